//! Flashcard quizzes generated from document text.

use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use tracing::{debug, warn};

use crate::api::completions::complete;
use crate::api::{ApiError, ChatMessage};
use crate::core::config::Endpoint;
use crate::core::prompts::quiz_prompt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug)]
pub enum QuizError {
    /// The backend returned no usable text for the document.
    NoText,
    Api(ApiError),
    /// The model's reply was not a JSON array of flashcards.
    Parse(String),
}

impl fmt::Display for QuizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizError::NoText => write!(f, "No text extracted from document"),
            QuizError::Api(err) => write!(f, "Failed to generate questions: {err}"),
            QuizError::Parse(detail) => write!(f, "Failed to generate questions: {detail}"),
        }
    }
}

impl StdError for QuizError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            QuizError::Api(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ApiError> for QuizError {
    fn from(err: ApiError) -> Self {
        QuizError::Api(err)
    }
}

/// Join extracted sentences into the text the quiz prompt is built from.
pub fn quiz_source_text(sentences: &[String]) -> Result<String, QuizError> {
    let text = sentences
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    if text.is_empty() {
        Err(QuizError::NoText)
    } else {
        Ok(text)
    }
}

/// Strip a surrounding code fence, which models add despite being asked not to.
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(rest) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };
    // Drop the info string on the opening line, if any.
    let body = match rest.find('\n') {
        Some(newline) if !rest[..newline].trim_start().starts_with('[') => &rest[newline + 1..],
        _ => rest,
    };
    body.trim()
}

/// Parse the model's reply into flashcards.
pub fn parse_flashcards(reply: &str) -> Result<Vec<Flashcard>, QuizError> {
    let body = strip_code_fence(reply);
    let cards: Vec<Flashcard> =
        serde_json::from_str(body).map_err(|err| QuizError::Parse(err.to_string()))?;
    let cards: Vec<Flashcard> = cards
        .into_iter()
        .filter(|card| !card.question.trim().is_empty())
        .collect();
    if cards.is_empty() {
        return Err(QuizError::Parse("the reply contained no questions".to_string()));
    }
    Ok(cards)
}

/// Ask the quiz endpoint for `count` flashcards about `text`.
pub async fn generate_flashcards(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    text: &str,
    count: usize,
    temperature: f32,
) -> Result<Vec<Flashcard>, QuizError> {
    debug!(count, chars = text.len(), "generating flashcards");
    let reply = complete(
        client,
        endpoint,
        vec![ChatMessage::user(quiz_prompt(text, count))],
        Some(temperature),
    )
    .await?;
    parse_flashcards(&reply).inspect_err(|err| warn!(error = %err, "unusable quiz reply"))
}

/// Flashcards in display order with a per-card revealed flag.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    cards: Vec<Flashcard>,
    revealed: Vec<bool>,
}

impl Deck {
    pub fn new(cards: Vec<Flashcard>) -> Self {
        let revealed = vec![false; cards.len()];
        Self { cards, revealed }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Flashcard> {
        self.cards.get(index)
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        self.revealed.get(index).copied().unwrap_or(false)
    }

    /// Flip a card between question and answer. Returns the new state, or
    /// `None` for an index outside the deck.
    pub fn toggle(&mut self, index: usize) -> Option<bool> {
        let slot = self.revealed.get_mut(index)?;
        *slot = !*slot;
        Some(*slot)
    }

    pub fn reveal_all(&mut self) {
        self.revealed.iter_mut().for_each(|r| *r = true);
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|r| **r).count()
    }

    pub fn cards(&self) -> &[Flashcard] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_array() {
        let reply = r#"
[{"question": "What is ATP?", "answer": "Energy currency", "explanation": "Cells spend it."},
 {"question": "Where is it made?", "answer": "Mitochondria"}]
"#;
        let cards = parse_flashcards(reply).expect("parse");
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].explanation.as_deref(), Some("Cells spend it."));
        assert_eq!(cards[1].answer, "Mitochondria");
        assert!(cards[1].explanation.is_none());
    }

    #[test]
    fn strips_surrounding_code_fence() {
        let reply = "```json\n[{\"question\": \"Q\", \"answer\": \"A\"}]\n```";
        let cards = parse_flashcards(reply).expect("parse");
        assert_eq!(cards[0].question, "Q");

        let bare = "```[{\"question\": \"Q\", \"answer\": \"A\"}]```";
        assert_eq!(parse_flashcards(bare).expect("parse").len(), 1);
    }

    #[test]
    fn prose_reply_is_a_parse_error() {
        let err = parse_flashcards("Here are your questions: 1. What is ATP?").unwrap_err();
        assert!(matches!(err, QuizError::Parse(_)));
        assert!(err.to_string().starts_with("Failed to generate questions"));
    }

    #[test]
    fn empty_array_is_rejected() {
        assert!(matches!(parse_flashcards("[]"), Err(QuizError::Parse(_))));
        assert!(matches!(
            parse_flashcards(r#"[{"question": " ", "answer": "x"}]"#),
            Err(QuizError::Parse(_))
        ));
    }

    #[test]
    fn source_text_skips_blank_sentences() {
        let sentences = vec!["First.".to_string(), "  ".to_string(), " Second. ".to_string()];
        assert_eq!(quiz_source_text(&sentences).expect("text"), "First.\nSecond.");
        assert!(matches!(quiz_source_text(&[]), Err(QuizError::NoText)));
    }

    #[test]
    fn deck_tracks_reveal_state_per_card() {
        let card = |q: &str| Flashcard {
            question: q.to_string(),
            answer: format!("{q}!"),
            explanation: None,
        };
        let mut deck = Deck::new(vec![card("a"), card("b"), card("c")]);
        assert_eq!(deck.revealed_count(), 0);
        assert_eq!(deck.toggle(1), Some(true));
        assert!(deck.is_revealed(1));
        assert!(!deck.is_revealed(0));
        assert_eq!(deck.toggle(1), Some(false));
        assert_eq!(deck.toggle(9), None);
        deck.reveal_all();
        assert_eq!(deck.revealed_count(), 3);
        assert_eq!(deck.get(2).map(|c| c.answer.as_str()), Some("c!"));
    }
}
