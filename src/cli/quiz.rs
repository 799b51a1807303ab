//! Flashcard quiz generated from a document.

use std::error::Error;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use ratatui::text::{Line, Span};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::context::CliContext;
use crate::core::quiz::{generate_flashcards, quiz_source_text, Deck, Flashcard};
use crate::core::upload::UploadPolicy;
use crate::ui::theme::Theme;

/// Lines for one card: the question, and the answer once revealed.
pub fn card_lines(
    card: &Flashcard,
    number: usize,
    total: usize,
    revealed: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("[{number}/{total}] "), theme.md_list_marker),
        Span::styled(card.question.clone(), theme.card_question_style),
    ])];
    if revealed {
        lines.push(Line::from(Span::styled(
            format!("  → {}", card.answer),
            theme.card_answer_style,
        )));
        if let Some(explanation) = card.explanation.as_deref().filter(|e| !e.trim().is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("    {explanation}"),
                theme.card_explanation_style,
            )));
        }
    }
    lines
}

async fn run_interactive(ctx: &CliContext, deck: &mut Deck) -> Result<(), Box<dyn Error>> {
    let total = deck.len();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    for index in 0..total {
        let Some(card) = deck.get(index).cloned() else {
            break;
        };
        ctx.print_lines(&card_lines(&card, index + 1, total, false, &ctx.theme))?;
        print!("  (Enter to reveal, q to stop) ");
        io::stdout().flush()?;
        match input.next_line().await? {
            Some(line) if line.trim().eq_ignore_ascii_case("q") => break,
            None => break,
            Some(_) => {}
        }
        deck.toggle(index);
        let revealed = card_lines(&card, index + 1, total, true, &ctx.theme);
        ctx.print_lines(&revealed[1..])?;
        println!();
    }

    eprintln!("Reviewed {} of {} cards.", deck.revealed_count(), total);
    Ok(())
}

pub async fn run_quiz(
    ctx: &CliContext,
    file: PathBuf,
    count: usize,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    let upload = UploadPolicy::quiz(ctx.config.max_upload_mb()).validate(&file)?;
    eprintln!("Extracting text from {}...", upload.file_name);
    let sentences = ctx.backend().extract_text(&upload).await?;
    let text = quiz_source_text(&sentences)?;

    eprintln!("Generating {count} questions...");
    let endpoint = ctx.config.quiz_endpoint();
    let cards = generate_flashcards(
        &ctx.client,
        &endpoint,
        &text,
        count,
        ctx.config.quiz_temperature(),
    )
    .await?;
    let mut deck = Deck::new(cards);

    if json {
        println!("{}", serde_json::to_string_pretty(deck.cards())?);
        return Ok(());
    }

    if io::stdin().is_terminal() {
        run_interactive(ctx, &mut deck).await
    } else {
        deck.reveal_all();
        let total = deck.len();
        for (index, card) in deck.cards().iter().enumerate() {
            ctx.print_lines(&card_lines(card, index + 1, total, true, &ctx.theme))?;
            println!();
        }
        Ok(())
    }
}
