//! Prompt templates sent to the language models.

/// Build the retrieval-augmented answer prompt for a user question.
pub fn rag_answer_prompt(document: &str, query: &str) -> String {
    format!(
        "You are an advanced Retrieval-Augmented Generation (RAG) system designed to provide \
accurate and concise answers based on retrieved documents. Use the following information \
to assist the user:

**Retrieved Document:**
{document}

**User Query:**
{query}

**Instructions:**
1. Analyze the retrieved document and extract relevant information to address the user's query.
2. Provide a clear, concise, and accurate response based solely on the document content.
3. If the document lacks sufficient information to fully answer the query, state that explicitly and avoid speculation.
4. Use natural language to ensure the response is easy to understand.

**Response:**
"
    )
}

/// Build the flashcard prompt. The model is asked for a bare JSON array.
pub fn quiz_prompt(text: &str, count: usize) -> String {
    format!(
        "Generate {count} quiz questions with answers from the following text.
{text}
Format the response as a JSON array of objects with 'question', 'answer' and an optional \
'explanation' property. Example: [{{\"question\": \"What is...\", \"answer\": \"The answer is...\", \
\"explanation\": \"Because...\"}}]

REMEMBER RETURN ONLY THE JSON ARRAY
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rag_prompt_embeds_document_and_query() {
        let prompt = rag_answer_prompt("Mitochondria make ATP.", "What makes ATP?");
        assert!(prompt.contains("**Retrieved Document:**\nMitochondria make ATP.\n"));
        assert!(prompt.contains("**User Query:**\nWhat makes ATP?\n"));
        assert!(prompt.trim_end().ends_with("**Response:**"));
    }

    #[test]
    fn quiz_prompt_requests_count_and_json_only() {
        let prompt = quiz_prompt("Some text", 15);
        assert!(prompt.starts_with("Generate 15 quiz questions"));
        assert!(prompt.contains("[{\"question\": \"What is...\""));
        assert!(prompt.contains("RETURN ONLY THE JSON ARRAY"));
    }
}
