// System prompts for the question-answering pipeline.

use crate::llm_client::prompts::{PERSONA, PLAIN_TEXT_RULES};

const GROUNDED_RULES: &str = "INSTRUCTIONS:
1. Answer using only the information in the context from the knowledge base below.
2. Careers with closely related titles (e.g. \"Software Engineer\" and \"Software Engineering\") count as the same career.
3. If the context covers the question only partially, answer with what is available and say what is missing.
4. If the context is unrelated to the question, say that you do not have enough information.";

const UNGROUNDED_RULES: &str = "INSTRUCTIONS:
No knowledge base context is available for this question.
Say plainly that you do not have enough information in your knowledge base to answer it with confidence.
You may add brief general guidance, clearly marked as general advice, and suggest what the user could ask or provide instead.";

const OPEN_CHAT_RULES: &str = "INSTRUCTIONS:
Have a helpful, concise conversation about the user's career. \
If the user seems to want a specific capability, mention that you can parse a resume, recommend careers, \
analyze skill gaps, score job fit and track learning goals.";

/// Instructions when retrieval produced context.
pub fn grounded_system() -> String {
    format!("{PERSONA}\n\n{GROUNDED_RULES}\n\n{PLAIN_TEXT_RULES}")
}

/// Instructions when retrieval produced nothing or was unavailable.
pub fn ungrounded_system() -> String {
    format!("{PERSONA}\n\n{UNGROUNDED_RULES}\n\n{PLAIN_TEXT_RULES}")
}

/// Instructions for open-ended chat that skips retrieval entirely.
pub fn open_chat_system() -> String {
    format!("{PERSONA}\n\n{OPEN_CHAT_RULES}\n\n{PLAIN_TEXT_RULES}")
}
