//! Assistant reply parsing
//!
//! Turns a free-text assistant reply into the structured form the chat widget
//! renders: the prose message plus an optional question with preset answers.
//!
//! The assistant is prompted to mark questions up like this:
//!
//! ```text
//! **Question:** What platform would you prefer?
//!
//! **Options:**
//! • Shopify
//! • WooCommerce
//! ```
//!
//! Parsing is lenient. Markup that doesn't fit the convention degrades to a
//! plain message with no question; it is never an error.

use serde::{Deserialize, Serialize};


const QUESTION_MARKER: &str = "**Question:**";
const OPTIONS_MARKER: &str = "**Options:**";
const OPTION_BULLET: char = '•';

/// How many options the user may pick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    Single,
    Multiple,
}

/// A question offered alongside an assistant message, with preset answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
}

/// Structured result of one assistant call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantResponse {
    /// User-visible text, never containing question markup
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<StructuredQuestion>,
    /// Set when the assistant could not answer; `message` may still hold a
    /// fallback the user can read
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AssistantResponse {
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            question: None,
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            question: None,
            error: Some(error.into()),
        }
    }

    pub fn has_question(&self) -> bool {
        self.question.is_some()
    }
}

/// Parse a raw assistant reply.
///
/// Single forward pass over the lines. A `**Question:**` line records the
/// question text (last one wins) and leaves options mode. `**Options:**`
/// enters options mode, where only `•` lines count and everything else is
/// dropped. Outside options mode, non-empty lines form the message.
///
/// The question is attached only when both its text and at least one option
/// were found.
pub fn parse_reply(raw: &str) -> AssistantResponse {
    let mut message_lines: Vec<&str> = Vec::new();
    let mut options: Vec<String> = Vec::new();
    let mut question = String::new();
    let mut in_options = false;

    for line in raw.split('\n') {
        let line = trim_text(line);

        if let Some(rest) = line.strip_prefix(QUESTION_MARKER) {
            question = trim_text(rest).to_string();
            in_options = false;
        } else if line.starts_with(OPTIONS_MARKER) {
            in_options = true;
        } else if in_options {
            if let Some(rest) = line.strip_prefix(OPTION_BULLET) {
                let option = trim_text(rest);
                if !option.is_empty() {
                    options.push(option.to_string());
                }
            }
        } else if !line.is_empty() {
            message_lines.push(line);
        }
    }

    let question = if !question.is_empty() && !options.is_empty() {
        Some(StructuredQuestion {
            question,
            options,
            kind: QuestionKind::Single,
        })
    } else {
        None
    };

    AssistantResponse {
        message: trim_text(&message_lines.join("\n")).to_string(),
        question,
        error: None,
    }
}

/// Trim whitespace and byte-order marks
fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}
