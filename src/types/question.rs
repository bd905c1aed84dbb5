//! Validated user question.

use std::fmt;

use crate::{ChattyError, Result};

/// Message returned to clients that send no usable question.
pub const QUESTION_REQUIRED: &str = "Question is required";

/// A trimmed, non-empty question.
///
/// The original casing is kept for display and as the cache key; keyword
/// matching lower-cases on its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question(String);

impl Question {
    /// Validate a raw question. Absent or whitespace-only input is rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            Some(text) if !text.is_empty() => Ok(Self(text.to_string())),
            _ => Err(ChattyError::InvalidInput(QUESTION_REQUIRED.to_string())),
        }
    }

    /// The trimmed text, case preserved.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Question {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_surrounding_whitespace() {
        let q = Question::parse(Some("  What is Urban Farm Lab?\n")).unwrap();
        assert_eq!(q.as_str(), "What is Urban Farm Lab?");
    }

    #[test]
    fn rejects_missing_and_blank() {
        assert!(matches!(
            Question::parse(None),
            Err(ChattyError::InvalidInput(_))
        ));
        assert!(matches!(
            Question::parse(Some("")),
            Err(ChattyError::InvalidInput(_))
        ));
        let err = Question::parse(Some(" \t\n ")).unwrap_err();
        assert!(err.to_string().contains(QUESTION_REQUIRED));
    }

    #[test]
    fn display_keeps_case() {
        let q = Question::parse(Some("Hello METROPOLIA")).unwrap();
        assert_eq!(q.to_string(), "Hello METROPOLIA");
    }
}
