//! Question definitions as they appear in lesson files.
//!
//! Field names follow the lesson JSON format (`question`, `correct`,
//! `correctOrder`, `flexibleOrder`) so existing lesson content loads as-is.

use serde::{Deserialize, Serialize};

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Prompt shown above the answer controls
    #[serde(rename = "question")]
    pub text: String,
    /// Shown on the explanation carousel once the quiz is passed
    #[serde(default)]
    pub explanation: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Answer shape of a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// Pick one of several choices
    Choice { choices: Vec<String>, correct: usize },
    /// Two-choice variant of `Choice`, validated identically
    TrueFalse { choices: Vec<String>, correct: usize },
    /// Put words in order
    Sort {
        words: Vec<String>,
        #[serde(rename = "correctOrder")]
        correct_order: Vec<usize>,
        /// Groups of word indices whose relative order is not graded
        #[serde(rename = "flexibleOrder", default)]
        flexible_order: Vec<Vec<usize>>,
    },
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Choice { .. } => "choice",
            Self::TrueFalse { .. } => "true_false",
            Self::Sort { .. } => "sort",
        }
    }

    pub fn is_sort(&self) -> bool {
        matches!(self, Self::Sort { .. })
    }
}

impl Question {
    /// Choice labels, empty for sort questions.
    pub fn choices(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Choice { choices, .. } | QuestionKind::TrueFalse { choices, .. } => choices,
            QuestionKind::Sort { .. } => &[],
        }
    }

    /// Sortable words, empty for choice questions.
    pub fn words(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Sort { words, .. } => words,
            _ => &[],
        }
    }

    /// Human-readable correct answer for the explanation view.
    pub fn correct_answer_text(&self) -> String {
        match &self.kind {
            QuestionKind::Choice { choices, correct } | QuestionKind::TrueFalse { choices, correct } => {
                choices.get(*correct).cloned().unwrap_or_default()
            }
            QuestionKind::Sort {
                words,
                correct_order,
                ..
            } => correct_order
                .iter()
                .filter_map(|&i| words.get(i).map(String::as_str))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
