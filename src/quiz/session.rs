//! Quiz flow for one lesson.
//!
//! `Idle -> Presenting(0) -> ... -> Presenting(n - 1) -> Completed`.
//! A correct answer advances; an incorrect one leaves the learner on the same
//! question with unlimited retries. Reaching `Completed` writes the lesson's
//! completion flag exactly once.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::question::{Question, QuestionKind};
use super::review::ExplanationCursor;
use super::validation::{validate, Submission};
use crate::db::{self, KeyValueStore, LogOnError};

/// Where the learner is in the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizState {
    Idle,
    Presenting(usize),
    Completed,
}

/// What the learner answered for one question (last attempt wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub submitted_text: String,
    pub is_correct: bool,
}

/// Result of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Correct; the next question is now presented
    Advanced,
    /// Correct on the last question; the quiz is complete
    Completed,
    /// Incorrect; still on the same question
    Retry,
    /// Nothing to answer (not started, or already complete)
    Ignored,
}

/// In-memory quiz session for one lesson.
#[derive(Debug, Clone)]
pub struct QuizController {
    lesson_id: String,
    questions: Arc<Vec<Question>>,
    state: QuizState,
    answers: BTreeMap<usize, AnswerRecord>,
    correct_count: usize,
    /// Word indices placed so far on a sort question
    sort_buffer: Vec<usize>,
    review: ExplanationCursor,
}

impl QuizController {
    pub fn new(lesson_id: impl Into<String>, questions: Arc<Vec<Question>>) -> Self {
        let review = ExplanationCursor::new(questions.len());
        Self {
            lesson_id: lesson_id.into(),
            questions,
            state: QuizState::Idle,
            answers: BTreeMap::new(),
            correct_count: 0,
            sort_buffer: Vec::new(),
            review,
        }
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerRecord> {
        &self.answers
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn review(&self) -> &ExplanationCursor {
        &self.review
    }

    /// Reset all progress and present the first question.
    ///
    /// A lesson without questions completes immediately.
    pub fn start(&mut self, store: &dyn KeyValueStore) -> QuizState {
        tracing::debug!("Quiz started for lesson {}", self.lesson_id);
        self.answers.clear();
        self.correct_count = 0;
        self.review = ExplanationCursor::new(self.questions.len());
        self.present(0, store);
        self.state
    }

    /// The question currently on screen.
    pub fn current_question(&self) -> Option<(usize, &Question)> {
        match self.state {
            QuizState::Presenting(index) => self.questions.get(index).map(|q| (index, q)),
            _ => None,
        }
    }

    /// Validate `submission` against the current question and move on if correct.
    pub fn submit_answer(&mut self, submission: Submission, store: &dyn KeyValueStore) -> SubmitOutcome {
        let Some((index, question)) = self.current_question() else {
            return SubmitOutcome::Ignored;
        };

        let is_correct = validate(question, &submission);
        let submitted_text = submitted_text(question, &submission);
        self.answers.insert(
            index,
            AnswerRecord {
                submitted_text,
                is_correct,
            },
        );

        if !is_correct {
            tracing::debug!("Incorrect answer for {} question {}", self.lesson_id, index);
            return SubmitOutcome::Retry;
        }

        self.correct_count += 1;
        self.present(index + 1, store);
        if self.state == QuizState::Completed {
            SubmitOutcome::Completed
        } else {
            SubmitOutcome::Advanced
        }
    }

    pub fn submit_choice(&mut self, choice: usize, store: &dyn KeyValueStore) -> SubmitOutcome {
        self.submit_answer(Submission::Choice(choice), store)
    }

    // ==================== Sort questions ====================

    /// Word indices placed so far, in placement order.
    pub fn placed(&self) -> &[usize] {
        &self.sort_buffer
    }

    /// Append a word to the answer. Unknown or already placed words are ignored.
    pub fn place_word(&mut self, word_index: usize) {
        let Some((_, question)) = self.current_question() else {
            return;
        };
        if word_index < question.words().len() && !self.sort_buffer.contains(&word_index) {
            self.sort_buffer.push(word_index);
        }
    }

    /// Take a placed word back out of the answer.
    pub fn remove_word(&mut self, word_index: usize) {
        self.sort_buffer.retain(|&i| i != word_index);
    }

    pub fn reset_sort(&mut self) {
        self.sort_buffer.clear();
    }

    /// Submit the placed words as the answer to a sort question.
    pub fn check_sort(&mut self, store: &dyn KeyValueStore) -> SubmitOutcome {
        let order = self.sort_buffer.clone();
        self.submit_answer(Submission::Order(order), store)
    }

    // ==================== Explanation review ====================

    pub fn prev_explanation(&mut self) {
        self.review.prev();
    }

    pub fn next_explanation(&mut self) {
        self.review.next();
    }

    pub fn go_to_explanation(&mut self, index: usize) {
        self.review.go_to(index);
    }

    fn present(&mut self, index: usize, store: &dyn KeyValueStore) {
        self.sort_buffer.clear();
        if index < self.questions.len() {
            self.state = QuizState::Presenting(index);
        } else {
            self.complete(store);
        }
    }

    fn complete(&mut self, store: &dyn KeyValueStore) {
        self.state = QuizState::Completed;
        self.review = ExplanationCursor::new(self.questions.len());
        db::mark_lesson_completed(store, &self.lesson_id)
            .log_warn(&format!("Failed to save completion for lesson {}", self.lesson_id));
    }
}

/// Text of what was submitted, as shown back to the learner.
fn submitted_text(question: &Question, submission: &Submission) -> String {
    match (&question.kind, submission) {
        (QuestionKind::Sort { words, .. }, Submission::Order(order)) => order
            .iter()
            .filter_map(|&i| words.get(i).map(String::as_str))
            .collect::<Vec<_>>()
            .join(" "),
        (_, Submission::Choice(i)) => question.choices().get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}
