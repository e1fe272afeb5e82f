//! Quiz engine: question model, answer validation, and the per-lesson flow.

pub mod question;
pub mod review;
pub mod session;
pub mod validation;

pub use question::{Question, QuestionKind};
pub use review::ExplanationCursor;
pub use session::{AnswerRecord, QuizController, QuizState, SubmitOutcome};
pub use validation::{flexible_order_count, flexible_orders, validate, Submission, MAX_FLEXIBLE_ORDERS};
