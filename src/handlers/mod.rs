pub mod gate;
pub mod index;
pub mod lesson;
pub mod quiz;

use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::db::SqliteStore;
use crate::state::AppState;

pub use gate::verify_email;
pub use index::{index, legacy_page};
pub use lesson::lesson_page;
pub use quiz::{
    check_sort, explanation_go_to, explanation_next, explanation_prev, place_word, quiz_page,
    remove_word, reset_sort, start_quiz, submit_choice,
};

/// Shown when the database lock cannot be taken
pub const DB_ERROR_HTML: &str = "<h1>Database unavailable</h1><p>Please try again shortly.</p>";

/// Gate modal contents, rendered on any page while the gate is closed.
pub struct GateView {
    /// Where to go after a successful verification
    pub next: String,
    pub error: Option<String>,
    /// Previously entered address, kept on error
    pub email: String,
}

impl GateView {
    pub fn new(next: &str) -> Self {
        Self {
            next: next.to_string(),
            error: None,
            email: String::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub message: String,
}

/// Render a template, logging failures instead of serving an empty page.
pub fn render<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template render failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

pub fn not_found(message: impl Into<String>) -> Response {
    let template = NotFoundTemplate {
        message: message.into(),
    };
    (StatusCode::NOT_FOUND, render(&template)).into_response()
}

pub fn db_unavailable() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Html(DB_ERROR_HTML)).into_response()
}

/// `Some(GateView)` while the visitor still has to pass the gate.
pub fn gate_view(state: &AppState, store: &SqliteStore<'_>, next: &str) -> Option<GateView> {
    (!state.gate.is_open(store)).then(|| GateView::new(next))
}
