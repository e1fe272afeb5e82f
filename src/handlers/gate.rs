//! Email gate submission.

use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::{render, GateView};
use crate::db::{self, SqliteStore};
use crate::gate::GateError;
use crate::state::AppState;
use crate::visitor::Visitor;

#[derive(Deserialize)]
pub struct GateForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub next: String,
}

/// Standalone gate page, used to show an inline error after a failed attempt.
#[derive(Template)]
#[template(path = "gate.html")]
pub struct GatePageTemplate {
    pub gate: GateView,
}

/// Only same-site absolute paths are followed after verification.
fn safe_next(next: &str) -> &str {
    if next.starts_with('/') && !next.starts_with("//") && !next.contains('\\') {
        next
    } else {
        "/"
    }
}

/// POST /gate/verify
pub async fn verify_email(
    State(state): State<AppState>,
    visitor: Visitor,
    Form(form): Form<GateForm>,
) -> Response {
    let next = safe_next(&form.next).to_string();

    // Network call happens before any lock is taken
    let result = match state.gate.verify(&form.email).await {
        Ok(_) => open_gate(&state, &visitor),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => Redirect::to(&next).into_response(),
        Err(e) => {
            let gate = GateView {
                next,
                error: Some(e.user_message()),
                email: form.email,
            };
            let status = match e {
                GateError::InvalidEmail => StatusCode::UNPROCESSABLE_ENTITY,
                GateError::Rejected(_) => StatusCode::FORBIDDEN,
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, render(&GatePageTemplate { gate })).into_response()
        }
    }
}

fn open_gate(state: &AppState, visitor: &Visitor) -> Result<(), GateError> {
    let conn = db::try_lock(&state.pool)?;
    let store = SqliteStore::new(&conn, &visitor.id);
    state.gate.open(&store)
}
