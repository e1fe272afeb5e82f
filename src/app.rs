//! Router construction, shared by `main` and the integration tests.

use axum::{middleware, routing::get, routing::post, Router};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::visitor::ensure_visitor;

pub fn build_router(state: AppState, static_dir: &Path) -> Router {
  Router::new()
    .route("/", get(handlers::index))
    .route("/gate/verify", post(handlers::verify_email))
    .route("/lessons/{id}", get(handlers::lesson_page))
    .route("/lessons/{id}/quiz", get(handlers::quiz_page))
    .route("/lessons/{id}/quiz/start", post(handlers::start_quiz))
    .route("/lessons/{id}/quiz/choice", post(handlers::submit_choice))
    .route("/lessons/{id}/quiz/sort/place", post(handlers::place_word))
    .route("/lessons/{id}/quiz/sort/remove", post(handlers::remove_word))
    .route("/lessons/{id}/quiz/sort/reset", post(handlers::reset_sort))
    .route("/lessons/{id}/quiz/sort/check", post(handlers::check_sort))
    .route("/lessons/{id}/quiz/explanation/prev", post(handlers::explanation_prev))
    .route("/lessons/{id}/quiz/explanation/next", post(handlers::explanation_next))
    .route("/lessons/{id}/quiz/explanation/goto", post(handlers::explanation_go_to))
    // Old static links: /index.html, /lesson-l0-1.html
    .route("/{page}", get(handlers::legacy_page))
    .nest_service("/static", ServeDir::new(static_dir))
    .layer(middleware::from_fn(ensure_visitor))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
