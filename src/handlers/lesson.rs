use askama::Template;
use axum::extract::{Path, State};
use axum::response::Response;

use super::{db_unavailable, gate_view, not_found, render, GateView};
use crate::db::{self, LogOnError, SqliteStore};
use crate::state::AppState;
use crate::visitor::Visitor;

#[derive(Template)]
#[template(path = "lesson.html")]
pub struct LessonTemplate {
    pub gate: Option<GateView>,
    pub lesson_id: String,
    pub title: String,
    pub body: Vec<String>,
    pub completed: bool,
    pub question_count: usize,
}

/// GET /lessons/{id}
pub async fn lesson_page(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
) -> Response {
    let Some(lesson) = state.lessons.get(&lesson_id) else {
        tracing::debug!("Unknown lesson {}", lesson_id);
        return not_found("レッスンが見つかりません。");
    };

    let conn = match db::try_lock(&state.pool) {
        Ok(conn) => conn,
        Err(_) => return db_unavailable(),
    };
    let store = SqliteStore::new(&conn, &visitor.id);

    let completed = db::is_lesson_completed(&store, &lesson.id)
        .log_warn_default(&format!("Failed to read completion for {}", lesson.id));

    let template = LessonTemplate {
        gate: gate_view(&state, &store, &format!("/lessons/{}", lesson.id)),
        lesson_id: lesson.id.clone(),
        title: lesson.title.clone(),
        body: lesson.body.clone(),
        completed,
        question_count: lesson.questions.len(),
    };

    render(&template)
}
