//! Lesson index with per-lesson completion marks.

use askama::Template;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};

use super::{db_unavailable, gate_view, not_found, render, GateView};
use crate::content::lesson_id_from_href;
use crate::db::{self, LogOnError, SqliteStore};
use crate::state::AppState;
use crate::visitor::Visitor;

pub struct LessonLink {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

pub struct LevelView {
    pub heading: String,
    pub lessons: Vec<LessonLink>,
    pub completed_count: usize,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub gate: Option<GateView>,
    pub levels: Vec<LevelView>,
}

fn level_heading(level: Option<u32>) -> String {
    match level {
        Some(level) => format!("レベル {}", level),
        None => "その他".to_string(),
    }
}

/// GET / - lesson list grouped by level
pub async fn index(State(state): State<AppState>, visitor: Visitor) -> Response {
    let conn = match db::try_lock(&state.pool) {
        Ok(conn) => conn,
        Err(_) => return db_unavailable(),
    };
    let store = SqliteStore::new(&conn, &visitor.id);

    let completed = db::completed_lessons(&store).log_warn_default("Failed to load completed lessons");

    let levels = state
        .lessons
        .levels()
        .into_iter()
        .map(|group| {
            let lessons: Vec<LessonLink> = group
                .lessons
                .iter()
                .map(|lesson| LessonLink {
                    id: lesson.id.clone(),
                    title: lesson.title.clone(),
                    completed: completed.contains(&lesson.id),
                })
                .collect();
            LevelView {
                heading: level_heading(group.level),
                completed_count: lessons.iter().filter(|l| l.completed).count(),
                lessons,
            }
        })
        .collect();

    let template = IndexTemplate {
        gate: gate_view(&state, &store, "/"),
        levels,
    };

    render(&template)
}

/// GET /{page} - old static page links (`index.html`, `lesson-l0-1.html`)
pub async fn legacy_page(State(state): State<AppState>, Path(page): Path<String>) -> Response {
    if page == "index.html" {
        return Redirect::permanent("/").into_response();
    }

    match lesson_id_from_href(&page) {
        Some(id) if state.lessons.get(id).is_some() => {
            Redirect::permanent(&format!("/lessons/{}", id)).into_response()
        }
        _ => not_found("ページが見つかりません。"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_heading() {
        assert_eq!(level_heading(Some(0)), "レベル 0");
        assert_eq!(level_heading(None), "その他");
    }
}
