//! Application state shared by all handlers.

use std::sync::Arc;

use crate::content::LessonCatalog;
use crate::db::DbPool;
use crate::gate::AccessGate;
use crate::session::QuizSessions;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Key/value store database
    pub pool: DbPool,
    /// Lessons loaded at startup
    pub lessons: Arc<LessonCatalog>,
    /// Active quiz sessions by visitor and lesson
    pub sessions: QuizSessions,
    pub gate: AccessGate,
}

impl AppState {
    pub fn new(pool: DbPool, lessons: LessonCatalog, gate: AccessGate) -> Self {
        Self {
            pool,
            lessons: Arc::new(lessons),
            sessions: QuizSessions::new(),
            gate,
        }
    }
}
