//! Lesson content.
//!
//! Lessons live as JSON files under the lessons directory (see `paths`).
//! The catalog is loaded once at startup and shared read-only.

pub mod lessons;

pub use lessons::{
    is_safe_lesson_id, lesson_id_from_href, parse_lesson, parse_lesson_key, Lesson, LessonCatalog,
    LessonLoadError, LevelGroup,
};
