//! Completion and access flags stored in the key/value namespace.

use std::collections::HashSet;

use super::kv::{KeyValueStore, SqliteStore, StoreError};

/// Set once the visitor's email has been verified
pub const AUTH_KEY: &str = "ecg_auth_success";

/// Prefix of per-lesson completion keys (`lesson_completed_l0-1`)
pub const LESSON_COMPLETED_PREFIX: &str = "lesson_completed_";

const FLAG_TRUE: &str = "true";

pub fn completion_key(lesson_id: &str) -> String {
    format!("{LESSON_COMPLETED_PREFIX}{lesson_id}")
}

/// Record that every question of a lesson has been answered correctly
pub fn mark_lesson_completed(store: &dyn KeyValueStore, lesson_id: &str) -> Result<(), StoreError> {
    let key = completion_key(lesson_id);
    store.set(&key, FLAG_TRUE)?;
    tracing::info!("Saved progress: {}", key);
    Ok(())
}

pub fn is_lesson_completed(store: &dyn KeyValueStore, lesson_id: &str) -> Result<bool, StoreError> {
    Ok(store.get(&completion_key(lesson_id))?.as_deref() == Some(FLAG_TRUE))
}

/// Lesson ids with a completion flag set
pub fn completed_lessons(store: &SqliteStore<'_>) -> Result<HashSet<String>, StoreError> {
    Ok(store
        .entries_with_prefix(LESSON_COMPLETED_PREFIX)?
        .into_iter()
        .filter(|(_, value)| value == FLAG_TRUE)
        .filter_map(|(key, _)| key.strip_prefix(LESSON_COMPLETED_PREFIX).map(str::to_string))
        .collect())
}

pub fn is_authenticated(store: &dyn KeyValueStore) -> Result<bool, StoreError> {
    Ok(store.get(AUTH_KEY)?.as_deref() == Some(FLAG_TRUE))
}

pub fn set_authenticated(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    store.set(AUTH_KEY, FLAG_TRUE)
}
