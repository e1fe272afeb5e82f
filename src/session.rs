//! In-memory quiz sessions.
//!
//! One `QuizController` per (visitor, lesson). Sessions are never persisted and
//! auto-expire after a configurable duration of inactivity.

use crate::config;
use crate::quiz::QuizController;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Session entry with last access time for expiration
struct SessionEntry {
  quiz: QuizController,
  last_access: DateTime<Utc>,
}

/// Registry of active quiz sessions, shared through `AppState`.
#[derive(Clone, Default)]
pub struct QuizSessions {
  inner: Arc<Mutex<HashMap<String, SessionEntry>>>,
}

impl QuizSessions {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionEntry>> {
    // A panic mid-request leaves at worst one stale quiz behind
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Store `quiz` as the visitor's session for its lesson, replacing any previous one.
  pub fn insert(&self, visitor_id: &str, quiz: QuizController) {
    let mut sessions = self.lock();

    // Clean up expired sessions occasionally (~10% chance)
    if rand::random::<u8>() < config::SESSION_CLEANUP_THRESHOLD {
      cleanup_expired(&mut sessions);
    }

    sessions.insert(
      session_key(visitor_id, quiz.lesson_id()),
      SessionEntry {
        quiz,
        last_access: Utc::now(),
      },
    );
  }

  /// Run `f` against the visitor's session for `lesson_id`, if there is a live one.
  pub fn with_session<R>(
    &self,
    visitor_id: &str,
    lesson_id: &str,
    f: impl FnOnce(&mut QuizController) -> R,
  ) -> Option<R> {
    let mut sessions = self.lock();
    let key = session_key(visitor_id, lesson_id);
    let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);

    if sessions.get(&key).is_some_and(|entry| entry.last_access <= expiry) {
      sessions.remove(&key);
      return None;
    }

    let entry = sessions.get_mut(&key)?;
    entry.last_access = Utc::now();
    Some(f(&mut entry.quiz))
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

fn session_key(visitor_id: &str, lesson_id: &str) -> String {
  format!("{visitor_id}:{lesson_id}")
}

/// Clean up expired sessions
fn cleanup_expired(sessions: &mut HashMap<String, SessionEntry>) {
  let expiry = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS);
  sessions.retain(|_, entry| entry.last_access > expiry);
}

/// Generate a new visitor ID
pub fn generate_visitor_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..32)
    .map(|_| {
      let idx = rng.random_range(0..36u8);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::quiz::{Question, QuestionKind, QuizState};
  use crate::testing::MemoryStore;

  fn quiz(lesson_id: &str) -> QuizController {
    let questions = vec![Question {
      text: "q".to_string(),
      explanation: String::new(),
      kind: QuestionKind::Choice {
        choices: vec!["A".to_string(), "B".to_string()],
        correct: 0,
      },
    }];
    QuizController::new(lesson_id, Arc::new(questions))
  }

  #[test]
  fn test_sessions_are_keyed_by_visitor_and_lesson() {
    let sessions = QuizSessions::new();
    let store = MemoryStore::default();

    let mut q = quiz("l0-1");
    q.start(&store);
    sessions.insert("alice", q);
    sessions.insert("alice", quiz("l0-2"));
    sessions.insert("bob", quiz("l0-1"));
    assert_eq!(sessions.len(), 3);

    let state = sessions.with_session("alice", "l0-1", |q| q.state());
    assert_eq!(state, Some(QuizState::Presenting(0)));
    assert_eq!(sessions.with_session("bob", "l0-1", |q| q.state()), Some(QuizState::Idle));
    assert!(sessions.with_session("carol", "l0-1", |q| q.state()).is_none());
  }

  #[test]
  fn test_mutations_persist_between_calls() {
    let sessions = QuizSessions::new();
    let store = MemoryStore::default();
    sessions.insert("alice", quiz("l0-1"));

    sessions.with_session("alice", "l0-1", |q| q.start(&store));
    sessions.with_session("alice", "l0-1", |q| q.submit_choice(0, &store));
    let state = sessions.with_session("alice", "l0-1", |q| q.state());
    assert_eq!(state, Some(QuizState::Completed));
    assert_eq!(sessions.len(), 1);
  }

  #[test]
  fn test_expired_session_is_dropped() {
    let sessions = QuizSessions::new();
    sessions.insert("alice", quiz("l0-1"));
    {
      let mut inner = sessions.lock();
      let entry = inner.get_mut("alice:l0-1").unwrap();
      entry.last_access = Utc::now() - Duration::hours(config::SESSION_EXPIRY_HOURS + 1);
    }
    assert!(sessions.with_session("alice", "l0-1", |q| q.state()).is_none());
    assert!(sessions.is_empty());
  }

  #[test]
  fn test_generate_visitor_id() {
    let id = generate_visitor_id();
    assert_eq!(id.len(), 32);
    assert!(id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    assert_ne!(id, generate_visitor_id());
  }
}
