#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::TestServer;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use ecg_quiz::app::build_router;
use ecg_quiz::content::{parse_lesson, LessonCatalog};
use ecg_quiz::db::{self, DbPool};
use ecg_quiz::gate::{AccessGate, EmailVerifier, VerifyError};
use ecg_quiz::state::AppState;

pub const REGISTERED_EMAIL: &str = "nurse@example.com";

pub const LESSON_L0_1: &str = r#"{
    "id": "l0-1",
    "title": "Basic waveforms",
    "body": ["The P wave comes first."],
    "questions": [
        {
            "type": "choice",
            "question": "What does the P wave represent?",
            "choices": ["Atrial depolarization", "Ventricular depolarization"],
            "correct": 0,
            "explanation": "Atrial depolarization."
        },
        {
            "type": "sort",
            "question": "Order the waves",
            "words": ["T", "P", "QRS"],
            "correctOrder": [1, 2, 0],
            "explanation": "P then QRS then T."
        }
    ]
}"#;

pub const LESSON_L0_2: &str = r#"{
    "id": "l0-2",
    "title": "Heart rate",
    "questions": [
        {
            "type": "true_false",
            "question": "300 / 4 is 75.",
            "choices": ["True", "False"],
            "correct": 0
        }
    ]
}"#;

/// Accepts only `REGISTERED_EMAIL` and records every call.
/// While `offline` is set every call fails as a transport error.
pub struct StubVerifier {
    pub calls: Mutex<Vec<String>>,
    pub offline: AtomicBool,
}

#[async_trait]
impl EmailVerifier for StubVerifier {
    async fn verify(&self, email: &str) -> Result<(), VerifyError> {
        self.calls.lock().unwrap().push(email.to_string());
        if self.offline.load(Ordering::SeqCst) {
            Err(VerifyError::NotConfigured)
        } else if email == REGISTERED_EMAIL {
            Ok(())
        } else {
            Err(VerifyError::Rejected(Some("not registered".to_string())))
        }
    }
}

pub struct TestApp {
    pub state: AppState,
    pub pool: DbPool,
    pub verifier: Arc<StubVerifier>,
    temp: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let pool = db::init_db(&temp.path().join("ecg.db")).unwrap();

        let mut lessons = LessonCatalog::default();
        lessons.insert(parse_lesson(LESSON_L0_1, "").unwrap());
        lessons.insert(parse_lesson(LESSON_L0_2, "").unwrap());

        let verifier = Arc::new(StubVerifier {
            calls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        });
        let state = AppState::new(pool.clone(), lessons, AccessGate::new(verifier.clone()));

        Self {
            state,
            pool,
            verifier,
            temp,
        }
    }

    /// A fresh browser: its own cookie jar, so its own visitor id.
    pub fn browser(&self) -> TestServer {
        let app = build_router(self.state.clone(), Path::new("static"));
        TestServer::builder().save_cookies().build(app).unwrap()
    }

    /// Stored values for `key` across all visitors.
    pub fn stored_values(&self, key: &str) -> Vec<String> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn
            .prepare("SELECT value FROM kv_store WHERE key = ?1")
            .unwrap();
        stmt.query_map([key], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap()
    }

    pub fn set_verifier_offline(&self, offline: bool) {
        self.verifier.offline.store(offline, Ordering::SeqCst);
    }

    pub fn verify_calls(&self) -> Vec<String> {
        self.verifier.calls.lock().unwrap().clone()
    }
}

/// Pass the gate with the registered email.
pub async fn pass_gate(server: &TestServer) {
    let response = server
        .post("/gate/verify")
        .form(&[("email", REGISTERED_EMAIL), ("next", "/")])
        .await;
    assert_eq!(response.status_code(), 303);
}

pub fn location(response: &axum_test::TestResponse) -> String {
    response.header("location").to_str().unwrap().to_string()
}
