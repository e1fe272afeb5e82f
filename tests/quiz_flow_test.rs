mod common;

use axum::http::StatusCode;
use common::{location, pass_gate, TestApp};

#[tokio::test]
async fn test_full_quiz_marks_lesson_completed() {
    let app = TestApp::new();
    let server = app.browser();
    pass_gate(&server).await;

    let response = server.post("/lessons/l0-1/quiz/start").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/lessons/l0-1/quiz");

    let html = server.get("/lessons/l0-1/quiz").await.text();
    assert!(html.contains("What does the P wave represent?"));
    assert!(html.contains("問題 1 / 2"));

    // Wrong answer: same question again with a retry notice
    let response = server.post("/lessons/l0-1/quiz/choice").form(&[("choice", "1")]).await;
    assert_eq!(location(&response), "/lessons/l0-1/quiz?retry=1");
    let html = server.get("/lessons/l0-1/quiz?retry=1").await.text();
    assert!(html.contains("What does the P wave represent?"));
    assert!(html.contains("quiz-retry"));

    let response = server.post("/lessons/l0-1/quiz/choice").form(&[("choice", "0")]).await;
    assert_eq!(location(&response), "/lessons/l0-1/quiz");
    let html = server.get("/lessons/l0-1/quiz").await.text();
    assert!(html.contains("Order the waves"));
    assert!(html.contains("問題 2 / 2"));

    for word in ["1", "2", "0"] {
        server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", word)]).await;
    }
    assert!(app.stored_values("lesson_completed_l0-1").is_empty());

    let response = server.post("/lessons/l0-1/quiz/sort/check").await;
    assert_eq!(location(&response), "/lessons/l0-1/quiz");
    assert_eq!(app.stored_values("lesson_completed_l0-1"), vec!["true".to_string()]);

    let html = server.get("/lessons/l0-1/quiz").await.text();
    assert!(html.contains("全問正解おめでとうございます！"));
    assert!(html.contains("2 / 2 問正解"));
    assert!(html.contains("Atrial depolarization."));

    let html = server.get("/").await.text();
    assert!(html.contains("クリア"));
    assert!(html.contains("1 / 2"));
}

#[tokio::test]
async fn test_wrong_sort_order_can_be_corrected() {
    let app = TestApp::new();
    let server = app.browser();
    pass_gate(&server).await;
    server.post("/lessons/l0-1/quiz/start").await;
    server.post("/lessons/l0-1/quiz/choice").form(&[("choice", "0")]).await;

    for word in ["0", "1", "2"] {
        server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", word)]).await;
    }
    let response = server.post("/lessons/l0-1/quiz/sort/check").await;
    assert_eq!(location(&response), "/lessons/l0-1/quiz?retry=1");

    server.post("/lessons/l0-1/quiz/sort/reset").await;
    server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", "1")]).await;
    server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", "0")]).await;
    server.post("/lessons/l0-1/quiz/sort/remove").form(&[("word", "0")]).await;
    server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", "2")]).await;
    server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", "0")]).await;

    let response = server.post("/lessons/l0-1/quiz/sort/check").await;
    assert_eq!(location(&response), "/lessons/l0-1/quiz");
    assert_eq!(app.stored_values("lesson_completed_l0-1"), vec!["true".to_string()]);
}

#[tokio::test]
async fn test_explanation_carousel_navigation() {
    let app = TestApp::new();
    let server = app.browser();
    pass_gate(&server).await;
    server.post("/lessons/l0-1/quiz/start").await;
    server.post("/lessons/l0-1/quiz/choice").form(&[("choice", "0")]).await;
    for word in ["1", "2", "0"] {
        server.post("/lessons/l0-1/quiz/sort/place").form(&[("word", word)]).await;
    }
    server.post("/lessons/l0-1/quiz/sort/check").await;

    // Clamped at the first slide
    server.post("/lessons/l0-1/quiz/explanation/prev").await;
    let html = server.get("/lessons/l0-1/quiz").await.text();
    assert!(html.contains("What does the P wave represent?"));

    server.post("/lessons/l0-1/quiz/explanation/next").await;
    server.post("/lessons/l0-1/quiz/explanation/next").await;
    let html = server.get("/lessons/l0-1/quiz").await.text();
    assert!(html.contains("Order the waves"));
    assert!(html.contains("P QRS T"));

    server
        .post("/lessons/l0-1/quiz/explanation/goto")
        .form(&[("index", "0")])
        .await;
    let html = server.get("/lessons/l0-1/quiz").await.text();
    assert!(html.contains("Atrial depolarization"));
}

#[tokio::test]
async fn test_completion_is_per_visitor() {
    let app = TestApp::new();
    let alice = app.browser();
    let bob = app.browser();
    pass_gate(&alice).await;
    pass_gate(&bob).await;

    alice.post("/lessons/l0-2/quiz/start").await;
    alice.post("/lessons/l0-2/quiz/choice").form(&[("choice", "0")]).await;

    assert!(alice.get("/lessons/l0-2").await.text().contains("クリア"));
    assert!(!bob.get("/lessons/l0-2").await.text().contains("クリア"));
}

#[tokio::test]
async fn test_quiz_without_session_redirects_to_lesson() {
    let app = TestApp::new();
    let server = app.browser();
    pass_gate(&server).await;

    let response = server.get("/lessons/l0-1/quiz").await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/lessons/l0-1");

    let response = server.post("/lessons/l0-1/quiz/choice").form(&[("choice", "0")]).await;
    assert_eq!(location(&response), "/lessons/l0-1");
    assert!(app.stored_values("lesson_completed_l0-1").is_empty());
}

#[tokio::test]
async fn test_unknown_lesson_is_not_found() {
    let app = TestApp::new();
    let server = app.browser();

    server.get("/lessons/l9-9").await.assert_status(StatusCode::NOT_FOUND);
    server
        .post("/lessons/l9-9/quiz/start")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_legacy_links_redirect() {
    let app = TestApp::new();
    let server = app.browser();

    let response = server.get("/lesson-l0-1.html").await;
    response.assert_status(StatusCode::PERMANENT_REDIRECT);
    assert_eq!(location(&response), "/lessons/l0-1");

    let response = server.get("/index.html").await;
    assert_eq!(location(&response), "/");

    server.get("/lesson-l5-5.html").await.assert_status(StatusCode::NOT_FOUND);
}
