//! Quiz pages and actions.
//!
//! Every action is a POST that mutates the visitor's `QuizController` and
//! redirects back to `GET /lessons/{id}/quiz`, which renders either the
//! current question or, once complete, the explanation carousel.

use askama::Template;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use super::{db_unavailable, not_found, render};
use crate::content::Lesson;
use crate::db::{self, KeyValueStore, SqliteStore};
use crate::quiz::{QuizController, QuizState, SubmitOutcome};
use crate::state::AppState;
use crate::visitor::Visitor;

pub struct ChoiceView {
    pub index: usize,
    pub text: String,
}

pub struct WordView {
    pub index: usize,
    pub text: String,
    pub used: bool,
}

pub struct SlideView {
    /// 1-based question number
    pub number: usize,
    pub question: String,
    pub correct_answer: String,
    pub explanation: String,
}

pub struct IndicatorView {
    pub index: usize,
    pub active: bool,
}

#[derive(Template)]
#[template(path = "quiz/question.html")]
pub struct QuestionTemplate {
    pub lesson_id: String,
    pub lesson_title: String,
    pub number: usize,
    pub total: usize,
    pub question: String,
    pub kind: &'static str,
    pub is_sort: bool,
    pub choices: Vec<ChoiceView>,
    pub words: Vec<WordView>,
    /// Placed words in answer order
    pub placed: Vec<WordView>,
    pub retry: bool,
}

#[derive(Template)]
#[template(path = "quiz/explanation.html")]
pub struct ExplanationTemplate {
    pub lesson_id: String,
    pub lesson_title: String,
    pub correct_count: usize,
    pub total: usize,
    pub slide: Option<SlideView>,
    pub indicators: Vec<IndicatorView>,
    pub is_first: bool,
    pub is_last: bool,
}

enum QuizPage {
    Question(QuestionTemplate),
    Explanation(ExplanationTemplate),
    NotStarted,
}

#[derive(Deserialize)]
pub struct QuizQuery {
    #[serde(default)]
    pub retry: Option<u8>,
}

#[derive(Deserialize)]
pub struct ChoiceForm {
    pub choice: Option<usize>,
}

#[derive(Deserialize)]
pub struct WordForm {
    pub word: usize,
}

#[derive(Deserialize)]
pub struct GoToForm {
    pub index: usize,
}

fn lesson_url(lesson_id: &str) -> String {
    format!("/lessons/{}", lesson_id)
}

fn quiz_url(lesson_id: &str) -> String {
    format!("/lessons/{}/quiz", lesson_id)
}

/// POST /lessons/{id}/quiz/start - the lesson's "complete lesson" trigger
pub async fn start_quiz(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
) -> Response {
    let Some(lesson) = state.lessons.get(&lesson_id) else {
        return not_found("レッスンが見つかりません。");
    };

    let conn = match db::try_lock(&state.pool) {
        Ok(conn) => conn,
        Err(_) => return db_unavailable(),
    };
    let store = SqliteStore::new(&conn, &visitor.id);

    if !state.gate.is_open(&store) {
        tracing::debug!("Quiz start for {} refused, gate closed", lesson.id);
        return Redirect::to(&lesson_url(&lesson.id)).into_response();
    }

    let mut quiz = QuizController::new(lesson.id.clone(), lesson.questions.clone());
    quiz.start(&store);
    state.sessions.insert(&visitor.id, quiz);

    Redirect::to(&quiz_url(&lesson.id)).into_response()
}

/// GET /lessons/{id}/quiz
pub async fn quiz_page(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
    Query(query): Query<QuizQuery>,
) -> Response {
    let Some(lesson) = state.lessons.get(&lesson_id) else {
        return not_found("レッスンが見つかりません。");
    };

    let retry = query.retry.unwrap_or(0) != 0;
    let page = state
        .sessions
        .with_session(&visitor.id, &lesson.id, |quiz| build_page(&lesson, quiz, retry))
        .unwrap_or(QuizPage::NotStarted);

    match page {
        QuizPage::Question(template) => render(&template),
        QuizPage::Explanation(template) => render(&template),
        QuizPage::NotStarted => Redirect::to(&lesson_url(&lesson.id)).into_response(),
    }
}

fn build_page(lesson: &Lesson, quiz: &QuizController, retry: bool) -> QuizPage {
    let total = quiz.questions().len();

    match quiz.state() {
        QuizState::Idle => QuizPage::NotStarted,
        QuizState::Presenting(_) => {
            let Some((index, question)) = quiz.current_question() else {
                return QuizPage::NotStarted;
            };
            let placed = quiz.placed();
            let words: Vec<WordView> = question
                .words()
                .iter()
                .enumerate()
                .map(|(i, text)| WordView {
                    index: i,
                    text: text.clone(),
                    used: placed.contains(&i),
                })
                .collect();
            let placed = placed
                .iter()
                .filter_map(|&i| {
                    question.words().get(i).map(|text| WordView {
                        index: i,
                        text: text.clone(),
                        used: true,
                    })
                })
                .collect();

            QuizPage::Question(QuestionTemplate {
                lesson_id: lesson.id.clone(),
                lesson_title: lesson.title.clone(),
                number: index + 1,
                total,
                question: question.text.clone(),
                kind: question.kind.as_str(),
                is_sort: question.kind.is_sort(),
                choices: question
                    .choices()
                    .iter()
                    .enumerate()
                    .map(|(i, text)| ChoiceView {
                        index: i,
                        text: text.clone(),
                    })
                    .collect(),
                words,
                placed,
                retry,
            })
        }
        QuizState::Completed => {
            let review = quiz.review();
            let slide = quiz.questions().get(review.index()).map(|q| SlideView {
                number: review.index() + 1,
                question: q.text.clone(),
                correct_answer: q.correct_answer_text(),
                explanation: q.explanation.clone(),
            });

            QuizPage::Explanation(ExplanationTemplate {
                lesson_id: lesson.id.clone(),
                lesson_title: lesson.title.clone(),
                correct_count: quiz.correct_count(),
                total,
                slide,
                indicators: (0..review.len())
                    .map(|i| IndicatorView {
                        index: i,
                        active: i == review.index(),
                    })
                    .collect(),
                is_first: review.is_first(),
                is_last: review.is_last(),
            })
        }
    }
}

/// Apply `action` to the visitor's session, then redirect back to the quiz.
///
/// The database lock is taken before the session lock, as in `start_quiz`.
fn apply<F>(state: &AppState, visitor: &Visitor, lesson_id: &str, action: F) -> Response
where
    F: FnOnce(&mut QuizController, &dyn KeyValueStore) -> Option<SubmitOutcome>,
{
    let conn = match db::try_lock(&state.pool) {
        Ok(conn) => conn,
        Err(_) => return db_unavailable(),
    };
    let store = SqliteStore::new(&conn, &visitor.id);

    match state
        .sessions
        .with_session(&visitor.id, lesson_id, |quiz| action(quiz, &store))
    {
        None => {
            tracing::debug!("No quiz session for {} on {}", visitor.id, lesson_id);
            Redirect::to(&lesson_url(lesson_id)).into_response()
        }
        Some(Some(SubmitOutcome::Retry)) => {
            Redirect::to(&format!("{}?retry=1", quiz_url(lesson_id))).into_response()
        }
        Some(_) => Redirect::to(&quiz_url(lesson_id)).into_response(),
    }
}

/// POST /lessons/{id}/quiz/choice
pub async fn submit_choice(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
    Form(form): Form<ChoiceForm>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, store| match form.choice {
        Some(choice) => Some(quiz.submit_choice(choice, store)),
        // Nothing selected counts as a wrong attempt
        None => quiz.current_question().map(|_| SubmitOutcome::Retry),
    })
}

/// POST /lessons/{id}/quiz/sort/place
pub async fn place_word(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
    Form(form): Form<WordForm>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, _| {
        quiz.place_word(form.word);
        None
    })
}

/// POST /lessons/{id}/quiz/sort/remove
pub async fn remove_word(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
    Form(form): Form<WordForm>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, _| {
        quiz.remove_word(form.word);
        None
    })
}

/// POST /lessons/{id}/quiz/sort/reset
pub async fn reset_sort(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, _| {
        quiz.reset_sort();
        None
    })
}

/// POST /lessons/{id}/quiz/sort/check
pub async fn check_sort(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, store| Some(quiz.check_sort(store)))
}

/// POST /lessons/{id}/quiz/explanation/prev
pub async fn explanation_prev(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, _| {
        quiz.prev_explanation();
        None
    })
}

/// POST /lessons/{id}/quiz/explanation/next
pub async fn explanation_next(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, _| {
        quiz.next_explanation();
        None
    })
}

/// POST /lessons/{id}/quiz/explanation/goto
pub async fn explanation_go_to(
    State(state): State<AppState>,
    visitor: Visitor,
    Path(lesson_id): Path<String>,
    Form(form): Form<GoToForm>,
) -> Response {
    apply(&state, &visitor, &lesson_id, |quiz, _| {
        quiz.go_to_explanation(form.index);
        None
    })
}
