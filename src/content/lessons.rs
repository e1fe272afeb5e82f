//! Lesson loading and the lesson catalog.
//!
//! Each lesson is one JSON file (`l0-1.json`) in the lessons directory,
//! holding the lesson text and its quiz questions. Lesson ids of the form
//! `l<level>-<number>` are grouped by level on the index page.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::quiz::{flexible_order_count, Question, QuestionKind, MAX_FLEXIBLE_ORDERS};

/// Lesson file as stored on disk.
#[derive(Debug, Clone, Deserialize)]
struct LessonFile {
    /// Defaults to the file stem when omitted
    #[serde(default)]
    id: String,
    title: String,
    /// Paragraphs of lesson text
    #[serde(default)]
    body: Vec<String>,
    #[serde(default)]
    questions: Vec<Question>,
}

/// A loaded lesson.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub body: Vec<String>,
    pub questions: Arc<Vec<Question>>,
}

impl Lesson {
    /// `(level, number)` parsed from the id, if it follows the `l0-1` scheme.
    pub fn key(&self) -> Option<(u32, u32)> {
        parse_lesson_key(&self.id)
    }
}

/// Lessons sharing a level, for the index page.
#[derive(Debug, Clone)]
pub struct LevelGroup {
    /// `None` for lessons outside the `l<level>-<number>` scheme
    pub level: Option<u32>,
    pub lessons: Vec<Arc<Lesson>>,
}

/// Error loading a lesson.
#[derive(Debug, Error)]
pub enum LessonLoadError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid lesson: {0}")]
    InvalidLesson(String),
}

/// All lessons known to the server, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct LessonCatalog {
    lessons: BTreeMap<String, Arc<Lesson>>,
}

impl LessonCatalog {
    /// Load every `*.json` lesson in `dir`. Invalid files are skipped with a warning.
    pub fn load_dir(dir: &Path) -> Result<Self, LessonLoadError> {
        let mut catalog = Self::default();

        if !dir.is_dir() {
            tracing::warn!("Lessons directory {} not found, no lessons loaded", dir.display());
            return Ok(catalog);
        }

        let entries = fs::read_dir(dir).map_err(|e| LessonLoadError::IoError(e.to_string()))?;

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match load_lesson_file(&path) {
                Ok(lesson) => {
                    if catalog.lessons.contains_key(&lesson.id) {
                        tracing::warn!("Duplicate lesson id {} in {}, skipping", lesson.id, path.display());
                        continue;
                    }
                    catalog.insert(lesson);
                }
                Err(e) => {
                    tracing::warn!("Failed to load lesson from {}: {}", path.display(), e);
                }
            }
        }

        tracing::info!("Loaded {} lessons from {}", catalog.len(), dir.display());
        Ok(catalog)
    }

    pub fn insert(&mut self, lesson: Lesson) {
        self.lessons.insert(lesson.id.clone(), Arc::new(lesson));
    }

    pub fn get(&self, id: &str) -> Option<Arc<Lesson>> {
        self.lessons.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    /// Lessons grouped by level, ordered by level then lesson number.
    /// Lessons outside the naming scheme come last, ordered by id.
    pub fn levels(&self) -> Vec<LevelGroup> {
        let mut by_level: BTreeMap<Option<u32>, Vec<Arc<Lesson>>> = BTreeMap::new();
        for lesson in self.lessons.values() {
            by_level
                .entry(lesson.key().map(|(level, _)| level))
                .or_default()
                .push(Arc::clone(lesson));
        }

        let mut unscoped = by_level.remove(&None);
        let mut groups: Vec<LevelGroup> = by_level
            .into_iter()
            .map(|(level, mut lessons)| {
                lessons.sort_by_key(|l| l.key().map(|(_, number)| number));
                LevelGroup { level, lessons }
            })
            .collect();

        if let Some(lessons) = unscoped.take() {
            groups.push(LevelGroup { level: None, lessons });
        }
        groups
    }
}

/// Parse `l<level>-<number>` (e.g. "l0-1" -> (0, 1)).
pub fn parse_lesson_key(id: &str) -> Option<(u32, u32)> {
    let rest = id.strip_prefix('l')?;
    let (level, number) = rest.split_once('-')?;
    if level.is_empty() || number.is_empty() {
        return None;
    }
    if !level.chars().all(|c| c.is_ascii_digit()) || !number.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((level.parse().ok()?, number.parse().ok()?))
}

/// Extract a lesson id from a legacy page link (`lesson-l0-1.html` -> "l0-1").
pub fn lesson_id_from_href(href: &str) -> Option<&str> {
    let file = href.rsplit('/').next()?;
    let id = file.strip_prefix("lesson-")?.strip_suffix(".html")?;
    parse_lesson_key(id).map(|_| id)
}

/// Lesson ids appear in storage keys and URLs: only alphanumerics, `-` and `_`.
pub fn is_safe_lesson_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn load_lesson_file(path: &Path) -> Result<Lesson, LessonLoadError> {
    let content = fs::read_to_string(path).map_err(|e| LessonLoadError::IoError(e.to_string()))?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    parse_lesson(&content, stem)
}

/// Parse and validate a lesson from JSON. `fallback_id` is used when the file has no id.
pub fn parse_lesson(json: &str, fallback_id: &str) -> Result<Lesson, LessonLoadError> {
    let mut file: LessonFile =
        serde_json::from_str(json).map_err(|e| LessonLoadError::ParseError(e.to_string()))?;

    if file.id.is_empty() {
        file.id = fallback_id.to_string();
    }

    validate_lesson(&file)?;

    Ok(Lesson {
        id: file.id,
        title: file.title,
        body: file.body,
        questions: Arc::new(file.questions),
    })
}

fn validate_lesson(file: &LessonFile) -> Result<(), LessonLoadError> {
    if !is_safe_lesson_id(&file.id) {
        return Err(LessonLoadError::InvalidLesson(format!(
            "Lesson id {:?} must be non-empty and use only letters, digits, '-' or '_'",
            file.id
        )));
    }

    for (i, question) in file.questions.iter().enumerate() {
        validate_question(question).map_err(|msg| {
            LessonLoadError::InvalidLesson(format!("{} question {}: {}", file.id, i + 1, msg))
        })?;
    }

    Ok(())
}

fn validate_question(question: &Question) -> Result<(), String> {
    if question.text.trim().is_empty() {
        return Err("missing question text".to_string());
    }

    match &question.kind {
        QuestionKind::Choice { choices, correct } | QuestionKind::TrueFalse { choices, correct } => {
            if choices.is_empty() {
                return Err("no choices".to_string());
            }
            if *correct >= choices.len() {
                return Err(format!("correct index {} out of range", correct));
            }
        }
        QuestionKind::Sort {
            words,
            correct_order,
            flexible_order,
        } => {
            if words.is_empty() {
                return Err("no words to sort".to_string());
            }
            let mut sorted = correct_order.clone();
            sorted.sort_unstable();
            if sorted != (0..words.len()).collect::<Vec<_>>() {
                return Err("correctOrder is not a permutation of the word indices".to_string());
            }
            let variants = flexible_order_count(correct_order, flexible_order);
            if variants > MAX_FLEXIBLE_ORDERS {
                return Err(format!(
                    "flexibleOrder allows {} orders, more than {}",
                    variants, MAX_FLEXIBLE_ORDERS
                ));
            }
        }
    }

    Ok(())
}
