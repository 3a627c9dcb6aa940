#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use moodlog::db;
use moodlog::models::{Emoji, Entry, MoodCategory, NewEntry};
use moodlog::services::classifier::{ClassifyError, MoodClassifier};
use sqlx::SqlitePool;

/// Fresh in-memory database with migrations applied.
///
/// One connection only: every `sqlite::memory:` connection is its own database.
pub async fn memory_pool() -> SqlitePool {
    db::connect("sqlite::memory:", 1).await.unwrap()
}

pub async fn insert_user(pool: &SqlitePool, username: &str) -> String {
    let id = uuid::Uuid::now_v7().to_string();
    db::users::create_user(
        pool,
        &id,
        username,
        &format!("{username}@example.com"),
        "not-a-real-hash",
    )
    .await
    .unwrap();
    id
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// Insert an entry with a chosen timestamp and mood, bypassing the classifier.
pub async fn insert_entry(
    pool: &SqlitePool,
    user_id: &str,
    created_at: DateTime<Utc>,
    mood: MoodCategory,
    emoji: Option<Emoji>,
) -> Entry {
    let vocabulary = match mood {
        MoodCategory::AnalysisFailed => None,
        _ => Some("sentiment-bert@v1".to_string()),
    };
    let new = NewEntry {
        id: uuid::Uuid::now_v7().to_string(),
        user_id: user_id.to_string(),
        title: Some("entry".to_string()),
        content: "today was a day".to_string(),
        emoji,
        mood,
        mood_vocabulary: vocabulary,
        created_at: db::format_timestamp(created_at),
    };
    db::create_entry(pool, &new).await.unwrap()
}

/// Classifier that replays a script of answers, then keeps failing.
///
/// `Ok(label)` is returned as the raw label, `Err(())` as an unavailable classifier.
pub struct StubClassifier {
    script: Mutex<VecDeque<Result<String, ()>>>,
    calls: AtomicUsize,
}

impl StubClassifier {
    pub fn scripted<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Result<S, ()>>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(answers.into_iter().map(|a| a.map(Into::into)).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always_failing() -> Self {
        Self::scripted(Vec::<Result<String, ()>>::new())
    }

    /// Answers `label` `n` times.
    pub fn repeating(label: &str, n: usize) -> Self {
        Self::scripted((0..n).map(|_| Ok(label.to_string())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MoodClassifier for StubClassifier {
    async fn classify(&self, _text: &str) -> Result<String, ClassifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(label)) => Ok(label),
            Some(Err(())) | None => Err(ClassifyError::Unavailable("stub is down".to_string())),
        }
    }
}
