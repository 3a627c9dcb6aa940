//! # 일기(Entry) 데이터베이스 쿼리 모듈
//!
//! `entries` 테이블에 대한 CRUD 쿼리와, 재분류 스윕이 쓰는 조건부 갱신 쿼리입니다.
//!
//! ## 소유권
//! 사용자 요청에서 오는 조회/수정/삭제는 모두 `WHERE id = ? AND user_id = ?`로 묶습니다.
//! 다른 사용자의 일기는 "없는 것"과 똑같이 `None` / `false`가 됩니다.
//!
//! ## 스윕의 compare-and-set
//! 스윕은 `analysis_failed` 일기를 읽은 뒤 외부 분류기를 호출하므로, 그 사이에 사용자가
//! 일기를 수정할 수 있습니다. 그래서 스윕의 갱신은 읽을 때 본 `updated_at`과
//! `mood = 'analysis_failed'`를 다시 확인하는 조건부 UPDATE로만 수행합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::SqlitePool;

/// DB 행 그대로의 모양: 기분/이모지는 TEXT
#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    id: String,
    user_id: String,
    title: Option<String>,
    content: String,
    emoji: Option<String>,
    mood: String,
    mood_vocabulary: Option<String>,
    classify_attempts: i64,
    created_at: String,
    updated_at: String,
}

impl TryFrom<EntryRow> for Entry {
    type Error = AppError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let mood = parse_mood(&row.mood)?;
        let emoji = Emoji::parse_optional(row.emoji.as_deref()).map_err(|e| {
            AppError::Internal(format!("entry {} has a corrupt emoji: {}", row.id, e))
        })?;

        Ok(Entry {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            content: row.content,
            emoji,
            mood,
            mood_vocabulary: row.mood_vocabulary,
            classify_attempts: row.classify_attempts,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// 저장된 기분 문자열을 해석합니다. CHECK 제약 때문에 실패는 곧 DB 손상입니다.
pub(crate) fn parse_mood(raw: &str) -> Result<MoodCategory, AppError> {
    raw.parse()
        .map_err(|e| AppError::Internal(format!("corrupt mood column: {}", e)))
}

fn into_entries(rows: Vec<EntryRow>) -> Result<Vec<Entry>, AppError> {
    rows.into_iter().map(Entry::try_from).collect()
}

/// 새 일기를 저장하고, 저장된 행을 다시 읽어 반환합니다.
///
/// `updated_at`은 `created_at`과 같은 값으로 시작합니다.
pub async fn create_entry(pool: &SqlitePool, new: &NewEntry) -> Result<Entry, AppError> {
    sqlx::query(
        r#"
        INSERT INTO entries (id, user_id, title, content, emoji, mood, mood_vocabulary,
                             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new.id)
    .bind(&new.user_id)
    .bind(&new.title)
    .bind(&new.content)
    .bind(new.emoji.map(|e| e.as_str()))
    .bind(new.mood.as_str())
    .bind(&new.mood_vocabulary)
    .bind(&new.created_at)
    .bind(&new.created_at)
    .execute(pool)
    .await?;

    get_entry(pool, &new.id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created entry".to_string()))
}

pub async fn get_entry(pool: &SqlitePool, id: &str) -> Result<Option<Entry>, AppError> {
    let row = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT id, user_id, title, content, emoji, mood, mood_vocabulary,
               classify_attempts, created_at, updated_at
        FROM entries
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Entry::try_from).transpose()
}

/// 소유자가 일치할 때만 일기를 반환합니다.
pub async fn get_entry_for_user(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> Result<Option<Entry>, AppError> {
    let row = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT id, user_id, title, content, emoji, mood, mood_vocabulary,
               classify_attempts, created_at, updated_at
        FROM entries
        WHERE id = ? AND user_id = ?
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    row.map(Entry::try_from).transpose()
}

/// 사용자의 모든 일기를 최신순으로 조회합니다.
pub async fn list_entries_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Entry>, AppError> {
    let rows = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT id, user_id, title, content, emoji, mood, mood_vocabulary,
               classify_attempts, created_at, updated_at
        FROM entries
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    into_entries(rows)
}

/// 사용자 수정 내용
///
/// `assessment`가 `Some`이면 텍스트가 바뀌어 다시 분류한 것이므로 기분/어휘를 교체하고
/// 실패 횟수를 0으로 되돌립니다. `None`이면 기존 기분을 유지합니다.
#[derive(Debug, Clone)]
pub struct EntryChanges {
    pub title: Option<String>,
    pub content: String,
    pub emoji: Option<Emoji>,
    pub assessment: Option<MoodAssessment>,
}

pub async fn update_entry(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    changes: &EntryChanges,
) -> Result<Option<Entry>, AppError> {
    let result = match &changes.assessment {
        Some(assessment) => {
            sqlx::query(
                r#"
                UPDATE entries
                SET title = ?, content = ?, emoji = ?,
                    mood = ?, mood_vocabulary = ?, classify_attempts = 0,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ? AND user_id = ?
                "#,
            )
            .bind(&changes.title)
            .bind(&changes.content)
            .bind(changes.emoji.map(|e| e.as_str()))
            .bind(assessment.mood.as_str())
            .bind(&assessment.vocabulary)
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                UPDATE entries
                SET title = ?, content = ?, emoji = ?,
                    updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                WHERE id = ? AND user_id = ?
                "#,
            )
            .bind(&changes.title)
            .bind(&changes.content)
            .bind(changes.emoji.map(|e| e.as_str()))
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?
        }
    };

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_entry(pool, id).await
}

/// 소유자의 일기를 삭제합니다. 삭제된 행이 있으면 true.
pub async fn delete_entry(pool: &SqlitePool, id: &str, user_id: &str) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM entries WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// 스윕 후보: 실패 예산이 남은 `analysis_failed` 일기, 오래된 것부터 `limit`개
pub async fn list_retryable_entries(
    pool: &SqlitePool,
    max_attempts: i64,
    limit: i64,
) -> Result<Vec<Entry>, AppError> {
    let rows = sqlx::query_as::<_, EntryRow>(
        r#"
        SELECT id, user_id, title, content, emoji, mood, mood_vocabulary,
               classify_attempts, created_at, updated_at
        FROM entries
        WHERE mood = 'analysis_failed' AND classify_attempts < ?
        ORDER BY created_at ASC, rowid ASC
        LIMIT ?
        "#,
    )
    .bind(max_attempts)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    into_entries(rows)
}

/// 스윕이 분류에 성공했을 때 기분을 기록합니다.
///
/// 읽은 뒤로 일기가 바뀌지 않았을 때(`updated_at` 동일, 여전히 `analysis_failed`)만 갱신하며,
/// 갱신했으면 true를 반환합니다. `updated_at`은 사용자 수정 시각이므로 건드리지 않습니다.
pub async fn resolve_failed_mood(
    pool: &SqlitePool,
    id: &str,
    seen_updated_at: &str,
    assessment: &MoodAssessment,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE entries
        SET mood = ?, mood_vocabulary = ?
        WHERE id = ? AND mood = 'analysis_failed' AND updated_at = ?
        "#,
    )
    .bind(assessment.mood.as_str())
    .bind(&assessment.vocabulary)
    .bind(id)
    .bind(seen_updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// 스윕의 분류 실패를 기록합니다 (`classify_attempts + 1`). 조건은 `resolve_failed_mood`와 같습니다.
pub async fn record_failed_attempt(
    pool: &SqlitePool,
    id: &str,
    seen_updated_at: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        UPDATE entries
        SET classify_attempts = classify_attempts + 1
        WHERE id = ? AND mood = 'analysis_failed' AND updated_at = ?
        "#,
    )
    .bind(id)
    .bind(seen_updated_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
