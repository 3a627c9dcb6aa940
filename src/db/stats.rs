//! # 통계 집계 쿼리
//!
//! 모든 쿼리는 `user_id = ?`와 윈도우 경계 `created_at >= ? AND created_at < ?`로 범위를 좁힙니다.
//! 축약(0 초기화, 센티널 분리, 날짜별 묶기)은 `services::aggregation`에서 합니다.

use crate::db::entries::parse_mood;
use crate::db::parse_timestamp;
use crate::error::AppError;
use crate::models::*;
use crate::services::aggregation::{AggregationWindow, CalendarRow};
use sqlx::SqlitePool;

/// 기분별 일기 수: 센티널 포함, 일기가 없는 기분은 행이 없습니다.
pub async fn mood_counts(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<Vec<(MoodCategory, i64)>, AppError> {
    let (start, end) = window.bounds();
    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT mood, COUNT(*)
        FROM entries
        WHERE user_id = ? AND created_at >= ? AND created_at < ?
        GROUP BY mood
        "#,
    )
    .bind(user_id)
    .bind(&start)
    .bind(&end)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(mood, count)| Ok((parse_mood(&mood)?, count)))
        .collect()
}

/// 실제 범주 일기의 타임라인
///
/// `rowid`는 삽입 순서이므로, 같은 `created_at`끼리는 저장된 순서가 유지됩니다.
pub async fn mood_timeline(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<Vec<TimelinePoint>, AppError> {
    let (start, end) = window.bounds();
    let rows: Vec<(String, String)> = sqlx::query_as(
        r#"
        SELECT created_at, mood
        FROM entries
        WHERE user_id = ? AND created_at >= ? AND created_at < ?
          AND mood IN ('normal', 'stressed', 'depressed')
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(user_id)
    .bind(&start)
    .bind(&end)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(created_at, mood)| {
            Ok(TimelinePoint {
                mood: parse_mood(&mood)?,
                created_at,
            })
        })
        .collect()
}

/// 이모지별 일기 수: NULL/빈 이모지는 제외합니다.
pub async fn emoji_counts(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<Vec<(String, i64)>, AppError> {
    let (start, end) = window.bounds();
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT emoji, COUNT(*)
        FROM entries
        WHERE user_id = ? AND created_at >= ? AND created_at < ?
          AND emoji IS NOT NULL AND TRIM(emoji) <> ''
        GROUP BY emoji
        "#,
    )
    .bind(user_id)
    .bind(&start)
    .bind(&end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// 캘린더용 행 (시각 오름차순, 동률은 저장 순서)
pub async fn calendar_rows(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<Vec<CalendarRow>, AppError> {
    let (start, end) = window.bounds();
    let rows: Vec<(String, Option<String>, String)> = sqlx::query_as(
        r#"
        SELECT created_at, emoji, mood
        FROM entries
        WHERE user_id = ? AND created_at >= ? AND created_at < ?
        ORDER BY created_at ASC, rowid ASC
        "#,
    )
    .bind(user_id)
    .bind(&start)
    .bind(&end)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(created_at, emoji, mood)| {
            let at = parse_timestamp(&created_at).map_err(|e| {
                AppError::Internal(format!("corrupt created_at '{}': {}", created_at, e))
            })?;
            let emoji = Emoji::parse_optional(emoji.as_deref())
                .map_err(|e| AppError::Internal(format!("corrupt emoji column: {}", e)))?;
            Ok(CalendarRow {
                created_at: at,
                emoji,
                mood: parse_mood(&mood)?,
            })
        })
        .collect()
}
