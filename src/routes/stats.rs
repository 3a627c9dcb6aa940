//! # 통계 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET /api/v1/stats/moods`    → `{ counts, unclassified }`
//! - `GET /api/v1/stats/timeline` → `{ timeline }`
//! - `GET /api/v1/stats/emojis`   → `{ emoji_counts }`
//! - `GET /api/v1/stats/calendar` → `{ days }` (`?year=&month=` 필수)
//! - `GET /api/v1/stats/analysis` → `{ mood_distribution, mood_timeline, unclassified }`
//!
//! 캘린더를 제외한 모든 엔드포인트는 같은 윈도우 파라미터(`WindowQuery`)를 받습니다.
//! - `?days=N` → 오늘 포함 최근 N일 (UTC)
//! - `?year=Y&month=M` → 그 달
//! - 없음 → 전체 기간

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::aggregation::{self, WindowQuery},
};

#[derive(Debug, Serialize)]
pub struct MoodStatsResponse {
    pub counts: MoodCounts,
    pub unclassified: UnclassifiedCounts,
}

#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub timeline: Vec<TimelinePoint>,
}

#[derive(Debug, Serialize)]
pub struct EmojiStatsResponse {
    pub emoji_counts: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub days: Vec<CalendarDay>,
}

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: i32,
    pub month: u32,
}

pub async fn mood_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<Json<MoodStatsResponse>, AppError> {
    let window = query.resolve(Utc::now())?;
    let (counts, unclassified) = aggregation::mood_breakdown(&state.pool, &auth_user.user_id, &window).await?;
    Ok(Json(MoodStatsResponse { counts, unclassified }))
}

pub async fn timeline_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<Json<TimelineResponse>, AppError> {
    let window = query.resolve(Utc::now())?;
    let timeline = aggregation::timeline(&state.pool, &auth_user.user_id, &window).await?;
    Ok(Json(TimelineResponse { timeline }))
}

pub async fn emoji_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<Json<EmojiStatsResponse>, AppError> {
    let window = query.resolve(Utc::now())?;
    let emoji_counts = aggregation::by_emoji(&state.pool, &auth_user.user_id, &window).await?;
    Ok(Json(EmojiStatsResponse { emoji_counts }))
}

/// 쿼리 파라미터가 빠지거나 숫자가 아니면 `Query` 추출 단계에서 400이 됩니다.
pub async fn calendar_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<CalendarResponse>, AppError> {
    let days = aggregation::calendar(&state.pool, &auth_user.user_id, query.year, query.month).await?;
    Ok(Json(CalendarResponse { days }))
}

pub async fn analysis_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Analysis>, AppError> {
    let window = query.resolve(Utc::now())?;
    let analysis = aggregation::analysis(&state.pool, &auth_user.user_id, &window).await?;
    Ok(Json(analysis))
}
