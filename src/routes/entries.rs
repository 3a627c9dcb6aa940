//! # 일기(Entry) 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/v1/entries`      → 내 일기 목록 (최신순)
//! - `POST   /api/v1/entries`      → 새 일기 저장 (감정 분류 후 201)
//! - `GET    /api/v1/entries/{id}` → 단일 일기 조회
//! - `PUT    /api/v1/entries/{id}` → 제목/내용/이모지 교체 (텍스트가 바뀌면 재분류)
//! - `DELETE /api/v1/entries/{id}` → 일기 삭제 (204)
//!
//! 모든 핸들러는 `AuthUser` Extractor로 로그인한 사용자를 확인하고,
//! 그 사용자의 일기만 다룹니다. 다른 사용자의 일기 id는 404입니다.
//!
//! ## 저장과 분류
//! 저장 요청은 분류기를 한 번 호출한 뒤에 일기를 씁니다. 분류기가 실패하거나 타임아웃되어도
//! 일기는 `analysis_failed`로 저장되고 응답은 성공(201)입니다. 재분류는 스윕이 맡습니다.

use crate::{
    db,
    error::AppError,
    middleware::auth::AuthUser,
    models::*,
    routes::AppState,
    services::classifier::{assess, classification_text},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

/// 내용은 공백만으로 채울 수 없습니다.
fn require_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Content must not be empty".to_string()));
    }
    Ok(())
}

async fn classify(state: &AppState, title: Option<&str>, content: &str) -> MoodAssessment {
    let text = classification_text(title, content);
    assess(state.classifier.as_ref(), &state.labels, &text).await
}

/// `GET /entries`
pub async fn list_entries(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Entry>>, AppError> {
    let entries = db::list_entries_for_user(&state.pool, &auth_user.user_id).await?;
    Ok(Json(entries))
}

/// `POST /entries`
///
/// 입력 검증(내용, 이모지)을 분류기 호출보다 먼저 합니다.
/// 잘못된 요청으로 분류기를 부르지 않습니다.
pub async fn create_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(req): Json<CreateEntryRequest>,
) -> Result<(StatusCode, Json<Entry>), AppError> {
    require_content(&req.content)?;
    let emoji = Emoji::parse_optional(req.emoji.as_deref())?;
    let title = normalize_title(req.title);

    let assessment = classify(&state, title.as_deref(), &req.content).await;

    let new = NewEntry {
        id: uuid::Uuid::now_v7().to_string(),
        user_id: auth_user.user_id,
        title,
        content: req.content,
        emoji,
        mood: assessment.mood,
        mood_vocabulary: assessment.vocabulary,
        created_at: db::format_timestamp(Utc::now()),
    };
    let entry = db::create_entry(&state.pool, &new).await?;

    tracing::info!(entry_id = %entry.id, mood = %entry.mood, "Created entry");
    Ok((StatusCode::CREATED, Json(entry)))
}

/// `GET /entries/{id}`
pub async fn get_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Entry>, AppError> {
    let entry = db::get_entry_for_user(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(entry))
}

/// `PUT /entries/{id}`
///
/// 분류 입력(제목 + 내용)이 그대로면 기존 기분을 유지하고, 바뀌었으면 다시 분류합니다.
/// 이모지만 바꾸는 수정은 분류기를 부르지 않습니다.
pub async fn update_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateEntryRequest>,
) -> Result<Json<Entry>, AppError> {
    require_content(&req.content)?;
    let emoji = Emoji::parse_optional(req.emoji.as_deref())?;
    let title = normalize_title(req.title);

    let existing = db::get_entry_for_user(&state.pool, &id, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let text_changed = existing.title != title || existing.content != req.content;
    let assessment = if text_changed {
        Some(classify(&state, title.as_deref(), &req.content).await)
    } else {
        None
    };

    let changes = db::EntryChanges {
        title,
        content: req.content,
        emoji,
        assessment,
    };
    let entry = db::update_entry(&state.pool, &id, &auth_user.user_id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::debug!(entry_id = %entry.id, reclassified = text_changed, "Updated entry");
    Ok(Json(entry))
}

/// `DELETE /entries/{id}`
pub async fn delete_entry(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if !db::delete_entry(&state.pool, &id, &auth_user.user_id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
