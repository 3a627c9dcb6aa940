//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들과, 이를 하나의 `Router`로 묶는 `build_app`입니다.
//!
//! 각 하위 모듈:
//! - `auth`: 인증 관련 (회원가입, 로그인, 토큰 갱신, 로그아웃, 내 정보)
//! - `entries`: 일기 CRUD 핸들러 (저장 시 감정 분류)
//! - `stats`: 기분/이모지/타임라인/캘린더 통계 핸들러
//! - `health`: 서버 상태 확인 (헬스체크)

pub mod auth;
pub mod entries;
pub mod health;
pub mod stats;

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::services::classifier::MoodClassifier;
use crate::services::labels::LabelCatalog;

/// 모든 핸들러가 공유하는 상태
///
/// `SqlitePool`은 내부적으로 `Arc`라서 clone해도 같은 풀을 가리킵니다.
/// 분류기와 라벨 카탈로그는 시작할 때 한 번 만들고 바꾸지 않으므로 `Arc`로 공유합니다.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    pub classifier: Arc<dyn MoodClassifier>,
    pub labels: Arc<LabelCatalog>,
}

/// `/api/v1` API 라우트
pub fn api_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    Router::new()
        .merge(auth_routes)
        .route("/entries", get(entries::list_entries).post(entries::create_entry))
        .route(
            "/entries/{id}",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route("/stats/moods", get(stats::mood_stats))
        .route("/stats/timeline", get(stats::timeline_stats))
        .route("/stats/emojis", get(stats::emoji_stats))
        .route("/stats/calendar", get(stats::calendar_stats))
        .route("/stats/analysis", get(stats::analysis_stats))
        .route("/health", get(health::health_check))
        .with_state(state)
}

/// 전체 앱: API + (있으면) 프론트엔드 정적 파일 + CORS/로깅 미들웨어
///
/// `frontend_dist`가 존재하는 디렉토리면 API에 매칭되지 않는 경로를 SPA로 넘기고,
/// 찾을 수 없는 파일은 `index.html`로 돌려보냅니다.
pub fn build_app(state: AppState, frontend_dist: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new().nest("/api/v1", api_router(state));

    let router = match frontend_dist.filter(|dir| dir.is_dir()) {
        Some(dir) => {
            tracing::info!("Serving frontend static files from {}", dir.display());
            let serve_dir = ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html")));
            router.fallback_service(serve_dir)
        }
        None => {
            tracing::warn!("Frontend dist directory not found, serving API only");
            router
        }
    };

    router.layer(cors).layer(TraceLayer::new_for_http())
}
