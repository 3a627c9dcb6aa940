//! # 헬스체크(Health Check) 핸들러
//!
//! - `GET /api/v1/health` → `{ "status": "ok" }`
//!
//! 인증이 필요 없고 DB도 건드리지 않습니다.
//! 분류기 상태는 포함하지 않습니다.

use axum::Json;
use serde_json::{json, Value};

/// `GET /health`: 항상 200 OK
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok"
    }))
}
