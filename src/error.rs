//! # 에러 처리 모듈
//!
//! HTTP 핸들러와 DB 계층이 공유하는 에러 타입을 정의합니다.
//! 예외(exception)를 던지는 대신 모든 함수가 `Result<T, AppError>`를 반환하고 `?`로 전파합니다.
//!
//! 이 모듈의 핵심:
//! - `AppError` 열거형(enum): 요청 처리 중 발생하는 모든 에러를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 `{ "error": { "code", "message" } }` JSON 응답으로 변환
//!
//! 감정 분류기 호출 실패(`ClassifyError`)는 여기에 없습니다.
//! 분류 실패는 사용자에게 에러로 보이지 않고, 일기를 `analysis_failed`로 저장하는 것으로 끝납니다.

use axum::{
    http::StatusCode,                   // HTTP 상태 코드 (400, 404, 500 등)
    response::{IntoResponse, Response}, // Axum의 응답 변환 트레이트
    Json,                               // JSON 응답 래퍼
};
use serde_json::json; // json! 매크로: JSON 객체를 리터럴처럼 작성
use thiserror::Error; // thiserror: Error/Display 구현을 derive로 생성

use crate::models::ParseEmojiError;
use crate::services::aggregation::WindowError;

// #[derive(Debug, Error)]
// - Debug: `{:?}` 출력 (tracing 필드로 찍을 때 사용)
// - Error (thiserror): std::error::Error 구현. 각 variant의 #[error("...")]가 Display 메시지가 됩니다.
//
// 새 variant를 추가하면 아래 `into_response`의 match가 컴파일 에러를 내므로
// 상태 코드 매핑을 빠뜨릴 수 없습니다 (exhaustive matching).

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
///
/// 핸들러에서 `Result<T, AppError>`를 반환하면,
/// Axum이 자동으로 `IntoResponse`를 호출하여 HTTP 응답으로 변환합니다.
#[derive(Debug, Error)]
pub enum AppError {
    // {0}은 튜플 variant의 첫 번째 필드를 가리키는 포맷 문법입니다.
    // err.to_string()이나 tracing의 `%err`가 이 메시지를 사용합니다.

    /// 요청한 리소스를 찾을 수 없음 (HTTP 404)
    /// 다른 사용자의 일기에 접근해도 404를 반환합니다 (존재 여부를 노출하지 않음).
    #[error("Resource not found")]
    NotFound,

    /// 잘못된 요청 (HTTP 400)
    /// 빈 본문, 알 수 없는 이모지, 잘못된 집계 기간 등
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 서버 내부 오류 (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// 데이터베이스 오류 (HTTP 500)
    /// #[from]: `From<sqlx::Error>`를 생성하므로 sqlx 호출 뒤의 `?`가
    /// 자동으로 AppError::Database로 변환됩니다.
    /// 저장소 에러는 이 계층에서 재시도하지 않고 그대로 전파합니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// 인증 실패 (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 리소스 충돌 (HTTP 409): 이미 존재하는 사용자명/이메일
    #[error("Conflict: {0}")]
    Conflict(String),
}

// 도메인 에러 → AppError 변환.
// 이 impl들이 있어야 핸들러에서 `query.resolve(now)?`, `emoji.parse()?`처럼 바로 `?`를 쓸 수 있습니다.

// 집계 윈도우 파라미터 오류(days=0, month=13 등)는 400입니다.
impl From<WindowError> for AppError {
    fn from(err: WindowError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

// 고정 이모지 집합 밖의 값은 400입니다.
impl From<ParseEmojiError> for AppError {
    fn from(err: ParseEmojiError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

// impl IntoResponse for AppError:
// 핸들러가 Err(AppError)를 반환하면 Axum이 이 메서드로 HTTP 응답을 만듭니다.
impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러(Database, Internal)는 실제 내용을 로그에만 기록하고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        // (상태 코드, 기계가 읽는 code, 사람이 읽는 message) 튜플
        let (status, code, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", self.to_string()),

            // ref: self를 이동(move)하지 않고 안쪽 String을 빌려옵니다.
            // NotFound 팔에서 self.to_string()을 쓰므로 match가 self를 소비하면 안 됩니다.
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AppError::Internal(ref msg) => {
                // 상세 내용은 서버 로그에만
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "database_error",
                    // SQL이나 제약 이름이 클라이언트로 새지 않게 고정 메시지
                    "A database error occurred".to_string(),
                )
            }
            AppError::Unauthorized(ref msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone())
            }
            AppError::Conflict(ref msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
        };

        // 결과: { "error": { "code": "not_found", "message": "Resource not found" } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        // Axum은 (StatusCode, Json<Value>) 튜플을 그대로 응답으로 바꿔줍니다.
        (status, body).into_response()
    }
}
