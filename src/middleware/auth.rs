use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::routes::AppState;

pub const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;
pub const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user id
    pub exp: i64,
    pub iat: i64,
    /// unique per token, so two refresh tokens issued in the same second never collide
    pub jti: String,
    pub kind: TokenKind,
}

/// Bearer 토큰에서 꺼낸 현재 사용자
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let claims = verify_token(token, &state.jwt_secret, TokenKind::Access)?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    ExpiredToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            AuthError::MissingToken => ("missing_token", "Authorization token is required"),
            AuthError::InvalidToken => ("invalid_token", "Invalid authorization token"),
            AuthError::ExpiredToken => ("expired_token", "Authorization token has expired"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// 발급된 토큰과 만료 시각
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn issue_token(
    user_id: &str,
    secret: &str,
    kind: TokenKind,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expires_at = match kind {
        TokenKind::Access => now + Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        TokenKind::Refresh => now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
    };
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        jti: uuid::Uuid::now_v7().to_string(),
        kind,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(IssuedToken { token, expires_at })
}

/// 서명, 만료, 토큰 종류를 확인합니다. 리프레시 토큰을 Bearer로 쓰면 `InvalidToken`입니다.
pub fn verify_token(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::InvalidToken,
    })?;

    if token_data.claims.kind != expected {
        return Err(AuthError::InvalidToken);
    }
    Ok(token_data.claims)
}

/// DB에는 리프레시 토큰 원문 대신 SHA-256 해시만 저장합니다.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
