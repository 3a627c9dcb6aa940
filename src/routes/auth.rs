use crate::{
    db::{format_timestamp, parse_timestamp, users as db_users, users::UserConflict},
    error::AppError,
    middleware::auth::{hash_token, issue_token, verify_token, AuthUser, TokenKind},
    models::user::*,
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 8;

fn validate_registration(req: &RegisterRequest) -> Result<(), AppError> {
    if req.username.trim().chars().count() < MIN_USERNAME_LEN {
        return Err(AppError::BadRequest(format!(
            "Username must be at least {} characters",
            MIN_USERNAME_LEN
        )));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    if !req.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    Ok(())
}

/// Issue an access/refresh pair and persist the refresh token's hash.
async fn start_session(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let access = issue_token(&user.id, &state.jwt_secret, TokenKind::Access)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh = issue_token(&user.id, &state.jwt_secret, TokenKind::Refresh)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let token_id = uuid::Uuid::now_v7().to_string();
    db_users::store_refresh_token(
        &state.pool,
        &token_id,
        &user.id,
        &hash_token(&refresh.token),
        &format_timestamp(refresh.expires_at),
    )
    .await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token: access.token,
        refresh_token: refresh.token,
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    validate_registration(&req)?;
    let username = req.username.trim();
    let email = req.email.trim();

    match db_users::find_conflict(&state.pool, username, email).await? {
        Some(UserConflict::Username) => {
            return Err(AppError::Conflict("Username already exists".to_string()))
        }
        Some(UserConflict::Email) => {
            return Err(AppError::Conflict("Email already exists".to_string()))
        }
        None => {}
    }

    // Argon2id with a random salt
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::now_v7().to_string();
    let user = db_users::create_user(&state.pool, &user_id, username, email, &password_hash).await?;
    tracing::info!(user_id = %user.id, "Registered user");

    Ok(Json(start_session(&state, user).await?))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = db_users::find_by_username(&state.pool, req.username.trim())
        .await?
        .ok_or_else(invalid)?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| invalid())?;

    Ok(Json(start_session(&state, user).await?))
}

/// Rotate: the presented refresh token is deleted and a new pair is issued.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_token(&req.refresh_token, &state.jwt_secret, TokenKind::Refresh)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    let token_hash = hash_token(&req.refresh_token);
    let (user_id, expires_at) = db_users::find_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = parse_timestamp(&expires_at)
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires < Utc::now() {
        db_users::delete_refresh_token(&state.pool, &token_hash).await?;
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    db_users::delete_refresh_token(&state.pool, &token_hash).await?;

    Ok(Json(start_session(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}
