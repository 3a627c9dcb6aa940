//! # 사용자 / 리프레시 토큰 쿼리
//!
//! 사용자명과 이메일은 각각 UNIQUE입니다. 이메일 컬럼은 `COLLATE NOCASE`라서 대소문자만 다른
//! 주소도 같은 주소로 봅니다. 가입 라우트는 먼저 `find_conflict`로 확인해서
//! 409를 돌려주고, 동시에 가입이 겹쳐 UNIQUE 제약에 걸리면 DB 에러가 그대로 전파됩니다.

use crate::error::AppError;
use crate::models::user::User;
use sqlx::SqlitePool;

/// 가입 충돌 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserConflict {
    Username,
    Email,
}

pub async fn create_user(
    pool: &SqlitePool,
    id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, username, email, password_hash)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or(AppError::Internal("Failed to retrieve created user".to_string()))
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, email, password_hash, created_at, updated_at
        FROM users
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// 사용자명이 먼저, 그다음 이메일(대소문자 무시)을 확인합니다.
pub async fn find_conflict(
    pool: &SqlitePool,
    username: &str,
    email: &str,
) -> Result<Option<UserConflict>, AppError> {
    let row: Option<(i64, i64)> = sqlx::query_as(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM users WHERE username = ?),
            EXISTS(SELECT 1 FROM users WHERE email = ?)
        "#,
    )
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(match row {
        Some((1, _)) => Some(UserConflict::Username),
        Some((_, 1)) => Some(UserConflict::Email),
        _ => None,
    })
}

pub async fn store_refresh_token(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    token_hash: &str,
    expires_at: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO refresh_tokens (id, user_id, token_hash, expires_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(token_hash)
    .bind(expires_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// 토큰 해시로 `(user_id, expires_at)`을 찾습니다.
pub async fn find_refresh_token(
    pool: &SqlitePool,
    token_hash: &str,
) -> Result<Option<(String, String)>, AppError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT user_id, expires_at FROM refresh_tokens WHERE token_hash = ?",
    )
    .bind(token_hash)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

pub async fn delete_refresh_token(pool: &SqlitePool, token_hash: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete_user_refresh_tokens(pool: &SqlitePool, user_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(())
}
