//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! SQLite와 직접 상호작용하는 함수들을 모아둔 모듈입니다.
//! 라우트 핸들러(routes/), 집계기, 스윕이 이 모듈의 함수를 호출합니다.
//!
//! 각 하위 모듈:
//! - `entries`: 일기 CRUD 쿼리 + 스윕용 조건부(compare-and-set) 갱신
//! - `stats`: 기분/이모지/타임라인/캘린더 집계 쿼리
//! - `users`: 사용자 인증 관련 쿼리
//!
//! 시각은 모두 `%Y-%m-%dT%H:%M:%S%.3fZ` 형식의 UTC 문자열로 저장합니다.
//! 이 형식은 문자열 비교 순서가 시간 순서와 같아서, 기간 조건을 `>=`/`<` 비교로 쓸 수 있습니다.

pub mod entries;
pub mod stats;
pub mod users;

pub use entries::*;
pub use stats::*;

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

/// DB에 저장하는 시각 문자열 형식 (SQLite의 `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`와 같은 모양)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// 저장된 시각 문자열을 다시 `DateTime<Utc>`로 읽습니다.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
}

/// 연결 풀을 만들고 마이그레이션을 실행합니다.
///
/// 서버와 스윕 바이너리가 같은 초기화 경로를 사용합니다.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_round_trip_at_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
            + chrono::Duration::milliseconds(42);
        let text = format_timestamp(at);
        assert_eq!(text, "2026-10-16T09:30:00.042Z");
        assert_eq!(parse_timestamp(&text).unwrap(), at);
    }

    #[test]
    fn sqlite_default_timestamps_parse() {
        assert!(parse_timestamp("2026-10-16T09:30:00.123Z").is_ok());
        assert!(parse_timestamp("16/10/2026").is_err());
    }
}
