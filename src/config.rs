//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(`.env` 파일 포함)에서 서버 설정값을 읽어옵니다.
//!
//! 설정 항목:
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `JWT_SECRET`: JWT 토큰 서명 비밀키 (필수, 서버만)
//! - `HOST` / `PORT`: 서버 바인딩 주소 (기본값 `0.0.0.0` / `3000`)
//! - `FRONTEND_DIST`: 빌드된 프론트엔드 정적 파일 디렉토리
//! - `CLASSIFIER_BASE_URL` / `CLASSIFIER_TIMEOUT_SECS`: 외부 감정 분류 서비스
//! - `LABEL_MAP_PATH` / `LABEL_VOCABULARY`: 라벨 매핑 카탈로그와 활성 어휘
//! - `SWEEP_INTERVAL_SECS` / `SWEEP_BATCH_SIZE` / `SWEEP_MAX_ATTEMPTS`: 재분류 스윕
//!
//! 값이 주어졌는데 해석할 수 없으면(예: `PORT=abc`) 기본값으로 넘어가지 않고 에러를 반환합니다.

use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::labels::{LabelCatalog, LabelMapError};
use crate::services::sweep::SweepPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),

    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to read label map {path}: {source}")]
    LabelMapIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    LabelMap(#[from] LabelMapError),
}

/// 서버 전체 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub frontend_dist: PathBuf,
    pub classifier: ClassifierConfig,
    pub sweep: SweepConfig,
}

/// 외부 감정 분류기와 라벨 매핑 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub label_map_path: Option<PathBuf>,
    pub label_vocabulary: Option<String>,
}

/// 재분류 스윕 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// `None`이면 서버 내부의 주기 실행을 끕니다 (`SWEEP_INTERVAL_SECS=0`).
    pub interval: Option<Duration>,
    pub batch_size: i64,
    pub max_attempts: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// `lookup`으로 값을 읽어 설정을 만듭니다.
    /// 테스트에서는 프로세스 환경변수 대신 HashMap 조회를 넘깁니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            database_url: database_url(&lookup)?,
            jwt_secret: required(&lookup, "JWT_SECRET")?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3000)?,
            frontend_dist: lookup("FRONTEND_DIST")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("../frontend/dist")),
            classifier: ClassifierConfig::from_lookup(&lookup)?,
            sweep: SweepConfig::from_lookup(&lookup)?,
        })
    }
}

/// `DATABASE_URL` (필수)
pub fn database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    required(lookup, "DATABASE_URL")
}

impl ClassifierConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs: u64 = parse_or(lookup, "CLASSIFIER_TIMEOUT_SECS", 10)?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "CLASSIFIER_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url: lookup("CLASSIFIER_BASE_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8000".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            label_map_path: non_empty(lookup, "LABEL_MAP_PATH").map(PathBuf::from),
            label_vocabulary: non_empty(lookup, "LABEL_VOCABULARY"),
        })
    }

    /// 라벨 카탈로그를 만듭니다.
    ///
    /// `LABEL_MAP_PATH`가 있으면 TOML 파일을, 없으면 내장 카탈로그를 사용하고,
    /// `LABEL_VOCABULARY`가 있으면 그 어휘를 활성화합니다.
    pub fn load_label_catalog(&self) -> Result<LabelCatalog, ConfigError> {
        let catalog = match &self.label_map_path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::LabelMapIo {
                    path: path.clone(),
                    source,
                })?;
                LabelCatalog::from_toml_str(&raw)?
            }
            None => LabelCatalog::builtin(),
        };

        match &self.label_vocabulary {
            Some(name) => Ok(catalog.select(name)?),
            None => Ok(catalog),
        }
    }
}

impl SweepConfig {
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs: u64 = parse_or(lookup, "SWEEP_INTERVAL_SECS", 300)?;
        let batch_size: i64 = parse_or(lookup, "SWEEP_BATCH_SIZE", 50)?;
        let max_attempts: i64 = parse_or(lookup, "SWEEP_MAX_ATTEMPTS", 5)?;

        for (key, value) in [("SWEEP_BATCH_SIZE", batch_size), ("SWEEP_MAX_ATTEMPTS", max_attempts)] {
            if value < 1 {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    "must be at least 1".to_string(),
                ));
            }
        }

        Ok(Self {
            interval: (interval_secs > 0).then(|| Duration::from_secs(interval_secs)),
            batch_size,
            max_attempts,
        })
    }

    pub fn policy(&self) -> SweepPolicy {
        SweepPolicy {
            batch_size: self.batch_size,
            max_attempts: self.max_attempts,
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key).ok_or_else(|| ConfigError::MissingVar(key.to_string()))
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}
