//! # moodlog
//!
//! 감정 일기 백엔드 라이브러리입니다. 서버(`main.rs`), 1회 스윕 바이너리(`bin/moodlog_sweep.rs`),
//! 통합 테스트(`tests/`)가 이 크레이트를 공유합니다.
//!
//! - `config`: 환경변수 설정
//! - `db`: SQLite 쿼리
//! - `error`: HTTP 에러 응답
//! - `middleware`: JWT 인증 Extractor
//! - `models`: 데이터 구조체
//! - `routes`: HTTP 핸들러와 라우터 조립
//! - `services`: 라벨 정규화, 분류기 게이트웨이, 스윕, 통계 집계

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
