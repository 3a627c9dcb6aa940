//! # 데이터 모델 모듈
//!
//! 애플리케이션에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `entry`: 일기(Entry)와 생성/수정 요청
//! - `mood`: 기분 범주(MoodCategory)와 이모지(Emoji)
//! - `stats`: 집계 결과 (카운트, 타임라인, 캘린더)
//! - `user`: 사용자(User)와 인증 요청/응답
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Entry`처럼 짧게 접근합니다.

pub mod entry;
pub mod mood;
pub mod stats;
pub mod user;

pub use entry::*;
pub use mood::*;
pub use stats::*;
pub use user::*;
