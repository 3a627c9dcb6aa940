//! # 비즈니스 로직 계층
//!
//! - `labels`: 분류기 원시 라벨 → 기분 범주 정규화
//! - `classifier`: 외부 감정 분류 서비스 호출
//! - `sweep`: `analysis_failed` 일기 재분류
//! - `aggregation`: 기간별 기분 통계

pub mod aggregation;
pub mod classifier;
pub mod labels;
pub mod sweep;
