//! # 통계(집계) 응답 모델
//!
//! 기분 집계기가 만들어 프론트엔드(차트/캘린더)로 내보내는 평범한 데이터 구조체들입니다.
//! - `MoodCounts`: 실제 범주 3개의 고정 키 카운트 (`{normal, stressed, depressed}`)
//! - `UnclassifiedCounts`: 센티널 범주 카운트: 실제 범주와 구분해서 따로 내보냅니다
//! - `TimelinePoint`: 타임라인 한 점 (시각 + 기분)
//! - `CalendarDay`: 캘린더 하루 칸 (그날 마지막 일기의 이모지/기분)
//! - `Analysis`: 분석 페이지용 묶음 응답

use chrono::NaiveDate;
use serde::Serialize;

use super::mood::{Emoji, MoodCategory};

/// 실제 기분 범주별 개수
///
/// 세 키는 항상 존재하며, 해당 일기가 없으면 0입니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MoodCounts {
    pub normal: i64,
    pub stressed: i64,
    pub depressed: i64,
}

impl MoodCounts {
    /// 실제 범주이면 `n`만큼 더합니다. 센티널은 무시합니다.
    pub fn add(&mut self, mood: MoodCategory, n: i64) {
        match mood {
            MoodCategory::Normal => self.normal += n,
            MoodCategory::Stressed => self.stressed += n,
            MoodCategory::Depressed => self.depressed += n,
            MoodCategory::Unknown | MoodCategory::AnalysisFailed => {}
        }
    }

    pub fn total(&self) -> i64 {
        self.normal + self.stressed + self.depressed
    }
}

/// 아직 분류되지 않았거나(`analysis_failed`) 매핑이 없는(`unknown`) 일기 개수
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UnclassifiedCounts {
    pub unknown: i64,
    pub analysis_failed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    pub created_at: String,
    pub mood: MoodCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub emoji: Option<Emoji>,
    pub mood: MoodCategory,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub mood_distribution: MoodCounts,
    pub mood_timeline: Vec<TimelinePoint>,
    pub unclassified: UnclassifiedCounts,
}
