//! # 기분(Mood)과 이모지 모델
//!
//! 일기 항목에 붙는 두 가지 분류 값을 정의합니다.
//! - `MoodCategory`: 외부 분류기 결과를 정규화한 기분 범주
//!   - 실제 범주 3개: `normal`, `stressed`, `depressed`
//!   - 센티널(sentinel) 2개: `unknown`(매핑 없는 라벨), `analysis_failed`(분류기 호출 실패)
//! - `Emoji`: 사용자가 직접 고르는 고정된 이모지 집합
//!
//! DB에는 두 값 모두 TEXT로 저장되며, `as_str()` / `FromStr`로 변환합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 정규화된 기분 범주
///
/// `Serialize`/`Deserialize`는 snake_case 문자열을 사용합니다.
/// 예: `MoodCategory::AnalysisFailed` ↔ `"analysis_failed"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodCategory {
    Normal,
    Stressed,
    Depressed,
    /// 분류기는 응답했지만 현재 어휘 테이블에 없는 라벨
    Unknown,
    /// 분류기 호출 실패 (스윕이 다시 시도)
    AnalysisFailed,
}

impl MoodCategory {
    /// 통계에 집계되는 실제 범주
    pub const REAL: [MoodCategory; 3] = [
        MoodCategory::Normal,
        MoodCategory::Stressed,
        MoodCategory::Depressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MoodCategory::Normal => "normal",
            MoodCategory::Stressed => "stressed",
            MoodCategory::Depressed => "depressed",
            MoodCategory::Unknown => "unknown",
            MoodCategory::AnalysisFailed => "analysis_failed",
        }
    }

    /// `normal | stressed | depressed`이면 true
    pub fn is_real(&self) -> bool {
        matches!(
            self,
            MoodCategory::Normal | MoodCategory::Stressed | MoodCategory::Depressed
        )
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized mood value: {0}")]
pub struct ParseMoodError(pub String);

impl FromStr for MoodCategory {
    type Err = ParseMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(MoodCategory::Normal),
            "stressed" => Ok(MoodCategory::Stressed),
            "depressed" => Ok(MoodCategory::Depressed),
            "unknown" => Ok(MoodCategory::Unknown),
            "analysis_failed" => Ok(MoodCategory::AnalysisFailed),
            other => Err(ParseMoodError(other.to_string())),
        }
    }
}

/// 분류 결과: 저장할 기분 값과, 그 값을 만든 어휘 태그(`name@vN`)
///
/// 분류기 호출이 실패하면 `vocabulary`는 `None`입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoodAssessment {
    pub mood: MoodCategory,
    pub vocabulary: Option<String>,
}

impl MoodAssessment {
    pub fn failed() -> Self {
        Self {
            mood: MoodCategory::AnalysisFailed,
            vocabulary: None,
        }
    }
}

/// 일기에 붙일 수 있는 이모지 (고정 집합)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Emoji {
    #[serde(rename = "🙂")]
    Smile,
    #[serde(rename = "😔")]
    Pensive,
    #[serde(rename = "😄")]
    Grin,
    #[serde(rename = "😡")]
    Angry,
    #[serde(rename = "😭")]
    Sob,
    #[serde(rename = "😕")]
    Confused,
    #[serde(rename = "😱")]
    Scream,
}

impl Emoji {
    pub const ALL: [Emoji; 7] = [
        Emoji::Smile,
        Emoji::Pensive,
        Emoji::Grin,
        Emoji::Angry,
        Emoji::Sob,
        Emoji::Confused,
        Emoji::Scream,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emoji::Smile => "🙂",
            Emoji::Pensive => "😔",
            Emoji::Grin => "😄",
            Emoji::Angry => "😡",
            Emoji::Sob => "😭",
            Emoji::Confused => "😕",
            Emoji::Scream => "😱",
        }
    }

    /// 요청 본문의 선택적 이모지 값을 해석합니다.
    ///
    /// - `None` 또는 공백뿐인 문자열 → `Ok(None)` (이모지 없음)
    /// - 고정 집합의 이모지 → `Ok(Some(emoji))`
    /// - 그 밖의 값 → `Err`
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Emoji>, ParseEmojiError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl fmt::Display for Emoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unsupported emoji: {0}")]
pub struct ParseEmojiError(pub String);

impl FromStr for Emoji {
    type Err = ParseEmojiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emoji::ALL
            .into_iter()
            .find(|emoji| emoji.as_str() == s)
            .ok_or_else(|| ParseEmojiError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_round_trips_through_its_db_text() {
        for mood in [
            MoodCategory::Normal,
            MoodCategory::Stressed,
            MoodCategory::Depressed,
            MoodCategory::Unknown,
            MoodCategory::AnalysisFailed,
        ] {
            assert_eq!(mood.as_str().parse::<MoodCategory>(), Ok(mood));
        }
        assert!("happy".parse::<MoodCategory>().is_err());
    }

    #[test]
    fn only_three_categories_are_real() {
        assert!(MoodCategory::REAL.iter().all(MoodCategory::is_real));
        assert!(!MoodCategory::Unknown.is_real());
        assert!(!MoodCategory::AnalysisFailed.is_real());
    }

    #[test]
    fn mood_serializes_as_snake_case() {
        let json = serde_json::to_string(&MoodCategory::AnalysisFailed).unwrap();
        assert_eq!(json, "\"analysis_failed\"");
    }

    #[test]
    fn parse_optional_emoji() {
        assert_eq!(Emoji::parse_optional(None), Ok(None));
        assert_eq!(Emoji::parse_optional(Some("  ")), Ok(None));
        assert_eq!(Emoji::parse_optional(Some("😡")), Ok(Some(Emoji::Angry)));
        assert_eq!(Emoji::parse_optional(Some(" 🙂 ")), Ok(Some(Emoji::Smile)));
        assert!(Emoji::parse_optional(Some("🐱")).is_err());
    }

    #[test]
    fn emoji_serializes_as_the_character() {
        let json = serde_json::to_string(&Emoji::Sob).unwrap();
        assert_eq!(json, "\"😭\"");
    }
}
