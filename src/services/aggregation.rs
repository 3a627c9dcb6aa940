//! # 기분 집계기(Mood Aggregator)
//!
//! 저장된 일기를 사용자 + 기간(윈도우) 단위로 모아 통계 화면이 쓰는 형태로 만듭니다.
//!
//! ## 제공하는 집계
//! - `counts_by_category`: 실제 기분 범주 3개의 개수 (0으로 초기화된 고정 키)
//! - `unclassified_counts`: `unknown` / `analysis_failed` 개수 (실제 범주와 분리)
//! - `timeline`: `{created_at, mood}` 목록, 시각 오름차순 (같은 시각은 저장 순서 유지)
//! - `by_emoji`: 이모지별 개수 (이모지가 없는 일기 제외)
//! - `calendar`: 특정 월의 날짜별 칸 (그날 마지막 일기의 이모지/기분)
//! - `analysis`: 분석 페이지용 묶음 (분포 + 타임라인 + 미분류)
//!
//! ## 윈도우(AggregationWindow)
//! 모든 윈도우는 UTC 기준 반열린 구간 `[start, end)` 입니다.
//! ```text
//! 최근 N일:  [오늘 00:00 - (N-1)일, now]         → 오늘을 포함한 N개의 달력 날짜, `now`까지
//! 월 단위:   [YYYY-MM-01 00:00, 다음 달 1일 00:00)
//! 전체 기간: [1970-01-01, 9999-12-31)
//! ```
//!
//! SQL은 `db::stats`에 있고, 이 모듈은 윈도우 계산과 순수한 축약(reduce) 함수를 담당합니다.
//! 센티널 기분은 어떤 경우에도 실제 범주 개수에 섞이지 않습니다.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use thiserror::Error;

use crate::db;
use crate::error::AppError;
use crate::models::*;

/// `days` 파라미터의 상한 (약 10년)
pub const MAX_WINDOW_DAYS: i64 = 3660;

/// 1970-01-01부터 9999-12-31까지의 일수: 전체 기간 윈도우의 끝
const DAYS_UNTIL_YEAR_9999_END: i64 = 2_932_896;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error("days must be between 1 and {max}, got {days}")]
    InvalidDays { days: i64, max: i64 },

    #[error("invalid calendar month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("use either 'days' or 'year'+'month', not both")]
    ConflictingParams,

    #[error("'year' and 'month' must be given together")]
    IncompleteMonth,

    #[error("window start must be before its end")]
    Empty,
}

/// 집계 기간: `start` 포함, `end` 미포함
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl AggregationWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start >= end {
            return Err(WindowError::Empty);
        }
        Ok(Self { start, end })
    }

    /// 오늘을 포함한 최근 `days`개의 달력 날짜 (UTC), `now`까지
    ///
    /// 끝은 `now`를 포함합니다. 저장 정밀도가 밀리초이므로 반열린 끝은 `now + 1ms`입니다.
    pub fn last_days(days: i64, now: DateTime<Utc>) -> Result<Self, WindowError> {
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(WindowError::InvalidDays {
                days,
                max: MAX_WINDOW_DAYS,
            });
        }
        let today = start_of_day(now.date_naive());
        Self::new(today - Duration::days(days - 1), now + Duration::milliseconds(1))
    }

    /// 달력 기준 한 달 (`month`는 1~12)
    pub fn month(year: i32, month: u32) -> Result<Self, WindowError> {
        let invalid = WindowError::InvalidMonth { year, month };
        if !(1970..=9998).contains(&year) {
            return Err(invalid);
        }
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let next = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or(WindowError::InvalidMonth {
            year: next_year,
            month: next_month,
        })?;
        Self::new(start_of_day(first), start_of_day(next))
    }

    pub fn all_time() -> Self {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        Self {
            start,
            end: start + Duration::days(DAYS_UNTIL_YEAR_9999_END),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }

    /// SQL 바인딩용 문자열 경계 `(start, end)`
    pub fn bounds(&self) -> (String, String) {
        (db::format_timestamp(self.start), db::format_timestamp(self.end))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 통계 API의 쿼리 파라미터
///
/// - `?days=7` → 최근 7일
/// - `?year=2026&month=10` → 2026년 10월
/// - 아무것도 없으면 전체 기간
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl WindowQuery {
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<AggregationWindow, WindowError> {
        match (self.days, self.year, self.month) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(WindowError::ConflictingParams),
            (Some(days), None, None) => AggregationWindow::last_days(days, now),
            (None, Some(year), Some(month)) => AggregationWindow::month(year, month),
            (None, Some(_), None) | (None, None, Some(_)) => Err(WindowError::IncompleteMonth),
            (None, None, None) => Ok(AggregationWindow::all_time()),
        }
    }
}

/// 캘린더 축약에 쓰는 일기 한 건의 요약
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRow {
    pub created_at: DateTime<Utc>,
    pub emoji: Option<Emoji>,
    pub mood: MoodCategory,
}

/// `(기분, 개수)` 행들을 실제 범주 카운트로 축약합니다. 센티널은 버립니다.
pub fn tally<I>(rows: I) -> MoodCounts
where
    I: IntoIterator<Item = (MoodCategory, i64)>,
{
    let mut counts = MoodCounts::default();
    for (mood, n) in rows {
        counts.add(mood, n);
    }
    counts
}

/// `(기분, 개수)` 행들에서 센티널 개수만 모읍니다.
pub fn tally_unclassified<I>(rows: I) -> UnclassifiedCounts
where
    I: IntoIterator<Item = (MoodCategory, i64)>,
{
    let mut counts = UnclassifiedCounts::default();
    for (mood, n) in rows {
        match mood {
            MoodCategory::Unknown => counts.unknown += n,
            MoodCategory::AnalysisFailed => counts.analysis_failed += n,
            _ => {}
        }
    }
    counts
}

/// 시각 오름차순 행들을 날짜별 캘린더 칸으로 묶습니다.
///
/// 같은 날 여러 일기가 있으면 가장 나중 행의 이모지/기분이 그날을 대표합니다.
pub fn build_calendar<I>(rows: I) -> Vec<CalendarDay>
where
    I: IntoIterator<Item = CalendarRow>,
{
    let mut days: BTreeMap<NaiveDate, CalendarDay> = BTreeMap::new();
    for row in rows {
        let date = row.created_at.date_naive();
        let day = days.entry(date).or_insert(CalendarDay {
            date,
            emoji: None,
            mood: row.mood,
            entry_count: 0,
        });
        day.emoji = row.emoji;
        day.mood = row.mood;
        day.entry_count += 1;
    }
    days.into_values().collect()
}

pub async fn counts_by_category(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<MoodCounts, AppError> {
    let rows = db::mood_counts(pool, user_id, window).await?;
    Ok(tally(rows))
}

pub async fn unclassified_counts(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<UnclassifiedCounts, AppError> {
    let rows = db::mood_counts(pool, user_id, window).await?;
    Ok(tally_unclassified(rows))
}

/// 실제 범주 카운트와 센티널 카운트를 한 번의 GROUP BY 결과로 함께 만듭니다.
pub async fn mood_breakdown(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<(MoodCounts, UnclassifiedCounts), AppError> {
    let rows = db::mood_counts(pool, user_id, window).await?;
    Ok((tally(rows.iter().copied()), tally_unclassified(rows)))
}

/// 실제 범주 일기의 `{created_at, mood}` 목록 (시각 오름차순, 동률은 저장 순서)
pub async fn timeline(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<Vec<TimelinePoint>, AppError> {
    db::mood_timeline(pool, user_id, window).await
}

pub async fn by_emoji(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<BTreeMap<String, i64>, AppError> {
    let rows = db::emoji_counts(pool, user_id, window).await?;
    Ok(rows.into_iter().collect())
}

pub async fn calendar(
    pool: &SqlitePool,
    user_id: &str,
    year: i32,
    month: u32,
) -> Result<Vec<CalendarDay>, AppError> {
    let window = AggregationWindow::month(year, month)?;
    let rows = db::calendar_rows(pool, user_id, &window).await?;
    Ok(build_calendar(rows))
}

pub async fn analysis(
    pool: &SqlitePool,
    user_id: &str,
    window: &AggregationWindow,
) -> Result<Analysis, AppError> {
    let (mood_distribution, unclassified) = mood_breakdown(pool, user_id, window).await?;
    let mood_timeline = db::mood_timeline(pool, user_id, window).await?;

    Ok(Analysis {
        mood_distribution,
        unclassified,
        mood_timeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn last_days_covers_whole_calendar_days_including_today() {
        let now = at(2026, 10, 16, 15, 30);
        let window = AggregationWindow::last_days(7, now).unwrap();

        assert_eq!(window.start(), at(2026, 10, 10, 0, 0));
        assert_eq!(window.end(), now + Duration::milliseconds(1));
        assert!(window.contains(now));
        assert!(!window.contains(now + Duration::milliseconds(1)));
        assert!(!window.contains(at(2026, 10, 16, 23, 59)));
        // offset -(N-1) is in, offset -N is out
        assert!(window.contains(at(2026, 10, 10, 0, 0)));
        assert!(window.contains(at(2026, 10, 10, 23, 59)));
        assert!(!window.contains(at(2026, 10, 9, 23, 59)));
    }

    #[test]
    fn one_day_window_is_today() {
        let now = at(2026, 1, 1, 0, 5);
        let window = AggregationWindow::last_days(1, now).unwrap();
        assert_eq!(window.start(), at(2026, 1, 1, 0, 0));
        assert!(window.contains(at(2026, 1, 1, 0, 0)));
        assert!(!window.contains(at(2025, 12, 31, 23, 59)));

        // `now` exactly at midnight still gives a non-empty window
        let midnight = at(2026, 1, 1, 0, 0);
        assert!(AggregationWindow::last_days(1, midnight).unwrap().contains(midnight));
    }

    #[test]
    fn days_out_of_range_are_rejected() {
        let now = at(2026, 10, 16, 0, 0);
        for days in [0, -3, MAX_WINDOW_DAYS + 1] {
            assert!(matches!(
                AggregationWindow::last_days(days, now),
                Err(WindowError::InvalidDays { .. })
            ));
        }
    }

    #[test]
    fn month_window_spans_to_the_next_month() {
        let window = AggregationWindow::month(2026, 2).unwrap();
        assert_eq!(window.start(), at(2026, 2, 1, 0, 0));
        assert_eq!(window.end(), at(2026, 3, 1, 0, 0));

        let december = AggregationWindow::month(2026, 12).unwrap();
        assert_eq!(december.end(), at(2027, 1, 1, 0, 0));
        assert!(!december.contains(at(2027, 1, 1, 0, 0)));
    }

    #[test]
    fn invalid_months_are_rejected() {
        assert!(AggregationWindow::month(2026, 0).is_err());
        assert!(AggregationWindow::month(2026, 13).is_err());
    }

    #[test]
    fn all_time_bounds_sort_as_text() {
        let (start, end) = AggregationWindow::all_time().bounds();
        assert_eq!(start, "1970-01-01T00:00:00.000Z");
        assert_eq!(end, "9999-12-31T00:00:00.000Z");
    }

    #[test]
    fn window_query_resolution() {
        let now = at(2026, 10, 16, 12, 0);
        let q = |days, year, month| WindowQuery { days, year, month };

        assert_eq!(
            q(Some(3), None, None).resolve(now),
            AggregationWindow::last_days(3, now)
        );
        assert_eq!(
            q(None, Some(2026), Some(10)).resolve(now),
            AggregationWindow::month(2026, 10)
        );
        assert_eq!(q(None, None, None).resolve(now), Ok(AggregationWindow::all_time()));
        assert_eq!(
            q(Some(3), Some(2026), None).resolve(now),
            Err(WindowError::ConflictingParams)
        );
        assert_eq!(
            q(None, None, Some(4)).resolve(now),
            Err(WindowError::IncompleteMonth)
        );
    }

    #[test]
    fn tally_starts_at_zero_and_skips_sentinels() {
        assert_eq!(tally(Vec::new()), MoodCounts::default());

        let rows = vec![
            (MoodCategory::Normal, 2),
            (MoodCategory::Unknown, 4),
            (MoodCategory::Depressed, 1),
            (MoodCategory::AnalysisFailed, 3),
        ];
        let counts = tally(rows.clone());
        assert_eq!(
            counts,
            MoodCounts {
                normal: 2,
                stressed: 0,
                depressed: 1
            }
        );
        assert_eq!(counts.total(), 3);

        let pending = tally_unclassified(rows);
        assert_eq!(pending.unknown, 4);
        assert_eq!(pending.analysis_failed, 3);
    }

    #[test]
    fn calendar_keeps_the_last_entry_of_each_day() {
        let rows = vec![
            CalendarRow {
                created_at: at(2026, 10, 3, 8, 0),
                emoji: Some(Emoji::Smile),
                mood: MoodCategory::Normal,
            },
            CalendarRow {
                created_at: at(2026, 10, 3, 21, 0),
                emoji: Some(Emoji::Sob),
                mood: MoodCategory::Depressed,
            },
            CalendarRow {
                created_at: at(2026, 10, 5, 9, 0),
                emoji: None,
                mood: MoodCategory::AnalysisFailed,
            },
        ];

        let days = build_calendar(rows);
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 10, 3).unwrap());
        assert_eq!(days[0].emoji, Some(Emoji::Sob));
        assert_eq!(days[0].mood, MoodCategory::Depressed);
        assert_eq!(days[0].entry_count, 2);
        assert_eq!(days[1].date.day(), 5);
        assert_eq!(days[1].emoji, None);
    }
}
