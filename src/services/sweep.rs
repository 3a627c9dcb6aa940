//! # 재분류 스윕 (Reconciliation Sweep)
//!
//! 저장 시점에 분류기가 응답하지 않아 `analysis_failed`로 남은 일기를 주기적으로 다시 분류합니다.
//!
//! ## 흐름
//! 1. 실패 예산(`classify_attempts < max_attempts`)이 남은 후보를 오래된 순으로 `batch_size`개 읽음
//! 2. 후보마다 분류기를 한 번 호출
//! 3. 성공하면 기분을 기록하고, 실패하면 `classify_attempts`를 1 올림
//!
//! 2와 3 사이에 사용자가 일기를 수정할 수 있으므로, 3의 갱신은 읽을 때 본 `updated_at`을
//! 조건으로 거는 compare-and-set입니다. 조건이 맞지 않으면 그 일기는 건너뜁니다(`skipped`).
//!
//! 서버는 `spawn_sweep_loop`로 백그라운드에서 돌리고, `moodlog-sweep` 바이너리는
//! `sweep_once`를 한 번만 실행합니다 (cron 등 외부 스케줄러용).

use std::sync::Arc;

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::db;
use crate::error::AppError;
use crate::models::{Entry, MoodCategory};
use crate::services::classifier::{assess, classification_text, MoodClassifier};
use crate::services::labels::LabelCatalog;

/// 스윕 한 번의 범위와 실패 예산
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPolicy {
    pub batch_size: i64,
    pub max_attempts: i64,
}

/// 스윕 한 번의 결과
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// 읽은 후보 수
    pub scanned: usize,
    /// 기분이 기록된 일기 수 (`unknown` 포함)
    pub resolved: usize,
    /// 이번에도 분류에 실패한 일기 수
    pub failed: usize,
    /// `failed` 중 이번 실패로 예산을 다 쓴 일기 수
    pub exhausted: usize,
    /// 읽은 뒤 수정되어 건드리지 않은 일기 수
    pub skipped: usize,
}

/// 스윕을 한 번 실행합니다.
///
/// 분류기 실패는 일기별로 기록하고 계속 진행합니다. 저장소 에러는 즉시 중단하고 전파합니다.
pub async fn sweep_once(
    pool: &SqlitePool,
    classifier: &dyn MoodClassifier,
    catalog: &LabelCatalog,
    policy: SweepPolicy,
) -> Result<SweepReport, AppError> {
    let candidates = db::list_retryable_entries(pool, policy.max_attempts, policy.batch_size).await?;
    let mut report = SweepReport {
        scanned: candidates.len(),
        ..SweepReport::default()
    };

    for entry in &candidates {
        retry_entry(pool, classifier, catalog, policy, entry, &mut report).await?;
    }

    Ok(report)
}

async fn retry_entry(
    pool: &SqlitePool,
    classifier: &dyn MoodClassifier,
    catalog: &LabelCatalog,
    policy: SweepPolicy,
    entry: &Entry,
    report: &mut SweepReport,
) -> Result<(), AppError> {
    let text = classification_text(entry.title.as_deref(), &entry.content);
    let assessment = assess(classifier, catalog, &text).await;

    if assessment.mood == MoodCategory::AnalysisFailed {
        if !db::record_failed_attempt(pool, &entry.id, &entry.updated_at).await? {
            report.skipped += 1;
            return Ok(());
        }

        report.failed += 1;
        let attempts = entry.classify_attempts + 1;
        if attempts >= policy.max_attempts {
            report.exhausted += 1;
            tracing::warn!(
                entry_id = %entry.id,
                attempts,
                "Giving up on entry after exhausting the retry budget"
            );
        } else {
            tracing::debug!(entry_id = %entry.id, attempts, "Retry failed, will try again later");
        }
        return Ok(());
    }

    if db::resolve_failed_mood(pool, &entry.id, &entry.updated_at, &assessment).await? {
        report.resolved += 1;
        tracing::info!(entry_id = %entry.id, mood = %assessment.mood, "Resolved failed classification");
    } else {
        report.skipped += 1;
        tracing::debug!(entry_id = %entry.id, "Entry changed during sweep, skipping");
    }
    Ok(())
}

/// 백그라운드에서 `every` 간격으로 스윕을 실행합니다.
///
/// 첫 실행은 시작 후 `every`가 지난 뒤입니다. `cancel`이 취소되면 진행 중인 패스를 끝내지 않고
/// 다음 대기 지점에서 빠져나옵니다. 한 패스의 에러는 로그만 남기고 루프는 계속됩니다.
pub fn spawn_sweep_loop(
    pool: SqlitePool,
    classifier: Arc<dyn MoodClassifier>,
    catalog: Arc<LabelCatalog>,
    policy: SweepPolicy,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = every.as_secs(),
            batch_size = policy.batch_size,
            max_attempts = policy.max_attempts,
            "Sweep loop started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Sweep loop shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    let pass = sweep_once(&pool, classifier.as_ref(), &catalog, policy);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {
                            tracing::info!("Sweep loop shutting down mid-pass");
                            break;
                        }
                        result = pass => match result {
                            Ok(report) if report.scanned > 0 => {
                                tracing::info!(
                                    scanned = report.scanned,
                                    resolved = report.resolved,
                                    failed = report.failed,
                                    exhausted = report.exhausted,
                                    skipped = report.skipped,
                                    "Sweep pass finished"
                                );
                            }
                            Ok(_) => tracing::debug!("Sweep pass found nothing to retry"),
                            Err(err) => tracing::error!(error = %err, "Sweep pass failed"),
                        }
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_is_all_zero() {
        let report = SweepReport::default();
        assert_eq!(report.scanned + report.resolved + report.failed + report.skipped, 0);
    }

    #[test]
    fn report_serializes_every_counter() {
        let report = SweepReport {
            scanned: 3,
            resolved: 1,
            failed: 1,
            exhausted: 0,
            skipped: 1,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"scanned": 3, "resolved": 1, "failed": 1, "exhausted": 0, "skipped": 1})
        );
    }
}
