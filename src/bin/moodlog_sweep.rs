//! # moodlog-sweep
//!
//! 재분류 스윕을 한 번 실행하고 종료합니다. cron 같은 외부 스케줄러용이며,
//! 서버는 `SWEEP_INTERVAL_SECS=0`으로 내부 스윕을 끄고 함께 씁니다.
//!
//! `JWT_SECRET` 등 서버 전용 설정은 필요하지 않습니다.

use anyhow::{Context, Result};
use moodlog::{
    config::{self, ClassifierConfig, SweepConfig},
    db,
    services::{classifier::HttpClassifier, sweep::sweep_once},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodlog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let lookup = |key: &str| std::env::var(key).ok();
    let database_url = config::database_url(&lookup)?;
    let classifier_config = ClassifierConfig::from_lookup(&lookup)?;
    let sweep_config = SweepConfig::from_lookup(&lookup)?;

    let pool = db::connect(&database_url, 1).await?;
    let catalog = classifier_config.load_label_catalog()?;
    let classifier = HttpClassifier::new(&classifier_config.base_url, classifier_config.timeout)
        .context("failed to build the classifier HTTP client")?;

    let report = sweep_once(&pool, &classifier, &catalog, sweep_config.policy())
        .await
        .context("sweep pass failed")?;

    tracing::info!(
        scanned = report.scanned,
        resolved = report.resolved,
        failed = report.failed,
        exhausted = report.exhausted,
        skipped = report.skipped,
        "Sweep finished"
    );

    pool.close().await;
    Ok(())
}
