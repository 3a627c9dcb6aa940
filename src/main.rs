//! # moodlog 웹 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. 설정 로딩
//! 4. SQLite 연결 풀 생성 + 마이그레이션
//! 5. 감정 분류기와 라벨 카탈로그 준비
//! 6. 재분류 스윕 백그라운드 작업 시작
//! 7. 라우터 조립 후 HTTP 서버 시작 (Ctrl+C로 정상 종료)

use std::sync::Arc;

use anyhow::{Context, Result};
use moodlog::{
    config::Config,
    db,
    routes::{build_app, AppState},
    services::{
        classifier::{HttpClassifier, MoodClassifier},
        sweep::spawn_sweep_loop,
    },
};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1단계: 환경변수 로딩 ──
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // ── 2단계: 로깅 초기화 ──
    // RUST_LOG가 없으면 moodlog, tower_http, axum을 debug 레벨로 출력합니다.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "moodlog=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── 3단계: 설정 로딩 ──
    let config = Config::from_env()?;
    tracing::info!("Starting moodlog server on {}:{}", config.host, config.port);

    // ── 4단계: DB 연결 + 마이그레이션 ──
    let pool = db::connect(&config.database_url, 5).await?;

    // ── 5단계: 분류기 / 라벨 카탈로그 ──
    // 라벨 파일이 잘못되었으면 서버를 띄우지 않습니다.
    let labels = Arc::new(config.classifier.load_label_catalog()?);
    let http_classifier = HttpClassifier::new(&config.classifier.base_url, config.classifier.timeout)
        .context("failed to build the classifier HTTP client")?;
    tracing::info!(
        endpoint = %http_classifier.endpoint(),
        vocabulary = %labels.active_table().tag(),
        "Mood classifier configured"
    );
    let classifier: Arc<dyn MoodClassifier> = Arc::new(http_classifier);

    // ── 6단계: 재분류 스윕 ──
    // SWEEP_INTERVAL_SECS=0이면 서버 안에서는 돌리지 않습니다 (moodlog-sweep을 cron으로 실행).
    let shutdown = CancellationToken::new();
    let sweep_handle = match config.sweep.interval {
        Some(every) => Some(spawn_sweep_loop(
            pool.clone(),
            classifier.clone(),
            labels.clone(),
            config.sweep.policy(),
            every,
            shutdown.child_token(),
        )),
        None => {
            tracing::info!("In-process sweep disabled");
            None
        }
    };

    // ── 7단계: 라우터 + 서버 ──
    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        classifier,
        labels,
    };
    let app = build_app(state, Some(config.frontend_dist.as_path()));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            tracing::info!("Shutdown signal received");
            signal_token.cancel();
        })
        .await?;

    // 서버가 다른 이유로 끝났어도 스윕은 멈춥니다.
    shutdown.cancel();
    if let Some(handle) = sweep_handle {
        if let Err(err) = handle.await {
            tracing::error!(error = %err, "Sweep task ended abnormally");
        }
    }
    pool.close().await;

    Ok(())
}
