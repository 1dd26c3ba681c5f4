//! # Habitrack 서버 진입점
//!
//! 이 파일이 수행하는 작업:
//! 1. 환경변수(.env) 로딩
//! 2. 로깅(tracing) 초기화
//! 3. SQLite 연결 풀 생성과 마이그레이션
//! 4. 알림 전송기(Notifier)와 리마인더 스위프 작업 시작
//! 5. HTTP 서버 시작, Ctrl+C 시 정상 종료

use std::sync::Arc;

use anyhow::Result;
use habitrack::{
    config::Config,
    db,
    routes::{self, AppState},
    services::{notifier, reminders::ReminderSweeper},
};
use sqlx::sqlite::SqlitePoolOptions;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 에러 없이 넘어갑니다.
    dotenvy::dotenv().ok();

    // RUST_LOG가 없으면 habitrack, tower_http, axum 모듈을 debug 레벨로 설정
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "habitrack=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting Habitrack server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    db::MIGRATOR.run(&pool).await?;

    // ── 리마인더 스위프 ──
    // watch 채널: 종료 신호를 스위프 태스크에 전달합니다.
    let notifier = notifier::from_config(&config.telegram)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = Arc::new(ReminderSweeper::new(
        pool.clone(),
        notifier,
        config.sweep.clone(),
    ));
    let sweep_handle = sweeper.spawn(shutdown_rx);

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        page_size: config.page_size,
    };
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
            tracing::info!("Shutdown signal received");
            // 수신자가 이미 없으면 send가 실패하지만 무시해도 됩니다.
            let _ = shutdown_tx.send(true);
        })
        .await?;

    // 진행 중이던 스위프가 끝날 때까지 기다립니다.
    sweep_handle.await?;
    pool.close().await;

    Ok(())
}
