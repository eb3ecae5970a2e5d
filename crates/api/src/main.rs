use std::future::IntoFuture;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio::sync::Notify;

use doorsales_api::{Config, build_app};
use doorsales_auth::PasswordHasher;
use doorsales_infra::db;

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = dotenvy::dotenv() {
        // A missing .env is fine; anything else is worth a warning.
        if !e.not_found() {
            eprintln!("warning: failed to load .env file: {e}");
        }
    }

    let config = Config::from_env();
    doorsales_observability::init(
        config
            .as_ref()
            .map(|c| c.log_format)
            .unwrap_or_default(),
    );

    let result = match config {
        Ok(config) => run(config).await,
        Err(e) => Err(anyhow::Error::new(e).context("failed to load configuration")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "startup failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!(?config, "configuration loaded");

    let pool = db::connect(&config.db)
        .await
        .context("failed to connect to database")?;
    db::ensure_schema(&pool)
        .await
        .context("failed to create database schema")?;

    let services = doorsales_api::app::services::build_postgres_services(&config, pool.clone(), PasswordHasher::new())
        .await
        .context("failed to initialize services")?;

    let app = build_app(&config, Arc::new(services));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "listening");

    let stop = Arc::new(Notify::new());
    let mut server = tokio::spawn(
        axum::serve(listener, app)
            .with_graceful_shutdown({
                let stop = stop.clone();
                async move { stop.notified().await }
            })
            .into_future(),
    );

    tokio::select! {
        res = &mut server => {
            res.context("server task panicked")?.context("server error")?;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    stop.notify_one();
    drain(server, config.shutdown_grace).await?;

    pool.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Wait for in-flight requests, but no longer than `grace`.
async fn drain(server: tokio::task::JoinHandle<std::io::Result<()>>, grace: Duration) -> anyhow::Result<()> {
    match tokio::time::timeout(grace, server).await {
        Ok(res) => {
            res.context("server task panicked")?.context("server error")?;
        }
        Err(_) => {
            tracing::warn!(grace_secs = grace.as_secs(), "grace period elapsed; dropping open connections");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
