//! 规则管理服务入口

use std::sync::Arc;

use rule_api_service::{
    AppState, InMemoryRuleRepository, PgRuleRepository, RuleRepository, create_router,
};
use rule_shared::{
    config::{AppConfig, StorageBackend},
    observability,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("rule-api-service").unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        AppConfig {
            service_name: "rule-api-service".to_string(),
            ..Default::default()
        }
    });

    observability::init(&config.service_name, &config.observability)?;

    info!(
        environment = %config.environment,
        "Starting rule-api-service on {}",
        config.server_addr()
    );

    let mut postgres = None;
    let repository: Arc<dyn RuleRepository> = match config.storage {
        StorageBackend::Postgres => {
            let repo = PgRuleRepository::connect(&config.database)
                .await
                .inspect_err(|e| error!(error = %e, "Failed to connect to database"))?;
            postgres = Some(repo.clone());
            Arc::new(repo)
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("In-memory storage in production, rules are lost on restart");
            }
            Arc::new(InMemoryRuleRepository::new())
        }
    };
    info!(storage = ?config.storage, "Rule repository ready");

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(AppState::new(repository))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(repo) = postgres {
        repo.close().await;
    }

    info!("Server shutdown complete");

    Ok(())
}

/// 监听 Ctrl+C 或 SIGTERM，触发 axum 的优雅关闭
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
