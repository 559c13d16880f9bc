use rkt_predictor::{
    api::{build_router, AppState},
    config::Config,
    ml::{load_model, PredictionService},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "rkt_predictor={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let registry = tracing_subscriber::registry().with(filter);
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    if let Some(e) = config_error {
        tracing::warn!("Failed to load configuration: {}", e);
        tracing::warn!("Using default configuration");
    }

    tracing::info!("Starting RKT predictor v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = rkt_predictor::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Load the model once; the service keeps running without one
    tracing::info!(
        path = %config.model.path.display(),
        layout = %config.model.feature_layout,
        "Loading model artifact"
    );
    let model = load_model(&config.model);
    let predictor = Arc::new(PredictionService::new(config.model.feature_layout, model));

    let app = build_router(AppState::new(predictor));

    // Start HTTP server
    let http_addr = config.http_addr();
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Prediction: POST http://{}/predict", http_addr);

    axum::serve(http_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down gracefully...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
