//! ESP32-CAM Panel - browser control panel for an ESP32-CAM car
//!
//! Main entry point for the panel server.

use esp32cam_panel::{
    control_panel::ControlPanel,
    device_client::HttpDeviceClient,
    state::{AppConfig, AppState},
    ui_port::PanelView,
    web_api,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upper bound on waiting for the final stop command
const STOP_GRACE: Duration = Duration::from_secs(2);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "esp32cam_panel=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting ESP32-CAM panel v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    config.validate()?;
    tracing::info!(
        device_url = %config.device_url,
        request_timeout_ms = config.request_timeout.as_millis() as u64,
        status_interval_ms = config.status_interval.as_millis() as u64,
        frame_interval_ms = config.frame_interval.as_millis() as u64,
        param_debounce_ms = config.param_debounce.as_millis() as u64,
        log_capacity = config.log_capacity,
        "Configuration loaded"
    );

    let device = Arc::new(HttpDeviceClient::new(
        config.device_url.clone(),
        config.request_timeout,
    )?);
    let view = Arc::new(PanelView::new());
    let panel = Arc::new(ControlPanel::new(
        device,
        view.clone(),
        config.timing(),
        config.log_capacity,
    ));
    tracing::info!("ControlPanel initialized");

    let state = AppState {
        config: config.clone(),
        panel: panel.clone(),
        view,
    };

    let mut app = web_api::create_router(state);
    if let Some(static_dir) = &config.static_dir {
        let serve_dir = ServeDir::new(static_dir)
            .not_found_service(ServeFile::new(static_dir.join("index.html")));
        app = app.fallback_service(serve_dir);
        tracing::info!(static_dir = %static_dir.display(), "Static file serving enabled");
    }
    let app = app
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http());

    panel.start().await;
    tracing::info!("Status, frame and FPS polling started");

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let stop = panel.shutdown().await;
    match tokio::time::timeout(STOP_GRACE, stop).await {
        Ok(Ok(true)) => tracing::info!("Car stopped"),
        Ok(Ok(false)) => tracing::warn!("Final stop command was not accepted"),
        Ok(Err(e)) => tracing::warn!(error = %e, "Final stop task failed"),
        Err(_) => tracing::warn!("Timed out waiting for final stop command"),
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
