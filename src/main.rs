use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use dentabot::config::AppConfig;
use dentabot::handlers;
use dentabot::services::conversation::Dispatcher;
use dentabot::services::knowledge::qna::QnaMakerClient;
use dentabot::services::messaging::bot_connector::BotConnectorProvider;
use dentabot::services::scheduler::http::HttpScheduler;
use dentabot::services::understanding::luis::LuisRecognizer;
use dentabot::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    let timeout = Duration::from_secs(config.http_timeout_secs);

    let understanding = LuisRecognizer::new(
        config.luis_app_id.clone(),
        config.luis_api_key.clone(),
        config.luis_api_host_name.clone(),
        config.luis_slot.clone(),
        timeout,
    )?;
    let knowledge = QnaMakerClient::new(
        config.qna_knowledgebase_id.clone(),
        config.qna_endpoint_key.clone(),
        config.qna_endpoint_host_name.clone(),
        config.qna_top,
        config.qna_score_threshold,
        timeout,
    )?;
    let scheduler = HttpScheduler::new(config.scheduler_endpoint.clone(), timeout)?;
    tracing::info!(endpoint = %config.scheduler_endpoint, "using HTTP scheduler");

    let messaging = BotConnectorProvider::new(
        config.microsoft_app_id.clone(),
        config.microsoft_app_password.clone(),
        timeout,
    )?;
    if config.is_dev_mode() {
        tracing::warn!("MICROSOFT_APP_ID not set, sending replies without connector auth");
    }

    let state = Arc::new(AppState {
        config: config.clone(),
        dispatcher: Dispatcher::new(
            Box::new(understanding),
            Box::new(knowledge),
            Box::new(scheduler),
        ),
        messaging: Box::new(messaging),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/messages", post(handlers::messages::messages))
        .route("/api/dev/message", post(handlers::dev::send_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
