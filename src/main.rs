use std::sync::Arc;

use axum::http::HeaderValue;
use todo_api::application::app::{app_reducer, app_router, AppEnvironment, AppState};
use todo_api::config::Config;
use todo_api::http::{dispatcher::Dispatcher, server};
use todo_api::infrastructure::effects::JsonEncoder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    let environment = AppEnvironment::live(JsonEncoder { pretty: config.pretty_json });
    environment.verify_encoder()?;

    let dispatcher = Dispatcher::new(app_router(), app_reducer(), AppState::default(), environment)
        .with_location(HeaderValue::from_str(&config.location())?)
        .with_body_limit(config.body_limit);
    let router = server::app(Arc::new(dispatcher));

    let addr = config.addr();
    tracing::info!(%addr, "listening");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal::ctrl_c;
    let _ = ctrl_c().await;
    tracing::info!("shutdown");
}
