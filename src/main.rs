use std::sync::{Arc, Mutex};

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use appointment_agent::config::AppConfig;
use appointment_agent::db;
use appointment_agent::handlers;
use appointment_agent::services::clock::SystemClock;
use appointment_agent::services::store::SqliteAppointmentStore;
use appointment_agent::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;

    let conn = db::init_db(&config.database_url)?;
    tracing::info!(database = %config.database_url, "database ready");

    let db = Arc::new(Mutex::new(conn));
    let store = SqliteAppointmentStore::new(Arc::clone(&db));

    let state = Arc::new(AppState::new(
        db,
        config.clone(),
        Box::new(store),
        Box::new(SystemClock),
    ));

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
