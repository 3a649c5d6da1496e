use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use callflow::config::AppConfig;
use callflow::db;
use callflow::handlers;
use callflow::inventory::Inventory;
use callflow::services::classifier::IntentClassifier;
use callflow::services::crm::log::LogCrmExporter;
use callflow::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    // Catalog integrity is a startup-time concern; a malformed inventory
    // must stop the process here, never surface mid-call.
    let inventory = Inventory::load(Path::new(&config.inventory_path))?;
    tracing::info!(
        vehicles = inventory.len(),
        add_ons = inventory.add_on_services.len(),
        "inventory loaded"
    );

    let conn = db::init_db(&config.database_url, Path::new(&config.migrations_dir))?;

    let classifier = IntentClassifier::from_inventory(&inventory);
    let (call_events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        inventory: Arc::new(inventory),
        classifier,
        crm: Box::new(LogCrmExporter),
        call_events_tx,
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/calls", post(handlers::calls::start_call))
        .route("/api/calls", get(handlers::calls::list_calls))
        .route("/api/calls/events", get(handlers::events::events_stream))
        .route("/api/calls/:id", get(handlers::calls::get_call))
        .route("/api/calls/:id/turn", post(handlers::calls::take_turn))
        .route("/api/calls/:id/cancel", post(handlers::calls::cancel_call))
        .route("/api/inventory", get(handlers::inventory::get_inventory))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
