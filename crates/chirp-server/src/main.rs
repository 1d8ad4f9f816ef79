use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::bail;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use chirp_api::routes;
use chirp_api::state::{AppState, AppStateInner};
use chirp_db::{Database, MemoryStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "chirp=debug,chirp_api=debug,chirp_db=info,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let host = std::env::var("CHIRP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("CHIRP_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()?;
    let store_kind = std::env::var("CHIRP_STORE").unwrap_or_else(|_| "sqlite".into());
    let db_path = std::env::var("CHIRP_DB_PATH").unwrap_or_else(|_| "chirp.db".into());

    // Init store
    let app_state: AppState = match store_kind.as_str() {
        "sqlite" => {
            let db = if db_path == ":memory:" {
                Database::open_in_memory()?
            } else {
                Database::open(Path::new(&db_path))?
            };
            let db = Arc::new(db);
            Arc::new(AppStateInner::new(db.clone(), db))
        }
        "memory" => {
            info!("Using in-memory store, data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            Arc::new(AppStateInner::new(store.clone(), store))
        }
        other => bail!("Unknown CHIRP_STORE '{}', expected 'sqlite' or 'memory'", other),
    };

    let app = routes::router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Chirp server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
