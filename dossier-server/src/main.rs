use std::sync::Arc;

use anyhow::Result;
use dossier_records::{DirectoryCatalog, RecordContext, RecordStore};
use dossier_server::app::{build_router, AppState};
use dossier_server::config::ServerConfig;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    let context = RecordContext::new(&config.data_dir);
    let catalog = DirectoryCatalog::load(context.schemas_dir()).await?;

    let state = AppState {
        store: Arc::new(RecordStore::new(context)),
        catalog: Arc::new(catalog),
        app_id: config.app_id.clone(),
    };
    let router = build_router(state);

    let listener = TcpListener::bind(config.bind).await?;
    tracing::info!("dossier server listening on {}", config.bind);
    axum::serve(listener, router).await?;
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
