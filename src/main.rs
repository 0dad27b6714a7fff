//! Service entry point: configuration -> adapter -> schema sync -> router ->
//! HTTP listener. Any failure before the listener is up aborts the process.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use todo_api::db::{migrate, Db};
use todo_api::http::{run_server, AppState};
use todo_api::{metrics, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().context("couldn't load configuration, terminating")?;

    let db = Db::connect(&config.settings)
        .await
        .context("couldn't connect to database, terminating")?;
    migrate::run(&db)
        .await
        .context("couldn't synchronize database schema")?;
    tracing::debug!(adapter = %config.settings.adapter, "successfully connected to the database");

    let prometheus = metrics::install_recorder().context("couldn't install metrics recorder")?;

    let state = AppState { db, prometheus };
    run_server(state, config.settings.port)
        .await
        .context("server error")?;
    Ok(())
}
