mod app;
mod config;
mod error;
mod ui;

use std::{fs::OpenOptions, sync::Arc, sync::Mutex};

use engine::{Context, DocumentStore, LocalIdentity, MemoryStore, SqlStore, Tracker};
use migration::{Migrator, MigratorTrait};

use crate::{
    config::{AppConfig, Database},
    error::{AppError, Result},
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;
    init_logging(&config)?;

    let store = open_store(&config.database()).await?;
    let identity = LocalIdentity::new(config.allowed_domains.clone(), config.session_path());
    identity.restore().await?;

    let context = Context::builder()
        .identity(Arc::new(identity))
        .store(store)
        .build()?;
    let tracker = Tracker::start(context);

    let mut app = app::App::new(config, tracker);
    let result = app.run().await;
    app.into_tracker().shutdown();
    result
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(config: &AppConfig) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "motolog={level},engine={level}",
            level = config.level
        ))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| AppError::Logging(err.to_string()))
}

async fn open_store(database: &Database) -> Result<Arc<dyn DocumentStore>> {
    match database {
        Database::Memory => {
            tracing::info!("using in-memory store, nothing will be persisted");
            Ok(Arc::new(MemoryStore::new()))
        }
        Database::Sqlite(path) => {
            let db = sea_orm::Database::connect(database.url()).await?;
            Migrator::up(&db, None).await?;
            tracing::info!("opened {path}");
            Ok(Arc::new(SqlStore::new(db)))
        }
    }
}
