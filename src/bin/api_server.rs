//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This is the main entry point for the API server. It loads configuration, constructs the
// configured storage adapter, restores the engine from it once, then starts listening.
//--------------------------------------------------------------------------------------------------

use tracing::info;
use tracing_subscriber::EnvFilter;

use matching_engine::{Api, Config, JsonFileStorage, MatchingEngine, NoopStorage, SqlStorage, Storage, StorageBackend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    info!(host = %config.host_id, "starting matching engine");

    let storage: Box<dyn Storage> = match &config.storage_backend {
        StorageBackend::Noop => Box::new(NoopStorage),
        StorageBackend::JsonFile { path } => Box::new(JsonFileStorage::new(path.clone())),
        StorageBackend::Sql { database_url } => Box::new(SqlStorage::connect(database_url).await?),
    };

    let mut engine = MatchingEngine::new(storage);
    engine.restore().await?;

    let api = Api::new(config.bind_addr, engine);
    api.serve().await
}
