use anyhow::{Context, Result};
use databass_migrate::config::MigrateConfig;
use databass_migrate::export::ExportDir;
use databass_migrate::migration::{MigrationExecutor, MigrationOptions};
use databass_migrate::store::{GraphStore, MemoryStore, Neo4jStore};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let mut config = MigrateConfig::from_env()?;
    if let Some(dir) = std::env::args().nth(1) {
        config.export_dir = dir.into();
    }

    info!("Starting databass export to Neo4j migration");
    let export = ExportDir::new(&config.export_dir);
    let options = MigrationOptions {
        clear_target: config.clear_target,
    };

    match &config.neo4j {
        None => {
            info!("Dry run: writing to an in-memory graph");
            run(MemoryStore::new(), export, options).await
        }
        Some(settings) => {
            info!("Connecting to Neo4j at {}...", settings.uri);
            let store = Neo4jStore::connect(settings)?;
            store
                .verify_connectivity()
                .await
                .context("Failed to connect to Neo4j")?;
            info!("✓ Connected to Neo4j");

            run(store, export, options).await
        }
    }
}

async fn run<S: GraphStore>(store: S, export: ExportDir, options: MigrationOptions) -> Result<()> {
    let mut executor = MigrationExecutor::new(store, export, options);

    if let Err(e) = executor.execute().await {
        error!("The target graph may be partially populated; clear it before rerunning");
        return Err(e).context("Migration aborted");
    }

    Ok(())
}
