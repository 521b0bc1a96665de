use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use project_hub_api::config;
use project_hub_api::database::{DatabaseManager, MemoryStore, PgStore, ProjectStore, UserStore};
use project_hub_api::services::ensure_default_admin;
use project_hub_api::{app, AppState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Parser)]
#[command(name = "project-hub-api", version, about = "Project Hub API server")]
struct Cli {
    /// Port to listen on
    #[arg(long, env = "PROJECT_HUB_PORT", default_value_t = 8080)]
    port: u16,

    /// Backing store; defaults to postgres when DATABASE_URL is set
    #[arg(long, value_enum)]
    store: Option<StoreKind>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("project_hub_api=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Project Hub API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        bail!("SECURITY_JWT_SECRET must be set outside development");
    }

    let store_kind = cli.store.unwrap_or(if std::env::var("DATABASE_URL").is_ok() {
        StoreKind::Postgres
    } else {
        StoreKind::Memory
    });

    let (users, projects): (Arc<dyn UserStore>, Arc<dyn ProjectStore>) = match store_kind {
        StoreKind::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to open database")?;
            let store = Arc::new(PgStore::new(pool));
            (store.clone() as Arc<dyn UserStore>, store as Arc<dyn ProjectStore>)
        }
        StoreKind::Memory => {
            tracing::warn!("Using in-memory store; data is lost on exit");
            let store = Arc::new(MemoryStore::new());
            (store.clone() as Arc<dyn UserStore>, store as Arc<dyn ProjectStore>)
        }
    };

    ensure_default_admin(users.as_ref(), &config.bootstrap)
        .await
        .context("failed to create default manager account")?;

    let state = AppState::new(users, projects, config);
    let app = app(state, config);

    let bind_addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Project Hub API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
