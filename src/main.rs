use std::sync::Arc;

use shelfmate_api::{
    config::Config,
    db::{self, PgBookStore},
    routes::{create_router, AppState},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let pool = db::create_pool(&config).await?;
    if config.run_migrations {
        db::postgres::run_migrations(&pool).await?;
        tracing::info!("Migrations applied");
    }

    let relation = config.books_relation();
    tracing::info!(relation = %relation, "Connected to book store");

    let store = PgBookStore::new(pool, &relation);
    let state = Arc::new(AppState::new(Arc::new(store)));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
