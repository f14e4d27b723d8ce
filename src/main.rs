use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;

mod app;
mod auth;
mod config;
mod state;

use crate::auth::store::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use crate::config::AppConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "noicelens=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);

    // CREDENTIAL_STORE=memory runs without Postgres; data is lost on shutdown.
    let store: Arc<dyn CredentialStore> =
        if std::env::var("CREDENTIAL_STORE").as_deref() == Ok("memory") {
            tracing::warn!("using in-memory credential store");
            Arc::new(MemoryCredentialStore::new())
        } else {
            anyhow::ensure!(!config.database_url.is_empty(), "DATABASE_URL is not set");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(&config.database_url)
                .await
                .context("connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("run migrations")?;

            Arc::new(PgCredentialStore::new(pool))
        };

    let state = AppState::from_parts(store, config);
    let app = app::build_app(state);
    app::serve(app).await
}
