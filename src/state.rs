use std::sync::Arc;

use crate::auth::store::{CredentialStore, MemoryCredentialStore};
use crate::config::{AppConfig, Argon2Config, JwtConfig};

/// Shared handles injected into every handler. The store is a trait object
/// with an explicit lifecycle (opened at startup, dropped at shutdown) so
/// tests can substitute an in-memory implementation.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn from_parts(store: Arc<dyn CredentialStore>, config: Arc<AppConfig>) -> Self {
        Self { store, config }
    }

    /// State backed by the in-memory store, with a fixed test secret and
    /// minimum-cost hashing. Used by tests and by local runs without Postgres.
    pub fn in_memory() -> Self {
        let config = Arc::new(AppConfig {
            database_url: "unused".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 60,
            },
            argon2: Argon2Config {
                m_cost_kib: 8,
                t_cost: 1,
                p_cost: 1,
            },
            request_timeout_secs: 15,
        });
        Self {
            store: Arc::new(MemoryCredentialStore::new()),
            config,
        }
    }
}
