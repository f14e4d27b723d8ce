use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 PHC string, never exposed in JSON
    pub created_at: OffsetDateTime,
}

/// Store failures: a duplicate email is reported, not fatal; anything else
/// is a transport/storage fault surfaced separately.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("credential store unavailable")]
    Unavailable(#[source] anyhow::Error),
}

/// Durable mapping from email to user record. Callers pass emails already
/// trimmed and lowercased; the store treats them as opaque keys.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Persist a new user. Exactly one of two racing `create` calls with the
    /// same email may succeed; the other observes `DuplicateEmail`.
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError>;

    /// Pure lookup, no side effects. Safe to retry.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Lookup by primary key, used by bearer-authenticated routes.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}

/// Postgres-backed store. Uniqueness is the `UNIQUE` constraint's job, not
/// an application-level check-then-write.
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(StoreError::DuplicateEmail)
            }
            Err(e) => Err(StoreError::Unavailable(e.into())),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.into()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Unavailable(e.into()))
    }
}

/// In-memory store for tests and local runs without Postgres. The whole
/// check-and-insert happens under one lock, so the uniqueness invariant
/// holds under concurrent `create` calls just like the Postgres constraint.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, StoreError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| StoreError::Unavailable(anyhow::anyhow!("store lock poisoned")))?;
        if users.contains_key(email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(email.to_string(), user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let users = self
            .users
            .lock()
            .map_err(|_| StoreError::Unavailable(anyhow::anyhow!("store lock poisoned")))?;
        Ok(users.get(email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self
            .users
            .lock()
            .map_err(|_| StoreError::Unavailable(anyhow::anyhow!("store lock poisoned")))?;
        Ok(users.values().find(|u| u.id == id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn create_then_find_by_email() {
        let store = MemoryCredentialStore::new();
        let created = store
            .create("asha", "asha@example.com", "$argon2id$stub")
            .await
            .expect("create should succeed");
        let found = store
            .find_by_email("asha@example.com")
            .await
            .expect("lookup should succeed")
            .expect("user should exist");
        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "asha");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_first_record_survives() {
        let store = MemoryCredentialStore::new();
        let first = store
            .create("asha", "asha@example.com", "hash-one")
            .await
            .expect("first create should succeed");
        let err = store
            .create("impostor", "asha@example.com", "hash-two")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        let found = store
            .find_by_email("asha@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.username, "asha");
        assert_eq!(found.password_hash, "hash-one");
    }

    #[tokio::test]
    async fn find_by_id_round_trips() {
        let store = MemoryCredentialStore::new();
        let created = store
            .create("ravi", "ravi@example.com", "hash")
            .await
            .unwrap();
        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.email, "ravi@example.com");
        assert!(store
            .find_by_id(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn concurrent_creates_with_same_email_yield_exactly_one_winner() {
        let store = Arc::new(MemoryCredentialStore::new());
        let a = {
            let store = store.clone();
            tokio::spawn(async move { store.create("a", "race@example.com", "hash-a").await })
        };
        let b = {
            let store = store.clone();
            tokio::spawn(async move { store.create("b", "race@example.com", "hash-b").await })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(StoreError::DuplicateEmail))));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "asha".into(),
            email: "asha@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("asha@example.com"));
    }
}
