use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eyre::{bail, eyre, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use types::error::Error;

use crate::db::MIGRATOR;
use crate::domain::identity::RemoteIdentity;
use crate::provider::IdentityProvider;

/// A single-connection in-memory database; the connection must never be
/// recycled or the schema is lost.
pub async fn memory_pool() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect_with(options)
        .await?;
    MIGRATOR.run(&pool).await?;
    Ok(pool)
}

/// Resolves a fixed set of access tokens to github uids.
#[derive(Clone, Default)]
pub struct StubProvider {
    uids: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Arc<AtomicUsize>,
}

impl StubProvider {
    pub fn with_token(mut self, access_token: &str, uid: &str) -> Self {
        self.uids.insert(access_token.to_string(), uid.to_string());
        self
    }

    /// Tokens that fail the way an unreachable provider does, not as a rejection.
    pub fn with_failing_token(mut self, access_token: &str) -> Self {
        self.failing.insert(access_token.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    fn name(&self) -> &str {
        "github"
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<RemoteIdentity> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(access_token) {
            return Err(eyre!("connection to provider reset"));
        }
        let Some(uid) = self.uids.get(access_token) else {
            bail!(Error::AuthenticationFailed);
        };
        Ok(RemoteIdentity {
            provider: self.name().to_string(),
            uid: uid.clone(),
            name: "name".to_string(),
            email: Some("email@example.com".to_string()),
        })
    }
}
