use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;

use crate::domain::identity::RemoteIdentity;

pub mod github;

/// An external identity source able to tell who owns an access token.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch_identity(&self, access_token: &str) -> Result<RemoteIdentity>;
}

#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn IdentityProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<P>(mut self, provider: P) -> Self
    where
        P: IdentityProvider + 'static,
    {
        self.providers
            .insert(provider.name().to_string(), Arc::new(provider));
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn IdentityProvider>> {
        self.providers.get(name).cloned()
    }

    pub fn supports(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }
}
