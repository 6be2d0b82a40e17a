use eyre::{ContextCompat, Result};
use log::{debug, info, warn};
use sqlx::types::Uuid;
use tap::TapFallible;
use types::error::Error;

use crate::domain::authorization::{generate_token, mask_token, Authorization};
use crate::domain::identity::RemoteIdentity;
use crate::domain::user::User;
use crate::provider::ProviderRegistry;
use crate::repository::authorizations::AuthorizationRepository;
use crate::repository::users::UserRepository;

#[derive(Clone)]
pub struct SessionService {
    pub providers: ProviderRegistry,
    pub user_repository: UserRepository,
    pub authorization_repository: AuthorizationRepository,
    pub replace_existing_sessions: bool,
}

impl SessionService {
    pub fn supports(&self, provider: &str) -> bool {
        self.providers.supports(provider)
    }

    pub async fn create_session(&self, provider: &str, access_token: &str) -> Result<Authorization> {
        let provider = self
            .providers
            .get(provider)
            .ok_or(Error::ProviderNotSupported)?;

        let identity = provider
            .fetch_identity(access_token)
            .await
            .tap_err(|e| {
                warn!(
                    "{} did not accept access token {}: {:?}",
                    provider.name(),
                    mask_token(access_token),
                    e
                )
            })
            .map_err(|_| Error::AuthenticationFailed)?;

        let token = generate_token();
        let session = match self
            .user_repository
            .find_by_identity(&identity.provider, &identity.uid)
            .await?
        {
            Some(user) => self.issue_session(user.id, &token).await?,
            None => self.create_user_with_session(&identity, &token).await?,
        };
        info!(
            "issued session {} to user {} via {}",
            mask_token(&token),
            session.user_id,
            identity.provider
        );
        Ok(session)
    }

    async fn issue_session(&self, user_id: Uuid, token: &str) -> Result<Authorization> {
        if self.replace_existing_sessions {
            self.authorization_repository
                .replace_sessions(user_id, token)
                .await
        } else {
            self.authorization_repository
                .create_session(user_id, token)
                .await
        }
    }

    async fn create_user_with_session(
        &self,
        identity: &RemoteIdentity,
        token: &str,
    ) -> Result<Authorization> {
        if let Some((user, session)) = self
            .user_repository
            .create_with_identity(identity, token)
            .await?
        {
            info!(
                "created user {} for {} uid {}",
                user.id, identity.provider, identity.uid
            );
            return Ok(session);
        }
        // another request linked this identity between the lookup and the insert
        debug!(
            "{} uid {} was linked concurrently",
            identity.provider, identity.uid
        );
        let user = self
            .user_repository
            .find_by_identity(&identity.provider, &identity.uid)
            .await?
            .wrap_err("linked identity vanished after a conflicting insert")?;
        self.issue_session(user.id, token).await
    }

    /// Logs the token's owner out everywhere. Returns the number of sessions removed.
    pub async fn destroy_session(&self, token: &str) -> Result<u64> {
        let session = self
            .authorization_repository
            .find_session_by_token(token)
            .await?
            .ok_or(Error::AuthenticationFailed)?;
        let deleted = self
            .authorization_repository
            .delete_sessions_for_user(session.user_id)
            .await?;
        info!("destroyed {} session(s) of user {}", deleted, session.user_id);
        Ok(deleted)
    }

    pub async fn get_user_by_session_token(&self, token: &str) -> Result<Option<User>> {
        match self
            .authorization_repository
            .find_session_by_token(token)
            .await?
        {
            Some(session) => self.user_repository.get(session.user_id).await,
            None => Ok(None),
        }
    }
}
