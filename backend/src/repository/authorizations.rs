use eyre::Result;
use sqlx::types::chrono::Utc;
use sqlx::types::Uuid;
use sqlx::SqlitePool;

use types::domain::SESSION_PROVIDER;

use crate::domain::authorization::Authorization;

#[derive(Clone)]
pub struct AuthorizationRepository {
    pool: SqlitePool,
}

impl AuthorizationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuthorizationRepository { pool }
    }

    #[cfg(test)]
    pub async fn create_identity(
        &self,
        user_id: Uuid,
        provider: &str,
        uid: &str,
    ) -> Result<Authorization> {
        let now = Utc::now();
        sqlx::query_as(
            r#"
            INSERT INTO authorizations (id, user_id, provider, uid, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(provider)
        .bind(uid)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    #[cfg(test)]
    pub async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM authorizations WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    #[cfg(test)]
    pub async fn sessions_for_user(&self, user_id: Uuid) -> Result<Vec<Authorization>> {
        sqlx::query_as(
            r#"
            SELECT * FROM authorizations
            WHERE user_id = ? AND provider = ?
            "#,
        )
        .bind(user_id)
        .bind(SESSION_PROVIDER)
        .fetch_all(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn create_session(&self, user_id: Uuid, token: &str) -> Result<Authorization> {
        let now = Utc::now();
        sqlx::query_as(
            r#"
            INSERT INTO authorizations (id, user_id, provider, token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(SESSION_PROVIDER)
        .bind(token)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Drops every session of the user and issues a new one atomically.
    pub async fn replace_sessions(&self, user_id: Uuid, token: &str) -> Result<Authorization> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            DELETE FROM authorizations
            WHERE user_id = ? AND provider = ?
            "#,
        )
        .bind(user_id)
        .bind(SESSION_PROVIDER)
        .execute(&mut *tx)
        .await?;

        let session = sqlx::query_as(
            r#"
            INSERT INTO authorizations (id, user_id, provider, token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(SESSION_PROVIDER)
        .bind(token)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(session)
    }

    pub async fn find_session_by_token(&self, token: &str) -> Result<Option<Authorization>> {
        sqlx::query_as(
            r#"
            SELECT * FROM authorizations
            WHERE provider = ? AND token = ?
            "#,
        )
        .bind(SESSION_PROVIDER)
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete_sessions_for_user(&self, user_id: Uuid) -> Result<u64> {
        sqlx::query(
            r#"
            DELETE FROM authorizations
            WHERE user_id = ? AND provider = ?
            "#,
        )
        .bind(user_id)
        .bind(SESSION_PROVIDER)
        .execute(&self.pool)
        .await
        .map(|result| result.rows_affected())
        .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::users::UserRepository;
    use crate::test_util::memory_pool;

    #[tokio::test]
    async fn test_find_session_by_token() -> Result<()> {
        let pool = memory_pool().await?;
        let user = UserRepository::new(pool.clone())
            .create_user("name", None)
            .await?;
        let authorizations = AuthorizationRepository::new(pool);

        let session = authorizations.create_session(user.id, "tomatoes_token").await?;

        let found = authorizations.find_session_by_token("tomatoes_token").await?;
        assert_eq!(found, Some(session));
        assert!(authorizations
            .find_session_by_token("invalid_token")
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_identity_uid_is_not_a_session_token() -> Result<()> {
        let pool = memory_pool().await?;
        let user = UserRepository::new(pool.clone())
            .create_user("name", None)
            .await?;
        let authorizations = AuthorizationRepository::new(pool);
        authorizations
            .create_identity(user.id, "github", "github_user_id")
            .await?;

        assert!(authorizations
            .find_session_by_token("github_user_id")
            .await?
            .is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_sessions_keeps_linked_identities() -> Result<()> {
        let pool = memory_pool().await?;
        let user = UserRepository::new(pool.clone())
            .create_user("name", None)
            .await?;
        let authorizations = AuthorizationRepository::new(pool);
        authorizations
            .create_identity(user.id, "github", "github_user_id")
            .await?;
        authorizations.create_session(user.id, "first_token").await?;
        authorizations.create_session(user.id, "second_token").await?;

        let deleted = authorizations.delete_sessions_for_user(user.id).await?;

        assert_eq!(deleted, 2);
        assert_eq!(authorizations.count_for_user(user.id).await?, 1);
        assert!(authorizations.sessions_for_user(user.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_sessions_leaves_one_session() -> Result<()> {
        let pool = memory_pool().await?;
        let user = UserRepository::new(pool.clone())
            .create_user("name", None)
            .await?;
        let authorizations = AuthorizationRepository::new(pool);
        authorizations.create_session(user.id, "first_token").await?;
        authorizations.create_session(user.id, "second_token").await?;

        let session = authorizations.replace_sessions(user.id, "third_token").await?;

        assert_eq!(
            authorizations.sessions_for_user(user.id).await?,
            vec![session]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() -> Result<()> {
        let pool = memory_pool().await?;
        let user = UserRepository::new(pool.clone())
            .create_user("name", None)
            .await?;
        let authorizations = AuthorizationRepository::new(pool);
        authorizations.create_session(user.id, "same_token").await?;

        assert!(authorizations
            .create_session(user.id, "same_token")
            .await
            .is_err());
        Ok(())
    }
}
