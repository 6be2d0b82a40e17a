use eyre::Result;
use sqlx::types::chrono::Utc;
use sqlx::types::Uuid;
use sqlx::SqlitePool;

use types::domain::SESSION_PROVIDER;

use crate::domain::authorization::Authorization;
use crate::domain::identity::RemoteIdentity;
use crate::domain::user::User;

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    #[cfg(test)]
    pub async fn create_user(&self, name: &str, email: Option<&str>) -> Result<User> {
        let now = Utc::now();
        sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Into::into)
    }

    #[cfg(test)]
    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(Into::into)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        sqlx::query_as(
            r#"
            SELECT * FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_identity(&self, provider: &str, uid: &str) -> Result<Option<User>> {
        sqlx::query_as(
            r#"
            SELECT users.* FROM users
            INNER JOIN authorizations ON authorizations.user_id = users.id
            WHERE authorizations.provider = ? AND authorizations.uid = ?
            "#,
        )
        .bind(provider)
        .bind(uid)
        .fetch_optional(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Inserts a user, its linked identity and its first session in one
    /// transaction. Returns `None` when another request linked the same
    /// `(provider, uid)` first.
    pub async fn create_with_identity(
        &self,
        identity: &RemoteIdentity,
        token: &str,
    ) -> Result<Option<(User, Authorization)>> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;
        let user: User = sqlx::query_as(
            r#"
            INSERT INTO users (id, name, email, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let linked = sqlx::query(
            r#"
            INSERT INTO authorizations (id, user_id, provider, uid, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(&identity.provider)
        .bind(&identity.uid)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await;

        match linked {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                tx.rollback().await?;
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let session: Authorization = sqlx::query_as(
            r#"
            INSERT INTO authorizations (id, user_id, provider, token, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?) RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.id)
        .bind(SESSION_PROVIDER)
        .bind(token)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(Some((user, session)))
    }
}
