use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::types::chrono::{DateTime, Utc};
use sqlx::types::Uuid;
use sqlx::FromRow;

use types::domain::{SessionResponse, SESSION_PROVIDER};

const TOKEN_LENGTH: usize = 40;

/// Either a linked external identity (`uid` set) or an application session
/// (`provider == "tomatoes"`, `token` set).
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Authorization {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider: String,
    pub uid: Option<String>,
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Authorization {
    pub fn is_session(&self) -> bool {
        self.provider == SESSION_PROVIDER && self.token.is_some()
    }

    pub fn to_session_response(&self) -> Option<SessionResponse> {
        let token = self.token.clone().filter(|_| self.is_session())?;
        Some(SessionResponse {
            token,
            provider: self.provider.clone(),
            user_id: self.user_id,
            created_at: self.created_at,
        })
    }
}

pub fn generate_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Keeps the first and last 4 characters of a secret for log lines.
pub fn mask_token(token: &str) -> String {
    if token.len() > 8 && token.is_ascii() {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}
