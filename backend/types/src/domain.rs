use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Name under which application sessions are stored as authorizations.
pub const SESSION_PROVIDER: &str = "tomatoes";

#[derive(Debug, Clone, Default, Validate, Deserialize, Serialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
    pub provider: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: CreateSessionRequest =
            serde_json::from_str(r#"{"provider":"invalid_provider"}"#).unwrap();
        assert_eq!(request.provider, "invalid_provider");
        assert!(request.access_token.is_empty());
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_request_with_access_token_is_valid() {
        let request = CreateSessionRequest {
            provider: "github".to_string(),
            access_token: "github_access_token".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
