use rand::distr::Alphanumeric;
use rand::{rng, Rng};

use client::client::Client;

/// Server under test; defaults to the local development address.
pub fn test_client() -> Client {
    match std::env::var("E2E_BASE_URL") {
        Ok(base_url) => Client::with_base_url(&base_url),
        Err(_) => Client::new(),
    }
}

pub fn random_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(40)
        .map(char::from)
        .collect()
}

/// A real GitHub access token, when the environment provides one.
pub fn github_access_token() -> Option<String> {
    std::env::var("E2E_GITHUB_ACCESS_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
}
