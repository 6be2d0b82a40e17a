use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use eyre::Result;
use log::{debug, error, info};

use crate::config::Config;
use crate::extensions::{ExtractUserFromToken, SessionParams, SessionToken};
use crate::provider::github::GithubClient;
use crate::provider::ProviderRegistry;
use crate::repository::authorizations::AuthorizationRepository;
use crate::repository::users::UserRepository;
use crate::routes::Api;
use crate::service::sessions::SessionService;
use types::error::{Error, ErrorBody};

mod config;
mod db;
mod domain;
mod extensions;
mod provider;
mod repository;
mod routes;
mod service;
#[cfg(test)]
mod test_util;

#[tokio::main]
async fn main() -> Result<()> {
    // setup log
    env_logger::init();
    info!("server starts with logging");

    let config = Config::from_env()?;
    let pool = db::connect(&config.database_url).await?;

    // providers
    let providers = ProviderRegistry::new().register(GithubClient::new(
        &config.github_api_url,
        config.github_timeout,
    )?);

    // API
    let api = Api {
        session_service: SessionService {
            providers,
            user_repository: UserRepository::new(pool.clone()),
            authorization_repository: AuthorizationRepository::new(pool),
            replace_existing_sessions: config.replace_existing_sessions,
        },
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("listening on {}", config.bind_addr);
    axum::serve(listener, app(api)).await?;
    Ok(())
}

fn app(api: Api) -> Router {
    Router::new()
        .route("/api/session", post(create_session).delete(destroy_session))
        .route("/api/user", get(get_user))
        .layer(Extension(api))
}

async fn create_session(
    Extension(api): Extension<Api>,
    SessionParams(payload): SessionParams,
) -> impl IntoResponse {
    match api.create_session(payload).await {
        Ok(session) => (StatusCode::CREATED, Json(session)).into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn destroy_session(
    Extension(api): Extension<Api>,
    SessionToken(token): SessionToken,
) -> impl IntoResponse {
    match api.destroy_session(token).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => report_into_response(e).into_response(),
    }
}

async fn get_user(
    Extension(api): Extension<Api>,
    ExtractUserFromToken(user): ExtractUserFromToken,
) -> impl IntoResponse {
    (StatusCode::OK, Json(api.get_profile(user)))
}

fn report_into_response(e: eyre::Report) -> (StatusCode, Json<ErrorBody>) {
    match e.downcast::<Error>() {
        Ok(error) => {
            debug!("Request failed: {}", error);
            error.into_response_tuple()
        }
        Err(e) => {
            error!("Error occurred: {:?}", e);
            Error::Internal.into_response_tuple()
        }
    }
}
