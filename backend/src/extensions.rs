use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use log::{debug, error};
use tap::TapFallible;

use types::domain::{CreateSessionRequest, TokenParams};
use types::error::{Error, ErrorBody};

use crate::domain::authorization::mask_token;
use crate::domain::user::User;
use crate::routes::Api;

/// Session token taken from the `token` query parameter, or from an
/// `Authorization: Bearer` header when the parameter is absent.
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<TokenParams>::from_request_parts(req, state)
            .await
            .tap_err(|e| error!("Failed to parse query string: {}", e))
            .map_err(|_| Error::AuthenticationFailed)?;
        if let Some(token) = params.token.filter(|token| !token.is_empty()) {
            return Ok(SessionToken(token));
        }

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(req, state)
                .await
                .tap_err(|e| debug!("No session token in request: {}", e))
                .map_err(|_| Error::AuthenticationFailed)?;
        Ok(SessionToken(bearer.token().to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct ExtractUserFromToken(pub User);

impl<S> FromRequestParts<S> for ExtractUserFromToken
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(req: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let SessionToken(token) = SessionToken::from_request_parts(req, state).await?;
        let Extension(api) = Extension::<Api>::from_request_parts(req, state)
            .await
            .tap_err(|e| error!("Failed to extract API: {}", e))
            .map_err(|_| Error::Internal)?;

        match api.get_user_by_session_token(&token).await {
            Ok(Some(user)) => Ok(ExtractUserFromToken(user)),
            Ok(None) => {
                debug!("No session for token {}", mask_token(&token));
                Err(Error::AuthenticationFailed)
            }
            Err(e) => {
                error!("Failed to get user from token: {:?}", e);
                Err(Error::Internal)
            }
        }
    }
}

/// Session parameters read from a JSON body, a form body, or the query
/// string when the request carries no body content type.
#[derive(Debug, Clone)]
pub struct SessionParams(pub CreateSessionRequest);

impl<S> FromRequest<S> for SessionParams
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("application/json") {
            let Json(params) = Json::<CreateSessionRequest>::from_request(req, state)
                .await
                .map_err(|e| reject(e.status(), e.body_text()))?;
            Ok(SessionParams(params))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(params) = Form::<CreateSessionRequest>::from_request(req, state)
                .await
                .map_err(|e| reject(e.status(), e.body_text()))?;
            Ok(SessionParams(params))
        } else {
            let Query(params) = Query::<CreateSessionRequest>::try_from_uri(req.uri())
                .map_err(|e| reject(e.status(), e.body_text()))?;
            Ok(SessionParams(params))
        }
    }
}

fn reject(status: StatusCode, message: String) -> Response {
    debug!("Rejected session parameters: {}", message);
    (status, Json(ErrorBody { error: message })).into_response()
}
