use super::state::ServerState;
use crate::user::auth::AuthTokenValue;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, error};

#[derive(Debug)]
pub struct Session {
    pub user_id: usize,
    pub token: String,
}

pub const COOKIE_SESSION_TOKEN_KEY: &str = "session_token";
pub const HEADER_SESSION_TOKEN_KEY: &str = "Authorization";

#[derive(Debug)]
pub enum SessionExtractionError {
    AccessDenied,
    InternalError,
}

impl IntoResponse for SessionExtractionError {
    fn into_response(self) -> axum::response::Response {
        match self {
            SessionExtractionError::AccessDenied => StatusCode::FORBIDDEN.into_response(),
            SessionExtractionError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

fn extract_session_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_SESSION_TOKEN_KEY)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

fn extract_session_token_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_SESSION_TOKEN_KEY)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .map(|v| v.strip_prefix("Bearer ").map(str::to_owned).unwrap_or(v))
        .filter(|token| !token.is_empty())
}

fn extract_session_from_request_parts(
    parts: &Parts,
    ctx: &ServerState,
) -> Result<Option<Session>, SessionExtractionError> {
    let token = match extract_session_token_from_cookies(parts)
        .or_else(|| extract_session_token_from_headers(parts))
    {
        None => {
            debug!("No token in cookies nor headers.");
            return Ok(None);
        }
        Some(x) => x,
    };

    let user_manager = ctx.user_manager.lock().map_err(|_| {
        error!("User manager lock is poisoned");
        SessionExtractionError::InternalError
    })?;
    let auth_token_value = AuthTokenValue(token);
    let auth_token = match user_manager.get_auth_token(&auth_token_value) {
        Some(token) => token,
        None => {
            debug!("Unknown session token.");
            return Ok(None);
        }
    };

    if let Err(e) = user_manager.update_auth_token_last_used(&auth_token_value) {
        debug!("Failed to update auth token last_used timestamp: {}", e);
    }

    Ok(Some(Session {
        user_id: auth_token.user_id,
        token: auth_token.value.0,
    }))
}

impl FromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)?.ok_or(SessionExtractionError::AccessDenied)
    }
}

impl axum::extract::OptionalFromRequestParts<ServerState> for Session {
    type Rejection = SessionExtractionError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Option<Self>, Self::Rejection> {
        extract_session_from_request_parts(parts, ctx)
    }
}
