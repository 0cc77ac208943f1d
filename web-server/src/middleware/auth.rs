// web-server/src/middleware/auth.rs
//! Bearer-token gate for protected handlers.
//!
//! Taking [`AuthenticatedUser`] as the first handler argument rejects the
//! request with 401 before the body is read or any store is touched.
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use common::AuthError;
use futures_util::future::{ready, Ready};

use crate::error::ApiError;
use crate::AppState;

/// The verified subject of the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state not configured".to_string()))?;

    let token = bearer_token(req).ok_or(AuthError::MissingCredentials)?;

    match state.tokens.subject(token) {
        Ok(user_id) => Ok(AuthenticatedUser { user_id }),
        Err(e) => {
            tracing::warn!("Rejected bearer token on {}: {}", req.path(), e);
            Err(e.into())
        }
    }
}
