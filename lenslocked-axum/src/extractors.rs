use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use lenslocked::{RawToken, User};

use crate::{error::ApiError, middleware::session_token, types::CookieConfig};

/// The signed in user. Rejects with 401 when the request has none.
///
/// Requires [`auth_middleware`](crate::auth_middleware) or
/// [`require_auth`](crate::require_auth) to run first.
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}

pub struct OptionalAuthUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(parts.extensions.get::<User>().cloned()))
    }
}

/// The raw session token from the session cookie, if present
pub struct SessionTokenFromCookie(pub Option<RawToken>);

impl<S> FromRequestParts<S> for SessionTokenFromCookie
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let config = CookieConfig::from_extensions(&parts.extensions);
        let jar = CookieJar::from_headers(&parts.headers);

        Ok(SessionTokenFromCookie(session_token(&jar, &config)))
    }
}
