use axum::http::Extensions;
use axum_extra::extract::cookie::{Cookie, SameSite};
use lenslocked::{Gallery, RawToken, Session, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryRequest {
    pub title: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub session: Session,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleryResponse {
    pub gallery: Gallery,
}

/// A gallery as seen by any visitor
#[derive(Debug, Clone, Serialize)]
pub struct GalleryViewResponse {
    pub gallery: Gallery,
    /// Whether the signed in visitor owns the gallery
    pub editable: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GalleriesResponse {
    pub galleries: Vec<Gallery>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Settings for the session cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: CookieSameSite,
    pub path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self::new("session")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub enum CookieSameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<CookieSameSite> for SameSite {
    fn from(same_site: CookieSameSite) -> Self {
        match same_site {
            CookieSameSite::Strict => SameSite::Strict,
            CookieSameSite::Lax => SameSite::Lax,
            CookieSameSite::None => SameSite::None,
        }
    }
}

impl CookieConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_only: true,
            secure: true,
            same_site: CookieSameSite::Lax,
            path: "/".to_string(),
        }
    }

    /// Like the default, but sent over plain HTTP as well
    pub fn development() -> Self {
        Self {
            secure: false,
            ..Self::default()
        }
    }

    /// The config installed on the router, or the default outside of one.
    pub(crate) fn from_extensions(extensions: &Extensions) -> Self {
        extensions.get::<CookieConfig>().cloned().unwrap_or_default()
    }

    pub(crate) fn session_cookie(&self, token: &RawToken) -> Cookie<'static> {
        Cookie::build((self.name.clone(), token.as_str().to_string()))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .same_site(self.same_site.into())
            .build()
    }

    pub(crate) fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.name.clone())
            .path(self.path.clone())
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cookie_config() {
        let config = CookieConfig::default();
        assert_eq!(config.name, "session");
        assert!(config.http_only);
        assert!(config.secure);
        assert_eq!(config.path, "/");
        assert!(!CookieConfig::development().secure);
    }

    #[test]
    fn test_session_cookie() {
        let cookie = CookieConfig::development().session_cookie(&RawToken::new("abc"));
        assert_eq!(cookie.name(), "session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }
}
