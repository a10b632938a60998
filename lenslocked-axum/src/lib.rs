//! # Lenslocked Axum Integration
//!
//! JSON routes and middleware that expose [`lenslocked::Lenslocked`] over HTTP.
//! The session token travels in an http-only cookie (see [`CookieConfig`]).
//!
//! | Route                      | Auth     |                                   |
//! | -------------------------- | -------- | --------------------------------- |
//! | `POST /signup`             |          | Create an account and sign in     |
//! | `POST /signin`             |          | Sign in, replacing any session    |
//! | `POST /signout`            |          | End the session, drop the cookie  |
//! | `GET /users/me`            | required | The signed in user                |
//! | `POST /forgot-pw`          |          | Issue a password reset token      |
//! | `POST /reset-pw`           |          | Redeem it and sign in             |
//! | `GET /health`              |          | Storage health check              |
//! | `GET, POST /galleries`     | required | List or create own galleries      |
//! | `GET /galleries/{id}`      | optional | View any gallery                  |
//! | `PUT, DELETE /galleries/{id}` | owner | Rename or delete a gallery       |
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::{net::SocketAddr, sync::Arc};
//! use lenslocked::{Lenslocked, SqliteRepositoryProvider};
//! use lenslocked_axum::CookieConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = SqliteRepositoryProvider::connect("sqlite://lenslocked.db?mode=rwc").await?;
//!     let lenslocked = Arc::new(Lenslocked::new(Arc::new(repositories)));
//!     lenslocked.migrate().await?;
//!
//!     let app = lenslocked_axum::routes(lenslocked)
//!         .with_cookie_config(CookieConfig::development())
//!         .build();
//!
//!     // Serve with connect info so request logs carry the peer address
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
//!     Ok(())
//! }
//! ```

mod error;
mod extractors;
mod middleware;
mod routes;
mod types;

pub use error::{ApiError, Result};
pub use extractors::{AuthUser, OptionalAuthUser, SessionTokenFromCookie};
pub use middleware::{
    AppState, DiscardResetTokens, ResetTokenDelivery, auth_middleware, log_requests,
    require_auth,
};
pub use routes::create_router;
pub use types::{
    AuthResponse, CookieConfig, CookieSameSite, ForgotPasswordRequest, GalleriesResponse,
    GalleryRequest, GalleryResponse, GalleryViewResponse, HealthResponse, MessageResponse,
    ResetPasswordRequest, SigninRequest, SignupRequest, UserResponse,
};

use axum::Router;
use lenslocked::{Lenslocked, RepositoryProvider};
use std::sync::Arc;

/// Create the lenslocked routes for your Axum application.
///
/// The returned builder can be nested at any path (e.g. `/api`).
pub fn routes<R>(lenslocked: Arc<Lenslocked<R>>) -> AppRouterBuilder<R>
where
    R: RepositoryProvider + 'static,
{
    AppRouterBuilder {
        state: AppState::new(lenslocked),
        cookie_config: CookieConfig::default(),
    }
}

/// Builder for configuring the lenslocked routes
pub struct AppRouterBuilder<R: RepositoryProvider> {
    state: AppState<R>,
    cookie_config: CookieConfig,
}

impl<R: RepositoryProvider + 'static> AppRouterBuilder<R> {
    /// Set custom cookie configuration
    pub fn with_cookie_config(mut self, config: CookieConfig) -> Self {
        self.cookie_config = config;
        self
    }

    /// Set how password reset tokens reach the user
    pub fn with_reset_delivery(mut self, delivery: impl ResetTokenDelivery) -> Self {
        self.state.reset_delivery = Arc::new(delivery);
        self
    }

    /// Build the router with the configured options
    pub fn build(self) -> Router {
        create_router(self.state, self.cookie_config)
    }
}

impl<R: RepositoryProvider + 'static> From<AppRouterBuilder<R>> for Router {
    fn from(builder: AppRouterBuilder<R>) -> Self {
        builder.build()
    }
}
