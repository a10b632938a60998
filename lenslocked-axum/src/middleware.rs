use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
    time::Instant,
};

use async_trait::async_trait;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use lenslocked::{Lenslocked, RawToken, RepositoryProvider, User};

use crate::{error::ApiError, types::CookieConfig};

/// Hands a freshly issued password reset token to the user, usually by email.
#[async_trait]
pub trait ResetTokenDelivery: Send + Sync + 'static {
    async fn deliver(&self, user: &User, token: &RawToken) -> Result<(), lenslocked::Error>;
}

/// Drops reset tokens. Used until an application installs its own delivery.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardResetTokens;

#[async_trait]
impl ResetTokenDelivery for DiscardResetTokens {
    async fn deliver(&self, user: &User, _token: &RawToken) -> Result<(), lenslocked::Error> {
        tracing::warn!(user_id = %user.id, "No reset token delivery configured");
        Ok(())
    }
}

pub struct AppState<R: RepositoryProvider> {
    pub lenslocked: Arc<Lenslocked<R>>,
    pub reset_delivery: Arc<dyn ResetTokenDelivery>,
}

impl<R: RepositoryProvider> AppState<R> {
    pub fn new(lenslocked: Arc<Lenslocked<R>>) -> Self {
        Self {
            lenslocked,
            reset_delivery: Arc::new(DiscardResetTokens),
        }
    }
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            lenslocked: self.lenslocked.clone(),
            reset_delivery: self.reset_delivery.clone(),
        }
    }
}

pub(crate) fn session_token(jar: &CookieJar, config: &CookieConfig) -> Option<RawToken> {
    jar.get(&config.name)
        .map(|cookie| cookie.value())
        .filter(|value| !value.is_empty())
        .map(RawToken::new)
}

/// Resolve the session cookie to a user and store it in the request
/// extensions. Requests without a valid session pass through unchanged.
pub async fn auth_middleware<R>(
    State(state): State<AppState<R>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response
where
    R: RepositoryProvider,
{
    let config = CookieConfig::from_extensions(request.extensions());

    if let Some(token) = session_token(&jar, &config) {
        match state.lenslocked.authenticate(&token).await {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(e) if e.is_session_error() => {
                tracing::debug!("Ignoring invalid session cookie");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to look up session");
            }
        }
    }

    next.run(request).await
}

/// Reject requests that do not carry a valid session cookie.
pub async fn require_auth<R>(
    State(state): State<AppState<R>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    R: RepositoryProvider,
{
    if request.extensions().get::<User>().is_none() {
        let config = CookieConfig::from_extensions(request.extensions());
        let token = session_token(&jar, &config).ok_or(ApiError::Unauthorized)?;
        let user = state.lenslocked.authenticate(&token).await?;
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

/// Log method, path, client address and latency of every request
pub async fn log_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let ip = client_ip(request.headers(), peer)
        .map(|ip| ip.to_string())
        .unwrap_or_else(|| "-".to_string());

    let response = next.run(request).await;

    tracing::info!(
        ip = %ip,
        %method,
        path = %path,
        status = response.status().as_u16(),
        latency_ms = start.elapsed().as_millis() as u64,
        "Request"
    );

    response
}

/// The client address: the last `X-Forwarded-For` hop when it parses,
/// otherwise the peer address. IPv6 loopback is reported as `127.0.0.1`.
pub(crate) fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.rsplit(',').next())
        .and_then(|hop| hop.trim().parse::<IpAddr>().ok());

    forwarded.or_else(|| {
        peer.map(|addr| match addr.ip() {
            ip if ip.is_loopback() && ip.is_ipv6() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            ip => ip,
        })
    })
}
