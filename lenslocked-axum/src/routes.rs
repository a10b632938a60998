use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::CookieJar;
use lenslocked::{GalleryId, RawToken, RepositoryProvider};

use crate::{
    error::Result,
    extractors::{AuthUser, OptionalAuthUser, SessionTokenFromCookie},
    middleware::{AppState, auth_middleware, log_requests, require_auth},
    types::*,
};

const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent.";

pub fn create_router<R>(state: AppState<R>, cookie_config: CookieConfig) -> Router
where
    R: RepositoryProvider + 'static,
{
    let protected_routes = Router::new()
        .route("/users/me", get(current_user_handler))
        .route(
            "/galleries",
            get(list_galleries_handler).post(create_gallery_handler),
        )
        .route_layer(from_fn_with_state(state.clone(), require_auth::<R>));

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/signup", post(signup_handler))
        .route("/signin", post(signin_handler))
        .route("/signout", post(signout_handler))
        .route("/forgot-pw", post(forgot_password_handler))
        .route("/reset-pw", post(reset_password_handler))
        .route(
            "/galleries/{id}",
            get(show_gallery_handler)
                .put(update_gallery_handler)
                .delete(delete_gallery_handler),
        );

    Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(from_fn_with_state(state.clone(), auth_middleware::<R>))
        .layer(from_fn(log_requests))
        .layer(Extension(cookie_config))
        .with_state(state)
}

async fn health_handler<R>(State(state): State<AppState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.lenslocked.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn signup_handler<R>(
    State(state): State<AppState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    jar: CookieJar,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let (user, token, session) = state
        .lenslocked
        .signup(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        jar.add(cookie_config.session_cookie(&token)),
        Json(AuthResponse { user, session }),
    ))
}

async fn signin_handler<R>(
    State(state): State<AppState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    jar: CookieJar,
    Json(payload): Json<SigninRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let (user, token, session) = state
        .lenslocked
        .signin(&payload.email, &payload.password)
        .await?;

    Ok((
        jar.add(cookie_config.session_cookie(&token)),
        Json(AuthResponse { user, session }),
    ))
}

async fn signout_handler<R>(
    State(state): State<AppState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    jar: CookieJar,
    SessionTokenFromCookie(token): SessionTokenFromCookie,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    if let Some(token) = token {
        state.lenslocked.signout(&token).await?;
    }

    Ok((
        jar.remove(cookie_config.removal_cookie()),
        Json(MessageResponse {
            message: "Successfully signed out".to_string(),
        }),
    ))
}

async fn current_user_handler(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse { user })
}

async fn forgot_password_handler<R>(
    State(state): State<AppState<R>>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    if let Some((user, token, _)) = state
        .lenslocked
        .request_password_reset(&payload.email)
        .await?
    {
        state.reset_delivery.deliver(&user, &token).await?;
    }

    // Same answer whether or not the account exists
    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE.to_string(),
    }))
}

async fn reset_password_handler<R>(
    State(state): State<AppState<R>>,
    Extension(cookie_config): Extension<CookieConfig>,
    jar: CookieJar,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let (user, token, session) = state
        .lenslocked
        .reset_password(&RawToken::new(payload.token), &payload.password)
        .await?;

    Ok((
        jar.add(cookie_config.session_cookie(&token)),
        Json(AuthResponse { user, session }),
    ))
}

async fn list_galleries_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let galleries = state.lenslocked.list_galleries(&user.id).await?;
    Ok(Json(GalleriesResponse { galleries }))
}

async fn create_gallery_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    Json(payload): Json<GalleryRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let gallery = state
        .lenslocked
        .create_gallery(&user.id, &payload.title)
        .await?;
    Ok((StatusCode::CREATED, Json(GalleryResponse { gallery })))
}

async fn show_gallery_handler<R>(
    State(state): State<AppState<R>>,
    OptionalAuthUser(user): OptionalAuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let id = GalleryId::parse(&id)?;
    let gallery = state.lenslocked.get_gallery(&id).await?;
    let editable = user.is_some_and(|user| gallery.is_owned_by(&user.id));
    Ok(Json(GalleryViewResponse { gallery, editable }))
}

async fn update_gallery_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<GalleryRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let id = GalleryId::parse(&id)?;
    let gallery = state
        .lenslocked
        .update_gallery(&id, &user.id, &payload.title)
        .await?;
    Ok(Json(GalleryResponse { gallery }))
}

async fn delete_gallery_handler<R>(
    State(state): State<AppState<R>>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let id = GalleryId::parse(&id)?;
    state.lenslocked.delete_gallery(&id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
