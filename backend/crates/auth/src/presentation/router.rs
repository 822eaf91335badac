//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::domain::repository::{RefreshTokenStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::authenticate_request;

/// Mount point of the auth routes
pub const AUTH_BASE_PATH: &str = "/api/v1/users";

/// Auth routes without the authentication layer
pub fn auth_router<R, S>(state: AuthAppState<R, S>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(handlers::register::<R, S>))
        .route("/login", post(handlers::login::<R, S>))
        .route("/refresh", post(handlers::refresh::<R, S>))
        .route("/logout", post(handlers::logout::<R, S>))
        .route("/me", get(handlers::me))
        .with_state(state)
}

/// Wrap `app` so every request gets an `AuthContext` before routing
pub fn with_request_authentication<R, S>(app: Router, state: AuthAppState<R, S>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    app.layer(middleware::from_fn_with_state(
        state,
        authenticate_request::<R, S>,
    ))
}

/// Auth routes nested at [`AUTH_BASE_PATH`] with request authentication
pub fn auth_app<R, S>(state: AuthAppState<R, S>) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let app = Router::new().nest(AUTH_BASE_PATH, auth_router(state.clone()));
    with_request_authentication(app, state)
}
