//! Auth Middleware
//!
//! Attaches an [`AuthContext`] to every request. Never rejects; handlers that
//! need a principal check the context themselves.

use std::convert::Infallible;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;

use crate::application::request_auth::{AuthContext, RequestAuthenticator};
use crate::domain::repository::{RefreshTokenStore, UserRepository};
use crate::presentation::handlers::AuthAppState;

/// Resolve the access token cookie into an [`AuthContext`] extension
pub async fn authenticate_request<R, S>(
    State(state): State<AuthAppState<R, S>>,
    mut req: Request,
    next: Next,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let token = state.cookies.access_token(req.headers());

    let authenticator = RequestAuthenticator::new(state.repo.clone(), state.codec.clone());
    let context = authenticator.authenticate(token.as_deref()).await;

    req.extensions_mut().insert(context);

    next.run(req).await
}

/// Reads the context left by [`authenticate_request`]. Routes outside the
/// middleware see an anonymous context.
impl<St> FromRequestParts<St> for AuthContext
where
    St: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}
