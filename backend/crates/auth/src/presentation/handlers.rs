//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::request_auth::AuthContext;
use crate::application::token_codec::TokenCodec;
use crate::application::{
    AuthenticationService, FederatedSignInUseCase, LoginInput, OAuthAttributes, SignUpInput,
    SignUpUseCase,
};
use crate::domain::repository::{RefreshTokenStore, SocialAccountRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::cookie::CookieTransport;
use crate::presentation::dto::{LoginRequest, MeResponse, RegisterRequest, RegisterResponse};

/// Shared state for auth handlers and the authentication middleware
pub struct AuthAppState<R, S>
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub store: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub cookies: Arc<CookieTransport>,
    pub config: Arc<AuthConfig>,
}

impl<R, S> AuthAppState<R, S>
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, store: Arc<S>, config: AuthConfig) -> Self {
        Self {
            repo,
            store,
            codec: Arc::new(TokenCodec::new(&config.signing_key)),
            cookies: Arc::new(CookieTransport::new(&config)),
            config: Arc::new(config),
        }
    }

    fn authentication(&self) -> AuthenticationService<R, S> {
        AuthenticationService::new(
            self.repo.clone(),
            self.store.clone(),
            self.codec.clone(),
            self.config.clone(),
        )
    }
}

// Manual impl: derive would require `R: Clone` and `S: Clone`.
impl<R, S> Clone for AuthAppState<R, S>
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            store: self.store.clone(),
            codec: self.codec.clone(),
            cookies: self.cookies.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/v1/users/register
pub async fn register<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.config.clone());

    let input = SignUpInput {
        email: req.email,
        nickname: req.nickname,
        password: req.password,
        password_confirm: req.password_confirm,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: output.user_id.to_string(),
            email: output.email.as_str().to_string(),
        }),
    ))
}

// ============================================================================
// Login / Refresh / Logout
// ============================================================================

/// POST /api/v1/users/login
pub async fn login<R, S>(
    State(state): State<AuthAppState<R, S>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let input = LoginInput {
        email: req.email,
        password: req.password,
    };

    let pair = state.authentication().login(input).await?;
    let [access, refresh] = state.cookies.encode(&pair)?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, access), (header::SET_COOKIE, refresh)]),
    ))
}

/// POST /api/v1/users/refresh
pub async fn refresh<R, S>(
    State(state): State<AuthAppState<R, S>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let token = state
        .cookies
        .refresh_token(&headers)
        .ok_or(AuthError::MissingRefreshToken)?;

    let pair = state.authentication().refresh(&token).await?;
    let [access, refresh] = state.cookies.encode(&pair)?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(header::SET_COOKIE, access), (header::SET_COOKIE, refresh)]),
    ))
}

/// POST /api/v1/users/logout
///
/// Both cookies are expired on every outcome. A session store failure still
/// surfaces as an error so the client knows the refresh token may be live.
pub async fn logout<R, S>(
    State(state): State<AuthAppState<R, S>>,
    context: AuthContext,
) -> Response
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let [access, refresh] = match state.cookies.expire() {
        Ok(cookies) => cookies,
        Err(e) => return e.into_response(),
    };
    let clear = AppendHeaders([(header::SET_COOKIE, access), (header::SET_COOKIE, refresh)]);

    if let Some(principal) = context.principal() {
        if let Err(e) = state.authentication().logout(&principal.email).await {
            return (clear, e).into_response();
        }
    }

    (StatusCode::NO_CONTENT, clear).into_response()
}

// ============================================================================
// Federated Sign-In
// ============================================================================

/// Finish a provider sign-in whose userinfo has already been fetched and
/// normalized by the provider exchange.
///
/// On success the token pair is set as cookies and the browser is sent to
/// the configured landing page. Any failure redirects to the failure page
/// without cookies. Not routed: `attributes` must come from a verified
/// provider response, never from the client.
pub async fn complete_federated_sign_in<R, S>(
    state: &AuthAppState<R, S>,
    attributes: &OAuthAttributes,
) -> Response
where
    R: UserRepository + SocialAccountRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    let use_case = FederatedSignInUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.store.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let result = use_case
        .execute(attributes)
        .await
        .and_then(|(user, pair)| Ok((user, state.cookies.encode(&pair)?)));

    match result {
        Ok((user, [access, refresh])) => {
            tracing::info!(email = %user.email, provider = %attributes.provider, "Federated sign-in completed");
            (
                AppendHeaders([(header::SET_COOKIE, access), (header::SET_COOKIE, refresh)]),
                Redirect::to(&state.config.oauth2_success_redirect),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(provider = %attributes.provider, error = %e, code = e.code(), "Federated sign-in failed");
            Redirect::to(&state.config.oauth2_failure_redirect).into_response()
        }
    }
}

// ============================================================================
// Current Principal
// ============================================================================

/// GET /api/v1/users/me
pub async fn me(context: AuthContext) -> AuthResult<Json<MeResponse>> {
    let principal = context.principal().ok_or(AuthError::AccessDenied)?;
    Ok(Json(MeResponse::from(principal)))
}
