use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            normalize_email, AccessToken, RefreshRequest, RegisterRequest, RegisterResponse,
            TokenPair, TokenRequest,
        },
        jwt::JwtKeys,
        password::{hash_password, verify_password, verify_without_account},
        repo_types::NewUser,
    },
    error::AppError,
    extract::Json,
    state::AppState,
    store::StoreError,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/register/", post(register))
}

pub fn token_routes() -> Router<AppState> {
    Router::new()
        .route("/token/", post(obtain_token))
        .route("/token/refresh/", post(refresh_token))
}

fn email_taken() -> AppError {
    AppError::Conflict {
        field: "email",
        message: "A user with that email already exists.".into(),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    // Both fields are present after validation.
    let email = normalize_email(payload.email.as_deref().unwrap_or_default());
    let password = payload.password.unwrap_or_default();

    if state.users.find_by_username(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(email_taken());
    }

    let password_hash = hash_password(&password)?;
    let user = state
        .users
        .create(NewUser {
            username: email.clone(),
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate { .. } => email_taken(),
            other => other.into(),
        })?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully! Please login.",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn obtain_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let username = normalize_email(payload.username.as_deref().unwrap_or_default());
    let password = payload.password.unwrap_or_default();

    let Some(user) = state.users.find_by_username(&username).await? else {
        warn!(username = %username, "login unknown user");
        verify_without_account(&password);
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access = keys.sign_access(user.id, &user.username)?;
    let refresh = keys.sign_refresh(user.id, &user.username)?;

    info!(user_id = user.id, "tokens issued");
    Ok(Json(TokenPair { access, refresh }))
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(payload.refresh.as_deref().unwrap_or_default())
        .map_err(|e| AppError::InvalidToken(e.to_string()))?;

    // The account must still exist; the username is re-read for the new claims.
    let user = state
        .users
        .find_by_id(claims.user_id)
        .await?
        .ok_or_else(|| AppError::InvalidToken("user not found".into()))?;

    let access = keys.sign_access(user.id, &user.username)?;
    Ok(Json(AccessToken { access }))
}
