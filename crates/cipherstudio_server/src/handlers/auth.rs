//! Account HTTP handlers.

use super::run_blocking;
use crate::{error::HttpError, AppState};
use axum::{extract::State, http::header, http::HeaderMap, http::StatusCode, Json};
use cipherstudio_core::auth::{bearer_token, hash_password, verify_password};
use cipherstudio_core::models::user::{
    AuthResponse, LoginRequest, MeResponse, RegisterRequest, User,
};
use cipherstudio_core::text::trimmed_field;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Resolve the account behind the request's bearer token.
///
/// # Errors
/// Returns 401 when the header is missing or malformed, the token does not
/// verify, or the account no longer exists.
pub(crate) fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<User, HttpError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(HttpError::unauthorized)?;
    let claims = state.tokens.verify(token)?;
    state
        .db
        .users
        .get(&claims.sub)?
        .ok_or_else(HttpError::unauthorized)
}

/// Like [`authenticate`], but anonymous or invalid tokens yield `None`.
///
/// # Errors
/// Only storage failures are reported.
pub(crate) fn optional_user(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<User>, HttpError> {
    if !headers.contains_key(header::AUTHORIZATION) {
        return Ok(None);
    }
    match authenticate(state, headers) {
        Ok(user) => Ok(Some(user)),
        Err(err) if err.status() == StatusCode::UNAUTHORIZED => {
            tracing::debug!("Ignoring invalid bearer token on optional-auth route");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Create an account and sign the caller in.
///
/// # Returns
/// `201` with the public user and a bearer token.
///
/// # Errors
/// `400 Missing fields` when username, email, or password is absent;
/// `400 User already exists` when the username or email is taken.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), HttpError> {
    let username = trimmed_field(req.username);
    let email = trimmed_field(req.email);
    let password = req.password.filter(|password| !password.is_empty());
    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(HttpError::bad_request("Missing fields"));
    };

    if state.db.users.find_by_username(&username)?.is_some()
        || state.db.users.find_by_email(&email)?.is_some()
    {
        return Err(HttpError::bad_request(
            cipherstudio_core::db::user::USER_EXISTS_MESSAGE,
        ));
    }

    let cost = state.config.bcrypt_cost;
    let password_hash = run_blocking(move || hash_password(&password, cost)).await?;
    let user = User::new(username, email, password_hash);
    state.db.users.create(&user)?;

    let token = state.tokens.issue(&user)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: user.public(),
            token,
        }),
    ))
}

/// Exchange a username (or email) and password for a bearer token.
///
/// # Errors
/// `400 Missing credentials` or `400 Invalid credentials`.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, HttpError> {
    let username = trimmed_field(req.username);
    let email = trimmed_field(req.email);
    let Some(password) = req.password.filter(|password| !password.is_empty()) else {
        return Err(HttpError::bad_request("Missing credentials"));
    };

    let user = match (username, email) {
        (Some(username), _) => state.db.users.find_by_username(&username)?,
        (None, Some(email)) => state.db.users.find_by_email(&email)?,
        (None, None) => return Err(HttpError::bad_request("Missing credentials")),
    };
    let Some(user) = user else {
        return Err(HttpError::bad_request(INVALID_CREDENTIALS));
    };

    let password_hash = user.password_hash.clone();
    let matches = run_blocking(move || verify_password(&password, &password_hash)).await?;
    if !matches {
        tracing::debug!("Rejected login for {}", user.username);
        return Err(HttpError::bad_request(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue(&user)?;
    Ok(Json(AuthResponse {
        user: user.public(),
        token,
    }))
}

/// Return the account behind the bearer token.
///
/// # Errors
/// `401 Unauthorized` for missing, invalid, or orphaned tokens.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, HttpError> {
    let user = authenticate(&state, &headers)?;
    Ok(Json(MeResponse {
        user: user.public(),
    }))
}
