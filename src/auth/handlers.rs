use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, PublicUser, SignupRequest},
        error::AuthError,
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(get_me))
}

/// Registration never auto-logins: no token and no hash in the response.
#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AuthError> {
    let input = payload.validate()?;

    let hash = hash_password(&input.password, &state.config.argon2).map_err(AuthError::Internal)?;

    // Duplicate detection is left to the store's unique constraint so that
    // concurrent signups with one email resolve to exactly one record.
    let user = state
        .store
        .create(&input.username, &input.email, &hash)
        .await
        .map_err(|e| {
            if matches!(e, crate::auth::store::StoreError::DuplicateEmail) {
                warn!(email = %input.email, "signup with registered email");
            }
            AuthError::from(e)
        })?;

    info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "account created, please log in".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let input = payload.validate()?;

    let user = match state.store.find_by_email(&input.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %input.email, "login with unknown email");
            return Err(AuthError::NotFound);
        }
    };

    let ok = verify_password(&input.password, &user.password_hash).map_err(AuthError::Internal)?;
    if !ok {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id).map_err(AuthError::Internal)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        username: user.username,
    }))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AuthError> {
    let user = state
        .store
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(PublicUser {
        id: user.id,
        username: user.username,
    }))
}
