use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, CreateAdminRequest, CreatedAdminResponse, LoginRequest, PublicUser,
            RefreshRequest, RefreshResponse, RegisterRequest,
        },
        extractors::{AdminUser, JsonBody},
        jwt::TokenKeys,
        password::{hash_password, verify_password},
        repo::{Role, User},
    },
    error::ApiError,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh-token", post(refresh_token))
        .route("/auth/create-admin", post(create_admin))
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn validate_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

/// Shared by register and create-admin: duplicate-email check, hash, insert.
async fn create_account(
    state: &AppState,
    name: &str,
    email: &str,
    password: &str,
    role: Role,
) -> Result<User, ApiError> {
    if User::find_by_email(&state.db, email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(ApiError::Validation("User already exists".into()));
    }
    let hash = hash_password(password)?;
    let user = User::create(&state.db, name, email, &hash, role).await?;
    Ok(user)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate_credentials(&payload.email, &payload.password)?;

    let role = payload.role.unwrap_or(Role::User);
    let user = create_account(
        &state,
        &payload.name,
        &payload.email,
        &payload.password,
        role,
    )
    .await?;

    let keys = TokenKeys::from_ref(&state);
    let pair = keys.issue(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User created successfully".into(),
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            user: PublicUser::from(&user),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }

    // Inactive accounts get the same answer as unknown ones.
    let user = User::find_active_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login for unknown or inactive email");
            ApiError::Authentication("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::Authentication("Invalid credentials".into()));
    }

    let keys = TokenKeys::from_ref(&state);
    let pair = keys.issue(user.id)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        message: "Login successful".into(),
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let keys = TokenKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|_| {
        warn!("refresh with invalid token");
        ApiError::Authentication("Invalid refresh token".into())
    })?;

    // A valid signature for a deleted user buys nothing.
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::Authentication("Invalid refresh token".into()))?;

    let access_token = keys.sign_access(user.id)?;
    info!(user_id = %user.id, "access token refreshed");
    Ok(Json(RefreshResponse { access_token }))
}

#[instrument(skip(state, payload))]
pub async fn create_admin(
    State(state): State<AppState>,
    AdminUser(_caller): AdminUser,
    JsonBody(mut payload): JsonBody<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreatedAdminResponse>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    validate_credentials(&payload.email, &payload.password)?;

    let user = create_account(
        &state,
        &payload.name,
        &payload.email,
        &payload.password,
        Role::Admin,
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, "admin user created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedAdminResponse {
            message: "Admin user created successfully".into(),
            user: PublicUser::from(&user),
        }),
    ))
}
