use axum::{extract::State, http::StatusCode, Form, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::handlers::common::validate_required;
use crate::middlewares::AuthUser;
use crate::models::{CreateUser, UserResponse};
use crate::repositories::{Repository, UserRepository};
use crate::services::AuthService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// OAuth2 password-flow form fields
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// ============ Handlers ============

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error or username/email already registered"),
        (status = 429, description = "Too many registrations from this address")
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_string();

    // Validate input
    validate_required("Username", &username, 50)?;
    if username.chars().count() < 3 {
        return Err(AppError::Validation(
            "Username must be at least 3 characters".to_string(),
        ));
    }
    validate_required("Email", &email, 255)?;
    if !email.contains('@') {
        return Err(AppError::Validation("Email is not valid".to_string()));
    }
    if payload.password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    if UserRepository::username_or_email_exists(&state.db, &username, &email).await? {
        tracing::warn!(username = %username, email = %email, "Register failed (duplicate)");
        return Err(AppError::Conflict(
            "Username or email already registered".to_string(),
        ));
    }

    let password_hash = AuthService::hash_password(&payload.password)?;

    let create_user = CreateUser {
        username,
        email,
        password: payload.password,
    };

    let user = UserRepository::create(&state.db, &create_user, &password_hash).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Exchange username and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 401, description = "Incorrect username or password"),
        (status = 429, description = "Too many login attempts from this address")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Form(payload): Form<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let Some(user) =
        AuthService::authenticate(&state.db, &payload.username, &payload.password).await?
    else {
        tracing::warn!(username = %payload.username, "Login failed (bad credentials)");
        return Err(AppError::InvalidCredentials);
    };

    let access_token = AuthService::generate_token(&user.username, &state.config)?;
    tracing::info!(user_id = %user.id, username = %user.username, "Login successful");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    responses(
        (status = 200, description = "Current user info", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(
    user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<UserResponse>> {
    let user_data = UserRepository::find_by_id(&state.db, user.id).await?;
    Ok(Json(user_data.into()))
}
