use crate::{
    db::users as db_users,
    error::AppError,
    middleware::{
        auth::{
            create_access_token, create_refresh_token, hash_token, verify_token, AuthUser,
            TokenKind,
        },
        json::AppJson,
    },
    models::user::*,
    routes::AppState,
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

pub async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = req.email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }
    if req.password.len() < 8 {
        return Err(AppError::BadRequest("Password must be at least 8 characters".to_string()));
    }

    if db_users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();

    let user_id = uuid::Uuid::now_v7().to_string();
    let tg_chat_id = req.tg_chat_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
    let user =
        db_users::create_user(&state.pool, &user_id, &email, &password_hash, tg_chat_id).await?;
    tracing::info!(user_id = %user.id, "User registered");

    let response = issue_session(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = db_users::find_by_email(&state.pool, &email)
        .await?
        .ok_or(AppError::Unauthorized("Invalid email or password".to_string()))?;

    let parsed_hash = PasswordHash::new(&user.password_hash)
        .map_err(|e| AppError::Internal(format!("Password hash parse error: {}", e)))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized("Invalid email or password".to_string()))?;

    Ok(Json(issue_session(&state, user).await?))
}

pub async fn refresh(
    State(state): State<AppState>,
    AppJson(req): AppJson<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    verify_token(&req.refresh_token, &state.jwt_secret, TokenKind::Refresh)
        .map_err(|_| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    // The stored hash is the revocation list: logout deletes it.
    // Taking the row consumes the token, so a token can be exchanged only once.
    let token_hash = hash_token(&req.refresh_token);
    let (user_id, expires_at) = db_users::take_refresh_token(&state.pool, &token_hash)
        .await?
        .ok_or(AppError::Unauthorized("Refresh token not found or revoked".to_string()))?;

    let expires = chrono::NaiveDateTime::parse_from_str(&expires_at, "%Y-%m-%dT%H:%M:%S%.3fZ")
        .map_err(|e| AppError::Internal(format!("Date parse error: {}", e)))?;
    if expires.and_utc() < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    let user = db_users::find_by_id(&state.pool, &user_id)
        .await?
        .ok_or(AppError::Unauthorized("User not found".to_string()))?;

    Ok(Json(issue_session(&state, user).await?))
}

pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Value>, AppError> {
    db_users::delete_user_refresh_tokens(&state.pool, &auth_user.user_id).await?;

    Ok(Json(json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserResponse>, AppError> {
    let user = db_users::find_by_id(&state.pool, &auth_user.user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(user.into()))
}

/// `PATCH /auth/me` — sets or clears the Telegram chat that receives reminders.
pub async fn update_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(req): AppJson<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = match req.tg_chat_id {
        Some(chat_id) => {
            let chat_id = chat_id.as_deref().map(str::trim).filter(|id| !id.is_empty());
            db_users::set_tg_chat_id(&state.pool, &auth_user.user_id, chat_id).await?
        }
        None => db_users::find_by_id(&state.pool, &auth_user.user_id).await?,
    };

    Ok(Json(user.ok_or(AppError::NotFound)?.into()))
}

/// `DELETE /auth/me` — removes the account; the caller's habits stay behind without an owner.
pub async fn delete_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<StatusCode, AppError> {
    if !db_users::delete_user(&state.pool, &auth_user.user_id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(user_id = %auth_user.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

async fn issue_session(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let access_token = create_access_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;
    let refresh_token = create_refresh_token(&user.id, &state.jwt_secret)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

    let token_id = uuid::Uuid::now_v7().to_string();
    let expires_at = (Utc::now() + Duration::days(7))
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string();
    db_users::store_refresh_token(
        &state.pool,
        &token_id,
        &user.id,
        &hash_token(&refresh_token),
        &expires_at,
    )
    .await?;

    Ok(AuthResponse {
        user: user.into(),
        access_token,
        refresh_token,
    })
}
