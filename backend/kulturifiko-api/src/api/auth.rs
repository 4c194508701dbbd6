use axum::{extract::State, Extension, Json};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, SESSION_COOKIE};
use crate::services::AuthService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user_id: Uuid,
    pub username: String,
    pub is_admin: bool,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.users.clone(),
        state.revocations.clone(),
        state.config.jwt.clone(),
    )
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let payload = RegisterRequest {
        username: payload.username.trim().to_string(),
        ..payload
    };
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if payload.username.chars().any(char::is_whitespace) {
        return Err(AppError::BadRequest(
            "Username cannot contain spaces".to_string(),
        ));
    }

    let (user, token) = auth_service(&state)
        .register(&payload.username, &payload.password)
        .await?;

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(SessionResponse {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(payload), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let (user, token) = auth_service(&state)
        .authenticate(payload.username.trim(), &payload.password)
        .await?;

    tracing::info!("User {} logged in", user.id);

    Ok((
        jar.add(session_cookie(token.clone())),
        Json(SessionResponse {
            user_id: user.id,
            username: user.username,
            is_admin: user.is_admin,
            token,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LogoutResponse>)> {
    auth_service(&state).logout(&current_user.claims).await?;

    Ok((
        jar.remove(Cookie::build(SESSION_COOKIE).path("/").build()),
        Json(LogoutResponse {
            message: "Logged out".to_string(),
        }),
    ))
}
