use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Role, Viewer};
use crate::services::AuthService;
use crate::AppState;

pub const SESSION_COOKIE: &str = "session";
const LOGIN_PAGE: &str = "/login";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,       // User ID
    pub username: String,
    pub is_admin: bool,
    pub jti: String,       // Token ID, used for revocation
    pub exp: usize,        // Expiration time
    pub iat: usize,        // Issued at
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub claims: Claims,
}

impl CurrentUser {
    pub fn viewer(&self) -> Viewer {
        Viewer::new(self.id, self.role)
    }
}

/// Session token from `Authorization: Bearer` or the session cookie
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_string())
    })
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

/// Gate for every route that needs a logged-in user.
///
/// Browsers are redirected to the login page; API clients get a 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let unauthenticated = |headers: &HeaderMap| {
        if wants_html(headers) {
            Redirect::to(LOGIN_PAGE).into_response()
        } else {
            AppError::Unauthorized.into_response()
        }
    };

    let Some(token) = session_token(request.headers()) else {
        return unauthenticated(request.headers());
    };

    let auth_service = AuthService::new(
        state.users.clone(),
        state.revocations.clone(),
        state.config.jwt.clone(),
    );

    let claims = match auth_service.verify_token(&token).await {
        Ok(claims) => claims,
        Err(AppError::Unauthorized) => return unauthenticated(request.headers()),
        Err(e) => return e.into_response(),
    };

    let Ok(id) = Uuid::parse_str(&claims.sub) else {
        return unauthenticated(request.headers());
    };

    let current_user = CurrentUser {
        id,
        username: claims.username.clone(),
        role: if claims.is_admin {
            Role::Admin
        } else {
            Role::Regular
        },
        claims,
    };

    request.extensions_mut().insert(current_user);

    next.run(request).await
}
