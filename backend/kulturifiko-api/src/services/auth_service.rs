// Auth service - registration, login and session tokens
use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::info;
use uuid::Uuid;

use super::SessionRevocations;
use crate::config::JwtConfig;
use crate::error::{AppError, Result};
use crate::middleware::Claims;
use crate::models::User;
use crate::repository::UserRepository;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    revocations: Arc<dyn SessionRevocations>,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        revocations: Arc<dyn SessionRevocations>,
        jwt: JwtConfig,
    ) -> Self {
        Self {
            users,
            revocations,
            jwt,
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<(User, String)> {
        let password_hash = hash_password(password)?;
        let user = self.users.create_user(username, &password_hash, false).await?;
        let token = self.issue_token(&user)?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok((user, token))
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        verify_password(password, &user.password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    pub fn issue_token(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.jwt.expiry_hours as i64);

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))
    }

    /// Decode a session token and reject it when revoked
    pub async fn verify_token(&self, token: &str) -> Result<Claims> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::Unauthorized)?
        .claims;

        if self.revocations.is_revoked(&claims.jti).await? {
            return Err(AppError::Unauthorized);
        }

        Ok(claims)
    }

    pub async fn logout(&self, claims: &Claims) -> Result<()> {
        let remaining = (claims.exp as i64 - Utc::now().timestamp()).max(1) as u64;
        self.revocations.revoke(&claims.jti, remaining).await?;

        info!("Revoked session {} of user {}", claims.jti, claims.sub);
        Ok(())
    }
}

pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
        .to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryStore;
    use crate::services::MemoryRevocations;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MemoryRevocations::new()),
            JwtConfig {
                secret: "test-secret".to_string(),
                expiry_hours: 1,
            },
        )
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let (user, token) = auth.register("mara", "correct horse").await.unwrap();
        assert!(!user.is_admin);

        let claims = auth.verify_token(&token).await.unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.username, "mara");

        let (same, _) = auth.authenticate("mara", "correct horse").await.unwrap();
        assert_eq!(same.id, user.id);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let auth = service();
        auth.register("mara", "correct horse").await.unwrap();

        let result = auth.authenticate("mara", "battery staple").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
        let result = auth.authenticate("nobody", "correct horse").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let auth = service();
        let (_, token) = auth.register("mara", "correct horse").await.unwrap();
        let claims = auth.verify_token(&token).await.unwrap();

        auth.logout(&claims).await.unwrap();
        let result = auth.verify_token(&token).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_tampered_token_rejected() {
        let auth = service();
        let (_, token) = auth.register("mara", "correct horse").await.unwrap();
        let tampered = format!("{}x", token);
        assert!(matches!(
            auth.verify_token(&tampered).await,
            Err(AppError::Unauthorized)
        ));
    }
}
