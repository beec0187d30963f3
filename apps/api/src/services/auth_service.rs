//! Registration, login and token checks.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, Claims, JwtManager};
use crate::error::AuthError;
use invoice_core::{PublicUser, MIN_PASSWORD_LENGTH};
use invoice_db::Database;

/// Token plus the user it was issued for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Authentication service.
pub struct AuthService {
    db: Database,
    jwt: JwtManager,
}

impl AuthService {
    pub fn new(db: Database, jwt: JwtManager) -> Self {
        AuthService { db, jwt }
    }

    /// Creates an account and signs it in.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthResponse, AuthError> {
        if self.db.users().get_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))??;

        let user = self
            .db
            .users()
            .insert(email, &hash, name)
            .await
            .map_err(|e| {
                if e.is_unique_violation_on("users.email") {
                    AuthError::EmailTaken
                } else {
                    AuthError::Database(e)
                }
            })?;

        let token = self.jwt.issue(&user.id, &user.email)?;
        info!(user_id = %user.id, "User registered");

        Ok(AuthResponse {
            token,
            user: PublicUser::from(&user),
        })
    }

    /// Exchanges credentials for a token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let user = match self.db.users().get_by_email(email).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        let password = password.to_string();
        let hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?;

        if !valid {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.issue(&user.id, &user.email)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            token,
            user: PublicUser::from(&user),
        })
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt.verify(token)
    }

    pub async fn current_user(&self, user_id: &str) -> Result<PublicUser, AuthError> {
        self.db
            .users()
            .get_by_id(user_id)
            .await?
            .map(|user| PublicUser::from(&user))
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoice_db::DbConfig;

    async fn setup() -> AuthService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AuthService::new(db, JwtManager::new("test-secret", 3600))
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = setup().await;

        let registered = auth
            .register("admin@example.com", "admin123", "Admin User")
            .await
            .unwrap();
        assert_eq!(registered.user.name, "Admin User");

        let claims = auth.verify(&registered.token).unwrap();
        assert_eq!(claims.sub, registered.user.id);
        assert_eq!(claims.email, "admin@example.com");

        let logged_in = auth.login("admin@example.com", "admin123").await.unwrap();
        assert_eq!(logged_in.user.id, registered.user.id);

        let me = auth.current_user(&claims.sub).await.unwrap();
        assert_eq!(me.email, "admin@example.com");
    }

    #[tokio::test]
    async fn test_register_rules() {
        let auth = setup().await;

        assert!(matches!(
            auth.register("a@b.com", "12345", "A").await,
            Err(AuthError::WeakPassword { min: 6 })
        ));

        auth.register("a@b.com", "123456", "A").await.unwrap();
        assert!(matches!(
            auth.register("a@b.com", "123456", "A").await,
            Err(AuthError::EmailTaken)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = setup().await;
        auth.register("a@b.com", "123456", "A").await.unwrap();

        let unknown = auth.login("nobody@b.com", "123456").await.unwrap_err();
        let wrong = auth.login("a@b.com", "654321").await.unwrap_err();
        assert_eq!(unknown.to_string(), wrong.to_string());
        assert_eq!(wrong.to_string(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_current_user_missing() {
        let auth = setup().await;
        assert!(matches!(
            auth.current_user("missing").await,
            Err(AuthError::UserNotFound)
        ));
    }
}
