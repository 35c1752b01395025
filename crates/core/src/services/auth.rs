//! Authentication service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use foodie_common::{AppError, AppResult, Config, IdGenerator};
use foodie_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Bearer token claims.
///
/// `sub` carries the user ID. The embedded email and role are informational
/// only; the session middleware reloads the user row on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued session: token plus the authenticated user.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: user::Model,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 256))]
    pub name: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Authentication service: credential checks and bearer token issuing.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
    jwt_secret: String,
    token_ttl_secs: u64,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(user_repo: UserRepository, config: &Config) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
            jwt_secret: config.auth.jwt_secret.clone(),
            token_ttl_secs: config.auth.token_ttl_secs,
        }
    }

    /// Register a new user with role `user` and issue a session.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Session> {
        input.validate()?;

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("User already exists".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let now = chrono::Utc::now();

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email),
            password_hash: Set(password_hash),
            name: Set(input.name),
            role: Set(Role::User),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        let token = self.issue_token(&user)?;

        Ok(Session { token, user })
    }

    /// Authenticate by email and password and issue a session.
    ///
    /// The failure message never distinguishes an unknown email from a
    /// wrong password.
    pub async fn login(&self, input: LoginInput) -> AppResult<Session> {
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        let token = self.issue_token(&user)?;

        Ok(Session { token, user })
    }

    /// Issue a signed bearer token for the user.
    pub fn issue_token(&self, user: &user::Model) -> AppResult<String> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: now.timestamp() + self.token_ttl_secs as i64,
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a bearer token's signature and expiry.
    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Not authorized, token failed".to_string()))
    }

    /// Resolve a bearer token to the current user record.
    ///
    /// Fails when the token is invalid or expired, or when the encoded
    /// user no longer exists.
    pub async fn authenticate(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.verify_token(token)?;

        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid credentials".to_string())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foodie_common::config::{AuthConfig, DatabaseConfig, ServerConfig, UploadConfig};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/test".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: "test-secret".to_string(),
                token_ttl_secs: 86_400,
            },
            upload: UploadConfig {
                endpoint: "https://images.example.com/upload".to_string(),
                api_key: None,
                folder: "foodiediary".to_string(),
                timeout_secs: 30,
                max_bytes: 5_000_000,
            },
        }
    }

    fn create_test_user(id: &str, email: &str, password: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password).unwrap(),
            name: "Test User".to_string(),
            role: Role::User,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(db: Arc<sea_orm::DatabaseConnection>) -> AuthService {
        AuthService::new(UserRepository::new(db), &create_test_config())
    }

    // Unit tests for password functions

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hash.len() > 50);
    }

    #[test]
    fn test_verify_password_correct() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(verify_password("test_password_123", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_incorrect() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_different_each_time() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);

        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    // Token tests

    #[test]
    fn test_token_roundtrip() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);
        let user = create_test_user("u1", "alice@example.com", "password123");

        let token = service.issue_token(&user).unwrap();
        let claims = service.verify_token(&token).unwrap();

        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn test_garbage_token_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let result = service.verify_token("not-a-token");

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "u1".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::User,
            iat: now - 172_800,
            exp: now - 86_400,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let result = service.verify_token(&token);

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);
        let user = create_test_user("u1", "alice@example.com", "password123");

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email,
            role: user.role,
            iat: now,
            exp: now + 3600,
        };
        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"another-secret"),
        )
        .unwrap();

        assert!(service.verify_token(&token).is_err());
    }

    // Service tests

    #[tokio::test]
    async fn test_register_existing_email() {
        let existing = create_test_user("u1", "alice@example.com", "password123");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .register(RegisterInput {
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
                name: "Alice".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_invalid_email() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let service = create_test_service(db);

        let result = service
            .register(RegisterInput {
                email: "not-an-email".to_string(),
                password: "password123".to_string(),
                name: "Alice".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .login(LoginInput {
                email: "nobody@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await;

        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let existing = create_test_user("u1", "alice@example.com", "password123");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .login(LoginInput {
                email: "alice@example.com".to_string(),
                password: "wrong_password".to_string(),
            })
            .await;

        // Same generic message as the unknown-email case.
        match result {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let existing = create_test_user("u1", "alice@example.com", "password123");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let session = service
            .login(LoginInput {
                email: "alice@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        let claims = service.verify_token(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id);
    }

    #[tokio::test]
    async fn test_authenticate_deleted_user() {
        let user = create_test_user("u1", "alice@example.com", "password123");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let token = service.issue_token(&user).unwrap();
        let result = service.authenticate(&token).await;

        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
