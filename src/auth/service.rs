//! Authentication service: registration, login, token issue and verify.
//!
//! Tokens are HS256 JWTs carrying the identity snapshot the middleware
//! resolves into an [`Identity`]. Credential failures of any shape
//! (unknown email, wrong password, malformed or expired token) collapse to
//! the same external error kind.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::config::AuthConfig;
use crate::error::AppError;
use crate::types::BloodGroup;
use crate::users::models::{AccountStatus, Role, UserView};
use crate::users::repository::UserRepository;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// user_id as string
    pub sub: String,
    pub email: String,
    pub role: String,
    pub status: String,
    pub exp: usize,
    pub iat: usize,
}

/// Resolved caller identity, injected into request extensions by the JWT
/// middleware. This is a snapshot of the account at token-issue time; the
/// operations that must see a fresh account status re-read the store.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
}

impl Identity {
    fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::unauthorized("Invalid token"))?;
        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| AppError::unauthorized("Invalid token"))?;
        let status = claims
            .status
            .parse::<AccountStatus>()
            .map_err(|_| AppError::unauthorized("Invalid token"))?;

        Ok(Self {
            user_id,
            email: claims.email.clone(),
            role,
            status,
        })
    }
}

/// Registration request. Fields arrive optional so missing ones surface as
/// a validation failure, not a deserialization error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "Rahim Uddin")]
    pub name: Option<String>,
    #[schema(example = "rahim@example.com")]
    pub email: Option<String>,
    #[schema(example = "password123")]
    pub password: Option<String>,
    #[schema(example = "O+")]
    pub blood_group: Option<String>,
    #[schema(example = "Dhaka")]
    pub district: Option<String>,
    #[schema(example = "Savar")]
    pub upazila: Option<String>,
    pub avatar: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "rahim@example.com")]
    pub email: Option<String>,
    #[schema(example = "password123")]
    pub password: Option<String>,
}

/// Auth response: token plus the sanitized account
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserView,
}

pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: PgPool, jwt_secret: String, config: AuthConfig) -> Self {
        Self {
            db,
            jwt_secret,
            config,
        }
    }

    /// Register a new user (role donor, status active) and log them in.
    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError> {
        let required = |field: Option<String>, name: &str| -> Result<String, AppError> {
            match field {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(AppError::validation(format!("Missing required field: {}", name))),
            }
        };

        let name = required(req.name, "name")?;
        let email = required(req.email, "email")?;
        let password = required(req.password, "password")?;
        let district = required(req.district, "district")?;
        let upazila = required(req.upazila, "upazila")?;
        let blood_group = required(req.blood_group, "blood_group")?
            .parse::<BloodGroup>()
            .map_err(|_| AppError::validation("Invalid blood group"))?;

        if password.len() < self.config.min_password_len {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_len
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Hashing failed: {}", e)))?
            .to_string();

        let user_id = UserRepository::create(
            &self.db,
            &name,
            &email,
            &password_hash,
            req.avatar.as_deref(),
            blood_group,
            &district,
            &upazila,
        )
        .await
        .map_err(|e| match e {
            AppError::Database(msg) if msg.contains("duplicate key") => {
                AppError::conflict("Email already exists")
            }
            other => other,
        })?;

        let user = UserRepository::get_by_id(&self.db, user_id)
            .await?
            .ok_or_else(|| AppError::Internal("User vanished after insert".to_string()))?;

        let token = self.issue_token(user.user_id, &user.email, user.role, user.status)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    /// Login and issue a JWT. Blocked accounts cannot log in.
    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let (email, password) = match (req.email, req.password) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
            _ => return Err(AppError::validation("Email and password are required")),
        };

        let user = UserRepository::get_by_email(&self.db, &email)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid hash format: {}", e)))?;

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| AppError::unauthorized("Invalid credentials"))?;

        if user.is_blocked() {
            return Err(AppError::forbidden("Account is blocked"));
        }

        let token = self.issue_token(user.user_id, &user.email, user.role, user.status)?;
        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }

    fn issue_token(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        status: AccountStatus,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(self.config.token_ttl_hours))
            .ok_or_else(|| AppError::Internal("Token expiry overflow".to_string()))?
            .timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.as_str().to_string(),
            status: status.as_str().to_string(),
            exp: expiration as usize,
            iat: now.timestamp() as usize,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Verify a bearer token and resolve the caller identity.
    ///
    /// Every failure mode maps to the same Unauthorized kind so callers
    /// cannot probe which check rejected them.
    pub fn authenticate(&self, token: &str) -> Result<Identity, AppError> {
        let decoding_key = DecodingKey::from_secret(self.jwt_secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

        Identity::from_claims(&token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str, status: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            email: "x@example.com".to_string(),
            role: role.to_string(),
            status: status.to_string(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_identity_from_claims() {
        let identity = Identity::from_claims(&claims("42", "volunteer", "active")).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.role, Role::Volunteer);
        assert_eq!(identity.status, AccountStatus::Active);
    }

    #[test]
    fn test_identity_rejects_garbage_claims() {
        assert!(Identity::from_claims(&claims("not-a-number", "donor", "active")).is_err());
        assert!(Identity::from_claims(&claims("1", "root", "active")).is_err());
        assert!(Identity::from_claims(&claims("1", "donor", "suspended")).is_err());
    }

    #[test]
    fn test_claims_failures_all_look_the_same() {
        for bad in [
            claims("nope", "donor", "active"),
            claims("1", "nope", "active"),
            claims("1", "donor", "nope"),
        ] {
            let err = Identity::from_claims(&bad).unwrap_err();
            assert_eq!(err.code(), "UNAUTHORIZED");
            assert_eq!(err.to_string(), "Invalid token");
        }
    }
}
