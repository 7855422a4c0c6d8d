use crate::config::SecurityConfig;
use crate::db::models::user_models::{AuthToken, User};
use crate::error::Error;
use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod auth;
pub mod context;
pub mod password;
pub mod permissions;

pub use context::RequestContext;
pub use permissions::Operation;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// User role at issue time; the stored role is authoritative
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

impl Claims {
    /// Get the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid> {
        let id = Uuid::parse_str(&self.sub)
            .map_err(|e| Error::Authentication(format!("Invalid user ID in token: {}", e)))?;
        Ok(id)
    }
}

/// Issues and checks bearer tokens
pub struct SecurityService {
    config: SecurityConfig,
}

impl SecurityService {
    pub fn new(config: SecurityConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT token for a user
    pub fn generate_token(&self, user: &User) -> Result<AuthToken> {
        let now = Utc::now();
        let expiration = now + Duration::minutes(self.config.jwt_expiration_minutes as i64);

        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role.to_string(),
            exp: expiration.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| Error::Internal(format!("Failed to generate JWT token: {}", e)))?;

        Ok(AuthToken {
            access_token: token,
            token_type: "bearer".to_string(),
            expires_in: self.config.jwt_expiration_minutes * 60,
        })
    }

    /// Validate and decode a JWT token
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| Error::Authentication(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::UserRole;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Rita".to_string(),
            email: "rita@example.com".to_string(),
            password_hash: String::new(),
            role: UserRole::Supervisor,
            phone: None,
            department: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_token_roundtrip_carries_subject() {
        let service = SecurityService::new(SecurityConfig::default());
        let user = user();

        let token = service.generate_token(&user).unwrap();
        assert_eq!(token.token_type, "bearer");
        assert_eq!(token.expires_in, 30 * 60);

        let claims = service.validate_token(&token.access_token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.role, "supervisor");
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = SecurityService::new(SecurityConfig {
            jwt_secret: "one".to_string(),
            ..SecurityConfig::default()
        });
        let verifier = SecurityService::new(SecurityConfig {
            jwt_secret: "two".to_string(),
            ..SecurityConfig::default()
        });

        let token = issuer.generate_token(&user()).unwrap();
        let err = verifier.validate_token(&token.access_token).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Authentication(_))
        ));
    }
}
