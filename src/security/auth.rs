use crate::config::{BootstrapConfig, SecurityConfig};
use crate::db::models::user_models::{AuthToken, LoginCredentials, User, UserRole};
use crate::db::store::UserStore;
use crate::error::Error;
use crate::security::{password, Operation, RequestContext, SecurityService};
use crate::services::audit::{AuditAction, AuditService};
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Authentication service: login, token resolution and password changes
pub struct AuthService {
    users: Arc<dyn UserStore>,
    security: SecurityService,
    audit: AuditService,
    config: SecurityConfig,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, audit: AuditService, config: &SecurityConfig) -> Self {
        Self {
            users,
            security: SecurityService::new(config.clone()),
            audit,
            config: config.clone(),
        }
    }

    /// Login a user with email/password
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<(User, AuthToken)> {
        let user = self
            .users
            .get_by_email(credentials.email.trim())
            .await?
            .ok_or_else(|| Error::Authentication("Invalid email or password".to_string()))?;

        let valid = password::verify_password(&credentials.password, &user.password_hash)?;
        if !valid {
            return Err(Error::Authentication("Invalid email or password".to_string()).into());
        }

        if !user.active {
            return Err(Error::Authentication("User account is inactive".to_string()).into());
        }

        self.users.update_last_login(&user.id).await?;

        let token = self.security.generate_token(&user)?;

        info!("User logged in: {}", user.email);
        self.audit
            .record(
                &RequestContext::from_user(&user),
                AuditAction::Login,
                "auth",
                Some("Login".to_string()),
            )
            .await;

        Ok((user, token))
    }

    /// Resolve a bearer token to the user it was issued for
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.security.validate_token(token)?;
        let user_id = claims.user_id()?;

        let user = self
            .users
            .get_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::Authentication("Invalid credentials".to_string()))?;

        if !user.active {
            return Err(Error::Authentication("User account is inactive".to_string()).into());
        }

        Ok(user)
    }

    /// Change the caller's own password
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<()> {
        ctx.require(Operation::ChangeOwnPassword)?;

        if new_password != confirm_password {
            return Err(Error::Validation("New password and confirmation differ".to_string()).into());
        }
        password::validate_password(new_password)?;

        let user = self
            .users
            .get_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| Error::NotFound("User not found".to_string()))?;

        if !password::verify_password(current_password, &user.password_hash)? {
            return Err(Error::Authentication("Current password is incorrect".to_string()).into());
        }

        let mut updated_user = user.clone();
        updated_user.password_hash = password::hash_password(new_password, &self.config)?;
        updated_user.updated_at = Utc::now();
        self.users.update(&updated_user).await?;

        info!("Password changed for user: {}", user.email);
        self.audit
            .record(ctx, AuditAction::ChangePassword, "users", None)
            .await;

        Ok(())
    }

    /// Create the configured administrator when no administrator exists yet
    pub async fn ensure_default_admin(&self, bootstrap: &BootstrapConfig) -> Result<Option<User>> {
        if self.users.exists_with_role(UserRole::Administrator).await? {
            return Ok(None);
        }

        let now = Utc::now();
        let admin = User {
            id: Uuid::new_v4(),
            name: bootstrap.admin_name.clone(),
            email: bootstrap.admin_email.clone(),
            password_hash: password::hash_password(&bootstrap.admin_password, &self.config)?,
            role: UserRole::Administrator,
            phone: None,
            department: None,
            active: true,
            created_at: now,
            updated_at: now,
            last_login: None,
        };

        let admin = self.users.create(&admin).await?;
        warn!(
            "Default administrator created: {}. Please change its password immediately!",
            admin.email
        );

        Ok(Some(admin))
    }
}
