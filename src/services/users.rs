use crate::config::SecurityConfig;
use crate::db::models::user_models::{CreateUserRequest, UpdateUserRequest, User, UserRole};
use crate::db::store::UserStore;
use crate::error::Error;
use crate::security::{password, Operation, RequestContext};
use crate::services::audit::{AuditAction, AuditService};
use crate::services::{non_blank, optional_text};
use anyhow::Result;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// User management
pub struct UserService {
    users: Arc<dyn UserStore>,
    audit: AuditService,
    config: SecurityConfig,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, audit: AuditService, config: &SecurityConfig) -> Self {
        Self {
            users,
            audit,
            config: config.clone(),
        }
    }

    /// Create a user (administrators only)
    pub async fn create(&self, ctx: &RequestContext, request: &CreateUserRequest) -> Result<User> {
        ctx.require(Operation::CreateUser)?;

        let name = non_blank(&request.name, "name")?;
        let email = request.email.trim().to_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(Error::Validation(format!("Invalid email: {}", request.email)).into());
        }
        password::validate_password(&request.password)?;
        let role: UserRole = request.role.parse()?;

        if self.users.get_by_email(&email).await?.is_some() {
            return Err(Error::AlreadyExists("Email already in use".to_string()).into());
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash: password::hash_password(&request.password, &self.config)?,
            role,
            phone: optional_text(request.phone.as_deref()),
            department: optional_text(request.department.as_deref()),
            active: true,
            created_at: now,
            updated_at: now,
            last_login: None,
        };

        let user = self.users.create(&user).await?;

        info!("New user registered: {} ({})", user.email, user.role);
        self.audit
            .record(
                ctx,
                AuditAction::CreateUser,
                "users",
                Some(format!("Created user: {} ({})", user.name, user.role)),
            )
            .await;

        Ok(user)
    }

    /// All users ordered by name
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>> {
        ctx.require(Operation::ListUsers)?;
        self.users.get_all().await
    }

    /// The caller's own record
    pub async fn me(&self, ctx: &RequestContext) -> Result<User> {
        ctx.require(Operation::ViewOwnProfile)?;
        self.users
            .get_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", ctx.user_id)).into())
    }

    /// Change a user's role or active flag (administrators only)
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: &Uuid,
        request: &UpdateUserRequest,
    ) -> Result<User> {
        ctx.require(Operation::UpdateUser)?;

        let mut user = self
            .users
            .get_by_id(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("User not found: {}", id)))?;

        let role = request
            .role
            .as_deref()
            .map(str::parse::<UserRole>)
            .transpose()?;

        if *id == ctx.user_id
            && (request.active == Some(false) || role.map_or(false, |r| r != ctx.role))
        {
            return Err(Error::Validation(
                "Administrators cannot deactivate or demote themselves".to_string(),
            )
            .into());
        }

        if let Some(role) = role {
            user.role = role;
        }
        if let Some(active) = request.active {
            user.active = active;
        }
        user.updated_at = Utc::now();

        let user = self.users.update(&user).await?;

        info!("User {} updated: role={} active={}", user.email, user.role, user.active);
        self.audit
            .record(
                ctx,
                AuditAction::UpdateUser,
                "users",
                Some(format!("Updated user {}: role={} active={}", user.id, user.role, user.active)),
            )
            .await;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn service() -> UserService {
        let store = Arc::new(MemoryStore::new());
        UserService::new(
            store.clone(),
            AuditService::new(store),
            &SecurityConfig {
                password_hash_cost: 4,
                ..SecurityConfig::default()
            },
        )
    }

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            name: "Caller".to_string(),
            role,
        }
    }

    fn request(email: &str, role: &str) -> CreateUserRequest {
        CreateUserRequest {
            name: "João Silva".to_string(),
            email: email.to_string(),
            password: "guard123".to_string(),
            role: role.to_string(),
            phone: Some("  ".to_string()),
            department: Some("Night watch".to_string()),
        }
    }

    fn error_of(err: &anyhow::Error) -> Option<&Error> {
        err.downcast_ref::<Error>()
    }

    #[tokio::test]
    async fn test_admin_creates_user() {
        let users = service();
        let user = users
            .create(&ctx(UserRole::Administrator), &request("Joao@Example.com", "patrol"))
            .await
            .unwrap();

        assert_eq!(user.email, "joao@example.com");
        assert_eq!(user.role, UserRole::Patrol);
        assert!(user.active);
        assert_eq!(user.phone, None);
        assert_eq!(user.department.as_deref(), Some("Night watch"));
    }

    #[tokio::test]
    async fn test_supervisor_cannot_create_user() {
        let err = service()
            .create(&ctx(UserRole::Supervisor), &request("a@example.com", "patrol"))
            .await
            .unwrap_err();
        assert!(matches!(error_of(&err), Some(Error::Authorization(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let users = service();
        let admin = ctx(UserRole::Administrator);
        users.create(&admin, &request("dup@example.com", "patrol")).await.unwrap();

        let err = users
            .create(&admin, &request("DUP@example.com", "supervisor"))
            .await
            .unwrap_err();
        assert!(matches!(error_of(&err), Some(Error::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_invalid_input_rejected() {
        let users = service();
        let admin = ctx(UserRole::Administrator);

        for bad in [
            request("not-an-email", "patrol"),
            request("ok@example.com", "vigilante"),
            CreateUserRequest {
                password: "123".to_string(),
                ..request("ok@example.com", "patrol")
            },
            CreateUserRequest {
                name: "   ".to_string(),
                ..request("ok@example.com", "patrol")
            },
        ] {
            let err = users.create(&admin, &bad).await.unwrap_err();
            assert!(matches!(error_of(&err), Some(Error::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_update_role_and_deactivate() {
        let users = service();
        let admin = ctx(UserRole::Administrator);
        let user = users.create(&admin, &request("p@example.com", "patrol")).await.unwrap();

        let updated = users
            .update(
                &admin,
                &user.id,
                &UpdateUserRequest {
                    role: Some("supervisor".to_string()),
                    active: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, UserRole::Supervisor);
        assert!(!updated.active);

        let missing = users
            .update(&admin, &Uuid::new_v4(), &UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(error_of(&missing), Some(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_supervisor_lists_users_patrol_cannot() {
        let users = service();
        users
            .create(&ctx(UserRole::Administrator), &request("p@example.com", "patrol"))
            .await
            .unwrap();

        assert_eq!(users.list(&ctx(UserRole::Supervisor)).await.unwrap().len(), 1);
        assert!(users.list(&ctx(UserRole::Patrol)).await.is_err());
    }
}
