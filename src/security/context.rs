use crate::db::models::{User, UserRole};
use crate::error::Error;
use crate::security::permissions::{is_allowed, Operation};
use anyhow::Result;
use uuid::Uuid;

/// Identity of the caller, resolved once per request from the bearer token and
/// handed to every service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
}

impl RequestContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            name: user.name.clone(),
            role: user.role,
        }
    }

    pub fn can(&self, operation: Operation) -> bool {
        is_allowed(self.role, operation)
    }

    /// Fail with `Error::Authorization` unless the caller's role allows `operation`
    pub fn require(&self, operation: Operation) -> Result<()> {
        if self.can(operation) {
            Ok(())
        } else {
            Err(Error::Authorization(format!(
                "Role {} is not allowed to perform {}",
                self.role, operation
            ))
            .into())
        }
    }

    /// Allow the owner of a record, or anyone holding `override_op`
    pub fn require_owner_or(&self, owner: &Uuid, own_op: Operation, override_op: Operation) -> Result<()> {
        if (*owner == self.user_id && self.can(own_op)) || self.can(override_op) {
            Ok(())
        } else {
            Err(Error::Authorization(format!(
                "Role {} is not allowed to perform {} on this record",
                self.role, own_op
            ))
            .into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext {
            user_id: Uuid::new_v4(),
            name: "Tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_require_maps_to_authorization_error() {
        let err = ctx(UserRole::Patrol)
            .require(Operation::ResolveIncident)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::Authorization(_))
        ));
    }

    #[test]
    fn test_owner_or_override() {
        let patrol = ctx(UserRole::Patrol);
        let supervisor = ctx(UserRole::Supervisor);
        let other = Uuid::new_v4();

        assert!(patrol
            .require_owner_or(&patrol.user_id, Operation::EndShift, Operation::EndAnyShift)
            .is_ok());
        assert!(patrol
            .require_owner_or(&other, Operation::EndShift, Operation::EndAnyShift)
            .is_err());
        assert!(supervisor
            .require_owner_or(&other, Operation::EndShift, Operation::EndAnyShift)
            .is_ok());
    }
}
