//! Authorization Gate
//!
//! State-free decisions over (operation gate, session role, ownership fact).
//! Every operation declares its [`RoleGate`] as data, so the gate is applied
//! uniformly before dispatch instead of being duplicated inside handlers.
//!
//! Ownership facts are derived fresh per call by comparing the acting
//! session's identifier against the target store's fetched managerID; they
//! are never cached, since a manager may operate on multiple stores and
//! ownership can change between calls. A backend failure during the
//! ownership fetch denies (fail-closed).
//!
//! Denials are reported, never silently ignored; a gated operation
//! short-circuits before performing any read beyond what proves the
//! ownership fact.

use tracing::debug;

use crate::backend::Backend;
use crate::error::{BazaarError, Result};
use crate::lookup::fetch_store_manager;
use crate::session::Session;

/// Authenticated user role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Manager,
    Admin,
}

impl Role {
    /// Get the role name as stored in the `type` column
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Customer => "customer",
            Self::Manager => "manager",
            Self::Admin => "admin",
        }
    }

    /// Parse a stored `type` value, trimming fixed-width padding
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "customer" => Some(Self::Customer),
            "manager" => Some(Self::Manager),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Role requirement an operation declares as data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    /// Any authenticated user
    AnyUser,
    /// Managers only; store-targeted operations additionally require
    /// ownership via [`require_store_manager`]
    ManagerOnly,
    /// Administrators only
    AdminOnly,
    /// Everyone except managers (account deletion)
    NotManager,
}

impl RoleGate {
    /// Whether a role passes this gate
    #[must_use]
    pub const fn admits(self, role: Role) -> bool {
        match self {
            Self::AnyUser => true,
            Self::ManagerOnly => matches!(role, Role::Manager),
            Self::AdminOnly => matches!(role, Role::Admin),
            Self::NotManager => !matches!(role, Role::Manager),
        }
    }
}

/// Check a session's role against a gate
pub fn check_role(role: Role, gate: RoleGate) -> Result<()> {
    if gate.admits(role) {
        return Ok(());
    }
    let message = match gate {
        RoleGate::ManagerOnly => "only managers can perform this operation",
        RoleGate::AdminOnly => "only administrators can perform this operation",
        RoleGate::NotManager => "managers cannot perform this operation",
        RoleGate::AnyUser => unreachable!("AnyUser admits every role"),
    };
    debug!(role = %role, ?gate, "role check denied");
    Err(BazaarError::denied(message))
}

/// Require that the session user manages the target store.
///
/// The ownership fact is fetched fresh; role alone is never sufficient,
/// and a failed fetch denies rather than grants.
pub fn require_store_manager(
    backend: &dyn Backend,
    session: &Session,
    store_id: i64,
) -> Result<()> {
    let manager_id = match fetch_store_manager(backend, store_id) {
        Ok(id) => id,
        Err(BazaarError::NotFound(msg)) => return Err(BazaarError::NotFound(msg)),
        Err(e) => {
            debug!(error = %e, store_id, "ownership fetch failed closed");
            return Err(BazaarError::denied("could not verify store ownership"));
        }
    };

    if manager_id == session.user_id {
        Ok(())
    } else {
        Err(BazaarError::denied("you are not this store's manager"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sqlite::SqliteBackend;

    fn session(role: Role, user_id: i64) -> Session {
        Session {
            user_id,
            username: "test".to_string(),
            role,
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    #[test]
    fn test_role_parse_trims_padding() {
        assert_eq!(Role::parse("manager   "), Some(Role::Manager));
        assert_eq!(Role::parse("customer"), Some(Role::Customer));
        assert_eq!(Role::parse(" admin "), Some(Role::Admin));
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn test_gate_admission_table() {
        assert!(RoleGate::AnyUser.admits(Role::Customer));
        assert!(RoleGate::AnyUser.admits(Role::Manager));
        assert!(RoleGate::AnyUser.admits(Role::Admin));

        assert!(!RoleGate::ManagerOnly.admits(Role::Customer));
        assert!(RoleGate::ManagerOnly.admits(Role::Manager));
        assert!(!RoleGate::ManagerOnly.admits(Role::Admin));

        assert!(!RoleGate::AdminOnly.admits(Role::Customer));
        assert!(!RoleGate::AdminOnly.admits(Role::Manager));
        assert!(RoleGate::AdminOnly.admits(Role::Admin));

        assert!(RoleGate::NotManager.admits(Role::Customer));
        assert!(!RoleGate::NotManager.admits(Role::Manager));
        assert!(RoleGate::NotManager.admits(Role::Admin));
    }

    #[test]
    fn test_check_role_reports_denial() {
        let err = check_role(Role::Customer, RoleGate::ManagerOnly).unwrap_err();
        assert_eq!(err.error_code(), "DENIED");
        assert!(err.message().contains("managers"));
    }

    fn fixture() -> SqliteBackend {
        let backend = SqliteBackend::open_in_memory().expect("open in-memory database");
        backend.ensure_schema().expect("apply schema");
        backend
            .execute_batch(
                "INSERT INTO Users (userID, name, password, latitude, longitude, type)
                 VALUES (1, 'meg', 'pw', 0, 0, 'manager'),
                        (2, 'mia', 'pw', 0, 0, 'manager');
                 INSERT INTO Store (storeID, latitude, longitude, managerID)
                 VALUES (5, 0, 0, 1);",
            )
            .expect("seed");
        backend
    }

    #[test]
    fn test_owner_allowed() {
        let backend = fixture();
        assert!(require_store_manager(&backend, &session(Role::Manager, 1), 5).is_ok());
    }

    #[test]
    fn test_non_owner_denied_despite_role() {
        // a manager of some other store is still denied on this one
        let backend = fixture();
        let err = require_store_manager(&backend, &session(Role::Manager, 2), 5).unwrap_err();
        assert_eq!(err.error_code(), "DENIED");
    }

    #[test]
    fn test_missing_store_not_found() {
        let backend = fixture();
        let err = require_store_manager(&backend, &session(Role::Manager, 1), 99).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
    }
}
