//! Session and role model
//!
//! A request either carries no credentials or belongs to an authenticated
//! account with exactly one role. `Session` encodes that as a tagged union so
//! the role can never be read from an anonymous session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Coarse permission tag attached to an authenticated account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Superadmin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Admin, Role::Superadmin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Superadmin => "superadmin",
        }
    }

    /// Login route of the section guarded by this role
    pub fn login_route(&self) -> &'static str {
        match self {
            Role::Admin => "/admin-login",
            Role::Superadmin => "/superadmin-login",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is not one of the known roles
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::Superadmin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Identity of an authenticated account as carried by an access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// The caller of a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Anonymous,
    Admin(AuthUser),
    Superadmin(AuthUser),
}

impl Session {
    pub fn authenticated(user: AuthUser, role: Role) -> Self {
        match role {
            Role::Admin => Session::Admin(user),
            Role::Superadmin => Session::Superadmin(user),
        }
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Session::Anonymous => None,
            Session::Admin(_) => Some(Role::Admin),
            Session::Superadmin(_) => Some(Role::Superadmin),
        }
    }

    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Session::Anonymous => None,
            Session::Admin(user) | Session::Superadmin(user) => Some(user),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Session::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthUser {
        AuthUser {
            id: Uuid::new_v4(),
            email: "guard@neu.edu.ph".to_string(),
        }
    }

    #[test]
    fn test_role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!(
            "visitor".parse::<Role>(),
            Err(UnknownRole("visitor".to_string()))
        );
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Role::Superadmin).unwrap(),
            "\"superadmin\""
        );
    }

    #[test]
    fn test_session_role_and_user() {
        let u = user();
        let session = Session::authenticated(u.clone(), Role::Admin);
        assert_eq!(session.role(), Some(Role::Admin));
        assert_eq!(session.user(), Some(&u));

        let anonymous = Session::default();
        assert!(anonymous.is_anonymous());
        assert_eq!(anonymous.role(), None);
        assert_eq!(anonymous.user(), None);
    }
}
