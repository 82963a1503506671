//! Role-based route guard

use crate::session::{Role, Session};

/// Why a guard refused a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectReason {
    /// No authenticated session
    Unauthenticated,
    /// Authenticated, but with a role other than the required one
    WrongRole,
}

/// Outcome of checking a session against a guarded section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        to: &'static str,
        reason: RedirectReason,
    },
}

/// Guard for a route group that requires exactly one role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    required: Role,
}

impl RouteGuard {
    pub fn new(required: Role) -> Self {
        Self { required }
    }

    pub fn required(&self) -> Role {
        self.required
    }

    /// Decide whether `session` may enter the guarded section.
    ///
    /// Both refusals redirect to the login route of the guarded section.
    pub fn check(&self, session: &Session) -> GuardDecision {
        let to = self.required.login_route();
        match session.role() {
            None => GuardDecision::Redirect {
                to,
                reason: RedirectReason::Unauthenticated,
            },
            Some(role) if role != self.required => GuardDecision::Redirect {
                to,
                reason: RedirectReason::WrongRole,
            },
            Some(_) => GuardDecision::Allow,
        }
    }
}
