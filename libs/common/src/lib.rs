//! Common library for the NEUVIS visitor identification services
//!
//! This crate provides the session and role model, the route guard, token
//! verification, account storage and the database and cache plumbing shared
//! by the authentication and API services.

pub mod accounts;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod guard;
pub mod password;
pub mod session;
pub mod token;

pub use guard::{GuardDecision, RedirectReason, RouteGuard};
pub use session::{AuthUser, Role, Session};
