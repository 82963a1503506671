//! Application state shared across handlers

use common::{accounts::AccountStore, token::TokenVerifier};
use std::sync::Arc;

use crate::pass::PassIssuer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub passes: PassIssuer,
    pub verifier: TokenVerifier,
}
