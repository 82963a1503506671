//! API models for request and response payloads

use chrono::{DateTime, Utc};
use common::{Role, accounts::Account};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Visitor details submitted at the kiosk to obtain a pass.
///
/// Fields default to empty so that missing values reach validation and are
/// reported per field instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassRequest {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub cellphone: String,
    /// YYYY-MM-DD
    #[serde(default)]
    pub date_of_visit: String,
    #[serde(default)]
    pub id_type: String,
    #[serde(default)]
    pub id_number: String,
    #[serde(default)]
    pub purpose: String,
}

impl PassRequest {
    pub fn trimmed(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            cellphone: self.cellphone.trim().to_string(),
            date_of_visit: self.date_of_visit.trim().to_string(),
            id_type: self.id_type.trim().to_string(),
            id_number: self.id_number.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
        }
    }
}

/// Visitor details typed in by hand when an ID cannot be scanned
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualEntryRequest {
    #[serde(default)]
    pub full_name: String,
    /// YYYY-MM-DD
    #[serde(default)]
    pub birthday: String,
    #[serde(default)]
    pub cellphone: String,
    #[serde(default)]
    pub visit_count: u32,
    #[serde(default)]
    pub id_type: String,
    #[serde(default)]
    pub purpose: String,
}

impl ManualEntryRequest {
    pub fn trimmed(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            birthday: self.birthday.trim().to_string(),
            cellphone: self.cellphone.trim().to_string(),
            visit_count: self.visit_count,
            id_type: self.id_type.trim().to_string(),
            purpose: self.purpose.trim().to_string(),
        }
    }
}

/// Whether the profile row could be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Ok,
    Unavailable,
}

/// Profile card of the signed-in staff member
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub status: ProfileStatus,
}

impl ProfileView {
    /// Placeholder shown when the account store cannot be reached
    pub fn unavailable(role: Role) -> Self {
        Self {
            full_name: "Error loading".to_string(),
            email: "Try again later".to_string(),
            role,
            status: ProfileStatus::Unavailable,
        }
    }
}

impl From<Account> for ProfileView {
    fn from(account: Account) -> Self {
        Self {
            full_name: account.full_name,
            email: account.email,
            role: account.role,
            status: ProfileStatus::Ok,
        }
    }
}

/// Request for creating a staff account
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Response for account operations
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            full_name: account.full_name,
            email: account.email,
            role: account.role,
            created_at: account.created_at,
        }
    }
}

/// Superadmin dashboard figures
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub accounts_by_role: HashMap<Role, u64>,
    pub total_accounts: u64,
    pub active_passes: u64,
    pub generated_at: DateTime<Utc>,
}
