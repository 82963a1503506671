//! Input validation for visitor forms and staff accounts

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::models::{CreateAccountRequest, ManualEntryRequest, PassRequest};

/// Validation failures keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    fn check(&mut self, field: &'static str, result: Result<(), String>) {
        if let Err(message) = result {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

#[cfg(test)]
impl FieldErrors {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn required(value: &str, label: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", label));
    }
    Ok(())
}

fn max_len(value: &str, label: &str, max: usize) -> Result<(), String> {
    required(value, label)?;
    if value.chars().count() > max {
        return Err(format!("{} must be at most {} characters long", label, max));
    }
    Ok(())
}

/// Validate a cellphone number. Spaces and dashes are ignored.
pub fn validate_cellphone(cellphone: &str) -> Result<(), String> {
    required(cellphone, "Cellphone number")?;

    static CELLPHONE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = CELLPHONE_REGEX.get_or_init(|| {
        Regex::new(r"^\+?[0-9]{10,15}$").expect("Failed to compile cellphone regex")
    });

    let compact: String = cellphone
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !regex.is_match(&compact) {
        return Err("Cellphone number must contain 10 to 15 digits".to_string());
    }

    Ok(())
}

fn parse_date(value: &str, label: &str) -> Result<NaiveDate, String> {
    required(value, label)?;
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("{} must be a date in YYYY-MM-DD format", label))
}

/// Validate the date of a visit, which cannot lie in the past
pub fn validate_date_of_visit(value: &str, today: NaiveDate) -> Result<(), String> {
    let date = parse_date(value, "Date of visit")?;
    if date < today {
        return Err("Date of visit cannot be in the past".to_string());
    }
    Ok(())
}

/// Validate a birthday, which cannot lie in the future
pub fn validate_birthday(value: &str, today: NaiveDate) -> Result<(), String> {
    let date = parse_date(value, "Birthday")?;
    if date > today {
        return Err("Birthday cannot be in the future".to_string());
    }
    Ok(())
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate password strength for new staff accounts
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }

    if password.len() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if !has_upper {
        return Err("Password must contain at least one uppercase letter".to_string());
    }

    if !has_lower {
        return Err("Password must contain at least one lowercase letter".to_string());
    }

    if !has_digit {
        return Err("Password must contain at least one digit".to_string());
    }

    if !has_special {
        return Err("Password must contain at least one special character".to_string());
    }

    Ok(())
}

pub fn validate_pass_request(form: &PassRequest, today: NaiveDate) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check("full_name", max_len(&form.full_name, "Full name", 120));
    errors.check("cellphone", validate_cellphone(&form.cellphone));
    errors.check(
        "date_of_visit",
        validate_date_of_visit(&form.date_of_visit, today),
    );
    errors.check("id_type", max_len(&form.id_type, "ID type", 50));
    errors.check("id_number", max_len(&form.id_number, "ID number", 50));
    errors.check("purpose", max_len(&form.purpose, "Purpose of visit", 255));
    errors.into_result()
}

pub fn validate_manual_entry(
    form: &ManualEntryRequest,
    today: NaiveDate,
) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check("full_name", max_len(&form.full_name, "Full name", 120));
    errors.check("birthday", validate_birthday(&form.birthday, today));
    errors.check("cellphone", validate_cellphone(&form.cellphone));
    if form.visit_count == 0 {
        errors.check(
            "visit_count",
            Err("Number of visits must be at least 1".to_string()),
        );
    }
    errors.check("id_type", max_len(&form.id_type, "ID type", 50));
    errors.check("purpose", max_len(&form.purpose, "Purpose of visit", 255));
    errors.into_result()
}

pub fn validate_new_account(form: &CreateAccountRequest) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check("full_name", max_len(&form.full_name, "Full name", 120));
    errors.check("email", validate_email(form.email.trim()));
    errors.check("password", validate_password(&form.password));
    errors.into_result()
}
