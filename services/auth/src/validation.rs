//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Maximum length of a first or last name, in characters
const MAX_NAME_LEN: usize = 100;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("Username is required".to_string());
    }

    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }

    if username.len() > 32 {
        return Err("Username must be at most 32 characters long".to_string());
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile username regex"));

    if !regex.is_match(username) {
        return Err("Username can only contain letters, numbers, and underscores".to_string());
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.chars().count() > 128 {
        return Err("Password must be at most 128 characters long".to_string());
    }

    Ok(())
}

/// Validate an optional first or last name
pub fn validate_person_name(field: &str, value: Option<&str>) -> Result<(), String> {
    match value {
        Some(name) if name.chars().count() > MAX_NAME_LEN => Err(format!(
            "{} must be at most {} characters long",
            field, MAX_NAME_LEN
        )),
        _ => Ok(()),
    }
}
