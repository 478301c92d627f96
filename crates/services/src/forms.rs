//! Form validation for the login and signup pages.
//!
//! Validation is schema-like: every rule runs, and failures are collected
//! per field so the page can re-render with all messages at once instead
//! of stopping at the first bad field.

use crate::backend::{LoginInput, RegisterInput};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap()
});

pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
pub const USERNAME_MESSAGE: &str = "Username must be at least 3 characters";
pub const CONFIRM_MESSAGE: &str = "Passwords do not match";

/// Field name mapped to its validation message. BTreeMap keeps render
/// order stable.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !EMAIL_REGEX.is_match(&self.email) {
            errors.insert("email", EMAIL_MESSAGE);
        }
        if self.password.chars().count() < 6 {
            errors.insert("password", PASSWORD_MESSAGE);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_input(self) -> LoginInput {
        LoginInput {
            email: self.email,
            password: self.password,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl SignupForm {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !EMAIL_REGEX.is_match(&self.email) {
            errors.insert("email", EMAIL_MESSAGE);
        }
        if self.username.chars().count() < 3 {
            errors.insert("username", USERNAME_MESSAGE);
        }
        if self.password.chars().count() < 6 {
            errors.insert("password", PASSWORD_MESSAGE);
        }
        // The match check is independent of the length check: two short
        // but differing passwords report on both fields.
        if self.confirm != self.password {
            errors.insert("confirm", CONFIRM_MESSAGE);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn into_input(self) -> RegisterInput {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        RegisterInput {
            email: self.email,
            username: self.username,
            password: self.password,
            first_name: non_empty(self.first_name),
            last_name: non_empty(self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn signup(email: &str, username: &str, password: &str, confirm: &str) -> SignupForm {
        SignupForm {
            email: email.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            confirm: confirm.to_string(),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_valid_login_form_passes() {
        assert!(login("ada@example.com", "secret1").validate().is_ok());
    }

    #[test]
    fn test_login_form_collects_all_failures() {
        let errors = login("not-an-email", "12345").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some(&EMAIL_MESSAGE));
        assert_eq!(errors.get("password"), Some(&PASSWORD_MESSAGE));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_email_rejects_spaces_and_missing_tld() {
        for bad in ["ada @example.com", "ada@example", "@example.com", "ada@"] {
            let errors = login(bad, "secret1").validate().unwrap_err();
            assert_eq!(errors.get("email"), Some(&EMAIL_MESSAGE), "{bad}");
        }
    }

    #[test]
    fn test_password_boundary_is_six_characters() {
        assert!(login("ada@example.com", "123456").validate().is_ok());
        assert!(login("ada@example.com", "12345").validate().is_err());
    }

    #[test]
    fn test_signup_mismatch_is_independent_of_length() {
        let errors = signup("ada@example.com", "ada", "12345", "54321")
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("password"), Some(&PASSWORD_MESSAGE));
        assert_eq!(errors.get("confirm"), Some(&CONFIRM_MESSAGE));
    }

    #[test]
    fn test_signup_username_minimum() {
        let errors = signup("ada@example.com", "ab", "secret1", "secret1")
            .validate()
            .unwrap_err();
        assert_eq!(errors.get("username"), Some(&USERNAME_MESSAGE));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_signup_optional_names_blank_becomes_none() {
        let mut form = signup("ada@example.com", "ada", "secret1", "secret1");
        form.first_name = Some("  ".to_string());
        form.last_name = Some("Lovelace".to_string());
        let input = form.into_input();
        assert_eq!(input.first_name, None);
        assert_eq!(input.last_name, Some("Lovelace".to_string()));
    }
}
