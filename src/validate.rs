use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;

/// Field name to human-readable message, as rendered back into forms.
pub type FieldErrors = BTreeMap<String, String>;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn field_error(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), message.to_string());
    errors
}

/// Collects non-blank violations; returns the trimmed values on success.
pub struct FormCheck {
    errors: FieldErrors,
}

impl FormCheck {
    pub fn new() -> Self {
        Self {
            errors: FieldErrors::new(),
        }
    }

    pub fn require(&mut self, field: &str, value: &str, message: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.errors.insert(field.to_string(), message.to_string());
        }
        trimmed.to_string()
    }

    pub fn email(&mut self, field: &str, value: &str) -> String {
        let trimmed = value.trim();
        if !is_valid_email(trimmed) {
            self.errors
                .insert(field.to_string(), "Invalid email".to_string());
        }
        trimmed.to_string()
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

impl Default for FormCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_emails() {
        assert!(is_valid_email("me@example.com"));
        assert!(is_valid_email("first.last+tag@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com "));
        assert!(!is_valid_email("spaces in@example.com"));
        assert!(!is_valid_email("nodot@example"));
    }

    #[test]
    fn form_check_collects_blank_fields() {
        let mut check = FormCheck::new();
        let first = check.require("firstName", "  ", "First Name cannot be blank.");
        let last = check.require("lastName", " Smith ", "Last Name cannot be blank.");
        assert_eq!(first, "");
        assert_eq!(last, "Smith");

        let errors = check.finish().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get("firstName").map(String::as_str),
            Some("First Name cannot be blank.")
        );
    }
}
