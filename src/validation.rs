//! Request body parsing and field validation.
//!
//! Handlers take the raw body as `Bytes` and only parse it after the caller has
//! been authorized, so a forbidden caller never learns anything about the body
//! schema. Request structs use `#[serde(default)]` so a missing field surfaces
//! as a field error rather than a JSON error.

use std::collections::HashMap;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub trait Validate {
    fn validate(&self) -> Result<(), ApiError>;
}

/// Deserialize a JSON body. Syntax and type errors are 400 `INVALID_JSON`.
pub fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::invalid_json("Invalid JSON body")
    })
}

pub fn parse_valid<T: DeserializeOwned + Validate>(body: &Bytes) -> Result<T, ApiError> {
    let value: T = parse_body(body)?;
    value.validate()?;
    Ok(value)
}

/// Collects field errors; the first one becomes the top-level message
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<(&'static str, String)>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
        if !ok && !self.errors.iter().any(|(f, _)| *f == field) {
            self.errors.push((field, message.to_string()));
        }
        self
    }

    /// Length in characters, not bytes
    pub fn min_len(&mut self, field: &'static str, value: &str, min: usize, message: &str) -> &mut Self {
        self.check(value.chars().count() >= min, field, message)
    }

    pub fn email(&mut self, field: &'static str, value: &str, message: &str) -> &mut Self {
        self.check(is_email(value), field, message)
    }

    /// Absent or empty passes; anything else must be an email
    pub fn optional_email(&mut self, field: &'static str, value: Option<&str>, message: &str) -> &mut Self {
        let ok = value.map_or(true, |v| v.is_empty() || is_email(v));
        self.check(ok, field, message)
    }

    /// Absent or empty passes; anything else must be an absolute URL
    pub fn optional_url(&mut self, field: &'static str, value: Option<&str>, message: &str) -> &mut Self {
        let ok = value.map_or(true, |v| v.is_empty() || is_url(v));
        self.check(ok, field, message)
    }

    pub fn positive_id(&mut self, field: &'static str, value: Option<i64>, message: &str) -> &mut Self {
        self.check(matches!(value, Some(id) if id > 0), field, message)
    }

    pub fn finish(&mut self) -> Result<(), ApiError> {
        let Some((_, first)) = self.errors.first() else {
            return Ok(());
        };

        let message = first.clone();
        let field_errors: HashMap<String, String> = self
            .errors
            .drain(..)
            .map(|(field, msg)| (field.to_string(), msg))
            .collect();

        Err(ApiError::validation_error(message, Some(field_errors)))
    }
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        _ => false,
    }
}

pub fn is_url(value: &str) -> bool {
    url::Url::parse(value).map(|u| u.has_host()).unwrap_or(false)
}

/// Trimmed value, or `None` when absent or blank
/// Integer id from a query parameter; missing or unparseable reads as `None`
pub fn query_id(params: &HashMap<String, String>, key: &str) -> Option<i64> {
    params.get(key).and_then(|value| value.trim().parse().ok())
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_ids_tolerate_garbage() {
        let params: HashMap<String, String> =
            [("teamId".to_string(), "abc".to_string()), ("id".to_string(), " 7 ".to_string())].into();
        assert_eq!(query_id(&params, "teamId"), None);
        assert_eq!(query_id(&params, "id"), Some(7));
        assert_eq!(query_id(&params, "missing"), None);
    }
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Signup {
        name: String,
        email: String,
    }

    impl Validate for Signup {
        fn validate(&self) -> Result<(), ApiError> {
            Checks::new()
                .min_len("name", &self.name, 2, "Name must be at least 2 characters")
                .email("email", &self.email, "Invalid email address")
                .finish()
        }
    }

    #[test]
    fn email_shapes() {
        assert!(is_email("leader@pfe.com"));
        assert!(is_email("first.last@mail.example.org"));
        for bad in ["", "leader", "leader@", "@pfe.com", "a@b", "a@@b.com", "a b@pfe.com", "a@.com", "a@pfe."] {
            assert!(!is_email(bad), "{bad}");
        }
    }

    #[test]
    fn url_requires_scheme_and_host() {
        assert!(is_url("https://github.com/pfe"));
        assert!(!is_url("github.com/pfe"));
        assert!(!is_url("mailto:someone@pfe.com"));
    }

    #[test]
    fn malformed_json_is_invalid_json() {
        let err = parse_valid::<Signup>(&Bytes::from_static(b"{not json")).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_JSON");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_fields_are_field_errors() {
        let err = parse_valid::<Signup>(&Bytes::from_static(b"{}")).unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.message(), "Name must be at least 2 characters");
        let body = err.to_json();
        assert_eq!(body["fieldErrors"]["email"], "Invalid email address");
    }

    #[test]
    fn length_counts_characters() {
        let ok = parse_valid::<Signup>(&Bytes::from_static("{\"name\":\"Zé\",\"email\":\"z@pfe.ma\"}".as_bytes()));
        assert!(ok.is_ok());
    }

    #[test]
    fn blank_optionals_collapse_to_none() {
        assert_eq!(non_empty(Some("  ".into())), None);
        assert_eq!(non_empty(Some(" x ".into())), Some("x".into()));
        assert_eq!(non_empty(None), None);
    }
}
