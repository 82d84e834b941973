use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Checks the email as it will be stored, i.e. after [`normalize_email`].
fn validate_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(&normalize_email(email)) {
        return Ok(());
    }
    let mut err = ValidationError::new("invalid");
    err.message = Some(Cow::Borrowed("Enter a valid email address."));
    Err(err)
}

/// Rejects empty or whitespace-only strings.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if !value.trim().is_empty() {
        return Ok(());
    }
    let mut err = ValidationError::new("blank");
    err.message = Some(Cow::Borrowed("This field may not be blank."));
    Err(err)
}

/// Request body for user registration. A `username` sent by the client is
/// ignored; it is always derived from the email.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_email")
    )]
    pub email: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: &'static str,
}

/// Request body for token issuance.
#[derive(Debug, Deserialize, Validate)]
pub struct TokenRequest {
    #[serde(alias = "email")]
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub username: Option<String>,
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub password: Option<String>,
}

/// Request body for token refresh.
#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    #[validate(
        required(message = "This field is required."),
        custom(function = "not_blank")
    )]
    pub refresh: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// Lower-cases and trims an email; the result doubles as the username.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
