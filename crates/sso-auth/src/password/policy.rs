//! Input rules for registration credentials.

use sso_core::config::auth::AuthConfig;
use sso_core::error::AppError;

/// Longest accepted email address.
const MAX_EMAIL_LENGTH: usize = 254;

/// Shape checks applied to an email and password before any store access.
///
/// Emails are not normalized: they are compared exactly as submitted.
#[derive(Debug, Clone, Copy)]
pub struct CredentialPolicy {
    min_password_length: usize,
    max_password_length: usize,
}

impl CredentialPolicy {
    /// Creates a policy from the auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_password_length: config.password_min_length,
            max_password_length: config.password_max_length,
        }
    }

    /// Checks that the email looks like `local@domain`.
    pub fn check_email(&self, email: &str) -> Result<(), AppError> {
        if email.is_empty() || email.len() > MAX_EMAIL_LENGTH {
            return Err(AppError::validation("Email is required"));
        }
        if email.chars().any(char::is_whitespace) {
            return Err(AppError::validation("Email must not contain whitespace"));
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
                Ok(())
            }
            _ => Err(AppError::validation("Email address is malformed")),
        }
    }

    /// Checks the password length bounds.
    pub fn check_password(&self, password: &str) -> Result<(), AppError> {
        let chars = password.chars().count();
        if chars < self.min_password_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        if password.len() > self.max_password_length {
            return Err(AppError::validation(format!(
                "Password must be at most {} bytes",
                self.max_password_length
            )));
        }
        Ok(())
    }
}
