//! Login and registration input validation.
//!
//! Checks run in a fixed order and stop at the first failure so the user
//! sees exactly one message.

/// Errors produced while validating login or registration input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Username is a required field")]
    UsernameRequired,
    #[error("Username must be at least {min} characters")]
    UsernameTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    #[error("Password is a required field")]
    PasswordRequired,
    #[error("Password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum allowed length.
        min: usize,
    },
    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Validated login form input.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl LoginCredentials {
    /// Validate login input.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::UsernameRequired` or
    /// `CredentialError::PasswordRequired` for blank fields.
    pub fn parse(username: &str, password: &str) -> Result<Self, CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::UsernameRequired);
        }
        if password.is_empty() {
            return Err(CredentialError::PasswordRequired);
        }
        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }
}

impl core::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Validated registration form input.
#[derive(Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub password: String,
}

impl Registration {
    /// Minimum username length.
    pub const MIN_USERNAME_LENGTH: usize = 6;
    /// Minimum password length.
    pub const MIN_PASSWORD_LENGTH: usize = 6;

    /// Validate registration input.
    ///
    /// # Errors
    ///
    /// Returns the first failing check, in order: username present, username
    /// length, password present, password length, confirmation matches.
    pub fn parse(username: &str, password: &str, confirm: &str) -> Result<Self, CredentialError> {
        if username.is_empty() {
            return Err(CredentialError::UsernameRequired);
        }
        if username.chars().count() < Self::MIN_USERNAME_LENGTH {
            return Err(CredentialError::UsernameTooShort {
                min: Self::MIN_USERNAME_LENGTH,
            });
        }
        if password.is_empty() {
            return Err(CredentialError::PasswordRequired);
        }
        if password.chars().count() < Self::MIN_PASSWORD_LENGTH {
            return Err(CredentialError::PasswordTooShort {
                min: Self::MIN_PASSWORD_LENGTH,
            });
        }
        if password != confirm {
            return Err(CredentialError::PasswordMismatch);
        }
        Ok(Self {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }
}

impl core::fmt::Debug for Registration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_login_requires_both_fields() {
        assert_eq!(
            LoginCredentials::parse("", "secret"),
            Err(CredentialError::UsernameRequired)
        );
        assert_eq!(
            LoginCredentials::parse("crio.do", ""),
            Err(CredentialError::PasswordRequired)
        );
        assert!(LoginCredentials::parse("crio.do", "learnwithcrio").is_ok());
    }

    #[test]
    fn test_registration_check_order() {
        assert_eq!(
            Registration::parse("", "", ""),
            Err(CredentialError::UsernameRequired)
        );
        assert_eq!(
            Registration::parse("abc", "", ""),
            Err(CredentialError::UsernameTooShort { min: 6 })
        );
        assert_eq!(
            Registration::parse("abcdef", "", ""),
            Err(CredentialError::PasswordRequired)
        );
        assert_eq!(
            Registration::parse("abcdef", "12345", "12345"),
            Err(CredentialError::PasswordTooShort { min: 6 })
        );
        assert_eq!(
            Registration::parse("abcdef", "123456", "654321"),
            Err(CredentialError::PasswordMismatch)
        );
        assert!(Registration::parse("abcdef", "123456", "123456").is_ok());
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = LoginCredentials::parse("crio.do", "hunter22").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("crio.do"));
        assert!(!debug.contains("hunter22"));
    }
}
