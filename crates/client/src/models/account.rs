//! Account registration input.

use secrecy::{ExposeSecret, SecretString};

use shopfront_core::Email;

/// Minimum display-name length accepted by the remote sign-up endpoint.
pub const MIN_NAME_LENGTH: usize = 3;
/// Minimum password length accepted by the remote sign-up endpoint.
pub const MIN_PASSWORD_LENGTH: usize = 6;
/// Minimum phone-number length (digits and separators).
pub const MIN_PHONE_LENGTH: usize = 10;

/// Data for creating a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub email: Email,
    pub password: SecretString,
    pub phone: String,
}

impl NewAccount {
    /// Check the form the same way the sign-up page does before submitting.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().chars().count() < MIN_NAME_LENGTH {
            return Err(format!(
                "Name must be at least {MIN_NAME_LENGTH} characters"
            ));
        }
        if self.password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            ));
        }
        if self.phone.trim().len() < MIN_PHONE_LENGTH {
            return Err("Please enter a valid phone number".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn account(name: &str, password: &str, phone: &str) -> NewAccount {
        NewAccount {
            name: name.to_string(),
            email: Email::parse("new@example.com").unwrap(),
            password: SecretString::from(password.to_string()),
            phone: phone.to_string(),
        }
    }

    #[test]
    fn test_valid_account() {
        assert!(account("Mona", "hunter22", "01012345678").validate().is_ok());
    }

    #[test]
    fn test_short_name() {
        let err = account("Al", "hunter22", "01012345678").validate().unwrap_err();
        assert!(err.contains("Name"));
    }

    #[test]
    fn test_short_password() {
        let err = account("Mona", "abc", "01012345678").validate().unwrap_err();
        assert!(err.contains("Password"));
    }

    #[test]
    fn test_short_phone() {
        let err = account("Mona", "hunter22", "0101").validate().unwrap_err();
        assert_eq!(err, "Please enter a valid phone number");
    }
}
