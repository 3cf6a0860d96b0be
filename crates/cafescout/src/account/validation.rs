//! Client-side form validation.
//!
//! Registration and profile forms are checked before any request is made.
//! Registration collects every failing field so the user sees all problems at
//! once; the profile form stops at the first.

use crate::model::Registration;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

pub const MIN_USERNAME_LEN: usize = 3;
pub const MAX_USERNAME_LEN: usize = 50;
pub const MIN_PASSWORD_LEN: usize = 6;
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Which registration field an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

/// All field errors from one registration attempt, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationErrors(pub Vec<FieldError>);

impl RegistrationErrors {
    pub fn for_field(&self, field: Field) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Banner text: every field message joined by a space.
    pub fn general(&self) -> String {
        self.0
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for RegistrationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.general())
    }
}

impl std::error::Error for RegistrationErrors {}

/// Validates a registration form.
///
/// ```
/// use cafescout::account::validation::{validate_registration, Field};
/// use cafescout::model::Registration;
///
/// let form = Registration {
///     username: "bean_fan".into(),
///     email: "bean@example.com".into(),
///     password: "Latte#42".into(),
///     confirm_password: "Latte#42".into(),
/// };
/// assert!(validate_registration(&form).is_ok());
///
/// let bad = Registration { username: "ab".into(), ..form };
/// let errors = validate_registration(&bad).unwrap_err();
/// assert!(errors.for_field(Field::Username).is_some());
/// ```
pub fn validate_registration(form: &Registration) -> Result<(), RegistrationErrors> {
    let mut errors = Vec::new();

    let username = form.username.trim();
    if username.chars().count() < MIN_USERNAME_LEN {
        errors.push(FieldError {
            field: Field::Username,
            message: "Username must be at least 3 characters.".to_string(),
        });
    } else if !username.chars().all(is_username_char) {
        errors.push(FieldError {
            field: Field::Username,
            message: "Username can only contain letters, numbers, or underscores.".to_string(),
        });
    }

    if !looks_like_email(&form.email) {
        errors.push(FieldError {
            field: Field::Email,
            message: "Please enter a valid email address.".to_string(),
        });
    }

    let missing = missing_password_parts(&form.password);
    if !missing.is_empty() {
        errors.push(FieldError {
            field: Field::Password,
            message: format!("Password must contain {}.", missing.join(", ")),
        });
    }

    if form.confirm_password != form.password {
        errors.push(FieldError {
            field: Field::ConfirmPassword,
            message: "Passwords do not match.".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(RegistrationErrors(errors))
    }
}

/// Error type for profile username validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsernameError {
    Empty,
    TooShort,
    TooLong,
    InvalidCharacter(char),
}

impl fmt::Display for UsernameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsernameError::Empty => write!(f, "Username cannot be empty"),
            UsernameError::TooShort => write!(f, "Username must be at least 3 characters"),
            UsernameError::TooLong => write!(f, "Username cannot exceed 50 characters"),
            UsernameError::InvalidCharacter(ch) => write!(
                f,
                "Username can only contain letters, numbers, and underscores (found '{}')",
                ch
            ),
        }
    }
}

impl std::error::Error for UsernameError {}

/// Validates a new username for the profile form. The name is trimmed first.
pub fn validate_username(name: &str) -> Result<(), UsernameError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(UsernameError::Empty);
    }
    let len = name.chars().count();
    if len < MIN_USERNAME_LEN {
        return Err(UsernameError::TooShort);
    }
    if len > MAX_USERNAME_LEN {
        return Err(UsernameError::TooLong);
    }
    if let Some(ch) = name.chars().find(|c| !is_username_char(*c)) {
        return Err(UsernameError::InvalidCharacter(ch));
    }
    Ok(())
}

fn is_username_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_'
}

/// Shape check only: something, `@`, something, `.`, something, with no
/// whitespace anywhere.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+@\S+\.\S+$").expect("Invalid regex")
});

fn looks_like_email(email: &str) -> bool {
    EMAIL_SHAPE.is_match(email)
}

fn missing_password_parts(password: &str) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        missing.push("at least 6 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        missing.push("one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        missing.push("one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        missing.push("one special character");
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> Registration {
        Registration {
            username: "bean_fan".into(),
            email: "bean@example.com".into(),
            password: "Latte#42".into(),
            confirm_password: "Latte#42".into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_registration(&valid_form()).is_ok());
    }

    #[test]
    fn username_rules() {
        let form = Registration {
            username: " ab ".into(),
            ..valid_form()
        };
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.for_field(Field::Username),
            Some("Username must be at least 3 characters.")
        );

        let form = Registration {
            username: "bean-fan".into(),
            ..valid_form()
        };
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.for_field(Field::Username),
            Some("Username can only contain letters, numbers, or underscores.")
        );
    }

    #[test]
    fn email_shapes() {
        assert!(looks_like_email("a@b.co"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.co"));
        assert!(!looks_like_email("a b@c.d"));
        assert!(!looks_like_email("a@.co"));
        assert!(!looks_like_email("a@b."));
        assert!(!looks_like_email(""));
    }

    #[test]
    fn email_allows_extra_at_signs() {
        // Any '@' may split the address, as long as a dotted part follows.
        assert!(looks_like_email("@a@b.c"));
        assert!(looks_like_email("first.last@mail.example.org"));
        assert!(!looks_like_email("a@b@c"));
    }

    #[test]
    fn password_lists_every_missing_part() {
        let form = Registration {
            password: "abc".into(),
            confirm_password: "abc".into(),
            ..valid_form()
        };
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.for_field(Field::Password),
            Some("Password must contain at least 6 characters, one uppercase letter, one number, one special character.")
        );
    }

    #[test]
    fn confirmation_must_match() {
        let form = Registration {
            confirm_password: "Latte#43".into(),
            ..valid_form()
        };
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(
            errors.for_field(Field::ConfirmPassword),
            Some("Passwords do not match.")
        );
    }

    #[test]
    fn general_message_joins_all_fields() {
        let form = Registration {
            username: "x".into(),
            email: "nope".into(),
            ..valid_form()
        };
        let errors = validate_registration(&form).unwrap_err();
        assert_eq!(
            errors.general(),
            "Username must be at least 3 characters. Please enter a valid email address."
        );
    }

    #[test]
    fn profile_username_rules() {
        assert_eq!(validate_username("   "), Err(UsernameError::Empty));
        assert_eq!(validate_username("ab"), Err(UsernameError::TooShort));
        assert_eq!(validate_username(&"a".repeat(51)), Err(UsernameError::TooLong));
        assert_eq!(
            validate_username("bad name"),
            Err(UsernameError::InvalidCharacter(' '))
        );
        assert!(validate_username("  good_name  ").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
    }
}
