//! Account support: the forms a user fills in before the backend sees them.
//!
//! ## Rules
//!
//! See [`validation`] for the full rules. In summary:
//! - Usernames: ASCII letters, digits and underscore, 3 to 50 characters
//! - Passwords: at least 6 characters with upper, lower, digit and special
//! - Registration reports every failing field at once

pub mod validation;

pub use validation::{
    validate_registration, validate_username, Field, FieldError, RegistrationErrors,
    UsernameError,
};
