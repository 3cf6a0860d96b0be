use crate::account::{validate_registration, validate_username};
use crate::backend::Backend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::{CafeError, Result};
use crate::model::Registration;
use crate::session::SessionContext;

pub fn login<B: Backend>(
    backend: &mut B,
    session: &SessionContext,
    username: &str,
    password: &str,
) -> Result<CmdResult> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(CafeError::Validation(
            "Username and password are required".to_string(),
        ));
    }
    let new_session = backend.login(username, password)?;
    let name = new_session.username.clone();
    session.set(new_session)?;
    Ok(CmdResult::default()
        .with_username(name.clone())
        .with_message(CmdMessage::success(format!("Logged in as {}", name))))
}

/// Validates the whole form locally first; an invalid form never reaches the
/// backend.
pub fn register<B: Backend>(backend: &mut B, form: &Registration) -> Result<CmdResult> {
    validate_registration(form).map_err(|errors| CafeError::Validation(errors.general()))?;
    let message = backend.register(form)?;
    let message = if message.trim().is_empty() {
        "User registered successfully!".to_string()
    } else {
        message
    };
    Ok(CmdResult::default()
        .with_message(CmdMessage::success(message))
        .with_message(CmdMessage::info(
            "You can now log in with `cafescout login`",
        )))
}

pub fn logout(session: &SessionContext) -> Result<CmdResult> {
    let message = if session.clear()? {
        CmdMessage::success("Logged out")
    } else {
        CmdMessage::info("Not logged in")
    };
    Ok(CmdResult::default().with_message(message))
}

/// Reads the local session only; no request is made.
pub fn whoami(session: &SessionContext) -> Result<CmdResult> {
    let current = session.require()?;
    Ok(CmdResult::default()
        .with_message(CmdMessage::info(format!(
            "Logged in as {}",
            current.username
        )))
        .with_username(current.username))
}

/// Changes the logged-in user's name. On success the session picks up the new
/// name and the token the backend reissued for it.
pub fn update_username<B: Backend>(
    backend: &mut B,
    session: &SessionContext,
    new_username: &str,
) -> Result<CmdResult> {
    let current = session.require()?;
    validate_username(new_username).map_err(|e| CafeError::Validation(e.to_string()))?;
    let new_username = new_username.trim();

    if new_username == current.username {
        return Ok(CmdResult::default().with_message(CmdMessage::info("No changes to save")));
    }

    let change = backend.update_username(new_username)?;
    session.update(|s| {
        s.username = change.new_username.clone();
        s.token = change.token.clone();
    })?;

    let message = if change.message.trim().is_empty() {
        format!("Username successfully updated to '{}'", change.new_username)
    } else {
        change.message
    };
    Ok(CmdResult::default()
        .with_username(change.new_username)
        .with_message(CmdMessage::success(message)))
}
