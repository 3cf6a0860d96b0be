use crate::backend::Backend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::UserId;
use crate::session::SessionContext;

/// Username prefix search. A blank query is answered locally with a warning.
pub fn search<B: Backend>(backend: &B, session: &SessionContext, query: &str) -> Result<CmdResult> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(CmdResult::default()
            .with_message(CmdMessage::warning("Please enter a username to search")));
    }
    session.require()?;
    let users = backend.search_users(query)?;
    let mut result = CmdResult::default();
    if users.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "No users found matching '{}'",
            query
        )));
    }
    Ok(result.with_users(users))
}

pub fn friends<B: Backend>(backend: &B, session: &SessionContext) -> Result<CmdResult> {
    session.require()?;
    let friends = backend.friends()?;
    let mut result = CmdResult::default();
    if friends.is_empty() {
        result.add_message(CmdMessage::info(
            "No friends yet. Find people with `cafescout users <name>`",
        ));
    }
    Ok(result.with_users(friends))
}

pub fn add_friend<B: Backend>(
    backend: &mut B,
    session: &SessionContext,
    friend_id: UserId,
) -> Result<CmdResult> {
    session.require()?;
    let message = backend.add_friend(friend_id)?;
    Ok(CmdResult::default().with_message(CmdMessage::success(message)))
}

pub fn remove_friend<B: Backend>(
    backend: &mut B,
    session: &SessionContext,
    friend_id: UserId,
) -> Result<CmdResult> {
    session.require()?;
    let message = backend.remove_friend(friend_id)?;
    Ok(CmdResult::default().with_message(CmdMessage::success(message)))
}

/// Profile of `user_id`, or of the logged-in user when `None`.
pub fn profile<B: Backend>(
    backend: &B,
    session: &SessionContext,
    user_id: Option<UserId>,
) -> Result<CmdResult> {
    let current = session.require()?;
    let user_id = match user_id.or(current.user_id) {
        Some(id) => id,
        None => backend.current_user()?.id,
    };
    let profile = backend.user_profile(user_id)?;
    let mut result = CmdResult::default();
    if profile.reviews.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "{} has not reviewed any cafés yet",
            profile.user.username
        )));
    }
    Ok(result.with_profile(profile))
}
