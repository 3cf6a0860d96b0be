//! # Backend
//!
//! The [`Backend`] trait is the seam between the command layer and the café
//! service. Commands never build requests themselves; they call a backend and
//! get typed records back.
//!
//! ## Implementations
//!
//! - [`HttpBackend`]: talks to the REST service over `reqwest::blocking`.
//! - [`InMemoryBackend`]: an in-process service with the same rules as the
//!   real one, so the whole command and API stack runs without a network.
//!
//! ## Authentication
//!
//! Backends are built with a [`SessionContext`](crate::session::SessionContext)
//! and read the current session from it on every call. They never write to
//! it: storing a session after login is the command layer's job.

use crate::error::Result;
use crate::model::{
    Cafe, CafeId, CafeReviews, NewReview, Registration, ReviewId, ReviewReceipt, UserId,
    UserProfile, UserSummary,
};
use crate::session::Session;
use serde::{Deserialize, Serialize};

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;

/// Result of a successful username change. The backend issues a new token
/// because the old one names the old username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameChange {
    #[serde(default)]
    pub message: String,
    pub new_username: String,
    pub token: String,
}

pub trait Backend {
    // --- Auth ---

    /// Exchanges credentials for a session. Does not store it.
    fn login(&mut self, username: &str, password: &str) -> Result<Session>;

    /// Creates an account. Returns the backend's confirmation text.
    fn register(&mut self, form: &Registration) -> Result<String>;

    // --- Cafés ---

    fn fetch_cafes(&self) -> Result<Vec<Cafe>>;

    /// Highest rated cafés, as ranked by the backend.
    fn fetch_trending(&self) -> Result<Vec<Cafe>>;

    fn fetch_cafe(&self, id: CafeId) -> Result<Cafe>;

    // --- Reviews ---

    fn fetch_reviews(&self, cafe_id: CafeId) -> Result<CafeReviews>;

    fn submit_review(&mut self, cafe_id: CafeId, review: &NewReview) -> Result<ReviewReceipt>;

    fn delete_review(&mut self, review_id: ReviewId) -> Result<ReviewReceipt>;

    // --- Users ---

    /// Prefix search on usernames. The caller is never part of the result.
    fn search_users(&self, query: &str) -> Result<Vec<UserSummary>>;

    fn friends(&self) -> Result<Vec<UserSummary>>;

    fn add_friend(&mut self, friend_id: UserId) -> Result<String>;

    fn remove_friend(&mut self, friend_id: UserId) -> Result<String>;

    fn update_username(&mut self, new_username: &str) -> Result<UsernameChange>;

    fn current_user(&self) -> Result<UserSummary>;

    fn user_profile(&self, user_id: UserId) -> Result<UserProfile>;
}
