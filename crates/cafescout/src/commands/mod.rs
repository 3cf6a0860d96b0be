//! # Command Layer
//!
//! The **business logic** of cafescout. Each area lives in its own submodule
//! as plain functions over a [`Backend`](crate::backend::Backend) and, where
//! needed, the [`SessionContext`](crate::session::SessionContext).
//!
//! ## What Commands Do NOT Do
//!
//! - **Any terminal I/O**: no stdout, stderr or formatting
//! - **Argument parsing**: that's the CLI layer's job
//! - **Exit codes**: return `Result`, let the caller decide
//!
//! ## Structured Returns
//!
//! Commands return [`CmdResult`], not strings. It carries the records to show
//! (cafés, reviews, users, a profile) plus [`CmdMessage`]s with a level. The UI
//! decides how to render them. Local validation failures that should stop the
//! command are errors; soft outcomes ("nothing to save", "no users found") are
//! messages.
//!
//! ## Testing Strategy
//!
//! Command tests run against
//! [`InMemoryBackend`](crate::backend::InMemoryBackend) with an in-memory
//! session, so every branch is covered without a network.
//!
//! ## Command Modules
//!
//! - [`cafes`]: list, trending, view and discovery refresh
//! - [`reviews`]: add and delete reviews
//! - [`account`]: login, register, logout, whoami, username change
//! - [`users`]: user search, profiles and friends
//! - [`config`]: show the resolved configuration

use crate::config::CafeConfig;
use crate::model::{Cafe, CafeId, CafeReviews, UserProfile, UserSummary};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub mod account;
pub mod cafes;
pub mod config;
pub mod reviews;
pub mod users;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CmdResult {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub listed_cafes: Vec<Cafe>,
    /// Review counts for listed cafés, when the command gathered them.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub review_counts: BTreeMap<CafeId, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cafe: Option<Cafe>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<CafeReviews>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
    /// The logged-in username, for login and whoami.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<CafeConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_message(mut self, message: CmdMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_listed_cafes(mut self, cafes: Vec<Cafe>) -> Self {
        self.listed_cafes = cafes;
        self
    }

    pub fn with_review_counts(mut self, counts: BTreeMap<CafeId, u64>) -> Self {
        self.review_counts = counts;
        self
    }

    pub fn with_cafe(mut self, cafe: Cafe) -> Self {
        self.cafe = Some(cafe);
        self
    }

    pub fn with_reviews(mut self, reviews: CafeReviews) -> Self {
        self.reviews = Some(reviews);
        self
    }

    pub fn with_users(mut self, users: Vec<UserSummary>) -> Self {
        self.users = users;
        self
    }

    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_config(mut self, config: CafeConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn has_level(&self, level: MessageLevel) -> bool {
        self.messages.iter().any(|m| m.level == level)
    }
}

/// "1 café" / "3 cafés".
pub fn pluralize_cafes(count: usize) -> String {
    if count == 1 {
        "1 café".to_string()
    } else {
        format!("{} cafés", count)
    }
}
