//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single
//! entry point for every cafescout operation, whatever the UI.
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the matching function in `commands/*`
//! - **Owns** the backend and the shared [`SessionContext`]
//! - **Returns structured types** (`Result<CmdResult>`)
//!
//! It does no business logic, no terminal I/O and no formatting.
//!
//! ## Generic Over Backend
//!
//! `CafeScoutApi<B: Backend>`:
//! - Production: `CafeScoutApi<HttpBackend>`
//! - Testing: `CafeScoutApi<InMemoryBackend>`
//!
//! ## Discovery
//!
//! Interactive browsing keeps a [`DiscoveryEngine`] on the UI side. The API
//! only feeds it: [`refresh_discovery`](CafeScoutApi::refresh_discovery) is
//! called on start, on demand and after every review change.

use crate::backend::Backend;
use crate::commands::{self, config::ConfigAction, CmdResult};
use crate::config::CafeConfig;
use crate::discovery::{DiscoveryEngine, FilterConfig};
use crate::error::Result;
use crate::model::{CafeId, Registration, ReviewId, UserId};
use crate::session::SessionContext;
use std::path::Path;

pub struct CafeScoutApi<B: Backend> {
    backend: B,
    session: SessionContext,
}

impl<B: Backend> CafeScoutApi<B> {
    /// `session` should be the same context the backend was built with.
    pub fn new(backend: B, session: SessionContext) -> Self {
        Self { backend, session }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    // --- Cafés ---

    pub fn list_cafes(&self, search: &str, filters: &FilterConfig) -> Result<CmdResult> {
        commands::cafes::list(&self.backend, search, filters)
    }

    pub fn trending_cafes(&self) -> Result<CmdResult> {
        commands::cafes::trending(&self.backend)
    }

    pub fn view_cafe(&self, id: CafeId) -> Result<CmdResult> {
        commands::cafes::view(&self.backend, id)
    }

    /// Refetches into `engine`. Never fails: a fetch error leaves the engine's
    /// previous results in place and comes back as a warning message.
    pub fn refresh_discovery(&self, engine: &mut DiscoveryEngine) -> CmdResult {
        commands::cafes::refresh(&self.backend, engine)
    }

    // --- Reviews ---

    pub fn add_review(&mut self, cafe_id: CafeId, rating: f64, comment: &str) -> Result<CmdResult> {
        commands::reviews::add(&mut self.backend, &self.session, cafe_id, rating, comment)
    }

    pub fn delete_review(&mut self, review_id: ReviewId) -> Result<CmdResult> {
        commands::reviews::delete(&mut self.backend, &self.session, review_id)
    }

    // --- Account ---

    pub fn login(&mut self, username: &str, password: &str) -> Result<CmdResult> {
        commands::account::login(&mut self.backend, &self.session, username, password)
    }

    pub fn register(&mut self, form: &Registration) -> Result<CmdResult> {
        commands::account::register(&mut self.backend, form)
    }

    pub fn logout(&self) -> Result<CmdResult> {
        commands::account::logout(&self.session)
    }

    pub fn whoami(&self) -> Result<CmdResult> {
        commands::account::whoami(&self.session)
    }

    pub fn update_username(&mut self, new_username: &str) -> Result<CmdResult> {
        commands::account::update_username(&mut self.backend, &self.session, new_username)
    }

    // --- Users ---

    pub fn search_users(&self, query: &str) -> Result<CmdResult> {
        commands::users::search(&self.backend, &self.session, query)
    }

    pub fn list_friends(&self) -> Result<CmdResult> {
        commands::users::friends(&self.backend, &self.session)
    }

    pub fn add_friend(&mut self, friend_id: UserId) -> Result<CmdResult> {
        commands::users::add_friend(&mut self.backend, &self.session, friend_id)
    }

    pub fn remove_friend(&mut self, friend_id: UserId) -> Result<CmdResult> {
        commands::users::remove_friend(&mut self.backend, &self.session, friend_id)
    }

    pub fn user_profile(&self, user_id: Option<UserId>) -> Result<CmdResult> {
        commands::users::profile(&self.backend, &self.session, user_id)
    }

    // --- Config ---

    pub fn config(
        &self,
        dir: Option<&Path>,
        config: &CafeConfig,
        action: ConfigAction,
    ) -> Result<CmdResult> {
        commands::config::run(dir, config, action)
    }
}
