//! # Cafescout Architecture
//!
//! Cafescout is a **UI-agnostic café discovery library**: it finds cafés by
//! name, amenities, price and rating, and wraps the café service's reviews,
//! accounts and friends. The `cafescout` binary is one client of it.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI (cafescout-cli crate)                                  │
//! │  - Parses arguments, renders output, owns the terminal      │
//! │  - Holds the DiscoveryEngine during `cafescout browse`      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands, owns backend + session        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Business logic, returns CmdResult                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Backend Layer (backend/)                                   │
//! │  - Backend trait: HttpBackend (REST), InMemoryBackend (tests)│
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Beside the layers sits [`discovery`]: the pure filter function, the
//! draft/commit holders and the engine that keeps the visible set in sync.
//! It has no I/O at all.
//!
//! ## Key Principle: No Terminal I/O in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits
//! the process. Diagnostics go through `tracing`; the binary decides where
//! they end up.
//!
//! ## Testing Strategy
//!
//! 1. **Discovery** and **commands**: thorough unit tests, against
//!    `InMemoryBackend` where a backend is needed.
//! 2. **API**: dispatch tests.
//! 3. **CLI**: end-to-end tests of the binary in `cafescout-cli/tests`.
//!
//! ## Module Overview
//!
//! - [`api`]: the facade, entry point for all operations
//! - [`commands`]: business logic per area
//! - [`backend`]: the service seam and its implementations
//! - [`discovery`]: filtering, draft/commit state, the engine
//! - [`session`]: the shared login slot
//! - [`account`]: registration and username validation
//! - [`model`]: café, review and user records
//! - [`tags`]: amenity tags
//! - [`config`]: configuration management
//! - [`error`]: error types

pub mod account;
pub mod api;
pub mod backend;
pub mod commands;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;
pub mod session;
pub mod tags;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
