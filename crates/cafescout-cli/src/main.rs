//! # Cafescout CLI
//!
//! The binary is deliberately thin: everything lives in `src/cli/`, and this
//! file only calls `cli::run()` and turns an error into an exit code.
//!
//! ## Workspace Structure
//!
//! - `crates/cafescout/`: the UI-agnostic library (discovery, commands, backends)
//! - `crates/cafescout-cli/`: this binary, a client of the library
//!
//! ## Layering
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (crates/cafescout-cli/src/cli/)                  │
//! │  - clap argument parsing (setup.rs)                         │
//! │  - Context wiring + dispatch (commands.rs)                  │
//! │  - Terminal and JSON output (render.rs)                     │
//! │  - Interactive browsing over a DiscoveryEngine (browse.rs)  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (crates/cafescout/src/api.rs)                    │
//! │  - Dispatches to command modules, returns `CmdResult`       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything from `api.rs` inward is UI agnostic. The CLI owns every
//! user-facing concern: parsing, context setup, rendering, logging output and
//! the process exit code.
//!
//! ## Testing Approach
//!
//! - Library: unit tests per command plus integration tests in `crates/cafescout/tests`.
//! - CLI: render helpers and browse-command parsing are unit tested here;
//!   `tests/cli_e2e.rs` runs the binary against throwaway config and data dirs.

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
