//! # CLI Layer
//!
//! This module is **one possible UI client** for cafescout, not the
//! application itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, stdin)
//! - Installs a tracing subscriber
//! - Uses `std::process::exit`
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: shell arguments become typed commands via clap
//! 2. **Context Setup**: config, session storage, HTTP backend and API
//! 3. **Dispatch**: route each command to its API call
//! 4. **Output**: text or JSON through `render.rs`
//! 5. **Error Handling**: errors bubble up to `main` as `anyhow::Error`

use super::browse;
use super::render::render;
use super::setup::{
    Cli, Commands, ConfigCommands, FilterArgs, FriendCommands, OutputFormat, ProfileCommands,
    ReviewCommands,
};
use anyhow::Context;
use cafescout::api::CafeScoutApi;
use cafescout::backend::HttpBackend;
use cafescout::commands::config::ConfigAction;
use cafescout::commands::{CmdResult, MessageLevel};
use cafescout::config::{config_dir, data_dir, CafeConfig};
use cafescout::model::Registration;
use cafescout::session::SessionContext;
use clap::Parser;
use std::io::{BufRead, IsTerminal, Write};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Log filter directives, e.g. `CAFESCOUT_LOG=cafescout=debug`.
const LOG_ENV: &str = "CAFESCOUT_LOG";

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = config_dir();
    let mut config = CafeConfig::load(config_dir.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    debug!(api_url = %config.api_url, persist = config.persist_session, "loaded config");

    let mut api = create_api(&config)?;
    let format = cli.output;

    // Naked `cafescout` lists everything the configured defaults allow.
    let command = cli.command.unwrap_or(Commands::List {
        search: String::new(),
        filters: FilterArgs::default(),
    });

    let result = match command {
        Commands::List { search, filters } => {
            let filters = filters.apply_to(config.filters.to_filter_config());
            api.list_cafes(search.trim(), &filters)?
        }
        Commands::Trending => api.trending_cafes()?,
        Commands::View { id } => api.view_cafe(id)?,
        Commands::Browse { filters } => {
            let filters = filters.apply_to(config.filters.to_filter_config());
            let stdin = std::io::stdin();
            let interactive = stdin.is_terminal();
            return browse::run(&mut api, filters, stdin.lock(), format, interactive);
        }
        Commands::Review { action } => match action {
            ReviewCommands::Add {
                cafe_id,
                rating,
                comment,
            } => api.add_review(cafe_id, rating, &comment)?,
            ReviewCommands::Delete { review_id } => api.delete_review(review_id)?,
        },
        Commands::Login { username, password } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password")?,
            };
            api.login(&username, &password)?
        }
        Commands::Register {
            username,
            email,
            password,
            confirm_password,
        } => {
            let password = match password {
                Some(p) => p,
                None => read_secret("Password")?,
            };
            let confirm_password = match confirm_password {
                Some(p) => p,
                None => read_secret("Confirm password")?,
            };
            api.register(&Registration {
                username,
                email,
                password,
                confirm_password,
            })?
        }
        Commands::Logout => api.logout()?,
        Commands::Whoami => api.whoami()?,
        Commands::Profile { action } => match action {
            None => api.user_profile(None)?,
            Some(ProfileCommands::Show { user_id }) => api.user_profile(user_id)?,
            Some(ProfileCommands::Rename { new_username }) => api.update_username(&new_username)?,
        },
        Commands::Users { query } => api.search_users(&query)?,
        Commands::Friends { action } => match action {
            None | Some(FriendCommands::List) => api.list_friends()?,
            Some(FriendCommands::Add { user_id }) => api.add_friend(user_id)?,
            Some(FriendCommands::Remove { user_id }) => api.remove_friend(user_id)?,
        },
        Commands::Config { action } => {
            let action = match action {
                None => ConfigAction::ShowAll,
                Some(ConfigCommands::Get { key }) => ConfigAction::ShowKey(key),
                Some(ConfigCommands::Path) => ConfigAction::Path,
            };
            api.config(config_dir.as_deref(), &config, action)?
        }
    };

    finish(&result, format)
}

/// Wires config into a session store, an HTTP backend and the API facade.
fn create_api(config: &CafeConfig) -> anyhow::Result<CafeScoutApi<HttpBackend>> {
    let session = if config.persist_session {
        SessionContext::persistent(data_dir()?)
    } else {
        SessionContext::in_memory()
    };
    let backend = HttpBackend::new(&config.api_url, config.request_timeout(), session.clone())
        .context("could not set up the HTTP client")?;
    Ok(CafeScoutApi::new(backend, session))
}

fn finish(result: &CmdResult, format: OutputFormat) -> anyhow::Result<()> {
    render(result, format)?;
    if result.has_level(MessageLevel::Error) {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Reads one line from stdin, prompting on stderr when attached to a terminal.
fn read_secret(label: &str) -> anyhow::Result<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("{}: ", label);
        std::io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .with_context(|| format!("could not read {}", label.to_lowercase()))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
