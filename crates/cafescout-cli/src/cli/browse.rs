//! Interactive browsing.
//!
//! `cafescout browse` holds one [`DiscoveryEngine`] for the whole session and
//! reads commands line by line. Typing into the search box and editing the
//! filter panel only touch drafts; the café list changes on `submit`,
//! `apply`, `clear` or a refresh. Reviews trigger a refresh so averages and
//! rating filters see the new numbers.

use super::render::render;
use super::setup::{parse_rating, OutputFormat};
use cafescout::api::CafeScoutApi;
use cafescout::backend::Backend;
use cafescout::commands::{pluralize_cafes, CmdMessage, CmdResult, MessageLevel};
use cafescout::discovery::{DiscoveryEngine, FilterConfig};
use cafescout::error::Result as CafeResult;
use cafescout::model::{CafeId, ReviewId};
use cafescout::tags::Amenity;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::io::{BufRead, Write};

const PROMPT: &str = "cafescout> ";

/// One line typed at the browse prompt.
#[derive(Parser, Debug, PartialEq)]
#[command(
    name = "browse",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    help_template = "Commands:\n{subcommands}"
)]
struct BrowseLine {
    #[command(subcommand)]
    command: BrowseCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    /// Show the current café list
    #[command(alias = "ls", display_order = 1)]
    Show,

    /// Type into the search box without searching
    #[command(display_order = 2)]
    Type {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Search for what is in the search box
    #[command(display_order = 3)]
    Submit,

    /// Type and submit in one step
    #[command(alias = "s", display_order = 4)]
    Search {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Clear the search
    #[command(display_order = 5)]
    Clear,

    /// Open the filter panel
    #[command(alias = "f", display_order = 10)]
    Filters,

    /// Change one filter in the open panel
    #[command(display_order = 11)]
    Set {
        #[command(subcommand)]
        setting: FilterSetting,
    },

    /// Flip one amenity in the open panel
    #[command(display_order = 12)]
    Toggle {
        #[arg(value_parser = parse_amenity)]
        amenity: Amenity,
    },

    /// Apply the panel's filters
    #[command(display_order = 13)]
    Apply,

    /// Close the panel and discard its changes
    #[command(display_order = 14)]
    Cancel,

    /// Refetch cafés from the service
    #[command(alias = "r", display_order = 20)]
    Refresh,

    /// Show one café with its reviews
    #[command(alias = "v", display_order = 21)]
    View { id: CafeId },

    /// Review a café (rating 0-5 in half stars)
    #[command(display_order = 30)]
    Review {
        cafe_id: CafeId,
        rating: f64,
        #[arg(trailing_var_arg = true, num_args = 1.., allow_hyphen_values = true)]
        comment: Vec<String>,
    },

    /// Delete one of your reviews
    #[command(display_order = 31)]
    Unreview { review_id: ReviewId },

    /// List these commands
    #[command(display_order = 40)]
    Help,

    /// Leave browse
    #[command(aliases = ["exit", "q"], display_order = 41)]
    Quit,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum FilterSetting {
    Wifi { state: Switch },
    Bathrooms { state: Switch },
    Outlets { state: Switch },
    #[command(alias = "metro-friendly")]
    Metro { state: Switch },
    /// Highest price tier (1-3)
    Price {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=3))]
        tier: u8,
    },
    /// Lowest rating (0-5)
    #[command(alias = "min-rating")]
    Rating {
        #[arg(value_parser = parse_rating)]
        rating: f64,
    },
    /// Maximum distance in miles (1-10)
    #[command(alias = "max-distance")]
    Distance {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=10))]
        miles: u8,
    },
}

impl FilterSetting {
    fn apply(&self, filters: &mut FilterConfig) {
        match *self {
            FilterSetting::Wifi { state } => filters.set_amenity(Amenity::Wifi, state.is_on()),
            FilterSetting::Bathrooms { state } => {
                filters.set_amenity(Amenity::Bathrooms, state.is_on())
            }
            FilterSetting::Outlets { state } => filters.set_amenity(Amenity::Outlets, state.is_on()),
            FilterSetting::Metro { state } => filters.set_amenity(Amenity::Metro, state.is_on()),
            FilterSetting::Price { tier } => filters.price_range = tier,
            FilterSetting::Rating { rating } => filters.min_rating = rating,
            FilterSetting::Distance { miles } => filters.max_distance = miles,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Switch {
    #[value(alias = "yes", alias = "true")]
    On,
    #[value(alias = "no", alias = "false")]
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        self == Switch::On
    }
}

fn parse_amenity(s: &str) -> Result<Amenity, String> {
    s.parse()
}

/// Parses one input line. Blank lines yield `Ok(None)`; errors carry clap's
/// rendered message.
pub fn parse_line(line: &str) -> Result<Option<BrowseCommand>, String> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    BrowseLine::try_parse_from(line.split_whitespace())
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.render().to_string().trim_end().to_string())
}

fn help_text() -> String {
    BrowseLine::command().render_help().to_string()
}

/// One-line summary of a filter config, e.g. "wifi, outlets · up to $$ · 4.0+".
pub fn describe_filters(filters: &FilterConfig) -> String {
    let mut parts = Vec::new();
    let amenities = filters.enabled_amenities();
    if !amenities.is_empty() {
        parts.push(
            amenities
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    parts.push(format!("up to {}", "$".repeat(usize::from(filters.price_range))));
    if filters.min_rating > 0.0 {
        parts.push(format!("{:.1}+", filters.min_rating));
    }
    parts.join(" · ")
}

fn showing(engine: &DiscoveryEngine) -> CmdResult {
    let mut result = CmdResult::default().with_listed_cafes(engine.visible().to_vec());
    if engine.visible().is_empty() && engine.is_loaded() {
        result.add_message(CmdMessage::info("No cafés match"));
    }
    let mut status = format!(
        "Showing {} of {}",
        engine.visible().len(),
        pluralize_cafes(engine.all().len())
    );
    if !engine.committed_search().is_empty() {
        status.push_str(&format!(" matching '{}'", engine.committed_search()));
    }
    status.push_str(&format!(" [{}]", describe_filters(engine.committed_filters())));
    result.with_message(CmdMessage::info(status))
}

fn draft_status(engine: &DiscoveryEngine) -> CmdResult {
    let message = match engine.draft_filters() {
        Some(draft) => format!("Filters (draft): {}", describe_filters(draft)),
        None => "Open the filter panel first with `filters`".to_string(),
    };
    let level = if engine.is_panel_open() {
        CmdMessage::info(message)
    } else {
        CmdMessage::error(message)
    };
    CmdResult::default().with_message(level)
}

/// Refetches and reports the browse status. A refresh warning is kept ahead
/// of the status line.
fn refresh<B: Backend>(api: &CafeScoutApi<B>, engine: &mut DiscoveryEngine) -> CmdResult {
    let refreshed = api.refresh_discovery(engine);
    let mut result = showing(engine);
    let mut messages: Vec<CmdMessage> = refreshed
        .messages
        .into_iter()
        .filter(|m| m.level != MessageLevel::Info)
        .collect();
    messages.append(&mut result.messages);
    result.messages = messages;
    result
}

/// Runs an API call and then refreshes, folding both results together.
fn then_refresh<B: Backend>(
    api: &CafeScoutApi<B>,
    engine: &mut DiscoveryEngine,
    outcome: CafeResult<CmdResult>,
) -> CmdResult {
    match outcome {
        Ok(mut result) => {
            let refreshed = refresh(api, engine);
            result.listed_cafes = refreshed.listed_cafes;
            result.messages.extend(refreshed.messages);
            result
        }
        Err(e) => CmdResult::default().with_message(CmdMessage::error(e.to_string())),
    }
}

/// Executes one command. Returns `None` when the session should end.
pub fn execute<B: Backend>(
    api: &mut CafeScoutApi<B>,
    engine: &mut DiscoveryEngine,
    command: BrowseCommand,
) -> Option<CmdResult> {
    let result = match command {
        BrowseCommand::Quit => return None,
        BrowseCommand::Help => CmdResult::default().with_message(CmdMessage::info(help_text())),
        BrowseCommand::Show => showing(engine),
        BrowseCommand::Type { text } => {
            engine.type_search(text.join(" "));
            CmdResult::default().with_message(CmdMessage::info(format!(
                "Search box: '{}' (submit to search)",
                engine.pending_search()
            )))
        }
        BrowseCommand::Submit => {
            engine.submit_search();
            showing(engine)
        }
        BrowseCommand::Search { text } => {
            engine.type_search(text.join(" "));
            engine.submit_search();
            showing(engine)
        }
        BrowseCommand::Clear => {
            engine.clear_search();
            showing(engine)
        }
        BrowseCommand::Filters => {
            engine.open_filters();
            draft_status(engine)
        }
        BrowseCommand::Set { setting } => {
            engine.edit_filters(|f| setting.apply(f));
            draft_status(engine)
        }
        BrowseCommand::Toggle { amenity } => {
            engine.edit_filters(|f| f.toggle_amenity(amenity));
            draft_status(engine)
        }
        BrowseCommand::Apply => {
            if !engine.is_panel_open() {
                return Some(draft_status(engine));
            }
            engine.apply_filters();
            showing(engine)
        }
        BrowseCommand::Cancel => {
            let message = if engine.is_panel_open() {
                "Filter changes discarded"
            } else {
                "Filter panel is not open"
            };
            engine.cancel_filters();
            CmdResult::default().with_message(CmdMessage::info(message))
        }
        BrowseCommand::Refresh => refresh(api, engine),
        BrowseCommand::View { id } => api
            .view_cafe(id)
            .unwrap_or_else(|e| CmdResult::default().with_message(CmdMessage::error(e.to_string()))),
        BrowseCommand::Review {
            cafe_id,
            rating,
            comment,
        } => {
            let outcome = api.add_review(cafe_id, rating, &comment.join(" "));
            then_refresh(api, engine, outcome)
        }
        BrowseCommand::Unreview { review_id } => {
            let outcome = api.delete_review(review_id);
            then_refresh(api, engine, outcome)
        }
    };
    Some(result)
}

/// Reads commands from `input` until it ends or the user quits.
pub fn run<B: Backend, R: BufRead>(
    api: &mut CafeScoutApi<B>,
    initial: FilterConfig,
    input: R,
    format: OutputFormat,
    interactive: bool,
) -> anyhow::Result<()> {
    let mut engine = DiscoveryEngine::new(initial);
    render(&refresh(api, &mut engine), format)?;

    let show_prompt = interactive && format == OutputFormat::Text;
    if show_prompt {
        prompt()?;
    }
    for line in input.lines() {
        let line = line?;
        let result = match parse_line(&line) {
            Ok(None) => None,
            Ok(Some(command)) => match execute(api, &mut engine, command) {
                Some(result) => Some(result),
                None => break,
            },
            Err(message) => Some(CmdResult::default().with_message(CmdMessage::error(message))),
        };
        if let Some(result) = result {
            render(&result, format)?;
        }
        if show_prompt {
            prompt()?;
        }
    }
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    let mut out = std::io::stdout();
    write!(out, "{}", PROMPT)?;
    out.flush()
}
