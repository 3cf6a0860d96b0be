use cafescout::discovery::FilterConfig;
use cafescout::model::{CafeId, ReviewId, UserId, MAX_RATING};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format for releases: "v0.3.1"
/// Format for dev builds: "v0.3.1\ndev: abc1234 2026-01-15 14:30"
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            format!("v{}", VERSION)
        } else {
            format!("v{}\ndev: {} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "cafescout",
    bin_name = "cafescout",
    version = get_version(),
    disable_help_subcommand = true,
    after_help = "Logging goes to stderr; set CAFESCOUT_LOG (e.g. CAFESCOUT_LOG=debug) to tune it."
)]
#[command(about = "Find cafés by name, amenities, price and rating", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text, help_heading = "Options")]
    pub output: OutputFormat,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Café service base URL (overrides config and CAFESCOUT_API_URL)
    #[arg(long, global = true, value_name = "URL", help_heading = "Options")]
    pub api_url: Option<String>,
}

/// Filter flags shared by `list` and `browse`. They are layered over the
/// configured defaults.
#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct FilterArgs {
    /// Only cafés with WiFi
    #[arg(long)]
    pub wifi: bool,

    /// Only cafés with bathrooms
    #[arg(long)]
    pub bathrooms: bool,

    /// Only cafés with outlets
    #[arg(long)]
    pub outlets: bool,

    /// Only metro-friendly cafés
    #[arg(long)]
    pub metro: bool,

    /// Highest price tier to show (1 = $, 3 = $$$)
    #[arg(long, value_name = "TIER", value_parser = clap::value_parser!(u8).range(1..=3))]
    pub price: Option<u8>,

    /// Lowest rating to show (0-5, snapped to half stars)
    #[arg(long, value_name = "RATING", value_parser = parse_rating)]
    pub min_rating: Option<f64>,

    /// Maximum distance in miles (1-10)
    #[arg(long, value_name = "MILES", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_distance: Option<u8>,

    /// Ignore the filter defaults from the config file
    #[arg(long)]
    pub no_defaults: bool,
}

impl FilterArgs {
    /// Applies these flags on top of `base`. Amenity flags only ever switch
    /// a requirement on.
    pub fn apply_to(&self, base: FilterConfig) -> FilterConfig {
        let mut filters = if self.no_defaults {
            FilterConfig::default()
        } else {
            base
        };
        filters.wifi |= self.wifi;
        filters.bathrooms |= self.bathrooms;
        filters.outlets |= self.outlets;
        filters.metro |= self.metro;
        if let Some(price) = self.price {
            filters.price_range = price;
        }
        if let Some(rating) = self.min_rating {
            filters.min_rating = rating;
        }
        if let Some(distance) = self.max_distance {
            filters.max_distance = distance;
        }
        filters.normalized()
    }
}

pub(crate) fn parse_rating(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(0.0..=MAX_RATING).contains(&value) {
        return Err(format!("rating must be between 0 and {}", MAX_RATING));
    }
    Ok(value)
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List cafés matching a search and filters
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Case-insensitive name search
        #[arg(short, long, default_value = "")]
        search: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show the highest rated cafés
    #[command(display_order = 2)]
    Trending,

    /// Show one café with its reviews
    #[command(alias = "v", display_order = 3)]
    View { id: CafeId },

    /// Browse interactively: search, filter, refresh and review from a prompt
    #[command(display_order = 4)]
    Browse {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Add or delete reviews
    #[command(display_order = 10)]
    Review {
        #[command(subcommand)]
        action: ReviewCommands,
    },

    /// Log in to the café service
    #[command(display_order = 20)]
    Login {
        username: String,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    #[command(display_order = 21)]
    Register {
        username: String,

        #[arg(long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Password confirmation (read from stdin when omitted)
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Forget the stored session
    #[command(display_order = 22)]
    Logout,

    /// Show who is logged in
    #[command(display_order = 23)]
    Whoami,

    /// Show a profile or change your username
    #[command(display_order = 30)]
    Profile {
        #[command(subcommand)]
        action: Option<ProfileCommands>,
    },

    /// Search users by username prefix
    #[command(display_order = 31)]
    Users {
        #[arg(default_value = "")]
        query: String,
    },

    /// Manage friends
    #[command(display_order = 32)]
    Friends {
        #[command(subcommand)]
        action: Option<FriendCommands>,
    },

    /// Show configuration
    #[command(display_order = 40)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReviewCommands {
    /// Review a café
    Add {
        cafe_id: CafeId,

        /// 0-5 in half-star steps
        #[arg(short, long)]
        rating: f64,

        #[arg(short, long, default_value = "")]
        comment: String,
    },

    /// Delete one of your reviews
    #[command(alias = "rm")]
    Delete { review_id: ReviewId },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Show a user's profile (yours when no id is given)
    Show { user_id: Option<UserId> },

    /// Change your username
    Rename { new_username: String },
}

#[derive(Subcommand, Debug)]
pub enum FriendCommands {
    /// List your friends
    #[command(alias = "ls")]
    List,

    /// Add a friend by user id
    Add { user_id: UserId },

    /// Remove a friend by user id
    #[command(alias = "rm")]
    Remove { user_id: UserId },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one value by dotted key (e.g. filters.min_rating)
    Get { key: String },

    /// Print the config file location
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn naked_invocation_has_no_command() {
        let cli = parse(&["cafescout"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.output, OutputFormat::Text);
    }

    #[test]
    fn list_parses_filters() {
        let cli = parse(&[
            "cafescout", "list", "-s", "java", "--wifi", "--price", "2", "--min-rating", "4",
        ]);
        match cli.command {
            Some(Commands::List { search, filters }) => {
                assert_eq!(search, "java");
                assert!(filters.wifi);
                assert!(!filters.outlets);
                assert_eq!(filters.price, Some(2));
                assert_eq!(filters.min_rating, Some(4.0));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(Cli::try_parse_from(["cafescout", "list", "--price", "4"]).is_err());
        assert!(Cli::try_parse_from(["cafescout", "list", "--min-rating", "6"]).is_err());
        assert!(Cli::try_parse_from(["cafescout", "list", "--max-distance", "0"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["cafescout", "trending", "--output", "json", "-v"]);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(cli.verbose);
    }

    #[test]
    fn apply_to_layers_over_defaults() {
        let base = FilterConfig {
            outlets: true,
            min_rating: 3.0,
            ..Default::default()
        };
        let args = FilterArgs {
            wifi: true,
            min_rating: Some(4.2),
            ..Default::default()
        };
        let filters = args.apply_to(base);
        assert!(filters.wifi);
        assert!(filters.outlets);
        // Snapped to the half-star grid.
        assert_eq!(filters.min_rating, 4.0);
    }

    #[test]
    fn no_defaults_starts_unrestricted() {
        let base = FilterConfig {
            outlets: true,
            ..Default::default()
        };
        let args = FilterArgs {
            no_defaults: true,
            ..Default::default()
        };
        assert_eq!(args.apply_to(base), FilterConfig::default());
    }
}
