//! Command-line arguments for `nsecli`.
//!
//! The long flags keep their historical single-dash spelling (`-reset`,
//! `-add_display_fields ...`); [`normalize`] rewrites them to the `--` form clap
//! expects before parsing.
use clap::Parser;

/// Long flags that are also accepted with a single leading dash.
const SINGLE_DASH_FLAGS: [&str; 5] = [
    "reset",
    "current_display_fields",
    "all_display_fields",
    "add_display_fields",
    "remove_display_fields",
];

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "nsecli", version, about = "Live NSE stock quotes on the command line", long_about = None)]
pub struct Args {
    /// Security code to quote, e.g. INFY
    pub code: Option<String>,

    /// Enables debug mode for debugging purpose
    #[arg(short = 'D')]
    pub debug: bool,

    /// Resets all the display settings
    #[arg(long = "reset")]
    pub reset: bool,

    /// Shows current display fields
    #[arg(long = "current_display_fields")]
    pub current_display_fields: bool,

    /// Shows all possible display fields
    #[arg(long = "all_display_fields")]
    pub all_display_fields: bool,

    /// Adds display fields
    #[arg(long = "add_display_fields", num_args = 0.., value_name = "FIELD")]
    pub add_display_fields: Option<Vec<String>>,

    /// Deletes display fields
    #[arg(long = "remove_display_fields", num_args = 0.., value_name = "FIELD")]
    pub remove_display_fields: Option<Vec<String>>,
}

/// What a single invocation does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quote(String),
    CurrentFields,
    AllFields,
    AddFields(Vec<String>),
    Reset,
    RemoveFields(Vec<String>),
    Help,
}

impl Args {
    /// Parses `std::env::args`, accepting the single-dash long flags.
    pub fn parse_env() -> Self {
        Args::parse_from(normalize(std::env::args()))
    }

    /// Resolves the one mode honored for this run.
    ///
    /// A code wins over every settings flag; among those the first set in the order
    /// current, all, add, reset, remove is used.
    pub fn mode(&self) -> Command {
        if let Some(code) = &self.code {
            return Command::Quote(code.clone());
        }

        if self.current_display_fields {
            Command::CurrentFields
        } else if self.all_display_fields {
            Command::AllFields
        } else if let Some(fields) = &self.add_display_fields {
            Command::AddFields(fields.clone())
        } else if self.reset {
            Command::Reset
        } else if let Some(fields) = &self.remove_display_fields {
            Command::RemoveFields(fields.clone())
        } else {
            Command::Help
        }
    }
}

/// Rewrites `-reset` style flags to `--reset`; everything else passes through.
pub fn normalize<I: IntoIterator<Item = String>>(args: I) -> Vec<String> {
    args.into_iter()
        .map(|arg| match arg.strip_prefix('-') {
            Some(flag) if SINGLE_DASH_FLAGS.contains(&flag) => format!("--{}", flag),
            _ => arg,
        })
        .collect()
}
