use carbon_core::config::{ConfigOverrides, canonical_key, parse_budget, parse_utc_offset};
use carbon_core::error::AppError;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "Track activities and their estimated carbon footprint", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log an activity; its carbon and category are estimated from the name
    ///
    /// Example: carbon_cli add "Flight to Berlin"
    /// Example: carbon_cli add "Team lunch" --carbon 4.2
    Add {
        name: Option<String>,
        /// Manual carbon figure; files the task under Custom
        #[arg(long, allow_hyphen_values = true)]
        carbon: Option<String>,
    },
    /// Show the estimate for an activity without logging it
    ///
    /// Example: carbon_cli estimate "server upgrade"
    Estimate {
        name: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        carbon: Option<String>,
    },
    /// List logged tasks
    ///
    /// Example: carbon_cli list --category food
    /// Example: carbon_cli list --search lunch
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Show details of a task
    ///
    /// Example: carbon_cli show 1
    Show { id: String },
    /// Mark a task as completed
    ///
    /// Example: carbon_cli done 1
    Done { id: String },
    /// Delete a task
    ///
    /// Example: carbon_cli delete 1
    Delete { id: String },
    /// Delete every task
    ///
    /// Example: carbon_cli clear
    Clear,
    /// Show totals, budget and daily, weekly and category breakdowns
    ///
    /// Example: carbon_cli summary
    /// Example: carbon_cli summary --category travel --at 2025-12-20T18:00:00Z
    Summary {
        #[command(flatten)]
        filter: FilterArgs,
        /// Reference time for the day and week buckets (RFC 3339)
        #[arg(long, value_name = "DATETIME")]
        at: Option<String>,
    },
    /// Insert a set of sample tasks
    ///
    /// Example: carbon_cli seed
    Seed,
}

#[derive(clap::Args, Debug, Default, Clone)]
pub struct FilterArgs {
    /// Only tasks in this category (travel, food, office, other, custom)
    #[arg(long)]
    pub category: Option<String>,
    /// Only tasks whose name contains this text (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Budget,
    UtcOffset,
    Theme,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, AppError> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;

    let key = canonical_key(key_raw);
    let target = match key.as_str() {
        "" => return Err(AppError::invalid_input("override key cannot be empty")),
        "budget" => ConfigOverrideTarget::Budget,
        "utc_offset" | "offset" | "timezone" => ConfigOverrideTarget::UtcOffset,
        "theme" => ConfigOverrideTarget::Theme,
        other => {
            return Err(AppError::invalid_input(format!(
                "unknown config field '{other}'"
            )));
        }
    };

    Ok(ParsedConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

/// Parse and validate every `--config-override`; later entries win.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Budget => overrides.budget = Some(parse_budget(&parsed.value)?),
            ConfigOverrideTarget::UtcOffset => {
                parse_utc_offset(&parsed.value)?;
                overrides.utc_offset = Some(parsed.value);
            }
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
        }
    }
    Ok(overrides)
}
