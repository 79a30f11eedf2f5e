use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use time::UtcOffset;
use time::macros::format_description;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "CARBONTRACK_CONFIG_PATH";

/// Carbon allowance used when the config does not set one.
pub const DEFAULT_BUDGET: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct Palette {
    pub alert: &'static str,
    pub muted: &'static str,
    pub reset: &'static str,
}

impl Palette {
    pub fn alertize(&self, text: &str) -> String {
        if self.alert.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.alert, text, self.reset)
        }
    }

    pub fn mutedize(&self, text: &str) -> String {
        if self.muted.is_empty() {
            text.to_string()
        } else {
            format!("{}{}{}", self.muted, text, self.reset)
        }
    }
}

pub fn palette_for_theme(theme: Option<&str>) -> Palette {
    match theme.map(canonical_theme_name).as_deref() {
        Some("noir") => Palette {
            alert: "\x1b[38;5;208m",
            muted: "\x1b[38;5;250m",
            reset: "\x1b[0m",
        },
        Some("solarized") => Palette {
            alert: "\x1b[38;5;160m",
            muted: "\x1b[38;5;245m",
            reset: "\x1b[0m",
        },
        _ => Palette {
            alert: "",
            muted: "",
            reset: "",
        },
    }
}

pub fn canonical_theme_name(raw: &str) -> String {
    let cleaned = canonical_key(raw);
    match cleaned.as_str() {
        "" | "vanilla" | "light" | "plain" => "default".to_string(),
        "dark" | "dark_mode" | "darkmode" => "noir".to_string(),
        _ => cleaned,
    }
}

/// Lower-cases `raw` and collapses runs of non-alphanumerics into one `_`.
pub fn canonical_key(raw: &str) -> String {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    cleaned.trim_matches('_').to_string()
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub budget: Option<f64>,
    /// Fixed offset such as `+02:00` used to place records on calendar days.
    #[serde(default)]
    pub utc_offset: Option<String>,
    #[serde(default)]
    pub theme: Option<String>,
}

impl Config {
    pub fn budget(&self) -> f64 {
        self.budget.unwrap_or(DEFAULT_BUDGET)
    }

    /// Configured offset, else the machine's local offset, else UTC.
    pub fn reference_offset(&self) -> Result<UtcOffset, AppError> {
        match self.utc_offset.as_deref() {
            Some(raw) => parse_utc_offset(raw),
            None => Ok(UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)),
        }
    }

    pub fn palette(&self) -> Palette {
        palette_for_theme(self.theme.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigOverrides {
    pub budget: Option<f64>,
    pub utc_offset: Option<String>,
    pub theme: Option<String>,
}

pub fn parse_budget(raw: &str) -> Result<f64, AppError> {
    let budget: f64 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::invalid_input(format!("budget must be a number: '{raw}'")))?;
    if !budget.is_finite() || budget < 0.0 {
        return Err(AppError::invalid_input("budget must be a non-negative number"));
    }
    Ok(budget)
}

pub fn parse_utc_offset(raw: &str) -> Result<UtcOffset, AppError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("z") || trimmed.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }

    UtcOffset::parse(
        trimmed,
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .map_err(|_| AppError::invalid_input(format!("utc_offset must look like +02:00: '{raw}'")))
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata)
            .join("carbontrack")
            .join(CONFIG_FILE_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("carbontrack")
            .join(CONFIG_FILE_NAME))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    validate_config(path, normalize_config_theme(config))
}

fn validate_config(path: &Path, config: Config) -> Result<Config, AppError> {
    if let Some(budget) = config.budget
        && (!budget.is_finite() || budget < 0.0)
    {
        return Err(AppError::invalid_data(format!(
            "budget in {} must be a non-negative number",
            path.display()
        )));
    }
    if let Some(offset) = config.utc_offset.as_deref() {
        parse_utc_offset(offset)
            .map_err(|err| AppError::invalid_data(format!("{}: {}", path.display(), err.message())))?;
    }
    Ok(config)
}

fn normalize_config_theme(mut config: Config) -> Config {
    config.theme = config.theme.map(|name| canonical_theme_name(&name));
    config
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(budget) = overrides.budget {
        merged.budget = Some(budget);
    }
    if let Some(offset) = overrides.utc_offset.as_ref() {
        merged.utc_offset = Some(offset.clone());
    }
    if let Some(theme) = overrides.theme.as_ref() {
        merged.theme = Some(canonical_theme_name(theme));
    }
    merged
}
