use std::env;

use anyhow::{bail, Context};
use feathersheet_history::DEFAULT_HISTORY_DEPTH;

/// Session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Append the declared type to column headers
    pub show_dtypes: bool,
    /// Dark presentation requested by the front-end
    pub dark_mode: bool,
    /// Undo/redo snapshots kept per stack
    pub history_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_dtypes: false,
            dark_mode: false,
            history_depth: DEFAULT_HISTORY_DEPTH,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let show_dtypes = match lookup("FEATHERSHEET_SHOW_DTYPES") {
            Some(value) => parse_flag("FEATHERSHEET_SHOW_DTYPES", &value)?,
            None => defaults.show_dtypes,
        };
        let dark_mode = match lookup("FEATHERSHEET_DARK_MODE") {
            Some(value) => parse_flag("FEATHERSHEET_DARK_MODE", &value)?,
            None => defaults.dark_mode,
        };
        let history_depth = match lookup("FEATHERSHEET_HISTORY_DEPTH") {
            Some(value) => value.trim().parse().with_context(|| {
                format!("FEATHERSHEET_HISTORY_DEPTH: invalid number '{}'", value)
            })?,
            None => defaults.history_depth,
        };
        if history_depth == 0 {
            bail!("FEATHERSHEET_HISTORY_DEPTH must be at least 1");
        }

        Ok(Self {
            show_dtypes,
            dark_mode,
            history_depth,
        })
    }
}

fn parse_flag(key: &str, value: &str) -> anyhow::Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => bail!("{}: expected a boolean, got '{}'", key, other),
    }
}
