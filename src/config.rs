use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::inventory::Inventory;

/// Command-line arguments for the inventory shell
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Catalog file to load at start-up (`.json` selects the snapshot format)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    /// Save the catalog back to the data file when the shell exits
    #[arg(long, requires = "data")]
    pub autosave: bool,

    /// Prompt printed before each command
    #[arg(long, default_value = "library> ")]
    pub prompt: String,

    /// Latest publication year accepted by `add` (defaults to this year)
    #[arg(long)]
    pub current_year: Option<i32>,

    /// Log filter used when `RUST_LOG` is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Auto)]
    pub log_format: LogFormat,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// How log lines are rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON when stderr is not a terminal, text otherwise
    #[default]
    Auto,
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

impl Config {
    /// Build an empty inventory honoring `--current-year`
    #[must_use]
    pub fn inventory(&self) -> Inventory {
        self.current_year.map_or_else(Inventory::new, Inventory::with_current_year)
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;

    use super::{Config, LogFormat};

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["book-inventory"]);
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(config.data, None);
            assert!(!config.autosave);
            assert_eq!(config.prompt, "library> ");
            assert_eq!(config.log_format, LogFormat::Auto);
        }
    }

    #[test]
    fn test_explicit_values() {
        let config = Config::try_parse_from([
            "book-inventory",
            "--data",
            "catalog.txt",
            "--autosave",
            "--current-year",
            "1999",
            "--log-format",
            "json",
        ]);
        assert!(config.is_ok());
        if let Ok(config) = config {
            assert_eq!(config.data.as_deref(), Some(Path::new("catalog.txt")));
            assert!(config.autosave);
            assert_eq!(config.log_format, LogFormat::Json);
            assert_eq!(config.inventory().current_year(), 1999);
        }
    }

    #[test]
    fn test_autosave_requires_data() {
        assert!(Config::try_parse_from(["book-inventory", "--autosave"]).is_err());
    }
}
