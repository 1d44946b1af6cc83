//! Booking configuration.
//!
//! Layered from built-in defaults, an optional TOML file at
//! ~/.config/booking/config.toml (or an explicit path) and `BOOKING_*`
//! environment variables, in that order.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{BookingError, BookingResult};

/// Ten years of daily occurrences.
pub const DEFAULT_MAX_OCCURRENCES: usize = 3660;

fn default_max_occurrences() -> usize {
    DEFAULT_MAX_OCCURRENCES
}

/// What to do when a single appointment fails to expand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Leave the appointment out and report it
    #[default]
    Skip,
    /// Fail the whole expansion
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfig {
    /// Upper bound on occurrences generated for a single appointment
    #[serde(default = "default_max_occurrences")]
    pub max_occurrences: usize,

    #[serde(default)]
    pub on_error: ErrorPolicy,
}

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig {
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            on_error: ErrorPolicy::default(),
        }
    }
}

impl BookingConfig {
    pub fn config_path() -> BookingResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| BookingError::Config("Could not determine config directory".into()))?
            .join("booking");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default config path, creating a commented template there
    /// on first use.
    pub fn load() -> BookingResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from `path` (which may be missing) plus environment overrides.
    pub fn load_from(path: &Path) -> BookingResult<Self> {
        Self::builder(path)
            .add_source(Environment::with_prefix("BOOKING").try_parsing(true))
            .build()
            .map_err(|e| BookingError::Config(e.to_string()))?
            .try_deserialize::<BookingConfig>()
            .map_err(|e| BookingError::Config(e.to_string()))?
            .validated()
    }

    fn builder(path: &Path) -> config::ConfigBuilder<config::builder::DefaultState> {
        Config::builder().add_source(
            File::from(path)
                .format(FileFormat::Toml)
                .required(false),
        )
    }

    fn validated(self) -> BookingResult<Self> {
        if self.max_occurrences == 0 {
            return Err(BookingError::Config(
                "max_occurrences must be at least 1".into(),
            ));
        }
        Ok(self)
    }

    /// Save the current config to `path`.
    pub fn save(&self, path: &Path) -> BookingResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| BookingError::Serialization(e.to_string()))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> BookingResult<()> {
        let contents = format!(
            "\
# booking configuration

# Most occurrences a single recurring appointment may expand to:
# max_occurrences = {}

# What to do when one appointment cannot be expanded (\"skip\" or \"abort\"):
# on_error = \"skip\"
",
            DEFAULT_MAX_OCCURRENCES
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                BookingError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| BookingError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
