//! Declarative safe-area settings.
//!
//! ```json
//! {
//!     "adjust": { "top": true, "bottom": true },
//!     "blank": { "top": 1.0, "bottom": 0.5 },
//!     "log_level": "debug"
//! }
//! ```
//!
//! Every field is optional. Missing edges are not adjusted and missing blanks
//! are zero.

use std::fs;
use std::path::Path;

use safeline_layout::{AdjustConfig, EdgeBlanks, EdgeSet};
use serde::{Deserialize, Serialize};
use tracing::level_filters::LevelFilter;

use crate::{Error, Result, logging};

/// Settings for one anchored container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafeAreaConfig {
    /// Edges pulled back towards the screen edge.
    pub adjust: EdgeSet,
    /// How far each adjusted edge is pulled back, each within `[0, 1]`.
    pub blank: EdgeBlanks,
    /// Console log level, applied by [`apply_logging`](Self::apply_logging).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl SafeAreaConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] for malformed JSON and
    /// [`Error::BlankOutOfRange`] for a blank fraction outside `[0, 1]`.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file cannot be read, otherwise the same
    /// errors as [`from_json`](Self::from_json).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that every blank fraction lies within `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BlankOutOfRange`] naming the first offending edge.
    pub fn validate(&self) -> Result<()> {
        match self.blank.out_of_range() {
            Some((edge, value)) => Err(Error::BlankOutOfRange { edge, value }),
            None => Ok(()),
        }
    }

    /// Forwards `log_level` to [`logging::set_log_level`].
    ///
    /// Returns the cap now in effect, or `None` when no level is configured
    /// and the current cap was left alone.
    pub fn apply_logging(&self) -> Option<LevelFilter> {
        self.log_level.as_deref().map(logging::set_log_level)
    }

    /// The adjustment these settings describe.
    #[must_use]
    pub const fn adjust_config(&self) -> AdjustConfig {
        AdjustConfig::extend(self.adjust, self.blank)
    }
}

impl From<AdjustConfig> for SafeAreaConfig {
    fn from(config: AdjustConfig) -> Self {
        Self {
            adjust: config.adjust,
            blank: config.blank,
            log_level: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use safeline_layout::{AdjustConfig, EdgeBlanks, EdgeSet};
    use tracing::level_filters::LevelFilter;

    use super::SafeAreaConfig;
    use crate::Error;

    #[test]
    fn empty_document_follows_the_safe_area() {
        let config = SafeAreaConfig::from_json("{}").unwrap();
        assert_eq!(config.adjust_config(), AdjustConfig::fit());
        assert_eq!(config.log_level, None);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config = SafeAreaConfig::from_json(
            r#"{ "adjust": { "bottom": true }, "blank": { "bottom": 0.5 }, "log_level": "debug" }"#,
        )
        .unwrap();

        assert_eq!(config.adjust, EdgeSet::BOTTOM);
        assert_eq!(config.blank, EdgeBlanks::new(0.0, 0.5, 0.0, 0.0));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn log_level_is_forwarded_to_the_console_cap() {
        let config = SafeAreaConfig::from_json(r#"{ "log_level": "warn" }"#).unwrap();
        assert_eq!(config.apply_logging(), Some(LevelFilter::WARN));
        assert_eq!(SafeAreaConfig::default().apply_logging(), None);
    }

    #[test]
    fn out_of_range_blank_is_rejected() {
        let error = SafeAreaConfig::from_json(r#"{ "blank": { "left": 1.25 } }"#).unwrap_err();
        assert!(matches!(
            error,
            Error::BlankOutOfRange {
                edge: "left",
                value
            } if value == 1.25
        ));
    }

    #[test]
    fn malformed_document_is_a_config_error() {
        let error = SafeAreaConfig::from_json("{ adjust").unwrap_err();
        assert!(matches!(error, Error::Config(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = SafeAreaConfig::load("/nonexistent/safeline.json").unwrap_err();
        assert!(matches!(error, Error::Io { .. }));
    }

    #[test]
    fn serialized_config_parses_back() {
        let config = SafeAreaConfig::from(AdjustConfig::extend(
            EdgeSet::HORIZONTAL,
            EdgeBlanks::new(0.0, 0.0, 1.0, 0.25),
        ));
        let json = config.to_json().unwrap();
        assert!(!json.contains("log_level"));
        assert_eq!(SafeAreaConfig::from_json(&json).unwrap(), config);
    }
}
