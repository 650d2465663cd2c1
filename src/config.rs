//! Converter configuration.
//!
//! Defaults reproduce a standard MBP-10 conversion. A config can be loaded
//! from JSON; missing keys take their defaults.
//!
//! ```json
//! { "levels": 5, "duplicate_policy": "reject", "skip_invalid": true }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MbpError, Result};
use crate::lob::{BookConfig, DuplicateOrderPolicy};
use crate::types::{DEFAULT_LEVELS, MBP10_RTYPE};

/// Configuration for an MBO → MBP conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Price levels per side in each output row
    pub levels: usize,

    /// How to handle adds for order ids that are already live
    pub duplicate_policy: DuplicateOrderPolicy,

    /// Skip (and log) rows that fail to parse or are rejected, instead of
    /// aborting the run
    pub skip_invalid: bool,

    /// Whether to log warnings for book consistency issues
    pub log_warnings: bool,

    /// Record-type tag written in the `rtype` column
    pub record_type: u8,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS,
            duplicate_policy: DuplicateOrderPolicy::Replace,
            skip_invalid: false,
            log_warnings: true,
            record_type: MBP10_RTYPE,
        }
    }
}

impl ConverterConfig {
    /// Create a new config with specified number of levels.
    pub fn new(levels: usize) -> Self {
        Self {
            levels,
            ..Default::default()
        }
    }

    /// Set duplicate order id handling policy.
    pub fn with_duplicate_policy(mut self, policy: DuplicateOrderPolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    /// Enable/disable skipping of invalid rows.
    pub fn with_skip_invalid(mut self, skip: bool) -> Self {
        self.skip_invalid = skip;
        self
    }

    /// Enable/disable warning logs.
    pub fn with_logging(mut self, log: bool) -> Self {
        self.log_warnings = log;
        self
    }

    /// Set the record-type tag.
    pub fn with_record_type(mut self, rtype: u8) -> Self {
        self.record_type = rtype;
        self
    }

    /// Book configuration derived from this config.
    pub fn book_config(&self) -> BookConfig {
        BookConfig::default()
            .with_duplicate_policy(self.duplicate_policy)
            .with_logging(self.log_warnings)
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.levels == 0 {
            return Err(MbpError::Config("levels must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Load from JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save to JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConverterConfig::default();
        assert_eq!(config.levels, 10);
        assert_eq!(config.duplicate_policy, DuplicateOrderPolicy::Replace);
        assert!(!config.skip_invalid);
        assert!(config.log_warnings);
        assert_eq!(config.record_type, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::new(5)
            .with_duplicate_policy(DuplicateOrderPolicy::Reject)
            .with_skip_invalid(true)
            .with_logging(false)
            .with_record_type(99);

        assert_eq!(config.levels, 5);
        assert_eq!(config.duplicate_policy, DuplicateOrderPolicy::Reject);
        assert!(config.skip_invalid);
        assert!(!config.log_warnings);
        assert_eq!(config.record_type, 99);

        let book = config.book_config();
        assert_eq!(book.duplicate_policy, DuplicateOrderPolicy::Reject);
        assert!(!book.log_warnings);
    }

    #[test]
    fn test_zero_levels_rejected() {
        assert!(matches!(
            ConverterConfig::new(0).validate(),
            Err(MbpError::Config(_))
        ));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ConverterConfig =
            serde_json::from_str(r#"{ "levels": 3, "duplicate_policy": "reject" }"#).unwrap();
        assert_eq!(config.levels, 3);
        assert_eq!(config.duplicate_policy, DuplicateOrderPolicy::Reject);
        assert_eq!(config.record_type, 10);
        assert!(config.log_warnings);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let config = ConverterConfig::new(4).with_skip_invalid(true);
        config.save_json(&path).unwrap();
        let loaded = ConverterConfig::from_json_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_json_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "levels": 0 }"#).unwrap();
        assert!(ConverterConfig::from_json_file(&path).is_err());
    }
}
