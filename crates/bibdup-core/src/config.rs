//! Detector configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fewest entries a bibliography may hold and still be compared.
pub const MIN_ENTRIES: usize = 2;

/// Matching options for [`DuplicateDetector`](crate::DuplicateDetector).
///
/// The defaults compare citation keys and DOIs exactly as written.
/// Loadable from TOML; missing keys fall back to their defaults:
///
/// ```toml
/// normalize_dois = true
/// case_insensitive_keys = false
/// min_entries = 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Compare DOIs after stripping resolver prefixes and lowercasing
    pub normalize_dois: bool,
    pub case_insensitive_keys: bool,
    /// Values below [`MIN_ENTRIES`] are raised to it
    pub min_entries: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            normalize_dois: false,
            case_insensitive_keys: false,
            min_entries: MIN_ENTRIES,
        }
    }
}

impl DetectorConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Fails when `min_entries` does not fit a TOML integer (`i64`)
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub(crate) fn required_entries(&self) -> usize {
        self.min_entries.max(MIN_ENTRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_exact_matching() {
        let config = DetectorConfig::default();
        assert!(!config.normalize_dois);
        assert!(!config.case_insensitive_keys);
        assert_eq!(config.required_entries(), 2);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DetectorConfig::from_toml_str("normalize_dois = true").unwrap();
        assert!(config.normalize_dois);
        assert!(!config.case_insensitive_keys);
        assert_eq!(config.min_entries, MIN_ENTRIES);
    }

    #[test]
    fn test_min_entries_is_clamped() {
        let config = DetectorConfig::from_toml_str("min_entries = 0").unwrap();
        assert_eq!(config.required_entries(), 2);

        let config = DetectorConfig::from_toml_str("min_entries = 5").unwrap();
        assert_eq!(config.required_entries(), 5);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = DetectorConfig::from_toml_str("normalize_dois = \"yes\"").unwrap_err();
        assert!(matches!(err, crate::DetectError::Config(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DetectorConfig {
            normalize_dois: true,
            case_insensitive_keys: true,
            min_entries: 3,
        };
        let parsed = DetectorConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_out_of_range_min_entries_fails_to_serialize() {
        let config = DetectorConfig {
            min_entries: usize::MAX,
            ..Default::default()
        };
        let err = config.to_toml_string().unwrap_err();
        assert!(matches!(err, crate::DetectError::ConfigSerialize(_)));
    }
}
