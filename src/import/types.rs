//! Settings and result types for incipit import

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::models::score::Score;

use super::errors::ImportError;

/// Configuration options for import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Number of staff lines written to the staff definition
    pub staff_lines: u8,

    /// `@n` of the single staff
    pub staff_n: u32,

    /// `@n` of the single layer (voice)
    pub layer_n: u32,

    /// Number given to the first measure
    pub first_measure_n: u32,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            staff_lines: 5,
            staff_n: 1,
            layer_n: 1,
            first_measure_n: 1,
        }
    }
}

impl ImportSettings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> Result<Self, ImportError> {
        serde_json::from_str(text).map_err(|e| ImportError::Settings(e.to_string()))
    }

    /// Parse settings from YAML; missing fields take their defaults
    pub fn from_yaml(text: &str) -> Result<Self, ImportError> {
        serde_yaml::from_str(text).map_err(|e| ImportError::Settings(e.to_string()))
    }
}

/// Result of importing one incipit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    /// Score tree (always present, possibly degenerate)
    pub score: Score,

    /// Everything that was logged while decoding
    pub diagnostics: Diagnostics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_json_with_defaults() {
        let settings = ImportSettings::from_json(r#"{"first_measure_n": 0}"#).unwrap();
        assert_eq!(settings.first_measure_n, 0);
        assert_eq!(settings.staff_lines, 5);
    }

    #[test]
    fn test_settings_from_yaml() {
        let settings = ImportSettings::from_yaml("staff_lines: 4\nstaff_n: 2\n").unwrap();
        assert_eq!(settings.staff_lines, 4);
        assert_eq!(settings.staff_n, 2);
        assert_eq!(settings.layer_n, 1);
    }

    #[test]
    fn test_invalid_settings() {
        let err = ImportSettings::from_json("{\"staff_lines\": \"five\"}").unwrap_err();
        assert!(matches!(err, ImportError::Settings(_)));
        assert!(err.to_string().starts_with("Invalid import settings"));
    }
}
