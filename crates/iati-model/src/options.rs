//! Configuration options for an import run.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::family::Family;
use crate::group::DEFAULT_PERCENTAGE_TOLERANCE;

/// How organisation names are compared when no identifier matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchingMode {
    /// Case-insensitive comparison of the trimmed name.
    #[default]
    Exact,
    /// Also ignore punctuation, repeated whitespace and a leading "the".
    Fuzzy,
}

/// Options controlling import behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Allowed distance from 100 when summing a group's percentages.
    pub percentage_tolerance: f64,

    /// Families to import, in order.
    pub families: Vec<Family>,

    /// Organisation name matching used by the entity resolver.
    pub matching: MatchingMode,

    /// Fill single-value convenience columns (e.g. a transaction's
    /// `sector_code`) when a group has exactly one member covering 100%.
    pub project_single_values: bool,

    /// Merge a contact into an existing one with the same email or name
    /// instead of inserting a duplicate.
    pub merge_contacts: bool,

    /// Errors kept on the import log row.
    pub max_logged_errors: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            percentage_tolerance: DEFAULT_PERCENTAGE_TOLERANCE,
            families: Family::ALL.to_vec(),
            matching: MatchingMode::default(),
            project_single_values: true,
            merge_contacts: true,
            max_logged_errors: 100,
        }
    }
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_families(mut self, families: Vec<Family>) -> Self {
        self.families = families;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.percentage_tolerance = tolerance;
        self
    }

    pub fn with_matching(mut self, matching: MatchingMode) -> Self {
        self.matching = matching;
        self
    }

    /// Reject option values that would make the run meaningless.
    pub fn validate(&self) -> Result<()> {
        if !self.percentage_tolerance.is_finite() || self.percentage_tolerance < 0.0 {
            return Err(ModelError::Options(format!(
                "percentage_tolerance must be a non-negative number, got {}",
                self.percentage_tolerance
            )));
        }
        if self.families.is_empty() {
            return Err(ModelError::Options(
                "at least one family must be selected".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let options: ImportOptions = toml::from_str(
            r#"
percentage_tolerance = 0.5
matching = "fuzzy"
families = ["sector", "result"]
"#,
        )
        .unwrap();
        assert_eq!(options.percentage_tolerance, 0.5);
        assert_eq!(options.matching, MatchingMode::Fuzzy);
        assert_eq!(options.families, vec![Family::Sectors, Family::Results]);
        assert!(options.merge_contacts);
        assert_eq!(options.max_logged_errors, 100);
    }

    #[test]
    fn rejects_negative_tolerance() {
        assert!(ImportOptions::new().with_tolerance(-1.0).validate().is_err());
        assert!(ImportOptions::new().with_families(Vec::new()).validate().is_err());
        assert!(ImportOptions::new().validate().is_ok());
    }
}
