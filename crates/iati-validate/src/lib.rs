//! Vocabulary-aware validation of parsed IATI activities.
//!
//! Validation never aborts: invalid codes are filtered out with a warning,
//! percentage and placement problems are reported and the elements kept.

pub mod checks;
mod code;
mod warning;

use tracing::debug;

use iati_model::{DEFAULT_PERCENTAGE_TOLERANCE, ImportOptions, ParsedActivity};

pub use code::{CodeKind, Verdict, validate};
pub use warning::ValidationWarning;

/// Runs every check against one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Validator {
    tolerance: f64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_PERCENTAGE_TOLERANCE)
    }
}

impl Validator {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn from_options(options: &ImportOptions) -> Self {
        Self::new(options.percentage_tolerance)
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Filter invalid elements out of `activity` and collect all warnings.
    pub fn apply(&self, activity: &mut ParsedActivity) -> Vec<ValidationWarning> {
        let mut warnings = checks::codes::check(activity);
        warnings.extend(checks::percentages::check(activity, self.tolerance));
        warnings.extend(checks::placement::check(activity));
        debug!(warnings = warnings.len(), "validated activity");
        warnings
    }
}
