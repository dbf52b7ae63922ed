//! The four-level results hierarchy: result → indicator → baseline / period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::elements::DocumentLink;
use crate::narrative::Narrative;

/// Default indicator `@measure` (unit).
pub const DEFAULT_INDICATOR_MEASURE: &str = "1";

/// A `<reference>` on a result or indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub vocabulary: Option<String>,
    pub code: Option<String>,
    /// `vocabulary-uri` on results, `indicator-uri` on indicators.
    pub uri: Option<String>,
}

/// A disaggregation `<dimension name value>`; both attributes are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub name: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityResult {
    pub result_type: Option<String>,
    pub aggregation_status: Option<bool>,
    pub title: Option<Narrative>,
    pub description: Option<Narrative>,
    pub document_links: Vec<DocumentLink>,
    pub references: Vec<Reference>,
    pub indicators: Vec<Indicator>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub measure: String,
    pub ascending: bool,
    pub aggregation_status: Option<bool>,
    pub title: Option<Narrative>,
    pub description: Option<Narrative>,
    pub document_links: Vec<DocumentLink>,
    pub references: Vec<Reference>,
    pub baselines: Vec<Baseline>,
    pub periods: Vec<Period>,
}

impl Default for Indicator {
    fn default() -> Self {
        Self {
            measure: DEFAULT_INDICATOR_MEASURE.to_string(),
            ascending: true,
            aggregation_status: None,
            title: None,
            description: None,
            document_links: Vec::new(),
            references: Vec::new(),
            baselines: Vec::new(),
            periods: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub year: Option<i32>,
    pub iso_date: Option<NaiveDate>,
    pub value: Option<String>,
    pub comment: Option<Narrative>,
    /// `location/@ref` values pointing at activity locations.
    pub locations: Vec<String>,
    pub dimensions: Vec<Dimension>,
    pub document_links: Vec<DocumentLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub targets: Vec<PeriodValue>,
    pub actuals: Vec<PeriodValue>,
}

/// A period `<target>` or `<actual>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub value: Option<String>,
    pub comment: Option<Narrative>,
    pub locations: Vec<String>,
    pub dimensions: Vec<Dimension>,
    pub document_links: Vec<DocumentLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodValueKind {
    Target,
    Actual,
}

impl PeriodValueKind {
    pub fn element_name(self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Actual => "actual",
        }
    }
}
