//! Activity-level element families.
//!
//! Codelist attributes that IATI gives a default for are plain `String`s
//! filled with that default by the parser; attributes without a default
//! stay `Option`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::group::Weighted;
use crate::narrative::Narrative;
use crate::reference::{ActivityRef, OrganisationRef};

/// Default `@vocabulary` for sectors (OECD DAC 5-digit purpose codes).
pub const DEFAULT_SECTOR_VOCABULARY: &str = "1";
/// Default `@vocabulary` for recipient regions (OECD DAC regions).
pub const DEFAULT_REGION_VOCABULARY: &str = "1";
/// Default `@vocabulary` for aid types (OECD DAC aid type).
pub const DEFAULT_AID_TYPE_VOCABULARY: &str = "1";
/// Default `@vocabulary` for policy markers (OECD DAC CRS).
pub const DEFAULT_POLICY_MARKER_VOCABULARY: &str = "1";
/// Default `@vocabulary` for tags.
pub const DEFAULT_TAG_VOCABULARY: &str = "1";
/// Default budget `@type` (original).
pub const DEFAULT_BUDGET_TYPE: &str = "1";
/// Default budget `@status` (indicative).
pub const DEFAULT_BUDGET_STATUS: &str = "1";
/// Default contact-info `@type` (general enquiries).
pub const DEFAULT_CONTACT_TYPE: &str = "1";
/// Default point `@srsName` (WGS 84).
pub const DEFAULT_SRS_NAME: &str = "http://www.opengis.net/def/crs/EPSG/0/4326";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub code: String,
    pub vocabulary: String,
    pub vocabulary_uri: Option<String>,
    pub percentage: Option<f64>,
    pub narrative: Option<Narrative>,
}

impl Sector {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            vocabulary: DEFAULT_SECTOR_VOCABULARY.to_string(),
            vocabulary_uri: None,
            percentage: None,
            narrative: None,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: impl Into<String>) -> Self {
        self.vocabulary = vocabulary.into();
        self
    }

    pub fn with_percentage(mut self, percentage: f64) -> Self {
        self.percentage = Some(percentage);
        self
    }
}

impl Weighted for Sector {
    fn percentage(&self) -> Option<f64> {
        self.percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientCountry {
    /// ISO 3166-1 alpha-2 code, upper-cased by the parser.
    pub code: String,
    pub percentage: Option<f64>,
    pub narrative: Option<Narrative>,
}

impl Weighted for RecipientCountry {
    fn percentage(&self) -> Option<f64> {
        self.percentage
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipientRegion {
    pub code: String,
    pub vocabulary: String,
    pub vocabulary_uri: Option<String>,
    pub percentage: Option<f64>,
    pub narrative: Option<Narrative>,
}

impl Weighted for RecipientRegion {
    fn percentage(&self) -> Option<f64> {
        self.percentage
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AidType {
    pub code: String,
    pub vocabulary: String,
}

impl AidType {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            vocabulary: DEFAULT_AID_TYPE_VOCABULARY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipatingOrg {
    pub organisation: OrganisationRef,
    /// OrganisationRole code; required by IATI, no default.
    pub role: Option<String>,
    pub activity_id: Option<ActivityRef>,
    pub crs_channel_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub budget_type: String,
    pub status: String,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub value: Option<f64>,
    /// `value/@currency`, else the activity default currency.
    pub currency: Option<String>,
    pub value_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub contact_type: String,
    pub organisation: Option<Narrative>,
    pub department: Option<Narrative>,
    pub person_name: Option<Narrative>,
    pub job_title: Option<Narrative>,
    pub telephone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub mailing_address: Option<Narrative>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// ConditionType code; required by IATI, no default.
    pub condition_type: Option<String>,
    pub narrative: Option<Narrative>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyMarker {
    pub code: String,
    pub vocabulary: String,
    pub vocabulary_uri: Option<String>,
    pub significance: Option<String>,
    pub narrative: Option<Narrative>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub code: String,
    pub vocabulary: String,
    pub vocabulary_uri: Option<String>,
    pub narrative: Option<Narrative>,
}

/// A `<document-link>` on the activity or inside the results hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentLink {
    /// Always well-formed; links with an empty url are dropped by the parser.
    pub url: String,
    pub format: Option<String>,
    pub title: Option<Narrative>,
    pub description: Option<Narrative>,
    pub categories: Vec<String>,
    pub languages: Vec<String>,
    pub document_date: Option<NaiveDate>,
}

impl DocumentLink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            format: None,
            title: None,
            description: None,
            categories: Vec::new(),
            languages: Vec::new(),
            document_date: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationId {
    pub vocabulary: Option<String>,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Administrative {
    pub vocabulary: Option<String>,
    pub level: Option<u8>,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub srs_name: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// `@ref`, the handle result-level `<location ref>` elements point at.
    pub reference: Option<String>,
    pub location_reach: Option<String>,
    pub location_ids: Vec<LocationId>,
    pub name: Option<Narrative>,
    pub description: Option<Narrative>,
    pub activity_description: Option<Narrative>,
    pub administratives: Vec<Administrative>,
    pub point: Option<Point>,
    pub exactness: Option<String>,
    pub location_class: Option<String>,
    pub feature_designation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherFlag {
    pub code: String,
    pub significance: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub rate_1: Option<f64>,
    pub rate_2: Option<f64>,
    pub repayment_type: Option<String>,
    pub repayment_plan: Option<String>,
    pub commitment_date: Option<NaiveDate>,
    pub repayment_first_date: Option<NaiveDate>,
    pub repayment_final_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoanStatus {
    pub year: Option<i32>,
    pub currency: Option<String>,
    pub value_date: Option<NaiveDate>,
    pub interest_received: Option<f64>,
    pub principal_outstanding: Option<f64>,
    pub principal_arrears: Option<f64>,
    pub interest_arrears: Option<f64>,
}

/// `<crs-add>`: financing terms reported to the OECD CRS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancingTerms {
    pub other_flags: Vec<OtherFlag>,
    pub loan_terms: Option<LoanTerms>,
    pub loan_statuses: Vec<LoanStatus>,
    pub channel_code: Option<String>,
}

impl FinancingTerms {
    pub fn is_empty(&self) -> bool {
        self.other_flags.is_empty()
            && self.loan_terms.is_none()
            && self.loan_statuses.is_empty()
            && self.channel_code.is_none()
    }
}
