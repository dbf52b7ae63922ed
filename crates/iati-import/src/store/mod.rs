//! Write contract against the relational activity schema.
//!
//! The schema itself is owned by the host application; importers only see
//! [`Store`]. Every insert is a single row, there is no transaction spanning
//! a run, and constraint violations come back as [`StoreError`].

mod memory;

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use iati_model::{
    AidType, Budget, Condition, Contact, DocumentLink, LoanStatus, LoanTerms, Location, OtherFlag,
    PeriodValueKind, PolicyMarker, RecipientCountry, RecipientRegion, Reference, Sector, Tag,
};

use crate::error::StoreError;
use crate::resolver::OrganisationCategory;

pub use memory::InMemoryStore;

/// Primary key of a stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Organisations,
    Activities,
    ParticipatingOrgs,
    ActivitySectors,
    RecipientCountries,
    RecipientRegions,
    Locations,
    PolicyMarkers,
    Tags,
    Budgets,
    Transactions,
    TransactionSectors,
    TransactionRecipientCountries,
    TransactionRecipientRegions,
    TransactionAidTypes,
    Results,
    ResultReferences,
    Indicators,
    IndicatorReferences,
    Baselines,
    Periods,
    PeriodValues,
    Dimensions,
    LocationRefs,
    DocumentLinks,
    FinancingTerms,
    OtherFlags,
    LoanStatuses,
    Contacts,
    Conditions,
    ImportLogs,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organisations => "organisations",
            Self::Activities => "activities",
            Self::ParticipatingOrgs => "participating_orgs",
            Self::ActivitySectors => "activity_sectors",
            Self::RecipientCountries => "recipient_countries",
            Self::RecipientRegions => "recipient_regions",
            Self::Locations => "locations",
            Self::PolicyMarkers => "policy_markers",
            Self::Tags => "tags",
            Self::Budgets => "budgets",
            Self::Transactions => "transactions",
            Self::TransactionSectors => "transaction_sectors",
            Self::TransactionRecipientCountries => "transaction_recipient_countries",
            Self::TransactionRecipientRegions => "transaction_recipient_regions",
            Self::TransactionAidTypes => "transaction_aid_types",
            Self::Results => "results",
            Self::ResultReferences => "result_references",
            Self::Indicators => "indicators",
            Self::IndicatorReferences => "indicator_references",
            Self::Baselines => "baselines",
            Self::Periods => "periods",
            Self::PeriodValues => "period_values",
            Self::Dimensions => "dimensions",
            Self::LocationRefs => "location_refs",
            Self::DocumentLinks => "document_links",
            Self::FinancingTerms => "financing_terms",
            Self::OtherFlags => "other_flags",
            Self::LoanStatuses => "loan_statuses",
            Self::Contacts => "contacts",
            Self::Conditions => "conditions",
            Self::ImportLogs => "import_logs",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganisationRow {
    pub iati_ref: Option<String>,
    pub name: Option<String>,
    pub org_type: Option<String>,
    pub category: Option<OrganisationCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub iati_identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub reporting_org: Option<RowId>,
    pub default_currency: Option<String>,
    pub default_language: Option<String>,
    /// Created only because another activity pointed at it.
    pub stub: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipatingOrgRow {
    pub activity: RowId,
    pub organisation: Option<RowId>,
    pub role: String,
    pub linked_activity: Option<RowId>,
    pub crs_channel_code: Option<String>,
}

/// A transaction with its single-value convenience columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub activity: RowId,
    pub reference: Option<String>,
    pub humanitarian: Option<bool>,
    pub transaction_type: String,
    pub transaction_date: NaiveDate,
    pub value: f64,
    pub currency: String,
    pub value_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub provider_org: Option<RowId>,
    pub provider_activity: Option<RowId>,
    pub receiver_org: Option<RowId>,
    pub receiver_activity: Option<RowId>,
    pub disbursement_channel: Option<String>,
    pub flow_type: Option<String>,
    pub finance_type: Option<String>,
    pub tied_status: Option<String>,
    /// Projection of a sole 100% sector.
    pub sector_code: Option<String>,
    pub sector_vocabulary: Option<String>,
    /// Projection of a sole 100% recipient country.
    pub recipient_country_code: Option<String>,
    pub recipient_region_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub activity: RowId,
    pub result_type: Option<String>,
    pub aggregation_status: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub result: RowId,
    pub measure: String,
    pub ascending: bool,
    pub aggregation_status: Option<bool>,
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineRow {
    pub indicator: RowId,
    pub year: Option<i32>,
    pub iso_date: Option<NaiveDate>,
    pub value: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRow {
    pub indicator: RowId,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodValueRow {
    pub period: RowId,
    pub kind: PeriodValueKind,
    pub value: Option<String>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancingTermsRow {
    pub activity: RowId,
    pub loan_terms: Option<LoanTerms>,
    pub channel_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLogRow {
    pub activity: Option<RowId>,
    pub entity_type: String,
    pub source_name: String,
    /// Hex SHA-256 of the source text.
    pub source_sha256: String,
    pub created: usize,
    pub errors: usize,
    pub warnings: usize,
    /// First `max_logged_errors` error lines.
    pub logged_errors: Vec<String>,
    pub imported_at: DateTime<Utc>,
}

/// Owner of a baseline or period-value child (dimension, location ref).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "owner", content = "id", rename_all = "snake_case")]
pub enum ValueOwner {
    Baseline(RowId),
    PeriodValue(RowId),
}

impl ValueOwner {
    fn parent(self) -> (Table, RowId) {
        match self {
            Self::Baseline(id) => (Table::Baselines, id),
            Self::PeriodValue(id) => (Table::PeriodValues, id),
        }
    }
}

/// Owner of a document link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "owner", content = "id", rename_all = "snake_case")]
pub enum DocumentOwner {
    Activity(RowId),
    Result(RowId),
    Indicator(RowId),
    Baseline(RowId),
    PeriodValue(RowId),
}

impl DocumentOwner {
    fn parent(self) -> (Table, RowId) {
        match self {
            Self::Activity(id) => (Table::Activities, id),
            Self::Result(id) => (Table::Results, id),
            Self::Indicator(id) => (Table::Indicators, id),
            Self::Baseline(id) => (Table::Baselines, id),
            Self::PeriodValue(id) => (Table::PeriodValues, id),
        }
    }
}

/// One row to insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "table", rename_all = "snake_case")]
pub enum NewRow {
    Organisation(OrganisationRow),
    Activity(ActivityRow),
    ParticipatingOrg(ParticipatingOrgRow),
    Sector { activity: RowId, sector: Sector },
    RecipientCountry { activity: RowId, country: RecipientCountry },
    RecipientRegion { activity: RowId, region: RecipientRegion },
    Location { activity: RowId, location: Location },
    PolicyMarker { activity: RowId, marker: PolicyMarker },
    Tag { activity: RowId, tag: Tag },
    Budget { activity: RowId, budget: Budget },
    Transaction(TransactionRow),
    TransactionSector { transaction: RowId, sector: Sector },
    TransactionRecipientCountry { transaction: RowId, country: RecipientCountry },
    TransactionRecipientRegion { transaction: RowId, region: RecipientRegion },
    TransactionAidType { transaction: RowId, aid_type: AidType },
    Result(ResultRow),
    ResultReference { result: RowId, reference: Reference },
    Indicator(IndicatorRow),
    IndicatorReference { indicator: RowId, reference: Reference },
    Baseline(BaselineRow),
    Period(PeriodRow),
    PeriodValue(PeriodValueRow),
    Dimension { owner: ValueOwner, name: String, value: String },
    LocationRef {
        owner: ValueOwner,
        location_ref: String,
        /// Activity location with the same `@ref`, when one was imported.
        location: Option<RowId>,
    },
    DocumentLink { owner: DocumentOwner, link: DocumentLink },
    FinancingTerms(FinancingTermsRow),
    OtherFlag { financing: RowId, flag: OtherFlag },
    LoanStatus { financing: RowId, status: LoanStatus },
    Contact { activity: RowId, contact: Contact },
    Condition {
        activity: RowId,
        attached: Option<bool>,
        condition: Condition,
    },
    ImportLog(ImportLogRow),
}

impl NewRow {
    pub fn table(&self) -> Table {
        match self {
            Self::Organisation(_) => Table::Organisations,
            Self::Activity(_) => Table::Activities,
            Self::ParticipatingOrg(_) => Table::ParticipatingOrgs,
            Self::Sector { .. } => Table::ActivitySectors,
            Self::RecipientCountry { .. } => Table::RecipientCountries,
            Self::RecipientRegion { .. } => Table::RecipientRegions,
            Self::Location { .. } => Table::Locations,
            Self::PolicyMarker { .. } => Table::PolicyMarkers,
            Self::Tag { .. } => Table::Tags,
            Self::Budget { .. } => Table::Budgets,
            Self::Transaction(_) => Table::Transactions,
            Self::TransactionSector { .. } => Table::TransactionSectors,
            Self::TransactionRecipientCountry { .. } => Table::TransactionRecipientCountries,
            Self::TransactionRecipientRegion { .. } => Table::TransactionRecipientRegions,
            Self::TransactionAidType { .. } => Table::TransactionAidTypes,
            Self::Result(_) => Table::Results,
            Self::ResultReference { .. } => Table::ResultReferences,
            Self::Indicator(_) => Table::Indicators,
            Self::IndicatorReference { .. } => Table::IndicatorReferences,
            Self::Baseline(_) => Table::Baselines,
            Self::Period(_) => Table::Periods,
            Self::PeriodValue(_) => Table::PeriodValues,
            Self::Dimension { .. } => Table::Dimensions,
            Self::LocationRef { .. } => Table::LocationRefs,
            Self::DocumentLink { .. } => Table::DocumentLinks,
            Self::FinancingTerms(_) => Table::FinancingTerms,
            Self::OtherFlag { .. } => Table::OtherFlags,
            Self::LoanStatus { .. } => Table::LoanStatuses,
            Self::Contact { .. } => Table::Contacts,
            Self::Condition { .. } => Table::Conditions,
            Self::ImportLog(_) => Table::ImportLogs,
        }
    }

    /// Foreign keys that must point at existing rows.
    pub fn parents(&self) -> Vec<(Table, RowId)> {
        let activity = |id: &RowId| (Table::Activities, *id);
        match self {
            Self::Organisation(_) => Vec::new(),
            Self::Activity(row) => row
                .reporting_org
                .map(|id| (Table::Organisations, id))
                .into_iter()
                .collect(),
            Self::ParticipatingOrg(row) => {
                let mut parents = vec![activity(&row.activity)];
                parents.extend(row.organisation.map(|id| (Table::Organisations, id)));
                parents.extend(row.linked_activity.map(|id| (Table::Activities, id)));
                parents
            }
            Self::Sector { activity: id, .. }
            | Self::RecipientCountry { activity: id, .. }
            | Self::RecipientRegion { activity: id, .. }
            | Self::Location { activity: id, .. }
            | Self::PolicyMarker { activity: id, .. }
            | Self::Tag { activity: id, .. }
            | Self::Budget { activity: id, .. }
            | Self::Contact { activity: id, .. }
            | Self::Condition { activity: id, .. } => vec![activity(id)],
            Self::Transaction(row) => {
                let mut parents = vec![activity(&row.activity)];
                parents.extend(row.provider_org.map(|id| (Table::Organisations, id)));
                parents.extend(row.receiver_org.map(|id| (Table::Organisations, id)));
                parents.extend(row.provider_activity.map(|id| (Table::Activities, id)));
                parents.extend(row.receiver_activity.map(|id| (Table::Activities, id)));
                parents
            }
            Self::TransactionSector { transaction, .. }
            | Self::TransactionRecipientCountry { transaction, .. }
            | Self::TransactionRecipientRegion { transaction, .. }
            | Self::TransactionAidType { transaction, .. } => {
                vec![(Table::Transactions, *transaction)]
            }
            Self::Result(row) => vec![activity(&row.activity)],
            Self::ResultReference { result, .. } => vec![(Table::Results, *result)],
            Self::Indicator(row) => vec![(Table::Results, row.result)],
            Self::IndicatorReference { indicator, .. } => vec![(Table::Indicators, *indicator)],
            Self::Baseline(row) => vec![(Table::Indicators, row.indicator)],
            Self::Period(row) => vec![(Table::Indicators, row.indicator)],
            Self::PeriodValue(row) => vec![(Table::Periods, row.period)],
            Self::Dimension { owner, .. } => vec![owner.parent()],
            Self::LocationRef {
                owner, location, ..
            } => {
                let mut parents = vec![owner.parent()];
                parents.extend(location.map(|id| (Table::Locations, id)));
                parents
            }
            Self::DocumentLink { owner, .. } => vec![owner.parent()],
            Self::FinancingTerms(row) => vec![activity(&row.activity)],
            Self::OtherFlag { financing, .. } | Self::LoanStatus { financing, .. } => {
                vec![(Table::FinancingTerms, *financing)]
            }
            Self::ImportLog(row) => row
                .activity
                .map(|id| (Table::Activities, id))
                .into_iter()
                .collect(),
        }
    }
}

/// An organisation as seen by the entity resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganisationRecord {
    pub id: RowId,
    pub iati_ref: Option<String>,
    pub name: Option<String>,
}

/// Persistence API the importers write through.
pub trait Store {
    /// Insert one row, enforcing the schema's constraints.
    fn insert(&mut self, row: NewRow) -> Result<RowId, StoreError>;

    fn contains(&self, table: Table, id: RowId) -> bool;

    fn organisations(&self) -> Vec<OrganisationRecord>;

    fn find_activity(&self, iati_identifier: &str) -> Option<RowId>;

    /// Contacts already stored for `activity`, oldest first.
    fn contacts_for(&self, activity: RowId) -> Vec<(RowId, Contact)>;

    /// Replace the stored contact `id`.
    fn update_contact(&mut self, id: RowId, contact: Contact) -> Result<(), StoreError>;

    /// Locations already stored for `activity`, keyed by their `@ref`.
    fn location_refs(&self, activity: RowId) -> Vec<(String, RowId)>;
}
