//! Request-scoped result of one import run.
//!
//! Every importer returns its own partial [`ImportSummary`]; the
//! orchestrator folds them together with [`ImportSummary::merge`]. Merging
//! is associative and [`ImportSummary::default`] is its identity, so the
//! order in which independent families finish does not change the result
//! beyond the order of the error and warning lists.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::family::Family;

/// A created-row counter reported in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    ActivitiesCreated,
    OrganisationsCreated,
    ParticipatingOrgsCreated,
    SectorsCreated,
    RecipientCountriesCreated,
    RecipientRegionsCreated,
    LocationsCreated,
    PolicyMarkersCreated,
    TagsCreated,
    BudgetsCreated,
    TransactionsCreated,
    TransactionSectorsCreated,
    TransactionCountriesCreated,
    TransactionRegionsCreated,
    TransactionAidTypesCreated,
    ResultsCreated,
    ResultReferencesCreated,
    ResultDocumentLinksCreated,
    IndicatorsCreated,
    IndicatorReferencesCreated,
    IndicatorDocumentLinksCreated,
    BaselinesCreated,
    BaselineDimensionsCreated,
    BaselineLocationsCreated,
    BaselineDocumentLinksCreated,
    PeriodsCreated,
    PeriodTargetsCreated,
    PeriodActualsCreated,
    PeriodDimensionsCreated,
    PeriodLocationsCreated,
    PeriodDocumentLinksCreated,
    FinancingTermsCreated,
    OtherFlagsCreated,
    LoanStatusesCreated,
    ContactsCreated,
    ContactsMerged,
    ConditionsCreated,
    DocumentLinksCreated,
}

impl Counter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ActivitiesCreated => "activities_created",
            Self::OrganisationsCreated => "organisations_created",
            Self::ParticipatingOrgsCreated => "participating_orgs_created",
            Self::SectorsCreated => "sectors_created",
            Self::RecipientCountriesCreated => "recipient_countries_created",
            Self::RecipientRegionsCreated => "recipient_regions_created",
            Self::LocationsCreated => "locations_created",
            Self::PolicyMarkersCreated => "policy_markers_created",
            Self::TagsCreated => "tags_created",
            Self::BudgetsCreated => "budgets_created",
            Self::TransactionsCreated => "transactions_created",
            Self::TransactionSectorsCreated => "transaction_sectors_created",
            Self::TransactionCountriesCreated => "transaction_countries_created",
            Self::TransactionRegionsCreated => "transaction_regions_created",
            Self::TransactionAidTypesCreated => "transaction_aid_types_created",
            Self::ResultsCreated => "results_created",
            Self::ResultReferencesCreated => "result_references_created",
            Self::ResultDocumentLinksCreated => "result_document_links_created",
            Self::IndicatorsCreated => "indicators_created",
            Self::IndicatorReferencesCreated => "indicator_references_created",
            Self::IndicatorDocumentLinksCreated => "indicator_document_links_created",
            Self::BaselinesCreated => "baselines_created",
            Self::BaselineDimensionsCreated => "baseline_dimensions_created",
            Self::BaselineLocationsCreated => "baseline_locations_created",
            Self::BaselineDocumentLinksCreated => "baseline_document_links_created",
            Self::PeriodsCreated => "periods_created",
            Self::PeriodTargetsCreated => "period_targets_created",
            Self::PeriodActualsCreated => "period_actuals_created",
            Self::PeriodDimensionsCreated => "period_dimensions_created",
            Self::PeriodLocationsCreated => "period_locations_created",
            Self::PeriodDocumentLinksCreated => "period_document_links_created",
            Self::FinancingTermsCreated => "financing_terms_created",
            Self::OtherFlagsCreated => "other_flags_created",
            Self::LoanStatusesCreated => "loan_statuses_created",
            Self::ContactsCreated => "contacts_created",
            Self::ContactsMerged => "contacts_merged",
            Self::ConditionsCreated => "conditions_created",
            Self::DocumentLinksCreated => "document_links_created",
        }
    }

    /// Family whose importer owns the counter; `None` for resolver-created rows.
    pub fn family(self) -> Option<Family> {
        let family = match self {
            Self::ActivitiesCreated | Self::OrganisationsCreated => return None,
            Self::ParticipatingOrgsCreated => Family::ParticipatingOrgs,
            Self::SectorsCreated => Family::Sectors,
            Self::RecipientCountriesCreated | Self::RecipientRegionsCreated => {
                Family::RecipientGeography
            }
            Self::LocationsCreated => Family::Locations,
            Self::PolicyMarkersCreated => Family::PolicyMarkers,
            Self::TagsCreated => Family::Tags,
            Self::BudgetsCreated => Family::Budgets,
            Self::TransactionsCreated
            | Self::TransactionSectorsCreated
            | Self::TransactionCountriesCreated
            | Self::TransactionRegionsCreated
            | Self::TransactionAidTypesCreated => Family::Transactions,
            Self::ResultsCreated
            | Self::ResultReferencesCreated
            | Self::ResultDocumentLinksCreated
            | Self::IndicatorsCreated
            | Self::IndicatorReferencesCreated
            | Self::IndicatorDocumentLinksCreated
            | Self::BaselinesCreated
            | Self::BaselineDimensionsCreated
            | Self::BaselineLocationsCreated
            | Self::BaselineDocumentLinksCreated
            | Self::PeriodsCreated
            | Self::PeriodTargetsCreated
            | Self::PeriodActualsCreated
            | Self::PeriodDimensionsCreated
            | Self::PeriodLocationsCreated
            | Self::PeriodDocumentLinksCreated => Family::Results,
            Self::FinancingTermsCreated | Self::OtherFlagsCreated | Self::LoanStatusesCreated => {
                Family::FinancingTerms
            }
            Self::ContactsCreated | Self::ContactsMerged => Family::Contacts,
            Self::ConditionsCreated => Family::Conditions,
            Self::DocumentLinksCreated => Family::Documents,
        };
        Some(family)
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal failure scoped to one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportIssue {
    /// IATI element path, e.g. `period/target/dimension`.
    pub element: String,
    pub message: String,
    /// Indexed location in the source, e.g. `result[2]/indicator[1]/period[4]/target[1]/dimension[2]`.
    pub context: String,
}

impl ImportIssue {
    pub fn new(
        element: impl Into<String>,
        message: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
            context: context.into(),
        }
    }
}

impl fmt::Display for ImportIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.element, self.context, self.message)
    }
}

/// Presence of optional sub-elements per hierarchy level.
///
/// Levels and items are declared up front so an absent item reads `false`
/// rather than missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coverage(BTreeMap<String, BTreeMap<String, bool>>);

impl Coverage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `items` for `level` without marking any as present.
    pub fn declare(&mut self, level: &str, items: &[&str]) {
        let entry = self.0.entry(level.to_string()).or_default();
        for item in items {
            entry.entry((*item).to_string()).or_insert(false);
        }
    }

    /// Record that `item` was (or was not) seen at `level`. Presence is sticky.
    pub fn mark(&mut self, level: &str, item: &str, present: bool) {
        let slot = self
            .0
            .entry(level.to_string())
            .or_default()
            .entry(item.to_string())
            .or_insert(false);
        *slot |= present;
    }

    pub fn level(&self, level: &str) -> Option<&BTreeMap<String, bool>> {
        self.0.get(level)
    }

    pub fn levels(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, bool>)> {
        self.0.iter().map(|(level, items)| (level.as_str(), items))
    }

    /// Share of declared items present at `level`, in `0.0..=1.0`.
    pub fn fraction(&self, level: &str) -> Option<f64> {
        let items = self.0.get(level)?;
        if items.is_empty() {
            return None;
        }
        let present = items.values().filter(|present| **present).count();
        Some(present as f64 / items.len() as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn merge(&mut self, other: Coverage) {
        for (level, items) in other.0 {
            for (item, present) in items {
                self.mark(&level, &item, present);
            }
        }
    }
}

/// Aggregate outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: BTreeMap<Counter, usize>,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<String>,
    pub coverage: Coverage,
}

impl ImportSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, counter: Counter) -> usize {
        self.created.get(&counter).copied().unwrap_or(0)
    }

    pub fn record(&mut self, counter: Counter) {
        self.add(counter, 1);
    }

    pub fn add(&mut self, counter: Counter, amount: usize) {
        if amount == 0 {
            return;
        }
        *self.created.entry(counter).or_insert(0) += amount;
    }

    pub fn error(&mut self, issue: ImportIssue) {
        self.errors.push(issue);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Combine two partial summaries. Counts add, lists concatenate
    /// (`self` first), coverage presence is or-ed.
    #[must_use]
    pub fn merge(mut self, other: ImportSummary) -> ImportSummary {
        self.absorb(other);
        self
    }

    /// In-place form of [`ImportSummary::merge`].
    pub fn absorb(&mut self, other: ImportSummary) {
        for (counter, amount) in other.created {
            self.add(counter, amount);
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.coverage.merge(other.coverage);
    }

    /// Rows created by one family's importer.
    pub fn family_created(&self, family: Family) -> usize {
        self.created
            .iter()
            .filter(|(counter, _)| counter.family() == Some(family) && **counter != Counter::ContactsMerged)
            .map(|(_, amount)| *amount)
            .sum()
    }

    pub fn total_created(&self) -> usize {
        self.created
            .iter()
            .filter(|(counter, _)| **counter != Counter::ContactsMerged)
            .map(|(_, amount)| *amount)
            .sum()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl std::iter::Sum for ImportSummary {
    fn sum<I: Iterator<Item = ImportSummary>>(iter: I) -> Self {
        iter.fold(ImportSummary::default(), ImportSummary::merge)
    }
}
