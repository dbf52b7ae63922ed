//! Entity resolution: external references to local row ids.
//!
//! Organisations resolve by (1) exact IATI identifier, (2) name under the
//! configured [`MatchStrategy`], (3) creation from whatever fields exist.
//! Creation favours completing the import over referential strictness, so
//! slightly different spellings of one name can produce near-duplicates;
//! [`FuzzyNameMatch`] narrows that gap.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use iati_model::{
    ActivityRef, Counter, ImportSummary, MatchingMode, OrganisationRef, ParsedActivity,
    ReferenceKey,
};

use crate::error::StoreError;
use crate::store::{ActivityRow, NewRow, OrganisationRecord, OrganisationRow, RowId, Store};

/// Coarse grouping of the IATI OrganisationType codelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganisationCategory {
    Government,
    Ngo,
    Ingo,
    Multilateral,
    Private,
    Academic,
    Other,
}

impl OrganisationCategory {
    /// Category of an OrganisationType code; unknown codes are `Other`.
    pub fn from_org_type(code: &str) -> Self {
        match code.trim() {
            "10" | "11" | "15" => Self::Government,
            "21" => Self::Ingo,
            "22" | "23" | "24" => Self::Ngo,
            "30" | "40" => Self::Multilateral,
            "60" | "70" | "71" | "72" | "73" => Self::Private,
            "80" => Self::Academic,
            _ => Self::Other,
        }
    }
}

/// How an organisation name is compared with stored names.
pub trait MatchStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether `wanted` and `stored` name the same organisation.
    fn names_match(&self, wanted: &str, stored: &str) -> bool;
}

/// Case-insensitive comparison of trimmed names.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl MatchStrategy for ExactMatch {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn names_match(&self, wanted: &str, stored: &str) -> bool {
        wanted.trim().to_lowercase() == stored.trim().to_lowercase()
    }
}

/// Ignores case, punctuation, repeated whitespace and a leading "the".
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyNameMatch;

impl FuzzyNameMatch {
    fn normalize(name: &str) -> String {
        let cleaned: String = name
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_lowercase().next().unwrap_or(c)
                } else {
                    ' '
                }
            })
            .collect();
        let words: Vec<&str> = cleaned.split_whitespace().collect();
        let words = match words.split_first() {
            Some((&"the", rest)) if !rest.is_empty() => rest,
            _ => &words[..],
        };
        words.join(" ")
    }
}

impl MatchStrategy for FuzzyNameMatch {
    fn name(&self) -> &'static str {
        "fuzzy"
    }

    fn names_match(&self, wanted: &str, stored: &str) -> bool {
        let wanted = Self::normalize(wanted);
        !wanted.is_empty() && wanted == Self::normalize(stored)
    }
}

/// Strategy for a configured [`MatchingMode`].
pub fn strategy_for(mode: MatchingMode) -> Box<dyn MatchStrategy> {
    match mode {
        MatchingMode::Exact => Box::new(ExactMatch),
        MatchingMode::Fuzzy => Box::new(FuzzyNameMatch),
    }
}

/// Outcome of one organisation resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub id: RowId,
    pub created: bool,
}

#[derive(Debug)]
pub struct EntityResolver {
    strategy: Box<dyn MatchStrategy>,
}

impl Default for EntityResolver {
    fn default() -> Self {
        Self::new(Box::new(ExactMatch))
    }
}

impl EntityResolver {
    pub fn new(strategy: Box<dyn MatchStrategy>) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &dyn MatchStrategy {
        self.strategy.as_ref()
    }

    /// Resolve `reference`, creating the organisation on a miss.
    ///
    /// `Ok(None)` when the reference carries neither identifier nor name.
    pub fn resolve_organisation(
        &self,
        store: &mut dyn Store,
        reference: &OrganisationRef,
    ) -> Result<Option<Resolved>, StoreError> {
        if reference.is_empty() {
            return Ok(None);
        }
        let existing = store.organisations();
        if let Some(id) = self.find(&existing, reference) {
            return Ok(Some(Resolved { id, created: false }));
        }
        let org_type = reference.org_type.clone();
        let category = org_type.as_deref().map(OrganisationCategory::from_org_type);
        let id = store.insert(NewRow::Organisation(OrganisationRow {
            iati_ref: reference.iati_ref.clone(),
            name: reference.name_text().map(str::to_string),
            org_type,
            category,
        }))?;
        debug!(organisation = %reference, id = %id, "created organisation");
        Ok(Some(Resolved { id, created: true }))
    }

    fn find(&self, existing: &[OrganisationRecord], reference: &OrganisationRef) -> Option<RowId> {
        if let Some(wanted) = reference.iati_ref.as_deref()
            && let Some(record) = existing
                .iter()
                .find(|record| record.iati_ref.as_deref() == Some(wanted))
        {
            return Some(record.id);
        }
        let wanted = reference.name_text()?;
        existing
            .iter()
            .find(|record| {
                record
                    .name
                    .as_deref()
                    .is_some_and(|stored| self.strategy.names_match(wanted, stored))
            })
            .map(|record| record.id)
    }

    /// Resolve an activity by identifier, creating a stub on a miss.
    pub fn resolve_activity(
        &self,
        store: &mut dyn Store,
        reference: &ActivityRef,
    ) -> Result<Resolved, StoreError> {
        let identifier = reference.identifier.trim();
        if let Some(id) = store.find_activity(identifier) {
            return Ok(Resolved { id, created: false });
        }
        let id = store.insert(NewRow::Activity(ActivityRow {
            iati_identifier: Some(identifier.to_string()),
            stub: true,
            ..ActivityRow::default()
        }))?;
        debug!(activity = identifier, id = %id, "created activity stub");
        Ok(Resolved { id, created: true })
    }
}

/// Every reference in one activity, resolved ahead of the importers.
#[derive(Debug, Clone, Default)]
pub struct ResolvedReferences {
    organisations: BTreeMap<ReferenceKey, RowId>,
    activities: BTreeMap<String, RowId>,
}

impl ResolvedReferences {
    pub fn organisation(&self, reference: &OrganisationRef) -> Option<RowId> {
        self.organisations.get(&reference.key()).copied()
    }

    pub fn activity(&self, reference: &ActivityRef) -> Option<RowId> {
        self.activities.get(reference.identifier.trim()).copied()
    }

    pub fn organisation_count(&self) -> usize {
        self.organisations.len()
    }

    pub fn activity_count(&self) -> usize {
        self.activities.len()
    }
}

/// Resolve every organisation and linked activity `activity` mentions.
///
/// Failures never escape: the reference stays unresolved and a warning is
/// recorded, so importers store the element without the link.
pub fn resolve_references(
    resolver: &EntityResolver,
    store: &mut dyn Store,
    activity: &ParsedActivity,
) -> (ResolvedReferences, ImportSummary) {
    let mut resolved = ResolvedReferences::default();
    let mut summary = ImportSummary::new();

    let organisations = activity
        .reporting_org
        .iter()
        .chain(activity.participating_orgs.iter().map(|p| &p.organisation))
        .chain(activity.transactions.iter().flat_map(|t| {
            t.provider_org
                .iter()
                .chain(t.receiver_org.iter())
                .map(|party| &party.organisation)
        }));
    for reference in organisations {
        let key = reference.key();
        if key == ReferenceKey::Anonymous || resolved.organisations.contains_key(&key) {
            continue;
        }
        match resolver.resolve_organisation(store, reference) {
            Ok(Some(outcome)) => {
                if outcome.created {
                    summary.record(Counter::OrganisationsCreated);
                }
                resolved.organisations.insert(key, outcome.id);
            }
            Ok(None) => {}
            Err(error) => {
                warn!(organisation = %reference, %error, "organisation left unresolved");
                summary.warn(format!("organisation {reference} left unresolved: {error}"));
            }
        }
    }

    let activities = activity
        .participating_orgs
        .iter()
        .filter_map(|p| p.activity_id.as_ref())
        .chain(activity.transactions.iter().flat_map(|t| {
            t.provider_org
                .iter()
                .chain(t.receiver_org.iter())
                .filter_map(|party| party.activity.as_ref())
        }));
    for reference in activities {
        let identifier = reference.identifier.trim().to_string();
        if identifier.is_empty() || resolved.activities.contains_key(&identifier) {
            continue;
        }
        match resolver.resolve_activity(store, reference) {
            Ok(outcome) => {
                if outcome.created {
                    summary.record(Counter::ActivitiesCreated);
                }
                resolved.activities.insert(identifier, outcome.id);
            }
            Err(error) => {
                warn!(activity = %identifier, %error, "linked activity left unresolved");
                summary.warn(format!("activity {identifier} left unresolved: {error}"));
            }
        }
    }

    (resolved, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use iati_model::Narrative;

    fn org(iati_ref: Option<&str>, name: Option<&str>) -> OrganisationRef {
        OrganisationRef {
            iati_ref: iati_ref.map(str::to_string),
            name: name.map(Narrative::new),
            org_type: Some("22".to_string()),
        }
    }

    #[test]
    fn resolution_order_is_ref_then_name_then_create() {
        let mut store = InMemoryStore::new();
        let resolver = EntityResolver::default();

        let created = resolver
            .resolve_organisation(&mut store, &org(Some("GB-CHC-1"), Some("Oxfam GB")))
            .unwrap()
            .unwrap();
        assert!(created.created);

        let by_ref = resolver
            .resolve_organisation(&mut store, &org(Some("GB-CHC-1"), Some("Other name")))
            .unwrap()
            .unwrap();
        assert_eq!(by_ref, Resolved { id: created.id, created: false });

        let by_name = resolver
            .resolve_organisation(&mut store, &org(None, Some("  oxfam gb ")))
            .unwrap()
            .unwrap();
        assert_eq!(by_name.id, created.id);

        assert!(resolver
            .resolve_organisation(&mut store, &org(None, None))
            .unwrap()
            .is_none());
    }

    #[test]
    fn created_organisation_records_category() {
        let mut store = InMemoryStore::new();
        let resolved = EntityResolver::default()
            .resolve_organisation(&mut store, &org(None, Some("Local NGO")))
            .unwrap()
            .unwrap();
        match store.get(resolved.id) {
            Some(NewRow::Organisation(row)) => {
                assert_eq!(row.category, Some(OrganisationCategory::Ngo));
            }
            other => panic!("unexpected row {other:?}"),
        }
    }

    #[test]
    fn unknown_org_type_falls_back_to_other() {
        assert_eq!(OrganisationCategory::from_org_type(" 80 "), OrganisationCategory::Academic);
        assert_eq!(OrganisationCategory::from_org_type("90"), OrganisationCategory::Other);
        assert_eq!(OrganisationCategory::from_org_type("999"), OrganisationCategory::Other);

        let mut store = InMemoryStore::new();
        let mut reference = org(None, Some("Unlisted body"));
        reference.org_type = Some("999".to_string());
        let resolved = EntityResolver::default()
            .resolve_organisation(&mut store, &reference)
            .unwrap()
            .unwrap();
        match store.get(resolved.id) {
            Some(NewRow::Organisation(row)) => {
                assert_eq!(row.category, Some(OrganisationCategory::Other));
            }
            other => panic!("unexpected row {other:?}"),
        }
    }

    #[test]
    fn fuzzy_strategy_ignores_punctuation_and_article() {
        let fuzzy = FuzzyNameMatch;
        assert!(fuzzy.names_match("The World Bank", "world bank"));
        assert!(fuzzy.names_match("Save the Children, UK", "save the children uk"));
        assert!(!fuzzy.names_match("World Bank", "World Food Programme"));
        assert!(!ExactMatch.names_match("The World Bank", "world bank"));
    }

    #[test]
    fn activity_stub_is_created_once() {
        let mut store = InMemoryStore::new();
        let resolver = EntityResolver::default();
        let reference = ActivityRef::new("GB-GOV-1-300");
        let first = resolver.resolve_activity(&mut store, &reference).unwrap();
        let second = resolver.resolve_activity(&mut store, &reference).unwrap();
        assert!(first.created);
        assert_eq!(second, Resolved { id: first.id, created: false });
    }
}
