use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::elements::{
    AidType, Budget, Condition, Contact, DocumentLink, FinancingTerms, Location, ParticipatingOrg,
    PolicyMarker, RecipientCountry, RecipientRegion, Sector, Tag,
};
use crate::family::Family;
use crate::group::MultiValueGroup;
use crate::narrative::Narrative;
use crate::reference::OrganisationRef;
use crate::result::ActivityResult;
use crate::transaction::Transaction;

/// Activity-wide defaults that fill missing transaction and budget attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDefaults {
    pub currency: Option<String>,
    pub language: Option<String>,
    pub flow_type: Option<String>,
    pub finance_type: Option<String>,
    pub aid_types: Vec<AidType>,
    pub tied_status: Option<String>,
}

/// One `<iati-activity>` (or snippet) converted into typed element families.
///
/// A missing family is an empty collection, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedActivity {
    pub iati_identifier: Option<String>,
    pub defaults: ActivityDefaults,
    pub title: Option<Narrative>,
    pub description: Option<Narrative>,
    pub reporting_org: Option<OrganisationRef>,
    pub participating_orgs: Vec<ParticipatingOrg>,
    pub sectors: MultiValueGroup<Sector>,
    pub recipient_countries: MultiValueGroup<RecipientCountry>,
    pub recipient_regions: MultiValueGroup<RecipientRegion>,
    pub locations: Vec<Location>,
    pub policy_markers: Vec<PolicyMarker>,
    pub tags: Vec<Tag>,
    pub budgets: Vec<Budget>,
    pub transactions: Vec<Transaction>,
    pub results: Vec<ActivityResult>,
    pub financing_terms: Option<FinancingTerms>,
    pub contacts: Vec<Contact>,
    pub conditions_attached: Option<bool>,
    pub conditions: Vec<Condition>,
    pub documents: Vec<DocumentLink>,
    /// Elements the parser skipped, e.g. a document-link without url.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parse_warnings: Vec<String>,
}

impl ParsedActivity {
    /// Number of top-level elements parsed for `family`.
    pub fn family_len(&self, family: Family) -> usize {
        match family {
            Family::ParticipatingOrgs => self.participating_orgs.len(),
            Family::Sectors => self.sectors.len(),
            Family::RecipientGeography => {
                self.recipient_countries.len() + self.recipient_regions.len()
            }
            Family::Locations => self.locations.len(),
            Family::PolicyMarkers => self.policy_markers.len(),
            Family::Tags => self.tags.len(),
            Family::Budgets => self.budgets.len(),
            Family::Transactions => self.transactions.len(),
            Family::Results => self.results.len(),
            Family::FinancingTerms => usize::from(self.financing_terms.is_some()),
            Family::Contacts => self.contacts.len(),
            Family::Conditions => self.conditions.len(),
            Family::Documents => self.documents.len(),
        }
    }

    /// Element counts per family, for the review step before import.
    pub fn family_counts(&self) -> BTreeMap<Family, usize> {
        Family::ALL
            .iter()
            .map(|family| (*family, self.family_len(*family)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        Family::ALL.iter().all(|family| self.family_len(*family) == 0)
    }

    /// Whether any transaction declares its own sectors.
    pub fn has_transaction_sectors(&self) -> bool {
        self.transactions.iter().any(|t| !t.sectors.is_empty())
    }
}

/// Which families and elements a reviewer chose to import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySelection {
    families: BTreeSet<Family>,
    /// `(family, index)` of top-level elements to leave out.
    excluded: BTreeSet<(Family, usize)>,
    /// Positions among `recipient-region` elements only.
    #[serde(default)]
    excluded_regions: BTreeSet<usize>,
}

impl Default for FamilySelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FamilySelection {
    pub fn all() -> Self {
        Self::only(Family::ALL)
    }

    pub fn only(families: impl IntoIterator<Item = Family>) -> Self {
        Self {
            families: families.into_iter().collect(),
            excluded: BTreeSet::new(),
            excluded_regions: BTreeSet::new(),
        }
    }

    pub fn exclude(mut self, family: Family, index: usize) -> Self {
        self.excluded.insert((family, index));
        self
    }

    /// Leave out the region at `index`, counted the way issue paths count
    /// `recipient-region[n]` (regions only, zero-based).
    pub fn exclude_region(mut self, index: usize) -> Self {
        self.excluded_regions.insert(index);
        self
    }

    pub fn includes(&self, family: Family) -> bool {
        self.families.contains(&family)
    }

    pub fn is_excluded(&self, family: Family, index: usize) -> bool {
        !self.includes(family) || self.excluded.contains(&(family, index))
    }

    pub fn families(&self) -> impl Iterator<Item = Family> + '_ {
        self.families.iter().copied()
    }

    /// Drop unselected families and excluded elements from `activity`.
    ///
    /// [`exclude`](Self::exclude) on recipient geography counts countries
    /// first, then regions; [`exclude_region`](Self::exclude_region) counts
    /// regions alone.
    pub fn apply(&self, activity: &mut ParsedActivity) {
        retain_indexed(&mut activity.participating_orgs, |i| {
            !self.is_excluded(Family::ParticipatingOrgs, i)
        });
        let mut sectors = std::mem::take(&mut activity.sectors).into_members();
        retain_indexed(&mut sectors, |i| !self.is_excluded(Family::Sectors, i));
        activity.sectors = MultiValueGroup::new(sectors);

        let country_count = activity.recipient_countries.len();
        let mut countries = std::mem::take(&mut activity.recipient_countries).into_members();
        retain_indexed(&mut countries, |i| {
            !self.is_excluded(Family::RecipientGeography, i)
        });
        activity.recipient_countries = MultiValueGroup::new(countries);
        let mut regions = std::mem::take(&mut activity.recipient_regions).into_members();
        retain_indexed(&mut regions, |i| {
            !self.is_excluded(Family::RecipientGeography, country_count + i)
                && !self.excluded_regions.contains(&i)
        });
        activity.recipient_regions = MultiValueGroup::new(regions);

        retain_indexed(&mut activity.locations, |i| {
            !self.is_excluded(Family::Locations, i)
        });
        retain_indexed(&mut activity.policy_markers, |i| {
            !self.is_excluded(Family::PolicyMarkers, i)
        });
        retain_indexed(&mut activity.tags, |i| !self.is_excluded(Family::Tags, i));
        retain_indexed(&mut activity.budgets, |i| {
            !self.is_excluded(Family::Budgets, i)
        });
        retain_indexed(&mut activity.transactions, |i| {
            !self.is_excluded(Family::Transactions, i)
        });
        retain_indexed(&mut activity.results, |i| {
            !self.is_excluded(Family::Results, i)
        });
        if self.is_excluded(Family::FinancingTerms, 0) {
            activity.financing_terms = None;
        }
        retain_indexed(&mut activity.contacts, |i| {
            !self.is_excluded(Family::Contacts, i)
        });
        retain_indexed(&mut activity.conditions, |i| {
            !self.is_excluded(Family::Conditions, i)
        });
        retain_indexed(&mut activity.documents, |i| {
            !self.is_excluded(Family::Documents, i)
        });
    }
}

fn retain_indexed<T>(items: &mut Vec<T>, mut keep: impl FnMut(usize) -> bool) {
    let mut index = 0;
    items.retain(|_| {
        let keep_item = keep(index);
        index += 1;
        keep_item
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Sector;

    fn activity_with_sectors(codes: &[&str]) -> ParsedActivity {
        ParsedActivity {
            sectors: codes.iter().map(|code| Sector::new(*code)).collect(),
            ..ParsedActivity::default()
        }
    }

    #[test]
    fn counts_every_family() {
        let activity = activity_with_sectors(&["11110", "11120"]);
        let counts = activity.family_counts();
        assert_eq!(counts.len(), Family::ALL.len());
        assert_eq!(counts[&Family::Sectors], 2);
        assert_eq!(counts[&Family::Results], 0);
        assert!(!activity.is_empty());
        assert!(ParsedActivity::default().is_empty());
    }

    #[test]
    fn selection_drops_families_and_elements() {
        let mut activity = activity_with_sectors(&["11110", "11120", "11130"]);
        activity.documents.push(DocumentLink::new("https://example.org/a.pdf"));

        FamilySelection::only([Family::Sectors])
            .exclude(Family::Sectors, 1)
            .apply(&mut activity);

        let codes: Vec<&str> = activity.sectors.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["11110", "11130"]);
        assert!(activity.documents.is_empty());
    }

    #[test]
    fn region_exclusion_counts_regions_only() {
        let region = |code: &str| RecipientRegion {
            code: code.to_string(),
            vocabulary: "1".to_string(),
            vocabulary_uri: None,
            percentage: None,
            narrative: None,
        };
        let mut activity = ParsedActivity {
            recipient_countries: MultiValueGroup::new(vec![RecipientCountry {
                code: "TZ".to_string(),
                percentage: None,
                narrative: None,
            }]),
            recipient_regions: MultiValueGroup::new(vec![region("298"), region("289")]),
            ..ParsedActivity::default()
        };

        FamilySelection::all().exclude_region(0).apply(&mut activity);

        let countries: Vec<&str> = activity
            .recipient_countries
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        let regions: Vec<&str> = activity
            .recipient_regions
            .iter()
            .map(|r| r.code.as_str())
            .collect();
        assert_eq!(countries, vec!["TZ"]);
        assert_eq!(regions, vec!["289"]);
    }
}
