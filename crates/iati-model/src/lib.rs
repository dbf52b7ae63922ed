//! Typed IATI activity model shared by the parser, validator and importers.

pub mod activity;
pub mod elements;
pub mod error;
pub mod family;
pub mod group;
pub mod narrative;
pub mod options;
pub mod reference;
pub mod result;
pub mod summary;
pub mod transaction;

pub use activity::{ActivityDefaults, FamilySelection, ParsedActivity};
pub use elements::{
    Administrative, AidType, Budget, Condition, Contact, Coordinates, DocumentLink,
    FinancingTerms, LoanStatus, LoanTerms, Location, LocationId, OtherFlag, ParticipatingOrg,
    Point, PolicyMarker, RecipientCountry, RecipientRegion, Sector, Tag,
};
pub use error::{ModelError, Result};
pub use family::Family;
pub use group::{
    DEFAULT_PERCENTAGE_TOLERANCE, MultiValueGroup, PercentageUse, Weighted, percentage_use,
    sums_to_hundred,
};
pub use narrative::Narrative;
pub use options::{ImportOptions, MatchingMode};
pub use reference::{ActivityRef, OrganisationRef, ReferenceKey};
pub use result::{
    ActivityResult, Baseline, Dimension, Indicator, Period, PeriodValue, PeriodValueKind,
    Reference,
};
pub use summary::{Counter, Coverage, ImportIssue, ImportSummary};
pub use transaction::{Transaction, TransactionParty};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_activity_serializes() {
        let activity = ParsedActivity {
            iati_identifier: Some("XM-DAC-41114-PROJECT-00089027".to_string()),
            sectors: vec![Sector::new("111").with_vocabulary("2")]
                .into_iter()
                .collect(),
            ..ParsedActivity::default()
        };
        let json = serde_json::to_string(&activity).expect("serialize activity");
        let round: ParsedActivity = serde_json::from_str(&json).expect("deserialize activity");
        assert_eq!(round, activity);
    }
}
