//! Percentage-sum checks for multi-value groups.
//!
//! A group either gives every member a percentage or none, and the
//! percentages sum to 100 within the tolerance. Violations warn; the group
//! is still imported as declared.

use std::collections::BTreeMap;

use iati_model::{ParsedActivity, PercentageUse, Weighted, percentage_use, sums_to_hundred};
use tracing::warn;

use crate::warning::ValidationWarning;

struct Share(Option<f64>);

impl Weighted for Share {
    fn percentage(&self) -> Option<f64> {
        self.0
    }
}

pub fn check(activity: &ParsedActivity, tolerance: f64) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut by_vocabulary: BTreeMap<&str, Vec<Share>> = BTreeMap::new();
    for sector in &activity.sectors {
        by_vocabulary
            .entry(sector.vocabulary.as_str())
            .or_default()
            .push(Share(sector.percentage));
    }
    for (vocabulary, shares) in &by_vocabulary {
        let label = format!("sector percentages for vocabulary {vocabulary}");
        warnings.extend(group("sector", &label, shares, tolerance));
    }

    let geography: Vec<Share> = activity
        .recipient_countries
        .iter()
        .map(|c| Share(c.percentage))
        .chain(activity.recipient_regions.iter().map(|r| Share(r.percentage)))
        .collect();
    warnings.extend(group(
        "recipient-country/recipient-region",
        "recipient country and region percentages",
        &geography,
        tolerance,
    ));

    for (index, transaction) in activity.transactions.iter().enumerate() {
        let parent = format!("transaction[{}]", index + 1);
        let sectors: Vec<Share> = transaction
            .sectors
            .iter()
            .map(|s| Share(s.percentage))
            .collect();
        warnings.extend(group(
            &format!("{parent}/sector"),
            "transaction sector percentages",
            &sectors,
            tolerance,
        ));
        let countries: Vec<Share> = transaction
            .recipient_countries
            .iter()
            .map(|c| Share(c.percentage))
            .collect();
        warnings.extend(group(
            &format!("{parent}/recipient-country"),
            "transaction recipient country percentages",
            &countries,
            tolerance,
        ));
        let regions: Vec<Share> = transaction
            .recipient_regions
            .iter()
            .map(|r| Share(r.percentage))
            .collect();
        warnings.extend(group(
            &format!("{parent}/recipient-region"),
            "transaction recipient region percentages",
            &regions,
            tolerance,
        ));
    }

    warnings
}

fn group(
    element: &str,
    label: &str,
    shares: &[Share],
    tolerance: f64,
) -> Option<ValidationWarning> {
    let message = match percentage_use(shares) {
        PercentageUse::None => return None,
        PercentageUse::All(sum) if sums_to_hundred(sum, tolerance) => return None,
        PercentageUse::All(sum) => format!("{label} sum to {sum}, expected 100"),
        PercentageUse::Mixed { with, without } => format!(
            "{label}: {with} member(s) carry a percentage and {without} do not"
        ),
    };
    warn!(element = %element, "{message}");
    Some(ValidationWarning::new(element, message))
}

#[cfg(test)]
mod tests {
    use iati_model::{RecipientCountry, Sector};

    use super::*;

    fn country(code: &str, percentage: f64) -> RecipientCountry {
        RecipientCountry {
            code: code.to_string(),
            percentage: Some(percentage),
            narrative: None,
        }
    }

    #[test]
    fn geography_sum_of_ninety_five_warns_once() {
        let activity = ParsedActivity {
            recipient_countries: vec![country("TZ", 60.0), country("KE", 35.0)]
                .into_iter()
                .collect(),
            ..ParsedActivity::default()
        };
        let warnings = check(&activity, 0.01);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("sum to 95"));
    }

    #[test]
    fn sectors_are_summed_per_vocabulary() {
        let activity = ParsedActivity {
            sectors: vec![
                Sector::new("11110").with_percentage(50.0),
                Sector::new("11120").with_percentage(50.0),
                Sector::new("1").with_vocabulary("99").with_percentage(100.0),
            ]
            .into_iter()
            .collect(),
            ..ParsedActivity::default()
        };
        assert!(check(&activity, 0.01).is_empty());
    }

    #[test]
    fn rounding_within_tolerance_passes() {
        let activity = ParsedActivity {
            sectors: vec![
                Sector::new("11110").with_percentage(33.33),
                Sector::new("11120").with_percentage(33.33),
                Sector::new("11130").with_percentage(33.33),
            ]
            .into_iter()
            .collect(),
            ..ParsedActivity::default()
        };
        assert!(check(&activity, 0.01).is_empty());
        assert_eq!(check(&activity, 0.0).len(), 1);
    }

    #[test]
    fn mixed_usage_warns() {
        let activity = ParsedActivity {
            sectors: vec![
                Sector::new("11110").with_percentage(100.0),
                Sector::new("11120"),
            ]
            .into_iter()
            .collect(),
            ..ParsedActivity::default()
        };
        let warnings = check(&activity, 0.01);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("do not"));
    }
}
