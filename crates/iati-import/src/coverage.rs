//! Presence of optional sub-elements in the parsed source.
//!
//! Computed from the [`ParsedActivity`] rather than from what the importers
//! managed to write: coverage describes the document, not the run.

use iati_model::{Coverage, DocumentLink, ParsedActivity, PeriodValue};

pub const RESULT_ITEMS: &[&str] = &["reference", "document-link", "description"];
pub const INDICATOR_ITEMS: &[&str] = &[
    "reference",
    "document-link",
    "baseline",
    "period",
    "description",
];
pub const BASELINE_ITEMS: &[&str] = &["dimension", "location", "comment", "document-link"];
pub const PERIOD_ITEMS: &[&str] = &[
    "target",
    "actual",
    "dimension",
    "location",
    "comment",
    "document-link",
];
pub const TRANSACTION_ITEMS: &[&str] = &[
    "provider-org",
    "receiver-org",
    "sector",
    "recipient-geography",
    "aid-type",
    "description",
];
pub const DOCUMENT_ITEMS: &[&str] = &["title", "category", "language", "document-date"];

/// Coverage of `activity`.
///
/// The four results levels are always declared; the transaction and
/// document-link levels only when the activity has such elements.
pub fn compute(activity: &ParsedActivity) -> Coverage {
    let mut coverage = Coverage::new();
    coverage.declare("result", RESULT_ITEMS);
    coverage.declare("indicator", INDICATOR_ITEMS);
    coverage.declare("baseline", BASELINE_ITEMS);
    coverage.declare("period", PERIOD_ITEMS);

    for result in &activity.results {
        coverage.mark("result", "reference", !result.references.is_empty());
        coverage.mark("result", "document-link", !result.document_links.is_empty());
        coverage.mark("result", "description", result.description.is_some());

        for indicator in &result.indicators {
            coverage.mark("indicator", "reference", !indicator.references.is_empty());
            coverage.mark(
                "indicator",
                "document-link",
                !indicator.document_links.is_empty(),
            );
            coverage.mark("indicator", "baseline", !indicator.baselines.is_empty());
            coverage.mark("indicator", "period", !indicator.periods.is_empty());
            coverage.mark("indicator", "description", indicator.description.is_some());

            for baseline in &indicator.baselines {
                coverage.mark("baseline", "dimension", !baseline.dimensions.is_empty());
                coverage.mark("baseline", "location", !baseline.locations.is_empty());
                coverage.mark("baseline", "comment", baseline.comment.is_some());
                coverage.mark(
                    "baseline",
                    "document-link",
                    !baseline.document_links.is_empty(),
                );
            }

            for period in &indicator.periods {
                coverage.mark("period", "target", !period.targets.is_empty());
                coverage.mark("period", "actual", !period.actuals.is_empty());
                for value in period.targets.iter().chain(&period.actuals) {
                    mark_period_value(&mut coverage, value);
                }
            }
        }
    }

    if !activity.transactions.is_empty() {
        coverage.declare("transaction", TRANSACTION_ITEMS);
    }
    for transaction in &activity.transactions {
        coverage.mark(
            "transaction",
            "provider-org",
            transaction.provider_org.is_some(),
        );
        coverage.mark(
            "transaction",
            "receiver-org",
            transaction.receiver_org.is_some(),
        );
        coverage.mark("transaction", "sector", !transaction.sectors.is_empty());
        coverage.mark(
            "transaction",
            "recipient-geography",
            !transaction.recipient_countries.is_empty() || !transaction.recipient_regions.is_empty(),
        );
        coverage.mark("transaction", "aid-type", !transaction.aid_types.is_empty());
        coverage.mark(
            "transaction",
            "description",
            transaction.description.is_some(),
        );
    }

    if !activity.documents.is_empty() {
        coverage.declare("document-link", DOCUMENT_ITEMS);
    }
    for link in &activity.documents {
        mark_document(&mut coverage, link);
    }
    coverage
}

fn mark_period_value(coverage: &mut Coverage, value: &PeriodValue) {
    coverage.mark("period", "dimension", !value.dimensions.is_empty());
    coverage.mark("period", "location", !value.locations.is_empty());
    coverage.mark("period", "comment", value.comment.is_some());
    coverage.mark("period", "document-link", !value.document_links.is_empty());
}

fn mark_document(coverage: &mut Coverage, link: &DocumentLink) {
    coverage.mark("document-link", "title", link.title.is_some());
    coverage.mark("document-link", "category", !link.categories.is_empty());
    coverage.mark("document-link", "language", !link.languages.is_empty());
    coverage.mark("document-link", "document-date", link.document_date.is_some());
}
