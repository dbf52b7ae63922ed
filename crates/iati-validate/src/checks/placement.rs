//! Conventions about where an element should be declared.

use iati_model::ParsedActivity;
use tracing::warn;

use crate::warning::ValidationWarning;

pub fn check(activity: &ParsedActivity) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for (index, transaction) in activity.transactions.iter().enumerate() {
        if transaction.has_country_and_region() {
            let element = format!("transaction[{}]", index + 1);
            let message =
                "recipient-country and recipient-region both present; country XOR region recommended";
            warn!(element = %element, "{message}");
            warnings.push(ValidationWarning::new(element, message));
        }
    }

    if !activity.sectors.is_empty() && activity.has_transaction_sectors() {
        let message = "sectors declared on both the activity and its transactions; declare them at one level";
        warn!(element = "sector", "{message}");
        warnings.push(ValidationWarning::new("sector", message));
    }

    warnings
}
