//! Drop elements whose code does not fit their vocabulary.

use iati_model::{MultiValueGroup, ParsedActivity};
use tracing::warn;

use crate::code::{CodeKind, validate};
use crate::warning::ValidationWarning;

/// Filter invalid codes out of every coded group, one warning per element.
pub fn check(activity: &mut ParsedActivity) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    retain_valid(
        &mut activity.sectors,
        "",
        CodeKind::Sector,
        |s| (s.code.as_str(), Some(s.vocabulary.as_str())),
        &mut warnings,
    );
    retain_valid(
        &mut activity.recipient_countries,
        "",
        CodeKind::RecipientCountry,
        |c| (c.code.as_str(), None),
        &mut warnings,
    );
    retain_valid(
        &mut activity.recipient_regions,
        "",
        CodeKind::RecipientRegion,
        |r| (r.code.as_str(), Some(r.vocabulary.as_str())),
        &mut warnings,
    );

    let mut index = 0;
    activity.policy_markers.retain(|marker| {
        index += 1;
        keep(
            "",
            CodeKind::PolicyMarker,
            index,
            (marker.code.as_str(), Some(marker.vocabulary.as_str())),
            &mut warnings,
        )
    });

    for (index, transaction) in activity.transactions.iter_mut().enumerate() {
        let parent = format!("transaction[{}]", index + 1);
        retain_valid(
            &mut transaction.sectors,
            &parent,
            CodeKind::Sector,
            |s| (s.code.as_str(), Some(s.vocabulary.as_str())),
            &mut warnings,
        );
        retain_valid(
            &mut transaction.recipient_countries,
            &parent,
            CodeKind::RecipientCountry,
            |c| (c.code.as_str(), None),
            &mut warnings,
        );
        retain_valid(
            &mut transaction.recipient_regions,
            &parent,
            CodeKind::RecipientRegion,
            |r| (r.code.as_str(), Some(r.vocabulary.as_str())),
            &mut warnings,
        );
        retain_valid(
            &mut transaction.aid_types,
            &parent,
            CodeKind::AidType,
            |a| (a.code.as_str(), Some(a.vocabulary.as_str())),
            &mut warnings,
        );
    }

    warnings
}

fn retain_valid<T>(
    group: &mut MultiValueGroup<T>,
    parent: &str,
    kind: CodeKind,
    code_of: impl Fn(&T) -> (&str, Option<&str>),
    warnings: &mut Vec<ValidationWarning>,
) {
    let mut index = 0;
    group.retain(|member| {
        index += 1;
        keep(parent, kind, index, code_of(member), warnings)
    });
}

fn keep(
    parent: &str,
    kind: CodeKind,
    index: usize,
    (code, vocabulary): (&str, Option<&str>),
    warnings: &mut Vec<ValidationWarning>,
) -> bool {
    let verdict = validate(kind, code, vocabulary);
    if verdict.valid {
        return true;
    }
    let element = if parent.is_empty() {
        format!("{kind}[{index}]")
    } else {
        format!("{parent}/{kind}[{index}]")
    };
    let reason = verdict
        .reason
        .unwrap_or_else(|| format!("invalid {kind} code"));
    warn!(element = %element, "{reason}; element skipped");
    warnings.push(ValidationWarning::new(
        element,
        format!("{reason}; element skipped"),
    ));
    false
}
