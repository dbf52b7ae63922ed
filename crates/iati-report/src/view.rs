use serde::Serialize;

use iati_import::ImportRun;
use iati_model::{Counter, Family, ImportIssue, ImportSummary};

/// Everything the reporting surface shows for one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,
    pub totals: Totals,
    /// Families that created rows or recorded errors, in import order.
    pub families: Vec<FamilyRow>,
    pub coverage: Vec<CoverageRow>,
    pub errors: Vec<ImportIssue>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceInfo {
    pub name: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub activities: usize,
    pub created: usize,
    pub organisations_created: usize,
    pub activities_created: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyRow {
    pub family: Family,
    pub label: &'static str,
    pub created: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageRow {
    pub level: String,
    pub present: usize,
    pub declared: usize,
    /// Rounded share of declared items present.
    pub percent: u32,
    pub missing: Vec<String>,
}

impl ReportView {
    pub fn from_run(run: &ImportRun) -> Self {
        let mut view = Self::build(&run.summary(), run.activities.len());
        view.source = Some(SourceInfo {
            name: run.source_name.clone(),
            sha256: run.source_sha256.clone(),
        });
        view
    }

    /// View of a single summary, counted as one activity.
    pub fn from_summary(summary: &ImportSummary) -> Self {
        Self::build(summary, 1)
    }

    fn build(summary: &ImportSummary, activities: usize) -> Self {
        let families = Family::ALL
            .iter()
            .copied()
            .map(|family| FamilyRow {
                family,
                label: family.label(),
                created: summary.family_created(family),
                errors: summary
                    .errors
                    .iter()
                    .filter(|issue| issue_family(issue) == Some(family))
                    .count(),
            })
            .filter(|row| row.created > 0 || row.errors > 0)
            .collect();

        let coverage = summary
            .coverage
            .levels()
            .map(|(level, items)| {
                let present = items.values().filter(|present| **present).count();
                let declared = items.len();
                let percent = if declared == 0 {
                    0
                } else {
                    (present as f64 * 100.0 / declared as f64).round() as u32
                };
                CoverageRow {
                    level: level.to_string(),
                    present,
                    declared,
                    percent,
                    missing: items
                        .iter()
                        .filter(|(_, present)| !**present)
                        .map(|(item, _)| item.clone())
                        .collect(),
                }
            })
            .collect();

        Self {
            source: None,
            totals: Totals {
                activities,
                created: summary.total_created(),
                organisations_created: summary.count(Counter::OrganisationsCreated),
                activities_created: summary.count(Counter::ActivitiesCreated),
                errors: summary.errors.len(),
                warnings: summary.warnings.len(),
            },
            families,
            coverage,
            errors: summary.errors.clone(),
            warnings: summary.warnings.clone(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.totals.errors > 0
    }
}

/// Family owning the element an issue points at, from the first segment of
/// its context (e.g. `result[2]/indicator[1]` belongs to results).
pub fn issue_family(issue: &ImportIssue) -> Option<Family> {
    let root = issue.context.split('/').next()?;
    let name = root.split('[').next()?;
    name.parse().ok()
}
