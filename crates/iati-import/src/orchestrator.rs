//! Import orchestration with explicit stages.
//!
//! A run moves through these stages in order:
//! 1. **Parsing**: XML text to one [`ParsedActivity`] per activity (fatal on failure)
//! 2. **Validating**: codes, percentage sums and placement rules
//! 3. **Resolving**: target activity, organisations and linked activities
//! 4. **Importing**: every configured family, one importer each
//! 5. **Reporting**: coverage and the import log row
//!
//! Only parsing can fail the run. After that every configured family is
//! attempted no matter how earlier families fared.

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, info_span, warn};

use iati_model::{Counter, Family, FamilySelection, ImportOptions, ImportSummary, ParsedActivity};
use iati_validate::Validator;

use crate::coverage;
use crate::error::{ImportError, Result, StoreError};
use crate::importers::{ImportContext, importer_for};
use crate::resolver::{EntityResolver, resolve_references, strategy_for};
use crate::store::{ActivityRow, ImportLogRow, NewRow, RowId, Store, Table};

/// Stage of an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Parsing,
    Validating,
    Resolving,
    Importing,
    Reporting,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Parsing => "parsing",
            Self::Validating => "validating",
            Self::Resolving => "resolving",
            Self::Importing => "importing",
            Self::Reporting => "reporting",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Where parsed activities are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportTarget {
    /// Look the `iati-identifier` up, creating the activity on a miss.
    #[default]
    Resolve,
    /// Import into an existing activity row.
    Activity(RowId),
}

/// Outcome for one activity of the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityImport {
    pub iati_identifier: Option<String>,
    pub activity: RowId,
    pub summary: ImportSummary,
}

/// Outcome of one run over a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRun {
    pub source_name: String,
    /// Hex SHA-256 of the source text.
    pub source_sha256: String,
    pub activities: Vec<ActivityImport>,
    /// Stages passed through, in order. Validating to Reporting repeat for
    /// each activity.
    pub stages: Vec<Stage>,
}

impl ImportRun {
    /// All activity summaries folded into one.
    pub fn summary(&self) -> ImportSummary {
        self.activities
            .iter()
            .map(|activity| activity.summary.clone())
            .sum()
    }

    pub fn stage(&self) -> Stage {
        self.stages.last().copied().unwrap_or(Stage::Idle)
    }
}

/// Sequences parser, validator, resolver and importers for one document.
#[derive(Debug)]
pub struct Orchestrator {
    options: ImportOptions,
    selection: FamilySelection,
    validator: Validator,
    resolver: EntityResolver,
}

impl Orchestrator {
    /// Fails when `options` are rejected by [`ImportOptions::validate`].
    pub fn new(options: ImportOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            validator: Validator::from_options(&options),
            resolver: EntityResolver::new(strategy_for(options.matching)),
            selection: FamilySelection::all(),
            options,
        })
    }

    /// Restrict the run to what a reviewer selected.
    #[must_use]
    pub fn with_selection(mut self, selection: FamilySelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// Selected families in dependency order, each once. Locations come
    /// before results so `location-ref`s can link.
    pub fn families(&self) -> Vec<Family> {
        let mut families: Vec<Family> = self
            .options
            .families
            .iter()
            .copied()
            .filter(|family| self.selection.includes(*family))
            .collect();
        families.sort_unstable();
        families.dedup();
        families
    }

    /// Parse `xml` and import every activity it contains.
    pub fn run(
        &self,
        store: &mut dyn Store,
        xml: &str,
        source_name: &str,
        target: ImportTarget,
    ) -> Result<ImportRun> {
        let run_span = info_span!("import", source = %source_name);
        let _run_guard = run_span.enter();
        let run_start = Instant::now();

        let mut run = ImportRun {
            source_name: source_name.to_string(),
            source_sha256: hex::encode(Sha256::digest(xml.as_bytes())),
            activities: Vec::new(),
            stages: vec![Stage::Idle],
        };

        enter(&mut run.stages, Stage::Parsing);
        let parsed = iati_xml::parse_document(xml)?;
        if parsed.is_empty() {
            return Err(ImportError::NoActivity);
        }
        info!(activities = parsed.len(), "document parsed");

        for activity in parsed {
            let outcome = self.import_activity(store, activity, target, &mut run)?;
            run.activities.push(outcome);
        }
        enter(&mut run.stages, Stage::Done);

        let summary = run.summary();
        info!(
            activities = run.activities.len(),
            created = summary.total_created(),
            errors = summary.errors.len(),
            warnings = summary.warnings.len(),
            duration_ms = run_start.elapsed().as_millis(),
            "import complete"
        );
        Ok(run)
    }

    /// Run every stage after parsing for one activity.
    fn import_activity(
        &self,
        store: &mut dyn Store,
        mut activity: ParsedActivity,
        target: ImportTarget,
        run: &mut ImportRun,
    ) -> Result<ActivityImport> {
        let identifier = activity.iati_identifier.clone();
        let activity_span = info_span!(
            "activity",
            iati_identifier = identifier.as_deref().unwrap_or("-")
        );
        let _activity_guard = activity_span.enter();
        let mut summary = ImportSummary::new();

        enter(&mut run.stages, Stage::Validating);
        self.selection.apply(&mut activity);
        for warning in std::mem::take(&mut activity.parse_warnings) {
            summary.warn(warning);
        }
        for warning in self.validator.apply(&mut activity) {
            summary.warn(warning.to_string());
        }

        enter(&mut run.stages, Stage::Resolving);
        let parent = self
            .target_activity(store, &activity, target, &mut summary)
            .map_err(ImportError::Target)?;
        let (references, resolved) = resolve_references(&self.resolver, store, &activity);
        summary.absorb(resolved);
        debug!(
            organisations = references.organisation_count(),
            activities = references.activity_count(),
            "references resolved"
        );

        enter(&mut run.stages, Stage::Importing);
        let ctx = ImportContext {
            activity: parent,
            references: &references,
            options: &self.options,
        };
        for family in self.families() {
            let family_span = info_span!("family", family = %family);
            let partial = family_span.in_scope(|| {
                let start = Instant::now();
                let partial = importer_for(family).import(store, &ctx, &activity);
                info!(
                    elements = activity.family_len(family),
                    created = partial.family_created(family),
                    errors = partial.errors.len(),
                    duration_ms = start.elapsed().as_millis(),
                    "family imported"
                );
                partial
            });
            summary.absorb(partial);
        }

        enter(&mut run.stages, Stage::Reporting);
        summary.coverage = coverage::compute(&activity);
        self.write_log(store, parent, run, &mut summary);

        Ok(ActivityImport {
            iati_identifier: identifier,
            activity: parent,
            summary,
        })
    }

    fn target_activity(
        &self,
        store: &mut dyn Store,
        activity: &ParsedActivity,
        target: ImportTarget,
        summary: &mut ImportSummary,
    ) -> std::result::Result<RowId, StoreError> {
        if let ImportTarget::Activity(id) = target {
            if !store.contains(Table::Activities, id) {
                return Err(StoreError::NotFound {
                    table: Table::Activities,
                    id,
                });
            }
            return Ok(id);
        }

        let identifier = activity
            .iati_identifier
            .as_deref()
            .map(str::trim)
            .filter(|identifier| !identifier.is_empty());
        if let Some(id) = identifier.and_then(|identifier| store.find_activity(identifier)) {
            debug!(id = %id, "importing into existing activity");
            return Ok(id);
        }

        let reporting_org = match activity.reporting_org.as_ref() {
            Some(reference) => match self.resolver.resolve_organisation(store, reference) {
                Ok(Some(resolved)) => {
                    if resolved.created {
                        summary.record(Counter::OrganisationsCreated);
                    }
                    Some(resolved.id)
                }
                Ok(None) => None,
                Err(error) => {
                    warn!(%error, "reporting organisation left unresolved");
                    summary.warn(format!("reporting-org left unresolved: {error}"));
                    None
                }
            },
            None => None,
        };
        let id = store.insert(NewRow::Activity(ActivityRow {
            iati_identifier: identifier.map(str::to_string),
            title: activity.title.as_ref().map(|n| n.text.clone()),
            description: activity.description.as_ref().map(|n| n.text.clone()),
            reporting_org,
            default_currency: activity.defaults.currency.clone(),
            default_language: activity.defaults.language.clone(),
            stub: false,
        }))?;
        summary.record(Counter::ActivitiesCreated);
        debug!(id = %id, "created activity");
        Ok(id)
    }

    fn write_log(
        &self,
        store: &mut dyn Store,
        activity: RowId,
        run: &ImportRun,
        summary: &mut ImportSummary,
    ) {
        let row = NewRow::ImportLog(ImportLogRow {
            activity: Some(activity),
            entity_type: "activity".to_string(),
            source_name: run.source_name.clone(),
            source_sha256: run.source_sha256.clone(),
            created: summary.total_created(),
            errors: summary.errors.len(),
            warnings: summary.warnings.len(),
            logged_errors: summary
                .errors
                .iter()
                .take(self.options.max_logged_errors)
                .map(ToString::to_string)
                .collect(),
            imported_at: Utc::now(),
        });
        if let Err(error) = store.insert(row) {
            warn!(%error, "import log not written");
            summary.warn(format!("import log not written: {error}"));
        }
    }
}

fn enter(stages: &mut Vec<Stage>, stage: Stage) {
    debug!(stage = %stage, "stage");
    stages.push(stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn malformed_xml_is_fatal() {
        let orchestrator = Orchestrator::new(ImportOptions::default()).unwrap();
        let mut store = InMemoryStore::new();
        let error = orchestrator
            .run(&mut store, "<iati-activity><sector", "bad.xml", ImportTarget::Resolve)
            .unwrap_err();
        assert!(matches!(error, ImportError::Parse(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_target_is_rejected() {
        let orchestrator = Orchestrator::new(ImportOptions::default()).unwrap();
        let mut store = InMemoryStore::new();
        let error = orchestrator
            .run(
                &mut store,
                "<iati-activity><iati-identifier>A</iati-identifier></iati-activity>",
                "a.xml",
                ImportTarget::Activity(RowId(7)),
            )
            .unwrap_err();
        assert!(matches!(error, ImportError::Target(StoreError::NotFound { .. })));
    }

    #[test]
    fn rejects_invalid_options() {
        let options = ImportOptions::default().with_tolerance(f64::NAN);
        assert!(matches!(
            Orchestrator::new(options),
            Err(ImportError::Options(_))
        ));
    }

    #[test]
    fn stages_run_in_order() {
        let orchestrator = Orchestrator::new(ImportOptions::default()).unwrap();
        let mut store = InMemoryStore::new();
        let run = orchestrator
            .run(
                &mut store,
                "<iati-activity><iati-identifier>A</iati-identifier></iati-activity>",
                "a.xml",
                ImportTarget::Resolve,
            )
            .unwrap();
        assert_eq!(
            run.stages,
            vec![
                Stage::Idle,
                Stage::Parsing,
                Stage::Validating,
                Stage::Resolving,
                Stage::Importing,
                Stage::Reporting,
                Stage::Done,
            ]
        );
        assert_eq!(run.stage(), Stage::Done);
        assert_eq!(store.count(Table::ImportLogs), 1);
        assert_eq!(run.source_sha256.len(), 64);
    }
}
