//! Per-family importers.
//!
//! Each importer writes one family of a parsed activity and returns its own
//! partial [`ImportSummary`]. A failing element is recorded as an
//! [`ImportIssue`] tagged with its element path and the importer moves on;
//! children of a parent that failed to insert are skipped with a warning,
//! already-created parents are never rolled back.

mod budgets;
mod classifications;
mod conditions;
mod contacts;
mod documents;
mod financing;
mod locations;
mod organisations;
mod results;
mod transactions;

use std::fmt;

use tracing::warn;

use iati_model::{Counter, Family, ImportIssue, ImportOptions, ImportSummary, Narrative, ParsedActivity};

use crate::error::ElementImportError;
use crate::resolver::ResolvedReferences;
use crate::store::{NewRow, RowId, Store};

pub use budgets::BudgetsImporter;
pub use classifications::{
    PolicyMarkersImporter, RecipientGeographyImporter, SectorsImporter, TagsImporter,
};
pub use conditions::ConditionsImporter;
pub use contacts::{ContactKey, ContactsImporter, contact_key, merge_contact};
pub use documents::DocumentsImporter;
pub use financing::FinancingTermsImporter;
pub use locations::LocationsImporter;
pub use organisations::ParticipatingOrgsImporter;
pub use results::ResultsImporter;
pub use transactions::TransactionsImporter;

/// What every importer needs besides the elements themselves.
#[derive(Debug, Clone, Copy)]
pub struct ImportContext<'a> {
    /// Parent activity row all top-level elements attach to.
    pub activity: RowId,
    pub references: &'a ResolvedReferences,
    pub options: &'a ImportOptions,
}

/// Imports one element family.
pub trait FamilyImporter {
    fn family(&self) -> Family;

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary;
}

/// The importer responsible for `family`.
pub fn importer_for(family: Family) -> Box<dyn FamilyImporter> {
    match family {
        Family::ParticipatingOrgs => Box::new(ParticipatingOrgsImporter),
        Family::Sectors => Box::new(SectorsImporter),
        Family::RecipientGeography => Box::new(RecipientGeographyImporter),
        Family::Locations => Box::new(LocationsImporter),
        Family::PolicyMarkers => Box::new(PolicyMarkersImporter),
        Family::Tags => Box::new(TagsImporter),
        Family::Budgets => Box::new(BudgetsImporter),
        Family::Transactions => Box::new(TransactionsImporter),
        Family::Results => Box::new(ResultsImporter),
        Family::FinancingTerms => Box::new(FinancingTermsImporter),
        Family::Contacts => Box::new(ContactsImporter),
        Family::Conditions => Box::new(ConditionsImporter),
        Family::Documents => Box::new(DocumentsImporter),
    }
}

/// Location of an element in the source, e.g. `result[1]/indicator[2]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPath {
    segments: Vec<(&'static str, usize)>,
}

impl ElementPath {
    /// Segments kept in the short element tag.
    const TAG_DEPTH: usize = 3;

    /// `index` is zero-based; paths display it one-based.
    pub fn root(name: &'static str, index: usize) -> Self {
        Self {
            segments: vec![(name, index)],
        }
    }

    pub fn child(&self, name: &'static str, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push((name, index));
        Self { segments }
    }

    /// Short element tag: the last three element names, e.g.
    /// `period/target/dimension`.
    pub fn tag(&self) -> String {
        let skip = self.segments.len().saturating_sub(Self::TAG_DEPTH);
        self.segments[skip..]
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Fully indexed path.
    pub fn context(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, (name, index)) in self.segments.iter().enumerate() {
            if position > 0 {
                f.write_str("/")?;
            }
            write!(f, "{name}[{}]", index + 1)?;
        }
        Ok(())
    }
}

/// Record a failed element on `summary`.
pub(crate) fn record_error(
    summary: &mut ImportSummary,
    path: &ElementPath,
    error: &ElementImportError,
) {
    warn!(element = %path.tag(), context = %path, %error, "element not imported");
    summary.error(ImportIssue::new(path.tag(), error.to_string(), path.context()));
}

/// Insert `row`, counting it under `counter` on success and recording an
/// issue on failure.
pub(crate) fn insert_row(
    store: &mut dyn Store,
    summary: &mut ImportSummary,
    path: &ElementPath,
    counter: Counter,
    row: Result<NewRow, ElementImportError>,
) -> Option<RowId> {
    match row.and_then(|row| store.insert(row).map_err(ElementImportError::from)) {
        Ok(id) => {
            summary.record(counter);
            Some(id)
        }
        Err(error) => {
            record_error(summary, path, &error);
            None
        }
    }
}

/// Warn that `skipped` children of a parent that was not created were skipped.
pub(crate) fn skip_children(summary: &mut ImportSummary, path: &ElementPath, skipped: usize) {
    if skipped == 0 {
        return;
    }
    warn!(context = %path, skipped, "children skipped, parent not created");
    summary.warn(format!(
        "{path}: {skipped} child element(s) skipped because the parent was not created"
    ));
}

pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, ElementImportError> {
    value.ok_or(ElementImportError::MissingField { field })
}

pub(crate) fn text(narrative: Option<&Narrative>) -> Option<String> {
    narrative.map(|n| n.text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_path_tag_and_context() {
        let path = ElementPath::root("result", 0)
            .child("indicator", 1)
            .child("period", 3)
            .child("target", 0)
            .child("dimension", 1);
        assert_eq!(path.tag(), "period/target/dimension");
        assert_eq!(
            path.context(),
            "result[1]/indicator[2]/period[4]/target[1]/dimension[2]"
        );
        assert_eq!(ElementPath::root("sector", 2).tag(), "sector");
    }
}
