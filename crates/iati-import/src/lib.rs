//! Writes parsed IATI activities into a relational store.
//!
//! [`Orchestrator`] runs the whole pipeline for one document: parse,
//! validate, resolve references, run every family importer and compute
//! coverage. Element-level failures end up in the returned
//! [`ImportSummary`](iati_model::ImportSummary); only a parse failure (or an
//! unusable target activity) fails the run.

pub mod coverage;
pub mod error;
pub mod importers;
pub mod orchestrator;
pub mod resolver;
pub mod store;

pub use error::{ElementImportError, ImportError, Result, StoreError};
pub use importers::{ElementPath, FamilyImporter, ImportContext, importer_for};
pub use orchestrator::{ActivityImport, ImportRun, ImportTarget, Orchestrator, Stage};
pub use resolver::{
    EntityResolver, ExactMatch, FuzzyNameMatch, MatchStrategy, OrganisationCategory,
    ResolvedReferences, resolve_references, strategy_for,
};
pub use store::{InMemoryStore, NewRow, RowId, Store, Table};
