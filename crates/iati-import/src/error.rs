use thiserror::Error;

use iati_xml::ParseError;

use crate::store::{RowId, Table};

/// A write rejected by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{table}: constraint violated: {message}")]
    Constraint { table: Table, message: String },

    #[error("{table}: parent {parent} does not exist")]
    MissingParent { table: Table, parent: RowId },

    #[error("{table}: row {id} not found")]
    NotFound { table: Table, id: RowId },
}

/// Failure of one element. Converted into an [`iati_model::ImportIssue`]
/// by the importer; siblings continue.
#[derive(Debug, Error)]
pub enum ElementImportError {
    #[error("missing required {field}")]
    MissingField { field: &'static str },

    #[error("invalid {field} '{value}'")]
    InvalidValue { field: &'static str, value: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure of a whole run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("document contains no activity to import")]
    NoActivity,

    #[error("target activity cannot be resolved: {0}")]
    Target(StoreError),

    #[error("invalid import options: {0}")]
    Options(#[from] iati_model::ModelError),
}

pub type Result<T> = std::result::Result<T, ImportError>;
