//! Reporting surface for import runs: a [`ReportView`] with per-family
//! breakdowns and coverage percentages, rendered as terminal tables, JSON
//! or a CSV of the issues.

pub mod error;
pub mod export;
pub mod text;
pub mod view;

pub use error::{ReportError, Result};
pub use export::{to_json, write_issues_csv};
pub use text::{render, render_family_counts};
pub use view::{CoverageRow, FamilyRow, ReportView, SourceInfo, Totals, issue_family};
