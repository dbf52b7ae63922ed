//! Validation check modules.
//!
//! `codes` filters; the others only report.

pub mod codes;
pub mod percentages;
pub mod placement;
