//! Library side of the `iati-import` binary: logging setup, option layering
//! and saved stores.

pub mod logging;
pub mod settings;
pub mod snapshot;
