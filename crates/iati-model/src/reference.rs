//! Unresolved pointers to organisations and activities.
//!
//! References are produced by the parser and resolved to store ids during
//! import. They are never persisted themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::narrative::Narrative;

/// Pointer to an organisation by IATI identifier and/or name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganisationRef {
    /// The `ref` attribute (IATI organisation identifier).
    pub iati_ref: Option<String>,
    pub name: Option<Narrative>,
    /// IATI OrganisationType code.
    pub org_type: Option<String>,
}

impl OrganisationRef {
    pub fn is_empty(&self) -> bool {
        self.iati_ref.is_none() && self.name.is_none()
    }

    pub fn name_text(&self) -> Option<&str> {
        self.name.as_ref().map(Narrative::as_str)
    }

    /// Stable key used to cache resolutions within one run.
    pub fn key(&self) -> ReferenceKey {
        match (&self.iati_ref, self.name_text()) {
            (Some(iati_ref), _) => ReferenceKey::Identifier(iati_ref.trim().to_string()),
            (None, Some(name)) => ReferenceKey::Name(name.trim().to_lowercase()),
            (None, None) => ReferenceKey::Anonymous,
        }
    }
}

impl fmt::Display for OrganisationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.iati_ref, self.name_text()) {
            (Some(iati_ref), Some(name)) => write!(f, "{name} ({iati_ref})"),
            (Some(iati_ref), None) => write!(f, "{iati_ref}"),
            (None, Some(name)) => write!(f, "{name}"),
            (None, None) => write!(f, "<anonymous organisation>"),
        }
    }
}

/// Pointer to another activity by IATI identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityRef {
    pub identifier: String,
}

impl ActivityRef {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
        }
    }
}

/// Cache key for a resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReferenceKey {
    Identifier(String),
    Name(String),
    Anonymous,
}
