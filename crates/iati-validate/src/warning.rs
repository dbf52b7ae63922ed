use std::fmt;

use serde::{Deserialize, Serialize};

/// A non-fatal finding. The element is either dropped (invalid code) or
/// imported with a caveat (percentage sum, country and region together).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    /// Indexed element path, e.g. `transaction[2]/sector[1]`.
    pub element: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(element: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.element, self.message)
    }
}
