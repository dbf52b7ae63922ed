//! IATI activity XML parser.
//!
//! Turns an `<iati-activities>` document, a single `<iati-activity>` or a
//! pasted element snippet into typed [`ParsedActivity`] trees. Only
//! malformed XML is fatal; recoverable problems (bad dates, unreadable
//! percentages, document-links without a url) become parse warnings on
//! the activity and the element is skipped or left partially filled.

mod error;
mod extract;
mod tree;
mod values;

use tracing::debug;

use iati_model::ParsedActivity;

pub use error::{ParseError, Result};

use extract::Extractor;
use tree::{XmlNode, build_tree};

const ACTIVITIES_ROOT: &str = "iati-activities";
const ACTIVITY_ROOT: &str = "iati-activity";
const ORGANISATIONS_ROOT: &str = "iati-organisations";

/// Parse every activity in `xml`, in document order.
///
/// A snippet whose top-level elements are activity children (for example
/// two `<sector>` elements) is treated as the body of one activity.
pub fn parse_document(xml: &str) -> Result<Vec<ParsedActivity>> {
    let roots = build_tree(xml)?;
    let activities = activity_nodes(roots)?;
    debug!(activities = activities.len(), "parsed XML document");
    Ok(activities
        .iter()
        .map(|node| Extractor::new().activity(node))
        .collect())
}

/// Parse the first activity in `xml`.
pub fn parse_activity(xml: &str) -> Result<ParsedActivity> {
    parse_document(xml)?
        .into_iter()
        .next()
        .ok_or(ParseError::NoActivity)
}

fn activity_nodes(roots: Vec<XmlNode>) -> Result<Vec<XmlNode>> {
    if let [root] = roots.as_slice() {
        match root.name.as_str() {
            ACTIVITIES_ROOT => {
                let activities: Vec<XmlNode> = root
                    .children
                    .iter()
                    .filter(|child| child.name == ACTIVITY_ROOT)
                    .cloned()
                    .collect();
                if activities.is_empty() {
                    return Err(ParseError::NoActivity);
                }
                return Ok(activities);
            }
            ORGANISATIONS_ROOT => {
                return Err(ParseError::UnsupportedRoot {
                    name: root.name.clone(),
                });
            }
            _ => {}
        }
    }
    if roots.iter().all(|root| root.name == ACTIVITY_ROOT) {
        return Ok(roots);
    }
    if let Some(root) = roots
        .iter()
        .find(|root| root.name == ACTIVITIES_ROOT || root.name == ACTIVITY_ROOT)
    {
        return Err(ParseError::UnsupportedRoot {
            name: root.name.clone(),
        });
    }
    let mut snippet = XmlNode::new(ACTIVITY_ROOT);
    snippet.children = roots;
    Ok(vec![snippet])
}
