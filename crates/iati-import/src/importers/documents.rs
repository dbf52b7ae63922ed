use iati_model::{Counter, Family, ImportSummary, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row};
use crate::store::{DocumentOwner, NewRow, Store};

/// Activity-level `<document-link>`. Links inside the results hierarchy are
/// written by the results importer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentsImporter;

impl FamilyImporter for DocumentsImporter {
    fn family(&self) -> Family {
        Family::Documents
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, link) in activity.documents.iter().enumerate() {
            let row = NewRow::DocumentLink {
                owner: DocumentOwner::Activity(ctx.activity),
                link: link.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("document-link", index),
                Counter::DocumentLinksCreated,
                Ok(row),
            );
        }
        summary
    }
}
