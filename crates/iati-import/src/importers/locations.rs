use iati_model::{Counter, Family, ImportSummary, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row};
use crate::store::{NewRow, Store};

/// Activity `<location>`s. Imported before results so that result-level
/// `<location ref>` elements can link to them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationsImporter;

impl FamilyImporter for LocationsImporter {
    fn family(&self) -> Family {
        Family::Locations
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, location) in activity.locations.iter().enumerate() {
            let row = NewRow::Location {
                activity: ctx.activity,
                location: location.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("location", index),
                Counter::LocationsCreated,
                Ok(row),
            );
        }
        summary
    }
}
