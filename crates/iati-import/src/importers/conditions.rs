use iati_model::{Counter, Family, ImportSummary, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row, require};
use crate::store::{NewRow, Store};

/// `<conditions>/<condition>`; each row carries the parent's `@attached` flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionsImporter;

impl FamilyImporter for ConditionsImporter {
    fn family(&self) -> Family {
        Family::Conditions
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        let parent = ElementPath::root("conditions", 0);
        for (index, condition) in activity.conditions.iter().enumerate() {
            let row = require(condition.condition_type.as_ref(), "type").map(|_| NewRow::Condition {
                activity: ctx.activity,
                attached: activity.conditions_attached,
                condition: condition.clone(),
            });
            insert_row(
                store,
                &mut summary,
                &parent.child("condition", index),
                Counter::ConditionsCreated,
                row,
            );
        }
        summary
    }
}
