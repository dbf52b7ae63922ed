use iati_model::{Budget, Counter, Family, ImportSummary, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row, require};
use crate::error::ElementImportError;
use crate::store::{NewRow, RowId, Store};

/// `<budget>`; value and both period dates are required, and the period
/// must not end before it starts.
#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetsImporter;

impl FamilyImporter for BudgetsImporter {
    fn family(&self) -> Family {
        Family::Budgets
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, budget) in activity.budgets.iter().enumerate() {
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("budget", index),
                Counter::BudgetsCreated,
                budget_row(ctx.activity, budget),
            );
        }
        summary
    }
}

fn budget_row(activity: RowId, budget: &Budget) -> Result<NewRow, ElementImportError> {
    let start = require(budget.period_start, "period-start")?;
    let end = require(budget.period_end, "period-end")?;
    require(budget.value, "value")?;
    if end < start {
        return Err(ElementImportError::InvalidValue {
            field: "period-end",
            value: end.to_string(),
        });
    }
    Ok(NewRow::Budget {
        activity,
        budget: budget.clone(),
    })
}
