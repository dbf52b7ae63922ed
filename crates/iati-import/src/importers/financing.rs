use iati_model::{Counter, Family, FinancingTerms, ImportSummary, LoanStatus, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row, require, skip_children};
use crate::error::ElementImportError;
use crate::store::{FinancingTermsRow, NewRow, RowId, Store};

/// `<crs-add>`: one financing-terms row with its other-flags and loan
/// statuses underneath.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinancingTermsImporter;

impl FamilyImporter for FinancingTermsImporter {
    fn family(&self) -> Family {
        Family::FinancingTerms
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        let Some(terms) = activity.financing_terms.as_ref() else {
            return summary;
        };

        let path = ElementPath::root("crs-add", 0);
        let row = NewRow::FinancingTerms(FinancingTermsRow {
            activity: ctx.activity,
            loan_terms: terms.loan_terms.clone(),
            channel_code: terms.channel_code.clone(),
        });
        let Some(id) = insert_row(
            store,
            &mut summary,
            &path,
            Counter::FinancingTermsCreated,
            Ok(row),
        ) else {
            skip_children(
                &mut summary,
                &path,
                terms.other_flags.len() + terms.loan_statuses.len(),
            );
            return summary;
        };
        import_children(store, &mut summary, &path, id, terms);
        summary
    }
}

fn import_children(
    store: &mut dyn Store,
    summary: &mut ImportSummary,
    path: &ElementPath,
    financing: RowId,
    terms: &FinancingTerms,
) {
    for (index, flag) in terms.other_flags.iter().enumerate() {
        let row = NewRow::OtherFlag {
            financing,
            flag: flag.clone(),
        };
        insert_row(
            store,
            summary,
            &path.child("other-flags", index),
            Counter::OtherFlagsCreated,
            Ok(row),
        );
    }
    for (index, status) in terms.loan_statuses.iter().enumerate() {
        insert_row(
            store,
            summary,
            &path.child("loan-status", index),
            Counter::LoanStatusesCreated,
            loan_status_row(financing, status),
        );
    }
}

fn loan_status_row(financing: RowId, status: &LoanStatus) -> Result<NewRow, ElementImportError> {
    require(status.year, "year")?;
    Ok(NewRow::LoanStatus {
        financing,
        status: status.clone(),
    })
}
