use iati_model::{Counter, Family, ImportSummary, ParsedActivity, Transaction, TransactionParty};

use super::{
    ElementPath, FamilyImporter, ImportContext, insert_row, require, skip_children, text,
};
use crate::error::ElementImportError;
use crate::store::{NewRow, RowId, Store, TransactionRow};

/// `<transaction>` with its sector, recipient and aid-type groups.
///
/// When a group has a sole member covering 100% the matching single-value
/// column is filled as well (unless disabled in the options).
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionsImporter;

impl FamilyImporter for TransactionsImporter {
    fn family(&self) -> Family {
        Family::Transactions
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, transaction) in activity.transactions.iter().enumerate() {
            let path = ElementPath::root("transaction", index);
            let row = transaction_row(ctx, transaction);
            let Some(id) = insert_row(
                store,
                &mut summary,
                &path,
                Counter::TransactionsCreated,
                row,
            ) else {
                let children = transaction.sectors.len()
                    + transaction.recipient_countries.len()
                    + transaction.recipient_regions.len()
                    + transaction.aid_types.len();
                skip_children(&mut summary, &path, children);
                continue;
            };
            import_groups(store, &mut summary, &path, id, transaction);
        }
        summary
    }
}

fn transaction_row(
    ctx: &ImportContext<'_>,
    transaction: &Transaction,
) -> Result<NewRow, ElementImportError> {
    let transaction_type = require(transaction.transaction_type.clone(), "transaction-type")?;
    let transaction_date = require(transaction.transaction_date, "transaction-date")?;
    let value = require(transaction.value, "value")?;
    let currency = require(transaction.currency.clone(), "currency")?;

    let party_org = |party: Option<&TransactionParty>| {
        party.and_then(|p| ctx.references.organisation(&p.organisation))
    };
    let party_activity = |party: Option<&TransactionParty>| {
        party
            .and_then(|p| p.activity.as_ref())
            .and_then(|reference| ctx.references.activity(reference))
    };

    let mut row = TransactionRow {
        activity: ctx.activity,
        reference: transaction.reference.clone(),
        humanitarian: transaction.humanitarian,
        transaction_type,
        transaction_date,
        value,
        currency,
        value_date: transaction.value_date,
        description: text(transaction.description.as_ref()),
        provider_org: party_org(transaction.provider_org.as_ref()),
        provider_activity: party_activity(transaction.provider_org.as_ref()),
        receiver_org: party_org(transaction.receiver_org.as_ref()),
        receiver_activity: party_activity(transaction.receiver_org.as_ref()),
        disbursement_channel: transaction.disbursement_channel.clone(),
        flow_type: transaction.flow_type.clone(),
        finance_type: transaction.finance_type.clone(),
        tied_status: transaction.tied_status.clone(),
        sector_code: None,
        sector_vocabulary: None,
        recipient_country_code: None,
        recipient_region_code: None,
    };

    if ctx.options.project_single_values {
        let tolerance = ctx.options.percentage_tolerance;
        if let Some(sector) = transaction.sectors.sole_member(tolerance) {
            row.sector_code = Some(sector.code.clone());
            row.sector_vocabulary = Some(sector.vocabulary.clone());
        }
        if let Some(country) = transaction.recipient_countries.sole_member(tolerance) {
            row.recipient_country_code = Some(country.code.clone());
        }
        if let Some(region) = transaction.recipient_regions.sole_member(tolerance) {
            row.recipient_region_code = Some(region.code.clone());
        }
    }
    Ok(NewRow::Transaction(row))
}

fn import_groups(
    store: &mut dyn Store,
    summary: &mut ImportSummary,
    path: &ElementPath,
    id: RowId,
    transaction: &Transaction,
) {
    for (index, sector) in transaction.sectors.iter().enumerate() {
        let row = NewRow::TransactionSector {
            transaction: id,
            sector: sector.clone(),
        };
        insert_row(
            store,
            summary,
            &path.child("sector", index),
            Counter::TransactionSectorsCreated,
            Ok(row),
        );
    }
    for (index, country) in transaction.recipient_countries.iter().enumerate() {
        let row = NewRow::TransactionRecipientCountry {
            transaction: id,
            country: country.clone(),
        };
        insert_row(
            store,
            summary,
            &path.child("recipient-country", index),
            Counter::TransactionCountriesCreated,
            Ok(row),
        );
    }
    for (index, region) in transaction.recipient_regions.iter().enumerate() {
        let row = NewRow::TransactionRecipientRegion {
            transaction: id,
            region: region.clone(),
        };
        insert_row(
            store,
            summary,
            &path.child("recipient-region", index),
            Counter::TransactionRegionsCreated,
            Ok(row),
        );
    }
    for (index, aid_type) in transaction.aid_types.iter().enumerate() {
        let row = NewRow::TransactionAidType {
            transaction: id,
            aid_type: aid_type.clone(),
        };
        insert_row(
            store,
            summary,
            &path.child("aid-type", index),
            Counter::TransactionAidTypesCreated,
            Ok(row),
        );
    }
}
