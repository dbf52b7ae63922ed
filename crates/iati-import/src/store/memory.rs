use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use iati_model::Contact;

use super::{NewRow, OrganisationRecord, RowId, Store, Table};
use crate::error::StoreError;

/// A [`Store`] kept in memory, enforcing the constraints a relational
/// schema would: foreign keys, required columns and percentage ranges.
///
/// Serializes to JSON and back, so a saved store can seed a later run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryStore {
    next_id: u64,
    rows: BTreeMap<RowId, NewRow>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: RowId) -> Option<&NewRow> {
        self.rows.get(&id)
    }

    /// Rows of `table` in insertion order.
    pub fn rows(&self, table: Table) -> impl Iterator<Item = (RowId, &NewRow)> {
        self.rows
            .iter()
            .filter(move |(_, row)| row.table() == table)
            .map(|(id, row)| (*id, row))
    }

    pub fn count(&self, table: Table) -> usize {
        self.rows(table).count()
    }

    /// Row counts per non-empty table.
    pub fn table_counts(&self) -> BTreeMap<Table, usize> {
        let mut counts = BTreeMap::new();
        for row in self.rows.values() {
            *counts.entry(row.table()).or_insert(0) += 1;
        }
        counts
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Store for InMemoryStore {
    fn insert(&mut self, row: NewRow) -> Result<RowId, StoreError> {
        let table = row.table();
        for (parent_table, parent) in row.parents() {
            if !self.contains(parent_table, parent) {
                return Err(StoreError::MissingParent { table, parent });
            }
        }
        check_constraints(&row)?;
        self.next_id += 1;
        let id = RowId(self.next_id);
        self.rows.insert(id, row);
        Ok(id)
    }

    fn contains(&self, table: Table, id: RowId) -> bool {
        self.rows.get(&id).is_some_and(|row| row.table() == table)
    }

    fn organisations(&self) -> Vec<OrganisationRecord> {
        self.rows
            .iter()
            .filter_map(|(id, row)| match row {
                NewRow::Organisation(org) => Some(OrganisationRecord {
                    id: *id,
                    iati_ref: org.iati_ref.clone(),
                    name: org.name.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    fn find_activity(&self, iati_identifier: &str) -> Option<RowId> {
        self.rows.iter().find_map(|(id, row)| match row {
            NewRow::Activity(activity)
                if activity.iati_identifier.as_deref() == Some(iati_identifier) =>
            {
                Some(*id)
            }
            _ => None,
        })
    }

    fn contacts_for(&self, activity: RowId) -> Vec<(RowId, Contact)> {
        self.rows
            .iter()
            .filter_map(|(id, row)| match row {
                NewRow::Contact {
                    activity: owner,
                    contact,
                } if *owner == activity => Some((*id, contact.clone())),
                _ => None,
            })
            .collect()
    }

    fn update_contact(&mut self, id: RowId, contact: Contact) -> Result<(), StoreError> {
        match self.rows.get_mut(&id) {
            Some(NewRow::Contact {
                contact: stored, ..
            }) => {
                *stored = contact;
                Ok(())
            }
            _ => Err(StoreError::NotFound {
                table: Table::Contacts,
                id,
            }),
        }
    }

    fn location_refs(&self, activity: RowId) -> Vec<(String, RowId)> {
        self.rows
            .iter()
            .filter_map(|(id, row)| match row {
                NewRow::Location {
                    activity: owner,
                    location,
                } if *owner == activity => location.reference.clone().map(|r| (r, *id)),
                _ => None,
            })
            .collect()
    }
}

fn check_constraints(row: &NewRow) -> Result<(), StoreError> {
    let table = row.table();
    match row {
        NewRow::Organisation(org) if org.iati_ref.is_none() && org.name.is_none() => {
            Err(StoreError::Constraint {
                table,
                message: "organisation needs a ref or a name".to_string(),
            })
        }
        NewRow::Sector { sector, .. } | NewRow::TransactionSector { sector, .. } => {
            required("code", &sector.code, table)?;
            percentage(sector.percentage, table)
        }
        NewRow::RecipientCountry { country, .. }
        | NewRow::TransactionRecipientCountry { country, .. } => {
            required("code", &country.code, table)?;
            percentage(country.percentage, table)
        }
        NewRow::RecipientRegion { region, .. }
        | NewRow::TransactionRecipientRegion { region, .. } => {
            required("code", &region.code, table)?;
            percentage(region.percentage, table)
        }
        NewRow::TransactionAidType { aid_type, .. } => required("code", &aid_type.code, table),
        NewRow::PolicyMarker { marker, .. } => required("code", &marker.code, table),
        NewRow::Tag { tag, .. } => required("code", &tag.code, table),
        NewRow::ParticipatingOrg(org) => required("role", &org.role, table),
        NewRow::Transaction(transaction) => {
            required("transaction_type", &transaction.transaction_type, table)?;
            required("currency", &transaction.currency, table)
        }
        NewRow::Dimension { name, value, .. } => {
            required("name", name, table)?;
            required("value", value, table)
        }
        NewRow::LocationRef { location_ref, .. } => required("ref", location_ref, table),
        NewRow::DocumentLink { link, .. } => required("url", &link.url, table),
        NewRow::OtherFlag { flag, .. } => required("code", &flag.code, table),
        _ => Ok(()),
    }
}

fn required(column: &str, value: &str, table: Table) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Constraint {
            table,
            message: format!("{column} must not be empty"),
        });
    }
    Ok(())
}

fn percentage(value: Option<f64>, table: Table) -> Result<(), StoreError> {
    match value {
        Some(p) if !(0.0..=100.0).contains(&p) => Err(StoreError::Constraint {
            table,
            message: format!("percentage {p} outside 0-100"),
        }),
        _ => Ok(()),
    }
}
