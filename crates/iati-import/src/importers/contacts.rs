use tracing::debug;

use iati_model::{Contact, Counter, Family, ImportSummary, Narrative, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row, record_error};
use crate::error::ElementImportError;
use crate::store::{NewRow, RowId, Store};

/// `<contact-info>`, deduplicated against the contacts already stored for
/// the activity (including ones created earlier in the same run).
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactsImporter;

impl FamilyImporter for ContactsImporter {
    fn family(&self) -> Family {
        Family::Contacts
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, contact) in activity.contacts.iter().enumerate() {
            let path = ElementPath::root("contact-info", index);
            let existing = if ctx.options.merge_contacts {
                find_duplicate(store, ctx.activity, contact)
            } else {
                None
            };
            match existing {
                Some((id, stored)) => {
                    // Index only; contact details stay out of the logs.
                    debug!(contact = index + 1, row = %id, "contact merged into existing row");
                    match store.update_contact(id, merge_contact(&stored, contact)) {
                        Ok(()) => summary.record(Counter::ContactsMerged),
                        Err(error) => {
                            record_error(&mut summary, &path, &ElementImportError::from(error));
                        }
                    }
                }
                None => {
                    let row = NewRow::Contact {
                        activity: ctx.activity,
                        contact: contact.clone(),
                    };
                    insert_row(store, &mut summary, &path, Counter::ContactsCreated, Ok(row));
                }
            }
        }
        summary
    }
}

/// Identity used to detect duplicate contacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactKey {
    /// Lower-cased email.
    pub email: Option<String>,
    /// Lower-cased (first, last) name, split at the first whitespace.
    pub name: Option<(String, String)>,
}

impl ContactKey {
    /// Same person when the emails match or the names match.
    pub fn matches(&self, other: &ContactKey) -> bool {
        let same_email = self.email.is_some() && self.email == other.email;
        let same_name = self.name.is_some() && self.name == other.name;
        same_email || same_name
    }
}

pub fn contact_key(contact: &Contact) -> ContactKey {
    let email = contact
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_lowercase);
    let name = contact
        .person_name
        .as_ref()
        .map(|narrative| narrative.text.trim().to_lowercase())
        .filter(|name| !name.is_empty())
        .map(|name| match name.split_once(char::is_whitespace) {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (name, String::new()),
        });
    ContactKey { email, name }
}

/// `existing` with every empty field filled from `incoming`. Fields already
/// set on `existing` are never overwritten.
pub fn merge_contact(existing: &Contact, incoming: &Contact) -> Contact {
    let mut merged = existing.clone();
    if merged.contact_type.trim().is_empty() {
        merged.contact_type.clone_from(&incoming.contact_type);
    }
    fill_narrative(&mut merged.organisation, incoming.organisation.as_ref());
    fill_narrative(&mut merged.department, incoming.department.as_ref());
    fill_narrative(&mut merged.person_name, incoming.person_name.as_ref());
    fill_narrative(&mut merged.job_title, incoming.job_title.as_ref());
    fill_narrative(&mut merged.mailing_address, incoming.mailing_address.as_ref());
    fill_text(&mut merged.telephone, incoming.telephone.as_ref());
    fill_text(&mut merged.email, incoming.email.as_ref());
    fill_text(&mut merged.website, incoming.website.as_ref());
    merged
}

fn find_duplicate(store: &dyn Store, activity: RowId, contact: &Contact) -> Option<(RowId, Contact)> {
    let key = contact_key(contact);
    store
        .contacts_for(activity)
        .into_iter()
        .find(|(_, stored)| contact_key(stored).matches(&key))
}

fn fill_narrative(slot: &mut Option<Narrative>, incoming: Option<&Narrative>) {
    let empty = slot.as_ref().is_none_or(|n| n.text.trim().is_empty());
    if empty && let Some(value) = incoming.filter(|n| !n.text.trim().is_empty()) {
        *slot = Some(value.clone());
    }
}

fn fill_text(slot: &mut Option<String>, incoming: Option<&String>) {
    let empty = slot.as_deref().is_none_or(|s| s.trim().is_empty());
    if empty && let Some(value) = incoming.filter(|s| !s.trim().is_empty()) {
        *slot = Some(value.clone());
    }
}
