use proptest::prelude::*;

use iati_import::importers::{ContactsImporter, contact_key, merge_contact};
use iati_import::store::ActivityRow;
use iati_import::{
    FamilyImporter, ImportContext, InMemoryStore, NewRow, ResolvedReferences, Store, Table,
};
use iati_model::{Contact, Counter, ImportOptions, ImportSummary, Narrative, ParsedActivity};

fn recase(text: &str, upper: &[bool]) -> String {
    text.chars()
        .zip(upper.iter().copied().chain(std::iter::repeat(false)))
        .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
        .collect()
}

fn email_contact(email: String) -> Contact {
    Contact {
        contact_type: "1".to_string(),
        email: Some(email),
        ..Contact::default()
    }
}

fn run(contacts: Vec<Contact>, options: &ImportOptions) -> (InMemoryStore, ImportSummary) {
    let mut store = InMemoryStore::new();
    let activity = store
        .insert(NewRow::Activity(ActivityRow::default()))
        .unwrap();
    let references = ResolvedReferences::default();
    let ctx = ImportContext {
        activity,
        references: &references,
        options,
    };
    let parsed = ParsedActivity {
        contacts,
        ..ParsedActivity::default()
    };
    let summary = ContactsImporter.import(&mut store, &ctx, &parsed);
    (store, summary)
}

proptest! {
    #[test]
    fn same_email_in_any_case_is_one_row(
        local in "[a-z]{1,12}",
        domain in "[a-z]{1,8}",
        casings in prop::collection::vec(prop::collection::vec(any::<bool>(), 0..24), 1..6),
    ) {
        let email = format!("{local}@{domain}.org");
        let contacts: Vec<Contact> = casings
            .iter()
            .map(|upper| email_contact(recase(&email, upper)))
            .collect();
        let total = contacts.len();

        let (store, summary) = run(contacts, &ImportOptions::default());

        prop_assert_eq!(store.count(Table::Contacts), 1);
        prop_assert_eq!(summary.count(Counter::ContactsCreated), 1);
        prop_assert_eq!(summary.count(Counter::ContactsMerged), total - 1);
    }

    #[test]
    fn merge_is_idempotent_and_never_overwrites(
        email in proptest::option::of("[a-z]{1,8}@example\\.org"),
        phone in proptest::option::of("\\+[0-9]{6,10}"),
        other_phone in "\\+[0-9]{6,10}",
    ) {
        let existing = Contact {
            contact_type: "1".to_string(),
            email: email.clone(),
            telephone: phone.clone(),
            ..Contact::default()
        };
        let incoming = Contact {
            contact_type: "2".to_string(),
            email: Some("someone@example.org".to_string()),
            telephone: Some(other_phone.clone()),
            ..Contact::default()
        };

        let merged = merge_contact(&existing, &incoming);
        prop_assert_eq!(merge_contact(&merged, &incoming), merged.clone());
        prop_assert_eq!(merged.contact_type.as_str(), "1");
        prop_assert_eq!(merged.telephone, phone.or(Some(other_phone)));
        prop_assert_eq!(merged.email, email.or(Some("someone@example.org".to_string())));
    }
}

#[test]
fn same_name_merges_without_email() {
    let contacts = vec![
        Contact {
            person_name: Some(Narrative::new("Amina Diallo")),
            ..Contact::default()
        },
        Contact {
            person_name: Some(Narrative::new("AMINA DIALLO")),
            email: Some("amina@example.org".to_string()),
            ..Contact::default()
        },
    ];
    assert!(contact_key(&contacts[0]).matches(&contact_key(&contacts[1])));

    let (store, summary) = run(contacts, &ImportOptions::default());
    assert_eq!(store.count(Table::Contacts), 1);
    assert_eq!(summary.count(Counter::ContactsMerged), 1);
}

#[test]
fn merging_can_be_switched_off() {
    let contacts = vec![
        email_contact("amina@example.org".to_string()),
        email_contact("amina@example.org".to_string()),
    ];
    let options = ImportOptions {
        merge_contacts: false,
        ..ImportOptions::default()
    };
    let (store, summary) = run(contacts, &options);
    assert_eq!(store.count(Table::Contacts), 2);
    assert_eq!(summary.count(Counter::ContactsCreated), 2);
}
