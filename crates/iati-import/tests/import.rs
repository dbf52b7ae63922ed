use std::fmt::Write as _;

use iati_import::store::{DocumentOwner, NewRow, ValueOwner};
use iati_import::{ImportRun, ImportTarget, InMemoryStore, Orchestrator, Table};
use iati_model::{Counter, Family, FamilySelection, ImportOptions};

fn import(xml: &str) -> (InMemoryStore, ImportRun) {
    import_with(ImportOptions::default(), xml)
}

fn import_with(options: ImportOptions, xml: &str) -> (InMemoryStore, ImportRun) {
    let mut store = InMemoryStore::new();
    let run = Orchestrator::new(options)
        .unwrap()
        .run(&mut store, xml, "fixture.xml", ImportTarget::Resolve)
        .unwrap();
    (store, run)
}

#[test]
fn three_digit_vocabulary_two_sectors_import_cleanly() {
    let (store, run) = import(
        r#"<iati-activity>
  <iati-identifier>XM-1</iati-identifier>
  <sector code="111" vocabulary="2" percentage="50"/>
  <sector code="112" vocabulary="2" percentage="50"/>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
    assert_eq!(summary.count(Counter::SectorsCreated), 2);
    assert_eq!(store.count(Table::ActivitySectors), 2);
}

#[test]
fn country_sum_mismatch_imports_both_with_one_warning() {
    let (store, run) = import(
        r#"<iati-activity>
  <recipient-country code="TZ" percentage="60"/>
  <recipient-country code="KE" percentage="35"/>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert_eq!(store.count(Table::RecipientCountries), 2);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("95"));
    assert!(summary.errors.is_empty());
}

#[test]
fn transaction_with_country_and_region_imports_with_warning() {
    let (store, run) = import(
        r#"<iati-activity>
  <transaction>
    <transaction-type code="3"/>
    <transaction-date iso-date="2024-01-15"/>
    <value currency="USD" value-date="2024-01-15">2500</value>
    <recipient-country code="TZ"/>
    <recipient-region code="298"/>
  </transaction>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("country XOR region"));
    assert_eq!(store.count(Table::Transactions), 1);
    assert_eq!(store.count(Table::TransactionRecipientCountries), 1);
    assert_eq!(store.count(Table::TransactionRecipientRegions), 1);
}

#[test]
fn sole_full_sector_is_projected_onto_the_transaction() {
    let xml = r#"<iati-activity default-currency="EUR">
  <transaction>
    <transaction-type code="2"/>
    <transaction-date iso-date="2024-01-15"/>
    <value value-date="2024-01-15">100</value>
    <sector code="11110" percentage="100"/>
  </transaction>
</iati-activity>"#;
    let (store, _) = import(xml);
    let (_, row) = store.rows(Table::Transactions).next().unwrap();
    let NewRow::Transaction(transaction) = row else {
        panic!("expected a transaction row, got {row:?}");
    };
    assert_eq!(transaction.sector_code.as_deref(), Some("11110"));
    assert_eq!(transaction.currency, "EUR");

    let mut options = ImportOptions::default();
    options.project_single_values = false;
    let (store, _) = import_with(options, xml);
    let (_, row) = store.rows(Table::Transactions).next().unwrap();
    let NewRow::Transaction(transaction) = row else {
        panic!("expected a transaction row, got {row:?}");
    };
    assert_eq!(transaction.sector_code, None);
}

/// One result, one indicator, `periods` periods each with a target and an
/// actual carrying two dimensions. The dimension at `broken` lacks its name.
fn results_document(periods: usize, broken: usize) -> String {
    let mut xml = String::from(
        "<iati-activity><iati-identifier>XM-RESULTS</iati-identifier>\
         <result type=\"1\"><indicator measure=\"1\">",
    );
    for index in 0..periods {
        let name = if index == broken {
            String::new()
        } else {
            " name=\"sex\"".to_string()
        };
        write!(
            xml,
            "<period><period-start iso-date=\"2024-01-01\"/><period-end iso-date=\"2024-12-31\"/>\
             <target value=\"{index}\"><dimension{name} value=\"female\"/><dimension name=\"age\" value=\"adult\"/></target>\
             <actual value=\"{index}\"/></period>"
        )
        .unwrap();
    }
    xml.push_str("</indicator></result></iati-activity>");
    xml
}

#[test]
fn one_bad_dimension_in_a_large_results_document() {
    let (store, run) = import(&results_document(40, 17));
    let summary = run.summary();

    assert_eq!(summary.errors.len(), 1, "{:?}", summary.errors);
    let issue = &summary.errors[0];
    assert_eq!(issue.element, "period/target/dimension");
    assert_eq!(
        issue.context,
        "result[1]/indicator[1]/period[18]/target[1]/dimension[1]"
    );
    assert!(issue.message.contains("name"));

    assert_eq!(summary.count(Counter::PeriodsCreated), 40);
    assert_eq!(summary.count(Counter::PeriodTargetsCreated), 40);
    assert_eq!(summary.count(Counter::PeriodActualsCreated), 40);
    assert_eq!(summary.count(Counter::PeriodDimensionsCreated), 79);
    assert_eq!(store.count(Table::Dimensions), 79);
}

#[test]
fn results_hierarchy_links_every_level_to_its_parent() {
    let (store, run) = import(
        r#"<iati-activity>
  <iati-identifier>XM-2</iati-identifier>
  <location ref="LOC-1"><name><narrative>Dodoma</narrative></name></location>
  <result type="1">
    <reference vocabulary="99" code="R1"/>
    <document-link url="https://example.org/result.pdf"/>
    <indicator measure="1">
      <reference vocabulary="1" code="3.1"/>
      <baseline year="2023" value="10">
        <location ref="LOC-1"/>
        <dimension name="sex" value="female"/>
      </baseline>
      <period>
        <period-start iso-date="2024-01-01"/>
        <period-end iso-date="2024-12-31"/>
        <target value="100"><location ref="LOC-1"/></target>
        <actual value="80"/>
      </period>
    </indicator>
  </result>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);
    assert_eq!(summary.count(Counter::ResultsCreated), 1);
    assert_eq!(summary.count(Counter::ResultReferencesCreated), 1);
    assert_eq!(summary.count(Counter::ResultDocumentLinksCreated), 1);
    assert_eq!(summary.count(Counter::IndicatorsCreated), 1);
    assert_eq!(summary.count(Counter::IndicatorReferencesCreated), 1);
    assert_eq!(summary.count(Counter::BaselinesCreated), 1);
    assert_eq!(summary.count(Counter::BaselineDimensionsCreated), 1);
    assert_eq!(summary.count(Counter::BaselineLocationsCreated), 1);
    assert_eq!(summary.count(Counter::PeriodsCreated), 1);
    assert_eq!(summary.count(Counter::PeriodTargetsCreated), 1);
    assert_eq!(summary.count(Counter::PeriodActualsCreated), 1);
    assert_eq!(summary.count(Counter::PeriodLocationsCreated), 1);
    assert_eq!(summary.family_created(Family::Results), 12);

    let (result_id, _) = store.rows(Table::Results).next().unwrap();
    let (indicator_id, indicator) = store.rows(Table::Indicators).next().unwrap();
    let NewRow::Indicator(indicator) = indicator else {
        panic!("expected an indicator row");
    };
    assert_eq!(indicator.result, result_id);

    let (period_id, period) = store.rows(Table::Periods).next().unwrap();
    let NewRow::Period(period) = period else {
        panic!("expected a period row");
    };
    assert_eq!(period.indicator, indicator_id);
    for (_, value) in store.rows(Table::PeriodValues) {
        let NewRow::PeriodValue(value) = value else {
            panic!("expected a period value row");
        };
        assert_eq!(value.period, period_id);
    }

    let (location_id, _) = store.rows(Table::Locations).next().unwrap();
    let linked = store
        .rows(Table::LocationRefs)
        .filter(|(_, row)| {
            matches!(row, NewRow::LocationRef { location: Some(id), .. } if *id == location_id)
        })
        .count();
    assert_eq!(linked, 2);

    let (_, link) = store.rows(Table::DocumentLinks).next().unwrap();
    assert!(matches!(
        link,
        NewRow::DocumentLink {
            owner: DocumentOwner::Result(id),
            ..
        } if *id == result_id
    ));
    let (_, dimension) = store.rows(Table::Dimensions).next().unwrap();
    assert!(matches!(
        dimension,
        NewRow::Dimension {
            owner: ValueOwner::Baseline(_),
            ..
        }
    ));
}

#[test]
fn failed_dimension_keeps_its_parents() {
    // Only the dimension without a value fails.
    let (store, run) = import(
        r#"<iati-activity>
  <result type="1">
    <indicator measure="1">
      <period><target value="1"><dimension name="sex"/></target></period>
      <period><target value="2"/></period>
    </indicator>
  </result>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].message.contains("value"));
    assert_eq!(store.count(Table::Results), 1);
    assert_eq!(store.count(Table::Periods), 2);
}

#[test]
fn empty_url_document_link_does_not_block_its_siblings() {
    let (store, run) = import(
        r#"<iati-activity>
  <document-link url="https://example.org/a.pdf"/>
  <document-link url=""/>
  <document-link url="https://example.org/c.pdf"/>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert_eq!(summary.count(Counter::DocumentLinksCreated), 2);
    assert_eq!(store.count(Table::DocumentLinks), 2);
    assert!(summary.warnings.iter().any(|w| w.starts_with("document-link[2]")));
}

#[test]
fn contacts_with_the_same_email_merge_into_one_row() {
    let xml = r#"<iati-activity>
  <iati-identifier>XM-3</iati-identifier>
  <contact-info type="1">
    <email>Amina@Example.org</email>
  </contact-info>
  <contact-info type="1">
    <person-name><narrative>Amina Diallo</narrative></person-name>
    <email>amina@example.org</email>
    <telephone>+255 22 000</telephone>
  </contact-info>
</iati-activity>"#;
    let (mut store, run) = import(xml);
    let summary = run.summary();
    assert_eq!(summary.count(Counter::ContactsCreated), 1);
    assert_eq!(summary.count(Counter::ContactsMerged), 1);
    assert_eq!(store.count(Table::Contacts), 1);

    let (_, row) = store.rows(Table::Contacts).next().unwrap();
    let NewRow::Contact { contact, .. } = row else {
        panic!("expected a contact row");
    };
    assert_eq!(contact.email.as_deref(), Some("Amina@Example.org"));
    assert_eq!(contact.telephone.as_deref(), Some("+255 22 000"));

    // Re-importing into the same activity still leaves one row.
    Orchestrator::new(ImportOptions::default())
        .unwrap()
        .run(&mut store, xml, "again.xml", ImportTarget::Resolve)
        .unwrap();
    assert_eq!(store.count(Table::Activities), 1);
    assert_eq!(store.count(Table::Contacts), 1);
}

#[test]
fn failing_family_does_not_block_the_next() {
    let (store, run) = import(
        r#"<iati-activity>
  <budget><value value-date="2024-01-01">10</value></budget>
  <conditions attached="0"><condition><narrative>No type</narrative></condition></conditions>
  <tag code="T1" vocabulary="99"/>
  <policy-marker code="2" vocabulary="1" significance="1"/>
</iati-activity>"#,
    );
    let summary = run.summary();
    let elements: Vec<&str> = summary.errors.iter().map(|e| e.element.as_str()).collect();
    assert_eq!(elements, ["budget", "conditions/condition"]);
    assert_eq!(store.count(Table::Tags), 1);
    assert_eq!(store.count(Table::PolicyMarkers), 1);
}

#[test]
fn organisations_are_resolved_once_and_shared() {
    let (store, run) = import(
        r#"<iati-activity>
  <iati-identifier>XM-4</iati-identifier>
  <reporting-org ref="XM-DAC-41114" type="40"><narrative>UNDP</narrative></reporting-org>
  <participating-org ref="XM-DAC-41114" role="2"/>
  <participating-org role="4" type="22"><narrative>Local Water Board</narrative></participating-org>
  <transaction>
    <transaction-type code="3"/>
    <transaction-date iso-date="2024-01-15"/>
    <value currency="USD" value-date="2024-01-15">2500</value>
    <receiver-org receiver-activity-id="XM-5"><narrative>local water board</narrative></receiver-org>
  </transaction>
</iati-activity>"#,
    );
    let summary = run.summary();
    assert!(summary.errors.is_empty(), "{:?}", summary.errors);
    assert_eq!(summary.count(Counter::OrganisationsCreated), 2);
    assert_eq!(store.count(Table::Organisations), 2);
    // XM-4 itself plus the XM-5 stub.
    assert_eq!(summary.count(Counter::ActivitiesCreated), 2);
    assert_eq!(store.count(Table::Activities), 2);
}

#[test]
fn review_selection_limits_families_and_elements() {
    let xml = r#"<iati-activity>
  <sector code="11110" percentage="100"/>
  <tag code="T1" vocabulary="99"/>
  <tag code="T2" vocabulary="99"/>
</iati-activity>"#;
    let mut store = InMemoryStore::new();
    let selection = FamilySelection::only([Family::Tags]).exclude(Family::Tags, 0);
    let run = Orchestrator::new(ImportOptions::default())
        .unwrap()
        .with_selection(selection)
        .run(&mut store, xml, "fixture.xml", ImportTarget::Resolve)
        .unwrap();
    assert_eq!(store.count(Table::ActivitySectors), 0);
    assert_eq!(store.count(Table::Tags), 1);
    assert_eq!(run.summary().count(Counter::TagsCreated), 1);
}

#[test]
fn configured_families_run_in_dependency_order_once() {
    let options = ImportOptions::default().with_families(vec![
        Family::Results,
        Family::Sectors,
        Family::Locations,
        Family::Sectors,
    ]);
    let orchestrator = Orchestrator::new(options.clone()).unwrap();
    assert_eq!(
        orchestrator.families(),
        vec![Family::Sectors, Family::Locations, Family::Results]
    );

    let (store, run) = import_with(
        options,
        r#"<iati-activity>
  <iati-identifier>XM-O</iati-identifier>
  <sector code="11110" percentage="100"/>
  <location ref="LOC-1"><name><narrative>Dodoma</narrative></name></location>
  <result type="1">
    <indicator measure="1">
      <period><target value="1"><location ref="LOC-1"/></target></period>
    </indicator>
  </result>
</iati-activity>"#,
    );
    assert_eq!(store.count(Table::ActivitySectors), 1);
    assert_eq!(run.summary().count(Counter::SectorsCreated), 1);
    let linked = store
        .rows(Table::LocationRefs)
        .filter(|(_, row)| matches!(row, NewRow::LocationRef { location: Some(_), .. }))
        .count();
    assert_eq!(linked, 1);
}

#[test]
fn every_activity_of_a_document_is_imported_and_logged() {
    let (store, run) = import(
        r#"<iati-activities>
  <iati-activity><iati-identifier>XM-A</iati-identifier><tag code="A" vocabulary="99"/></iati-activity>
  <iati-activity><iati-identifier>XM-B</iati-identifier><tag code="B" vocabulary="99"/></iati-activity>
</iati-activities>"#,
    );
    assert_eq!(run.activities.len(), 2);
    assert_eq!(run.activities[1].iati_identifier.as_deref(), Some("XM-B"));
    assert_eq!(store.count(Table::Activities), 2);
    assert_eq!(store.count(Table::ImportLogs), 2);
    assert_eq!(run.summary().count(Counter::TagsCreated), 2);
}

#[test]
fn explicit_target_receives_snippet_elements() {
    let mut store = InMemoryStore::new();
    let first = Orchestrator::new(ImportOptions::default())
        .unwrap()
        .run(
            &mut store,
            "<iati-activity><iati-identifier>XM-T</iati-identifier></iati-activity>",
            "activity.xml",
            ImportTarget::Resolve,
        )
        .unwrap();
    let target = first.activities[0].activity;

    let run = Orchestrator::new(ImportOptions::default())
        .unwrap()
        .run(
            &mut store,
            r#"<sector code="11110"/><sector code="11120"/>"#,
            "snippet.xml",
            ImportTarget::Activity(target),
        )
        .unwrap();
    assert_eq!(run.activities[0].activity, target);
    assert_eq!(store.count(Table::Activities), 1);
    assert_eq!(store.count(Table::ActivitySectors), 2);
}

#[test]
fn coverage_reports_what_the_source_contains() {
    let (_, run) = import(&results_document(3, usize::MAX));
    let coverage = &run.activities[0].summary.coverage;
    let period = coverage.level("period").unwrap();
    assert!(period["target"]);
    assert!(period["actual"]);
    assert!(period["dimension"]);
    assert!(!period["document-link"]);
    assert_eq!(coverage.fraction("result"), Some(0.0));
}
