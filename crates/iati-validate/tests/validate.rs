use iati_validate::Validator;
use iati_xml::parse_activity;

fn validate(xml: &str) -> (iati_model::ParsedActivity, Vec<iati_validate::ValidationWarning>) {
    let mut activity = parse_activity(xml).unwrap();
    let warnings = Validator::default().apply(&mut activity);
    (activity, warnings)
}

#[test]
fn three_digit_vocabulary_two_sectors_are_valid() {
    let (activity, warnings) = validate(
        r#"<iati-activity>
  <sector code="111" vocabulary="2"/>
  <sector code="112" vocabulary="2"/>
</iati-activity>"#,
    );
    assert!(warnings.is_empty(), "{warnings:?}");
    assert_eq!(activity.sectors.len(), 2);
}

#[test]
fn invalid_sector_is_filtered_and_siblings_kept() {
    let (activity, warnings) = validate(
        r#"<iati-activity>
  <sector code="111"/>
  <sector code="11110"/>
  <sector code="CUSTOM1" vocabulary="99"/>
</iati-activity>"#,
    );
    let codes: Vec<&str> = activity.sectors.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, ["11110", "CUSTOM1"]);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].element, "sector[1]");
}

#[test]
fn geography_sum_mismatch_keeps_both_countries() {
    let (activity, warnings) = validate(
        r#"<iati-activity>
  <recipient-country code="TZ" percentage="60"/>
  <recipient-country code="KE" percentage="35"/>
</iati-activity>"#,
    );
    assert_eq!(activity.recipient_countries.len(), 2);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("95"));
}

#[test]
fn transaction_with_country_and_region_warns_once() {
    let (activity, warnings) = validate(
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
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].message.contains("country XOR region"));
    let transaction = &activity.transactions[0];
    assert_eq!(transaction.recipient_countries.len(), 1);
    assert_eq!(transaction.recipient_regions.len(), 1);
}

#[test]
fn sectors_on_both_levels_warn() {
    let (_, warnings) = validate(
        r#"<iati-activity>
  <sector code="11110"/>
  <transaction>
    <transaction-type code="3"/>
    <sector code="11120"/>
  </transaction>
</iati-activity>"#,
    );
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].element, "sector");
}

#[test]
fn invalid_transaction_aid_type_is_filtered() {
    let (activity, warnings) = validate(
        r#"<iati-activity>
  <transaction>
    <aid-type code="C01"/>
    <aid-type code="not-a-code"/>
  </transaction>
</iati-activity>"#,
    );
    assert_eq!(activity.transactions[0].aid_types.len(), 1);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].element, "transaction[1]/aid-type[2]");
}
