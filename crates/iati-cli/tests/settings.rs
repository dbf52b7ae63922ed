use std::fs;
use std::path::PathBuf;

use iati_cli::settings::{
    Exclusion, OptionOverrides, apply_overrides, build_selection, load_options,
    options_from_toml, parse_exclusion,
};
use iati_model::{
    Family, ImportOptions, MatchingMode, MultiValueGroup, ParsedActivity, RecipientCountry,
    RecipientRegion,
};

fn config_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("iati-cli-{}-{name}.toml", std::process::id()));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn flags_override_the_config_file() {
    let path = config_file(
        "override",
        r#"
percentage_tolerance = 0.5
matching = "exact"
merge_contacts = true
families = ["sector", "budget"]
"#,
    );
    let overrides = OptionOverrides {
        tolerance: Some(2.0),
        fuzzy_names: true,
        no_contact_merge: true,
        ..OptionOverrides::default()
    };

    let options = load_options(Some(&path), &overrides).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(options.percentage_tolerance, 2.0);
    assert_eq!(options.matching, MatchingMode::Fuzzy);
    assert!(!options.merge_contacts);
    assert_eq!(options.families, vec![Family::Sectors, Family::Budgets]);
    assert!(options.project_single_values);
}

#[test]
fn unset_flags_keep_file_values() {
    let base = options_from_toml("project_single_values = false\nmax_logged_errors = 5\n").unwrap();
    let options = apply_overrides(base, &OptionOverrides::default());
    assert!(!options.project_single_values);
    assert_eq!(options.max_logged_errors, 5);
    assert_eq!(options.families, ImportOptions::default().families);
}

#[test]
fn rejected_options_and_missing_files_are_errors() {
    let negative = OptionOverrides {
        tolerance: Some(-1.0),
        ..OptionOverrides::default()
    };
    assert!(load_options(None, &negative).is_err());

    let missing = std::env::temp_dir().join("iati-cli-does-not-exist.toml");
    let error = load_options(Some(&missing), &OptionOverrides::default()).unwrap_err();
    assert!(format!("{error:#}").contains("read config"));

    assert!(options_from_toml("matching = \"loose\"").is_err());
}

#[test]
fn selection_keeps_families_and_drops_exclusions() {
    let selection = build_selection(
        &[Family::Sectors, Family::Results],
        &[Exclusion::Element(Family::Sectors, 1)],
    );
    assert!(selection.includes(Family::Results));
    assert!(!selection.includes(Family::Budgets));
    assert!(selection.is_excluded(Family::Sectors, 1));
    assert!(!selection.is_excluded(Family::Sectors, 0));
}

#[test]
fn excluding_the_first_region_keeps_the_countries() {
    let mut activity = ParsedActivity {
        recipient_countries: MultiValueGroup::new(vec![RecipientCountry {
            code: "TZ".to_string(),
            percentage: Some(60.0),
            narrative: None,
        }]),
        recipient_regions: MultiValueGroup::new(vec![RecipientRegion {
            code: "298".to_string(),
            vocabulary: "1".to_string(),
            vocabulary_uri: None,
            percentage: Some(40.0),
            narrative: None,
        }]),
        ..ParsedActivity::default()
    };
    let exclusion = parse_exclusion("recipient-region[1]").unwrap();

    build_selection(&Family::ALL, &[exclusion]).apply(&mut activity);

    let countries: Vec<&str> = activity
        .recipient_countries
        .iter()
        .map(|country| country.code.as_str())
        .collect();
    assert_eq!(countries, vec!["TZ"]);
    assert!(activity.recipient_regions.is_empty());
}

#[test]
fn layered_options_snapshot() {
    let overrides = OptionOverrides {
        families: Some(vec![Family::Results, Family::Documents]),
        no_single_value_projection: true,
        ..OptionOverrides::default()
    };
    let options = apply_overrides(ImportOptions::default(), &overrides);
    insta::assert_json_snapshot!(options, @r#"
    {
      "percentage_tolerance": 0.01,
      "families": [
        "result",
        "document-link"
      ],
      "matching": "exact",
      "project_single_values": false,
      "merge_contacts": true,
      "max_logged_errors": 100
    }
    "#);
}
