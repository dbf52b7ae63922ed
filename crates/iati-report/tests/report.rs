use iati_import::{ImportTarget, InMemoryStore, Orchestrator};
use iati_model::{Counter, Coverage, Family, ImportIssue, ImportOptions, ImportSummary};
use iati_report::{ReportView, render, to_json};

fn sample_summary() -> ImportSummary {
    let mut summary = ImportSummary::new();
    summary.add(Counter::SectorsCreated, 2);
    summary.record(Counter::OrganisationsCreated);
    summary.record(Counter::ResultsCreated);
    summary.error(ImportIssue::new(
        "period/target/dimension",
        "missing required name",
        "result[1]/indicator[1]/period[1]/target[1]/dimension[1]",
    ));
    summary.warn("sector[1]: code 111 is not valid; element skipped");
    let mut coverage = Coverage::new();
    coverage.declare("result", &["reference", "description"]);
    coverage.mark("result", "reference", true);
    summary.coverage = coverage;
    summary
}

#[test]
fn json_view_snapshot() {
    let view = ReportView::from_summary(&sample_summary());
    insta::assert_json_snapshot!(view, @r#"
    {
      "totals": {
        "activities": 1,
        "created": 4,
        "organisations_created": 1,
        "activities_created": 0,
        "errors": 1,
        "warnings": 1
      },
      "families": [
        {
          "family": "sector",
          "label": "Sectors",
          "created": 2,
          "errors": 0
        },
        {
          "family": "result",
          "label": "Results",
          "created": 1,
          "errors": 1
        }
      ],
      "coverage": [
        {
          "level": "result",
          "present": 1,
          "declared": 2,
          "percent": 50,
          "missing": [
            "description"
          ]
        }
      ],
      "errors": [
        {
          "element": "period/target/dimension",
          "message": "missing required name",
          "context": "result[1]/indicator[1]/period[1]/target[1]/dimension[1]"
        }
      ],
      "warnings": [
        "sector[1]: code 111 is not valid; element skipped"
      ]
    }
    "#);
}

#[test]
fn text_report_lists_families_coverage_and_issues() {
    let text = render(&ReportView::from_summary(&sample_summary()));
    assert!(text.contains("Sectors"));
    assert!(text.contains("Organisations created"));
    assert!(text.contains("Coverage:"));
    assert!(text.contains("50%"));
    assert!(text.contains("Issues:"));
    assert!(text.contains("period/target/dimension"));
}

#[test]
fn view_of_a_real_run() {
    let xml = r#"<iati-activity>
  <iati-identifier>XM-R</iati-identifier>
  <sector code="111" vocabulary="2" percentage="100"/>
  <budget><value value-date="2024-01-01">10</value></budget>
  <result type="1"><indicator measure="1"><period><target value="1"/></period></indicator></result>
</iati-activity>"#;
    let mut store = InMemoryStore::new();
    let run = Orchestrator::new(ImportOptions::default())
        .unwrap()
        .run(&mut store, xml, "real.xml", ImportTarget::Resolve)
        .unwrap();
    let view = ReportView::from_run(&run);

    let source = view.source.as_ref().unwrap();
    assert_eq!(source.name, "real.xml");
    assert_eq!(view.totals.activities_created, 1);
    let budget = view
        .families
        .iter()
        .find(|row| row.family == Family::Budgets)
        .unwrap();
    assert_eq!((budget.created, budget.errors), (0, 1));
    let results = view
        .families
        .iter()
        .find(|row| row.family == Family::Results)
        .unwrap();
    assert_eq!(results.created, 4);

    let json: serde_json::Value = serde_json::from_str(&to_json(&view).unwrap()).unwrap();
    assert_eq!(json["source"]["name"], "real.xml");
    assert_eq!(json["coverage"].as_array().unwrap().len(), 4);
}
