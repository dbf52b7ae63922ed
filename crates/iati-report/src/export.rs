//! Machine-readable output: the JSON view and a CSV of every issue.

use std::io::Write;

use serde::Serialize;

use iati_model::Family;

use crate::error::Result;
use crate::view::{ReportView, issue_family};

/// Pretty-printed JSON of `view`, newline terminated.
pub fn to_json(view: &ReportView) -> Result<String> {
    let json = serde_json::to_string_pretty(view)?;
    Ok(format!("{json}\n"))
}

#[derive(Debug, Serialize)]
struct IssueRecord<'a> {
    severity: &'static str,
    family: &'a str,
    element: &'a str,
    context: &'a str,
    message: &'a str,
}

/// Write errors then warnings as CSV with a header row.
pub fn write_issues_csv<W: Write>(view: &ReportView, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for issue in &view.errors {
        csv.serialize(IssueRecord {
            severity: "error",
            family: issue_family(issue).map_or("", Family::as_str),
            element: &issue.element,
            context: &issue.context,
            message: &issue.message,
        })?;
    }
    for warning in &view.warnings {
        csv.serialize(IssueRecord {
            severity: "warning",
            family: "",
            element: "",
            context: "",
            message: warning,
        })?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use iati_model::{ImportIssue, ImportSummary};

    use super::*;

    #[test]
    fn csv_has_header_and_one_line_per_issue() {
        let mut summary = ImportSummary::new();
        summary.error(ImportIssue::new(
            "budget",
            "missing required period-start",
            "budget[2]",
        ));
        summary.warn("sector[1]: code 111 is not valid, element skipped");
        let view = ReportView::from_summary(&summary);

        let mut out = Vec::new();
        write_issues_csv(&view, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "severity,family,element,context,message");
        assert_eq!(
            lines[1],
            "error,budget,budget,budget[2],missing required period-start"
        );
        assert_eq!(
            lines[2],
            "warning,,,,\"sector[1]: code 111 is not valid, element skipped\""
        );
    }
}
