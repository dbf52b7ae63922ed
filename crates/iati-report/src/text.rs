//! Terminal rendering with comfy-table.

use std::collections::BTreeMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use iati_model::Family;

use crate::view::{CoverageRow, ReportView};

/// Summary, coverage and issue tables, separated by blank lines.
pub fn render(view: &ReportView) -> String {
    let mut sections = Vec::new();
    if let Some(source) = &view.source {
        sections.push(format!("Source: {} (sha256 {})", source.name, source.sha256));
    }
    sections.push(summary_table(view).to_string());
    if !view.coverage.is_empty() {
        sections.push(format!("Coverage:\n{}", coverage_table(&view.coverage)));
    }
    if let Some(issues) = issue_table(view) {
        sections.push(format!("Issues:\n{issues}"));
    }
    sections.join("\n\n")
}

fn summary_table(view: &ReportView) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Family"),
        header_cell("Description"),
        header_cell("Created"),
        header_cell("Errors"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);

    if view.totals.organisations_created > 0 {
        table.add_row(vec![
            dim_cell("resolver"),
            dim_cell("Organisations created"),
            Cell::new(view.totals.organisations_created),
            dim_cell("-"),
        ]);
    }
    if view.totals.activities_created > 0 {
        table.add_row(vec![
            dim_cell("resolver"),
            dim_cell("Activities created"),
            Cell::new(view.totals.activities_created),
            dim_cell("-"),
        ]);
    }
    for row in &view.families {
        table.add_row(vec![
            family_cell(row.family),
            Cell::new(row.label),
            Cell::new(row.created),
            count_cell(row.errors, Color::Red),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{} activit{}, {} warning(s)",
            view.totals.activities,
            if view.totals.activities == 1 { "y" } else { "ies" },
            view.totals.warnings
        ))
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold),
        Cell::new(view.totals.created).add_attribute(Attribute::Bold),
        count_cell(view.totals.errors, Color::Red).add_attribute(Attribute::Bold),
    ]);
    table
}

fn coverage_table(rows: &[CoverageRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Present"),
        header_cell("Coverage"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for row in rows {
        let missing = if row.missing.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(row.missing.join(", "))
        };
        table.add_row(vec![
            Cell::new(&row.level).fg(Color::Blue),
            Cell::new(format!("{}/{}", row.present, row.declared)),
            percent_cell(row.percent),
            missing,
        ]);
    }
    table
}

fn issue_table(view: &ReportView) -> Option<Table> {
    if view.errors.is_empty() && view.warnings.is_empty() {
        return None;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Element"),
        header_cell("Context"),
        header_cell("Message"),
    ]);
    apply_issue_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for issue in &view.errors {
        table.add_row(vec![
            Cell::new("ERROR").fg(Color::Red),
            Cell::new(&issue.element),
            Cell::new(&issue.context),
            Cell::new(&issue.message),
        ]);
    }
    for warning in &view.warnings {
        let (context, message) = split_context(warning);
        table.add_row(vec![
            Cell::new("WARN").fg(Color::Yellow),
            dim_cell("-"),
            context.map_or_else(|| dim_cell("-"), Cell::new),
            Cell::new(message),
        ]);
    }
    Some(table)
}

/// Elements per family in a parsed document, for review before import.
pub fn render_family_counts(counts: &BTreeMap<Family, usize>) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Family"),
        header_cell("Description"),
        header_cell("Elements"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for (family, count) in counts {
        table.add_row(vec![
            family_cell(*family),
            Cell::new(family.label()),
            if *count > 0 {
                Cell::new(count)
            } else {
                dim_cell(count)
            },
        ]);
    }
    table.to_string()
}

/// Warnings read `path: message`; the path becomes the context column.
fn split_context(warning: &str) -> (Option<&str>, &str) {
    match warning.split_once(": ") {
        Some((context, message)) if !context.contains(' ') => (Some(context), message),
        _ => (None, warning),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(22)),
        ColumnConstraint::UpperBoundary(Width::Percentage(50)),
        ColumnConstraint::LowerBoundary(Width::Fixed(9)),
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),
    ]);
}

fn apply_issue_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(160);
    table.set_constraints(vec![
        ColumnConstraint::UpperBoundary(Width::Fixed(9)),
        ColumnConstraint::UpperBoundary(Width::Fixed(28)),
        ColumnConstraint::UpperBoundary(Width::Percentage(35)),
        ColumnConstraint::UpperBoundary(Width::Percentage(45)),
    ]);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn family_cell(family: Family) -> Cell {
    Cell::new(family.as_str())
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn percent_cell(percent: u32) -> Cell {
    let color = match percent {
        80.. => Color::Green,
        40..=79 => Color::Yellow,
        _ => Color::Red,
    };
    Cell::new(format!("{percent}%")).fg(color)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_path_becomes_context() {
        assert_eq!(
            split_context("sector[2]: code 111 is not valid"),
            (Some("sector[2]"), "code 111 is not valid")
        );
        assert_eq!(
            split_context("organisation Local Water Board left unresolved: constraint"),
            (None, "organisation Local Water Board left unresolved: constraint")
        );
    }
}
