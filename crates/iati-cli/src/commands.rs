use std::fs::{self, File};
use std::io::{self, BufWriter, Read};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use tracing::{info, info_span};

use iati_cli::settings::{
    OptionOverrides, build_selection, load_options, parse_exclusion, parse_families,
};
use iati_cli::snapshot::{load_store, save_store};
use iati_import::{ImportTarget, InMemoryStore, Orchestrator, RowId};
use iati_model::{Family, ImportOptions};
use iati_report::{ReportView, render_family_counts, to_json, write_issues_csv};
use iati_validate::Validator;

use crate::cli::{ImportArgs, OptionArgs, SourceArgs, ValidateArgs};

/// What `validate` found across every activity in the file.
pub struct ValidateOutcome {
    pub activities: usize,
    pub warnings: Vec<String>,
}

pub fn run_families() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Element", "Description"]);
    apply_table_style(&mut table);
    for (position, family) in Family::ALL.iter().enumerate() {
        table.add_row(vec![
            (position + 1).to_string(),
            family.as_str().to_string(),
            family.label().to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_import(args: &ImportArgs) -> Result<ReportView> {
    let (source_name, xml) = read_source(&args.source.file)?;
    let options = import_options(&args.options)?;
    let exclusions = args
        .exclude
        .iter()
        .map(String::as_str)
        .map(parse_exclusion)
        .collect::<Result<Vec<_>>>()?;
    let selection = build_selection(&options.families, &exclusions);
    let orchestrator = Orchestrator::new(options)
        .context("invalid import options")?
        .with_selection(selection);
    let target = args
        .target
        .map_or(ImportTarget::Resolve, |id| ImportTarget::Activity(RowId(id)));

    let span = info_span!("cli_import", source = %source_name);
    let _guard = span.enter();
    let start = Instant::now();

    let mut store = match &args.store {
        Some(path) => load_store(path)?,
        None => InMemoryStore::new(),
    };
    let run = orchestrator
        .run(&mut store, &xml, &source_name, target)
        .with_context(|| format!("import {source_name}"))?;
    let view = ReportView::from_run(&run);
    info!(
        activities = run.activities.len(),
        created = view.totals.created,
        errors = view.totals.errors,
        duration_ms = start.elapsed().as_millis(),
        "import finished"
    );

    if let Some(path) = &args.json {
        let json = to_json(&view).context("render report json")?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }
    if let Some(path) = &args.errors_csv {
        let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        write_issues_csv(&view, BufWriter::new(file))
            .with_context(|| format!("write {}", path.display()))?;
    }
    if let Some(path) = &args.dump_store {
        save_store(&store, path)?;
    }
    Ok(view)
}

pub fn run_inspect(args: &SourceArgs) -> Result<()> {
    let (source_name, xml) = read_source(&args.file)?;
    let activities =
        iati_xml::parse_document(&xml).with_context(|| format!("parse {source_name}"))?;
    for (position, activity) in activities.iter().enumerate() {
        let identifier = activity
            .iati_identifier
            .as_deref()
            .unwrap_or("(no iati-identifier)");
        println!("Activity {}: {identifier}", position + 1);
        println!("{}", render_family_counts(&activity.family_counts()));
        for warning in &activity.parse_warnings {
            println!("  warning: {warning}");
        }
    }
    Ok(())
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateOutcome> {
    let (source_name, xml) = read_source(&args.source.file)?;
    let overrides = OptionOverrides {
        tolerance: args.tolerance,
        ..OptionOverrides::default()
    };
    let options = load_options(args.config.as_deref(), &overrides)?;
    let validator = Validator::from_options(&options);
    let activities =
        iati_xml::parse_document(&xml).with_context(|| format!("parse {source_name}"))?;

    let count = activities.len();
    let mut warnings = Vec::new();
    for mut activity in activities {
        let label = activity
            .iati_identifier
            .clone()
            .unwrap_or_else(|| source_name.clone());
        warnings.extend(
            activity
                .parse_warnings
                .iter()
                .map(|warning| format!("{label}: {warning}")),
        );
        warnings.extend(
            validator
                .apply(&mut activity)
                .iter()
                .map(|warning| format!("{label}: {warning}")),
        );
    }
    Ok(ValidateOutcome {
        activities: count,
        warnings,
    })
}

fn import_options(args: &OptionArgs) -> Result<ImportOptions> {
    let overrides = OptionOverrides {
        families: args.families.as_deref().map(parse_families).transpose()?,
        tolerance: args.tolerance,
        fuzzy_names: args.fuzzy_names,
        no_single_value_projection: args.no_single_value_projection,
        no_contact_merge: args.no_contact_merge,
    };
    load_options(args.config.as_deref(), &overrides)
}

/// File contents and the name recorded on the import log.
fn read_source(path: &Path) -> Result<(String, String)> {
    if path.as_os_str() == "-" {
        let mut xml = String::new();
        io::stdin()
            .read_to_string(&mut xml)
            .context("read stdin")?;
        return Ok(("stdin".to_string(), xml));
    }
    let xml = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned());
    Ok((name, xml))
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}
