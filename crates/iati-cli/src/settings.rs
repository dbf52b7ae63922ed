//! Import options from a TOML file layered under command-line flags.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};

use iati_model::{Family, FamilySelection, ImportOptions, MatchingMode};

/// Flag values that override the config file when set.
#[derive(Debug, Clone, Default)]
pub struct OptionOverrides {
    pub families: Option<Vec<Family>>,
    pub tolerance: Option<f64>,
    pub fuzzy_names: bool,
    pub no_single_value_projection: bool,
    pub no_contact_merge: bool,
}

/// Read `path` (when given) and apply `overrides` on top.
pub fn load_options(path: Option<&Path>, overrides: &OptionOverrides) -> Result<ImportOptions> {
    let base = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            options_from_toml(&text).with_context(|| format!("parse config {}", path.display()))?
        }
        None => ImportOptions::default(),
    };
    let options = apply_overrides(base, overrides);
    options.validate().context("invalid import options")?;
    Ok(options)
}

pub fn options_from_toml(text: &str) -> Result<ImportOptions> {
    Ok(toml::from_str(text)?)
}

pub fn apply_overrides(mut options: ImportOptions, overrides: &OptionOverrides) -> ImportOptions {
    if let Some(families) = &overrides.families {
        options.families.clone_from(families);
    }
    if let Some(tolerance) = overrides.tolerance {
        options.percentage_tolerance = tolerance;
    }
    if overrides.fuzzy_names {
        options.matching = MatchingMode::Fuzzy;
    }
    if overrides.no_single_value_projection {
        options.project_single_values = false;
    }
    if overrides.no_contact_merge {
        options.merge_contacts = false;
    }
    options
}

/// Comma-separated family names, e.g. `sector,result,budget`.
pub fn parse_families(value: &str) -> Result<Vec<Family>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse::<Family>().map_err(anyhow::Error::from))
        .collect()
}

/// A top-level element left out of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// Zero-based position within the family.
    Element(Family, usize),
    /// Zero-based position among `recipient-region` elements only.
    Region(usize),
}

/// An element path such as `sector[2]`, indexed from 1 like the paths in
/// issue reports. `recipient-country[n]` and `recipient-region[n]` count
/// within their own element, as those paths do.
pub fn parse_exclusion(value: &str) -> Result<Exclusion> {
    let Some((name, rest)) = value.trim().split_once('[') else {
        bail!("expected <family>[<n>], got {value:?}");
    };
    let index: usize = rest
        .strip_suffix(']')
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(|| anyhow!("expected <family>[<n>], got {value:?}"))?;
    if index == 0 {
        bail!("element positions start at 1, got {value:?}");
    }
    if name.trim().to_ascii_lowercase().replace('_', "-") == "recipient-region" {
        return Ok(Exclusion::Region(index - 1));
    }
    let family = name.parse::<Family>()?;
    Ok(Exclusion::Element(family, index - 1))
}

/// Selection covering `families` minus the excluded elements.
pub fn build_selection(families: &[Family], exclusions: &[Exclusion]) -> FamilySelection {
    exclusions.iter().fold(
        FamilySelection::only(families.iter().copied()),
        |selection, exclusion| match *exclusion {
            Exclusion::Element(family, index) => selection.exclude(family, index),
            Exclusion::Region(index) => selection.exclude_region(index),
        },
    )
}
