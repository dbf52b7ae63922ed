//! Conversion of the element tree into typed model families.

mod elements;
mod results;
mod transaction;

use std::fmt::Display;

use chrono::NaiveDate;
use tracing::warn;

use iati_model::{
    ActivityDefaults, AidType, DocumentLink, MultiValueGroup, Narrative, OrganisationRef,
    ParsedActivity,
};

use crate::tree::XmlNode;
use crate::values::{normalize_url, parse_bool, parse_date, parse_decimal};

/// Per-activity extraction state: inherited defaults and collected warnings.
pub(crate) struct Extractor {
    defaults: ActivityDefaults,
    warnings: Vec<String>,
}

impl Extractor {
    pub(crate) fn new() -> Self {
        Self {
            defaults: ActivityDefaults::default(),
            warnings: Vec::new(),
        }
    }

    /// Convert one `<iati-activity>` node (or a synthetic snippet root).
    pub(crate) fn activity(mut self, node: &XmlNode) -> ParsedActivity {
        self.defaults = self.activity_defaults(node);

        let iati_identifier = node.child_text("iati-identifier").map(str::to_string);
        let title = self.narrative(node.child("title"));
        let description = node
            .children("description")
            .find(|d| d.attr("type").is_none_or(|t| t == "1"))
            .or_else(|| node.child("description"))
            .and_then(|d| self.narrative(Some(d)));
        let reporting_org = node
            .child("reporting-org")
            .map(|org| self.organisation(org))
            .filter(|org| !org.is_empty());

        let participating_orgs = node
            .children("participating-org")
            .map(|org| self.participating_org(org))
            .collect();
        let sectors: MultiValueGroup<_> = node
            .children("sector")
            .enumerate()
            .map(|(index, sector)| self.sector(sector, &indexed("sector", index)))
            .collect();
        let recipient_countries = node
            .children("recipient-country")
            .enumerate()
            .map(|(index, country)| {
                self.recipient_country(country, &indexed("recipient-country", index))
            })
            .collect();
        let recipient_regions = node
            .children("recipient-region")
            .enumerate()
            .map(|(index, region)| {
                self.recipient_region(region, &indexed("recipient-region", index))
            })
            .collect();
        let locations = node
            .children("location")
            .enumerate()
            .map(|(index, location)| self.location(location, &indexed("location", index)))
            .collect();
        let policy_markers = node
            .children("policy-marker")
            .map(|marker| self.policy_marker(marker))
            .collect();
        let tags = node.children("tag").map(|tag| self.tag(tag)).collect();
        let budgets = node
            .children("budget")
            .enumerate()
            .map(|(index, budget)| self.budget(budget, &indexed("budget", index)))
            .collect();
        let transactions = node
            .children("transaction")
            .enumerate()
            .map(|(index, transaction)| {
                self.transaction(transaction, &indexed("transaction", index))
            })
            .collect();
        let results = node
            .children("result")
            .enumerate()
            .map(|(index, result)| self.result(result, &indexed("result", index)))
            .collect();
        let financing_terms = node
            .child("crs-add")
            .map(|crs| self.financing_terms(crs, "crs-add"))
            .filter(|terms| !terms.is_empty());
        let contacts = node
            .children("contact-info")
            .map(|contact| self.contact(contact))
            .collect();
        let conditions_node = node.child("conditions");
        let conditions_attached = conditions_node
            .and_then(|c| c.attr("attached"))
            .and_then(parse_bool);
        let conditions = conditions_node
            .map(|c| c.children("condition").map(|item| self.condition(item)).collect())
            .unwrap_or_default();
        let documents = self.document_links(node, "");

        ParsedActivity {
            iati_identifier,
            defaults: self.defaults,
            title,
            description,
            reporting_org,
            participating_orgs,
            sectors,
            recipient_countries,
            recipient_regions,
            locations,
            policy_markers,
            tags,
            budgets,
            transactions,
            results,
            financing_terms,
            contacts,
            conditions_attached,
            conditions,
            documents,
            parse_warnings: self.warnings,
        }
    }

    fn activity_defaults(&self, node: &XmlNode) -> ActivityDefaults {
        ActivityDefaults {
            currency: node.attr("default-currency").map(str::to_uppercase),
            language: node.attr_owned("xml:lang"),
            flow_type: node.child_attr("default-flow-type", "code").map(str::to_string),
            finance_type: node
                .child_attr("default-finance-type", "code")
                .map(str::to_string),
            aid_types: node
                .children("default-aid-type")
                .filter_map(aid_type)
                .collect(),
            tied_status: node
                .child_attr("default-tied-status", "code")
                .map(str::to_string),
        }
    }

    fn warn(&mut self, path: &str, message: impl Display) {
        let path = if path.is_empty() { "iati-activity" } else { path };
        warn!(element = %path, "{message}");
        self.warnings.push(format!("{path}: {message}"));
    }

    /// Primary narrative of `node`: English if present, else the first.
    ///
    /// Falls back to the element's own text for pre-2.01 documents.
    fn narrative(&self, node: Option<&XmlNode>) -> Option<Narrative> {
        let node = node?;
        let default_language = self.defaults.language.as_deref();
        let mut entries: Vec<(String, Option<String>)> = node
            .children("narrative")
            .filter_map(|narrative| {
                let text = narrative.text()?.to_string();
                let language = narrative
                    .attr("xml:lang")
                    .or(default_language)
                    .map(str::to_string);
                Some((text, language))
            })
            .collect();
        if entries.is_empty()
            && let Some(text) = node.text()
        {
            entries.push((text.to_string(), default_language.map(str::to_string)));
        }
        Narrative::select(entries)
    }

    fn organisation(&self, node: &XmlNode) -> OrganisationRef {
        OrganisationRef {
            iati_ref: node.attr_owned("ref"),
            name: self.narrative(Some(node)),
            org_type: node.attr_owned("type"),
        }
    }

    fn date_attr(&mut self, node: Option<&XmlNode>, attr: &str, path: &str) -> Option<NaiveDate> {
        let raw = node?.attr(attr)?;
        let date = parse_date(raw);
        if date.is_none() {
            self.warn(path, format_args!("invalid {attr} '{raw}' ignored"));
        }
        date
    }

    fn number(&mut self, raw: Option<&str>, what: &str, path: &str) -> Option<f64> {
        let raw = raw?;
        let value = parse_decimal(raw);
        if value.is_none() {
            self.warn(path, format_args!("invalid {what} '{raw}' ignored"));
        }
        value
    }

    fn percentage(&mut self, node: &XmlNode, path: &str) -> Option<f64> {
        self.number(node.attr("percentage"), "percentage", path)
    }

    /// Every `<document-link>` under `parent`, skipping links without a url.
    fn document_links(&mut self, parent: &XmlNode, parent_path: &str) -> Vec<DocumentLink> {
        let mut links = Vec::new();
        for (index, node) in parent.children("document-link").enumerate() {
            let path = join(parent_path, &indexed("document-link", index));
            let Some(url) = node.attr("url").and_then(normalize_url) else {
                self.warn(&path, "document-link has no url, skipped");
                continue;
            };
            let document_date = self.date_attr(node.child("document-date"), "iso-date", &path);
            links.push(DocumentLink {
                url,
                format: node.attr_owned("format"),
                title: self.narrative(node.child("title")),
                description: self.narrative(node.child("description")),
                categories: node
                    .children("category")
                    .filter_map(|c| c.attr_owned("code"))
                    .collect(),
                languages: node
                    .children("language")
                    .filter_map(|l| l.attr_owned("code"))
                    .collect(),
                document_date,
            });
        }
        links
    }
}

fn aid_type(node: &XmlNode) -> Option<AidType> {
    let code = node.attr("code")?;
    let mut aid_type = AidType::new(code);
    if let Some(vocabulary) = node.attr("vocabulary") {
        aid_type.vocabulary = vocabulary.to_string();
    }
    Some(aid_type)
}

/// `name[n]` with a 1-based index, as shown to users.
pub(crate) fn indexed(name: &str, index: usize) -> String {
    format!("{name}[{}]", index + 1)
}

pub(crate) fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}/{child}")
    }
}
