use iati_model::result::DEFAULT_INDICATOR_MEASURE;
use iati_model::{
    ActivityResult, Baseline, Dimension, Indicator, Period, PeriodValue, PeriodValueKind,
    Reference,
};

use super::{Extractor, indexed, join};
use crate::tree::XmlNode;
use crate::values::parse_bool;

impl Extractor {
    pub(super) fn result(&mut self, node: &XmlNode, path: &str) -> ActivityResult {
        let document_links = self.document_links(node, path);
        let indicators = node
            .children("indicator")
            .enumerate()
            .map(|(index, indicator)| {
                self.indicator(indicator, &join(path, &indexed("indicator", index)))
            })
            .collect();
        ActivityResult {
            result_type: node.attr_owned("type"),
            aggregation_status: node.attr("aggregation-status").and_then(parse_bool),
            title: self.narrative(node.child("title")),
            description: self.narrative(node.child("description")),
            document_links,
            references: references(node, "vocabulary-uri"),
            indicators,
        }
    }

    fn indicator(&mut self, node: &XmlNode, path: &str) -> Indicator {
        let document_links = self.document_links(node, path);
        let baselines = node
            .children("baseline")
            .enumerate()
            .map(|(index, baseline)| {
                self.baseline(baseline, &join(path, &indexed("baseline", index)))
            })
            .collect();
        let periods = node
            .children("period")
            .enumerate()
            .map(|(index, period)| self.period(period, &join(path, &indexed("period", index))))
            .collect();
        Indicator {
            measure: node
                .attr("measure")
                .unwrap_or(DEFAULT_INDICATOR_MEASURE)
                .to_string(),
            ascending: node
                .attr("ascending")
                .and_then(parse_bool)
                .unwrap_or(true),
            aggregation_status: node.attr("aggregation-status").and_then(parse_bool),
            title: self.narrative(node.child("title")),
            description: self.narrative(node.child("description")),
            document_links,
            references: references(node, "indicator-uri"),
            baselines,
            periods,
        }
    }

    fn baseline(&mut self, node: &XmlNode, path: &str) -> Baseline {
        let year = node.attr("year").and_then(|year| {
            let parsed = year.parse().ok();
            if parsed.is_none() {
                self.warn(path, format_args!("invalid year '{year}' ignored"));
            }
            parsed
        });
        Baseline {
            year,
            iso_date: self.date_attr(Some(node), "iso-date", path),
            value: node.attr_owned("value"),
            comment: self.narrative(node.child("comment")),
            locations: location_refs(node),
            dimensions: dimensions(node),
            document_links: self.document_links(node, path),
        }
    }

    fn period(&mut self, node: &XmlNode, path: &str) -> Period {
        Period {
            period_start: self.date_attr(node.child("period-start"), "iso-date", path),
            period_end: self.date_attr(node.child("period-end"), "iso-date", path),
            targets: self.period_values(node, PeriodValueKind::Target, path),
            actuals: self.period_values(node, PeriodValueKind::Actual, path),
        }
    }

    fn period_values(
        &mut self,
        period: &XmlNode,
        kind: PeriodValueKind,
        path: &str,
    ) -> Vec<PeriodValue> {
        let name = kind.element_name();
        period
            .children(name)
            .enumerate()
            .map(|(index, node)| {
                let value_path = join(path, &indexed(name, index));
                PeriodValue {
                    value: node.attr_owned("value"),
                    comment: self.narrative(node.child("comment")),
                    locations: location_refs(node),
                    dimensions: dimensions(node),
                    document_links: self.document_links(node, &value_path),
                }
            })
            .collect()
    }
}

fn references(node: &XmlNode, uri_attr: &str) -> Vec<Reference> {
    node.children("reference")
        .map(|reference| Reference {
            vocabulary: reference.attr_owned("vocabulary"),
            code: reference.attr_owned("code"),
            uri: reference.attr_owned(uri_attr),
        })
        .collect()
}

fn location_refs(node: &XmlNode) -> Vec<String> {
    node.children("location")
        .filter_map(|location| location.attr_owned("ref"))
        .collect()
}

/// Kept even when `name` or `value` is missing so the import reports them.
fn dimensions(node: &XmlNode) -> Vec<Dimension> {
    node.children("dimension")
        .map(|dimension| Dimension {
            name: dimension.attr_owned("name"),
            value: dimension.attr_owned("value"),
        })
        .collect()
}
