use iati_model::elements::{
    DEFAULT_BUDGET_STATUS, DEFAULT_BUDGET_TYPE, DEFAULT_CONTACT_TYPE,
    DEFAULT_POLICY_MARKER_VOCABULARY, DEFAULT_REGION_VOCABULARY, DEFAULT_SECTOR_VOCABULARY,
    DEFAULT_SRS_NAME, DEFAULT_TAG_VOCABULARY,
};
use iati_model::{
    ActivityRef, Administrative, Budget, Condition, Contact, Coordinates, FinancingTerms,
    LoanStatus, LoanTerms, Location, LocationId, OtherFlag, ParticipatingOrg, Point,
    PolicyMarker, RecipientCountry, RecipientRegion, Sector, Tag,
};

use super::{Extractor, indexed, join};
use crate::tree::XmlNode;
use crate::values::parse_bool;

impl Extractor {
    pub(super) fn participating_org(&self, node: &XmlNode) -> ParticipatingOrg {
        ParticipatingOrg {
            organisation: self.organisation(node),
            role: node.attr_owned("role"),
            activity_id: node.attr("activity-id").map(ActivityRef::new),
            crs_channel_code: node.attr_owned("crs-channel-code"),
        }
    }

    pub(super) fn sector(&mut self, node: &XmlNode, path: &str) -> Sector {
        Sector {
            code: node.attr_owned("code").unwrap_or_default(),
            vocabulary: node
                .attr("vocabulary")
                .unwrap_or(DEFAULT_SECTOR_VOCABULARY)
                .to_string(),
            vocabulary_uri: node.attr_owned("vocabulary-uri"),
            percentage: self.percentage(node, path),
            narrative: self.narrative(Some(node)),
        }
    }

    pub(super) fn recipient_country(&mut self, node: &XmlNode, path: &str) -> RecipientCountry {
        RecipientCountry {
            code: node
                .attr("code")
                .map(str::to_uppercase)
                .unwrap_or_default(),
            percentage: self.percentage(node, path),
            narrative: self.narrative(Some(node)),
        }
    }

    pub(super) fn recipient_region(&mut self, node: &XmlNode, path: &str) -> RecipientRegion {
        RecipientRegion {
            code: node.attr_owned("code").unwrap_or_default(),
            vocabulary: node
                .attr("vocabulary")
                .unwrap_or(DEFAULT_REGION_VOCABULARY)
                .to_string(),
            vocabulary_uri: node.attr_owned("vocabulary-uri"),
            percentage: self.percentage(node, path),
            narrative: self.narrative(Some(node)),
        }
    }

    pub(super) fn location(&mut self, node: &XmlNode, path: &str) -> Location {
        let point = node.child("point").and_then(|point| {
            let coordinates = self.coordinates(point.child_text("pos"), path)?;
            Some(Point {
                srs_name: point
                    .attr("srsName")
                    .unwrap_or(DEFAULT_SRS_NAME)
                    .to_string(),
                coordinates,
            })
        });
        Location {
            reference: node.attr_owned("ref"),
            location_reach: node.child_attr("location-reach", "code").map(str::to_string),
            location_ids: node
                .children("location-id")
                .filter_map(|id| {
                    Some(LocationId {
                        vocabulary: id.attr_owned("vocabulary"),
                        code: id.attr_owned("code")?,
                    })
                })
                .collect(),
            name: self.narrative(node.child("name")),
            description: self.narrative(node.child("description")),
            activity_description: self.narrative(node.child("activity-description")),
            administratives: node
                .children("administrative")
                .filter_map(|admin| {
                    Some(Administrative {
                        vocabulary: admin.attr_owned("vocabulary"),
                        level: admin.attr("level").and_then(|level| level.parse().ok()),
                        code: admin.attr_owned("code")?,
                    })
                })
                .collect(),
            point,
            exactness: node.child_attr("exactness", "code").map(str::to_string),
            location_class: node.child_attr("location-class", "code").map(str::to_string),
            feature_designation: node
                .child_attr("feature-designation", "code")
                .map(str::to_string),
        }
    }

    /// `<pos>` holds "latitude longitude" separated by whitespace.
    fn coordinates(&mut self, pos: Option<&str>, path: &str) -> Option<Coordinates> {
        let pos = pos?;
        let mut parts = pos.split_whitespace().map(str::parse::<f64>);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(latitude)), Some(Ok(longitude)), None)
                if (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude) =>
            {
                Some(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => {
                self.warn(path, format_args!("invalid point position '{pos}' ignored"));
                None
            }
        }
    }

    pub(super) fn policy_marker(&self, node: &XmlNode) -> PolicyMarker {
        PolicyMarker {
            code: node.attr_owned("code").unwrap_or_default(),
            vocabulary: node
                .attr("vocabulary")
                .unwrap_or(DEFAULT_POLICY_MARKER_VOCABULARY)
                .to_string(),
            vocabulary_uri: node.attr_owned("vocabulary-uri"),
            significance: node.attr_owned("significance"),
            narrative: self.narrative(Some(node)),
        }
    }

    pub(super) fn tag(&self, node: &XmlNode) -> Tag {
        Tag {
            code: node.attr_owned("code").unwrap_or_default(),
            vocabulary: node
                .attr("vocabulary")
                .unwrap_or(DEFAULT_TAG_VOCABULARY)
                .to_string(),
            vocabulary_uri: node.attr_owned("vocabulary-uri"),
            narrative: self.narrative(Some(node)),
        }
    }

    pub(super) fn budget(&mut self, node: &XmlNode, path: &str) -> Budget {
        let value_node = node.child("value");
        Budget {
            budget_type: node.attr("type").unwrap_or(DEFAULT_BUDGET_TYPE).to_string(),
            status: node.attr("status").unwrap_or(DEFAULT_BUDGET_STATUS).to_string(),
            period_start: self.date_attr(node.child("period-start"), "iso-date", path),
            period_end: self.date_attr(node.child("period-end"), "iso-date", path),
            value: self.number(value_node.and_then(XmlNode::text), "value", path),
            currency: self.currency(value_node),
            value_date: self.date_attr(value_node, "value-date", path),
        }
    }

    /// `@currency` of a value element, else the activity default.
    pub(super) fn currency(&self, value: Option<&XmlNode>) -> Option<String> {
        value
            .and_then(|v| v.attr("currency"))
            .map(str::to_uppercase)
            .or_else(|| self.defaults.currency.clone())
    }

    pub(super) fn financing_terms(&mut self, node: &XmlNode, path: &str) -> FinancingTerms {
        let other_flags = node
            .children("other-flags")
            .filter_map(|flag| {
                Some(OtherFlag {
                    code: flag.attr_owned("code")?,
                    significance: flag.attr("significance").and_then(parse_bool)?,
                })
            })
            .collect();
        let loan_terms = node.child("loan-terms").map(|terms| {
            let terms_path = join(path, "loan-terms");
            LoanTerms {
                rate_1: self.number(terms.attr("rate-1"), "rate-1", &terms_path),
                rate_2: self.number(terms.attr("rate-2"), "rate-2", &terms_path),
                repayment_type: terms.child_attr("repayment-type", "code").map(str::to_string),
                repayment_plan: terms.child_attr("repayment-plan", "code").map(str::to_string),
                commitment_date: self.date_attr(
                    terms.child("commitment-date"),
                    "iso-date",
                    &terms_path,
                ),
                repayment_first_date: self.date_attr(
                    terms.child("repayment-first-date"),
                    "iso-date",
                    &terms_path,
                ),
                repayment_final_date: self.date_attr(
                    terms.child("repayment-final-date"),
                    "iso-date",
                    &terms_path,
                ),
            }
        });
        let loan_statuses = node
            .children("loan-status")
            .enumerate()
            .map(|(index, status)| {
                let status_path = join(path, &indexed("loan-status", index));
                LoanStatus {
                    year: status.attr("year").and_then(|year| year.parse().ok()),
                    currency: self.currency(Some(status)),
                    value_date: self.date_attr(Some(status), "value-date", &status_path),
                    interest_received: self.number(
                        status.child_text("interest-received"),
                        "interest-received",
                        &status_path,
                    ),
                    principal_outstanding: self.number(
                        status.child_text("principal-outstanding"),
                        "principal-outstanding",
                        &status_path,
                    ),
                    principal_arrears: self.number(
                        status.child_text("principal-arrears"),
                        "principal-arrears",
                        &status_path,
                    ),
                    interest_arrears: self.number(
                        status.child_text("interest-arrears"),
                        "interest-arrears",
                        &status_path,
                    ),
                }
            })
            .collect();
        FinancingTerms {
            other_flags,
            loan_terms,
            loan_statuses,
            channel_code: node.child_text("channel-code").map(str::to_string),
        }
    }

    pub(super) fn contact(&self, node: &XmlNode) -> Contact {
        Contact {
            contact_type: node.attr("type").unwrap_or(DEFAULT_CONTACT_TYPE).to_string(),
            organisation: self.narrative(node.child("organisation")),
            department: self.narrative(node.child("department")),
            person_name: self.narrative(node.child("person-name")),
            job_title: self.narrative(node.child("job-title")),
            telephone: node.child_text("telephone").map(str::to_string),
            email: node.child_text("email").map(str::to_string),
            website: node.child_text("website").map(str::to_string),
            mailing_address: self.narrative(node.child("mailing-address")),
        }
    }

    pub(super) fn condition(&self, node: &XmlNode) -> Condition {
        Condition {
            condition_type: node.attr_owned("type"),
            narrative: self.narrative(Some(node)),
        }
    }
}
