use iati_model::{ActivityRef, MultiValueGroup, Transaction, TransactionParty};

use super::{Extractor, aid_type, indexed, join};
use crate::tree::XmlNode;
use crate::values::parse_bool;

impl Extractor {
    /// A `<transaction>`; flow, finance, aid and tied fall back to the
    /// activity defaults.
    pub(super) fn transaction(&mut self, node: &XmlNode, path: &str) -> Transaction {
        let value_node = node.child("value");

        let sectors = node
            .children("sector")
            .enumerate()
            .map(|(index, sector)| self.sector(sector, &join(path, &indexed("sector", index))))
            .collect();
        let recipient_countries = node
            .children("recipient-country")
            .enumerate()
            .map(|(index, country)| {
                self.recipient_country(country, &join(path, &indexed("recipient-country", index)))
            })
            .collect();
        let recipient_regions = node
            .children("recipient-region")
            .enumerate()
            .map(|(index, region)| {
                self.recipient_region(region, &join(path, &indexed("recipient-region", index)))
            })
            .collect();

        let mut aid_types: MultiValueGroup<_> =
            node.children("aid-type").filter_map(aid_type).collect();
        if aid_types.is_empty() {
            aid_types = self.defaults.aid_types.iter().cloned().collect();
        }

        Transaction {
            reference: node.attr_owned("ref"),
            humanitarian: node.attr("humanitarian").and_then(parse_bool),
            transaction_type: node
                .child_attr("transaction-type", "code")
                .map(str::to_string),
            transaction_date: self.date_attr(node.child("transaction-date"), "iso-date", path),
            value: self.number(value_node.and_then(XmlNode::text), "value", path),
            currency: self.currency(value_node),
            value_date: self.date_attr(value_node, "value-date", path),
            description: self.narrative(node.child("description")),
            provider_org: node
                .child("provider-org")
                .map(|org| self.party(org, "provider-activity-id")),
            receiver_org: node
                .child("receiver-org")
                .map(|org| self.party(org, "receiver-activity-id")),
            disbursement_channel: node
                .child_attr("disbursement-channel", "code")
                .map(str::to_string),
            sectors,
            recipient_countries,
            recipient_regions,
            flow_type: node
                .child_attr("flow-type", "code")
                .map(str::to_string)
                .or_else(|| self.defaults.flow_type.clone()),
            finance_type: node
                .child_attr("finance-type", "code")
                .map(str::to_string)
                .or_else(|| self.defaults.finance_type.clone()),
            aid_types,
            tied_status: node
                .child_attr("tied-status", "code")
                .map(str::to_string)
                .or_else(|| self.defaults.tied_status.clone()),
        }
    }

    fn party(&self, node: &XmlNode, activity_attr: &str) -> TransactionParty {
        TransactionParty {
            organisation: self.organisation(node),
            activity: node.attr(activity_attr).map(ActivityRef::new),
        }
    }
}
