use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// An IATI element family, imported as one unit.
///
/// Variant order is the default import order: organisations first so that
/// later families can point at them, the results hierarchy after the
/// flat families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "participating-org")]
    ParticipatingOrgs,
    #[serde(rename = "sector")]
    Sectors,
    #[serde(rename = "recipient-geography")]
    RecipientGeography,
    #[serde(rename = "location")]
    Locations,
    #[serde(rename = "policy-marker")]
    PolicyMarkers,
    #[serde(rename = "tag")]
    Tags,
    #[serde(rename = "budget")]
    Budgets,
    #[serde(rename = "transaction")]
    Transactions,
    #[serde(rename = "result")]
    Results,
    #[serde(rename = "crs-add")]
    FinancingTerms,
    #[serde(rename = "contact-info")]
    Contacts,
    #[serde(rename = "conditions")]
    Conditions,
    #[serde(rename = "document-link")]
    Documents,
}

impl Family {
    pub const ALL: [Family; 13] = [
        Family::ParticipatingOrgs,
        Family::Sectors,
        Family::RecipientGeography,
        Family::Locations,
        Family::PolicyMarkers,
        Family::Tags,
        Family::Budgets,
        Family::Transactions,
        Family::Results,
        Family::FinancingTerms,
        Family::Contacts,
        Family::Conditions,
        Family::Documents,
    ];

    /// Name of the IATI element that makes up the family.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ParticipatingOrgs => "participating-org",
            Self::Sectors => "sector",
            Self::RecipientGeography => "recipient-geography",
            Self::Locations => "location",
            Self::PolicyMarkers => "policy-marker",
            Self::Tags => "tag",
            Self::Budgets => "budget",
            Self::Transactions => "transaction",
            Self::Results => "result",
            Self::FinancingTerms => "crs-add",
            Self::Contacts => "contact-info",
            Self::Conditions => "conditions",
            Self::Documents => "document-link",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ParticipatingOrgs => "Participating organisations",
            Self::Sectors => "Sectors",
            Self::RecipientGeography => "Recipient countries and regions",
            Self::Locations => "Locations",
            Self::PolicyMarkers => "Policy markers",
            Self::Tags => "Tags",
            Self::Budgets => "Budgets",
            Self::Transactions => "Transactions",
            Self::Results => "Results",
            Self::FinancingTerms => "Financing terms (CRS)",
            Self::Contacts => "Contacts",
            Self::Conditions => "Conditions",
            Self::Documents => "Documents",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        let family = match normalized.as_str() {
            "participating-org" | "participating-orgs" | "organisations" => {
                Self::ParticipatingOrgs
            }
            "sector" | "sectors" => Self::Sectors,
            "recipient-geography" | "recipient-country" | "recipient-region" | "geography" => {
                Self::RecipientGeography
            }
            "location" | "locations" => Self::Locations,
            "policy-marker" | "policy-markers" => Self::PolicyMarkers,
            "tag" | "tags" => Self::Tags,
            "budget" | "budgets" => Self::Budgets,
            "transaction" | "transactions" => Self::Transactions,
            "result" | "results" => Self::Results,
            "crs-add" | "financing-terms" => Self::FinancingTerms,
            "contact-info" | "contact" | "contacts" => Self::Contacts,
            "conditions" | "condition" => Self::Conditions,
            "document-link" | "document-links" | "documents" => Self::Documents,
            _ => {
                return Err(ModelError::UnknownFamily {
                    name: value.to_string(),
                });
            }
        };
        Ok(family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_element_names_and_aliases() {
        for family in Family::ALL {
            assert_eq!(family.as_str().parse::<Family>().unwrap(), family);
        }
        assert_eq!("Results".parse::<Family>().unwrap(), Family::Results);
        assert_eq!("financing_terms".parse::<Family>().unwrap(), Family::FinancingTerms);
        assert!("humanitarian-scope".parse::<Family>().is_err());
    }

    #[test]
    fn serde_uses_element_names() {
        let json = serde_json::to_string(&Family::FinancingTerms).unwrap();
        assert_eq!(json, "\"crs-add\"");
    }
}
