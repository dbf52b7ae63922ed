use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::elements::{AidType, RecipientCountry, RecipientRegion, Sector};
use crate::group::MultiValueGroup;
use crate::narrative::Narrative;
use crate::reference::{ActivityRef, OrganisationRef};

/// Provider or receiver of a transaction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionParty {
    pub organisation: OrganisationRef,
    /// `provider-activity-id` / `receiver-activity-id`.
    pub activity: Option<ActivityRef>,
}

/// A `<transaction>`.
///
/// Type, date, value and currency are required by IATI. They stay optional
/// here so a transaction missing one is reported at import time instead of
/// vanishing during parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub reference: Option<String>,
    pub humanitarian: Option<bool>,
    pub transaction_type: Option<String>,
    pub transaction_date: Option<NaiveDate>,
    pub value: Option<f64>,
    pub currency: Option<String>,
    pub value_date: Option<NaiveDate>,
    pub description: Option<Narrative>,
    pub provider_org: Option<TransactionParty>,
    pub receiver_org: Option<TransactionParty>,
    pub disbursement_channel: Option<String>,
    pub sectors: MultiValueGroup<Sector>,
    pub recipient_countries: MultiValueGroup<RecipientCountry>,
    pub recipient_regions: MultiValueGroup<RecipientRegion>,
    pub flow_type: Option<String>,
    pub finance_type: Option<String>,
    pub aid_types: MultiValueGroup<AidType>,
    pub tied_status: Option<String>,
}

impl Transaction {
    /// Both geographic groups are populated, which IATI discourages.
    pub fn has_country_and_region(&self) -> bool {
        !self.recipient_countries.is_empty() && !self.recipient_regions.is_empty()
    }
}
