//! Flat activity-level classifications: sectors, recipient geography,
//! policy markers and tags.

use iati_model::{Counter, Family, ImportSummary, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row};
use crate::store::{NewRow, Store};

#[derive(Debug, Clone, Copy, Default)]
pub struct SectorsImporter;

impl FamilyImporter for SectorsImporter {
    fn family(&self) -> Family {
        Family::Sectors
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, sector) in activity.sectors.iter().enumerate() {
            let row = NewRow::Sector {
                activity: ctx.activity,
                sector: sector.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("sector", index),
                Counter::SectorsCreated,
                Ok(row),
            );
        }
        summary
    }
}

/// Activity-level `<recipient-country>` and `<recipient-region>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipientGeographyImporter;

impl FamilyImporter for RecipientGeographyImporter {
    fn family(&self) -> Family {
        Family::RecipientGeography
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, country) in activity.recipient_countries.iter().enumerate() {
            let row = NewRow::RecipientCountry {
                activity: ctx.activity,
                country: country.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("recipient-country", index),
                Counter::RecipientCountriesCreated,
                Ok(row),
            );
        }
        for (index, region) in activity.recipient_regions.iter().enumerate() {
            let row = NewRow::RecipientRegion {
                activity: ctx.activity,
                region: region.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("recipient-region", index),
                Counter::RecipientRegionsCreated,
                Ok(row),
            );
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyMarkersImporter;

impl FamilyImporter for PolicyMarkersImporter {
    fn family(&self) -> Family {
        Family::PolicyMarkers
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, marker) in activity.policy_markers.iter().enumerate() {
            let row = NewRow::PolicyMarker {
                activity: ctx.activity,
                marker: marker.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("policy-marker", index),
                Counter::PolicyMarkersCreated,
                Ok(row),
            );
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TagsImporter;

impl FamilyImporter for TagsImporter {
    fn family(&self) -> Family {
        Family::Tags
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, tag) in activity.tags.iter().enumerate() {
            let row = NewRow::Tag {
                activity: ctx.activity,
                tag: tag.clone(),
            };
            insert_row(
                store,
                &mut summary,
                &ElementPath::root("tag", index),
                Counter::TagsCreated,
                Ok(row),
            );
        }
        summary
    }
}
