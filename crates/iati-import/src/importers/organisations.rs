use iati_model::{Counter, Family, ImportSummary, ParsedActivity};

use super::{ElementPath, FamilyImporter, ImportContext, insert_row, require};
use crate::store::{NewRow, ParticipatingOrgRow, Store};

/// `<participating-org>`, linked to the resolved organisation and activity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParticipatingOrgsImporter;

impl FamilyImporter for ParticipatingOrgsImporter {
    fn family(&self) -> Family {
        Family::ParticipatingOrgs
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let mut summary = ImportSummary::new();
        for (index, participant) in activity.participating_orgs.iter().enumerate() {
            let path = ElementPath::root("participating-org", index);
            let row = require(participant.role.clone(), "role").map(|role| {
                NewRow::ParticipatingOrg(ParticipatingOrgRow {
                    activity: ctx.activity,
                    organisation: ctx.references.organisation(&participant.organisation),
                    role,
                    linked_activity: participant
                        .activity_id
                        .as_ref()
                        .and_then(|reference| ctx.references.activity(reference)),
                    crs_channel_code: participant.crs_channel_code.clone(),
                })
            });
            insert_row(
                store,
                &mut summary,
                &path,
                Counter::ParticipatingOrgsCreated,
                row,
            );
        }
        summary
    }
}
