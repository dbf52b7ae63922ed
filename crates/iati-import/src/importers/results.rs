//! The results hierarchy: result → indicator → baseline / period → target /
//! actual, each level with its own references, document links, dimensions
//! and location references.
//!
//! A level is only attempted once its parent row exists. A failed child is
//! recorded and its siblings continue; the parent is kept.

use std::collections::HashMap;

use iati_model::{
    ActivityResult, Baseline, Counter, Dimension, DocumentLink, Family, ImportSummary, Indicator,
    ParsedActivity, Period, PeriodValue, PeriodValueKind, Reference,
};

use super::{
    ElementPath, FamilyImporter, ImportContext, insert_row, require, skip_children, text,
};
use crate::error::ElementImportError;
use crate::store::{
    BaselineRow, DocumentOwner, IndicatorRow, NewRow, PeriodRow, PeriodValueRow, ResultRow, RowId,
    Store, ValueOwner,
};

#[derive(Debug, Clone, Copy, Default)]
pub struct ResultsImporter;

impl FamilyImporter for ResultsImporter {
    fn family(&self) -> Family {
        Family::Results
    }

    fn import(
        &self,
        store: &mut dyn Store,
        ctx: &ImportContext<'_>,
        activity: &ParsedActivity,
    ) -> ImportSummary {
        let locations = store.location_refs(ctx.activity).into_iter().collect();
        let mut writer = HierarchyWriter {
            store,
            summary: ImportSummary::new(),
            locations,
        };
        for (index, result) in activity.results.iter().enumerate() {
            writer.result(ctx.activity, &ElementPath::root("result", index), result);
        }
        writer.summary
    }
}

/// Counters for the children shared by baselines and period values.
struct ValueCounters {
    dimension: Counter,
    location: Counter,
    document: Counter,
}

const BASELINE_COUNTERS: ValueCounters = ValueCounters {
    dimension: Counter::BaselineDimensionsCreated,
    location: Counter::BaselineLocationsCreated,
    document: Counter::BaselineDocumentLinksCreated,
};

const PERIOD_COUNTERS: ValueCounters = ValueCounters {
    dimension: Counter::PeriodDimensionsCreated,
    location: Counter::PeriodLocationsCreated,
    document: Counter::PeriodDocumentLinksCreated,
};

struct HierarchyWriter<'s> {
    store: &'s mut dyn Store,
    summary: ImportSummary,
    /// Activity locations by `@ref`.
    locations: HashMap<String, RowId>,
}

impl HierarchyWriter<'_> {
    fn insert(
        &mut self,
        path: &ElementPath,
        counter: Counter,
        row: Result<NewRow, ElementImportError>,
    ) -> Option<RowId> {
        insert_row(&mut *self.store, &mut self.summary, path, counter, row)
    }

    fn result(&mut self, activity: RowId, path: &ElementPath, result: &ActivityResult) {
        let row = NewRow::Result(ResultRow {
            activity,
            result_type: result.result_type.clone(),
            aggregation_status: result.aggregation_status,
            title: text(result.title.as_ref()),
            description: text(result.description.as_ref()),
        });
        let Some(id) = self.insert(path, Counter::ResultsCreated, Ok(row)) else {
            let children =
                result.references.len() + result.document_links.len() + result.indicators.len();
            skip_children(&mut self.summary, path, children);
            return;
        };

        for (index, reference) in result.references.iter().enumerate() {
            let row = reference_row(reference).map(|reference| NewRow::ResultReference {
                result: id,
                reference,
            });
            self.insert(
                &path.child("reference", index),
                Counter::ResultReferencesCreated,
                row,
            );
        }
        self.document_links(
            path,
            DocumentOwner::Result(id),
            &result.document_links,
            Counter::ResultDocumentLinksCreated,
        );
        for (index, indicator) in result.indicators.iter().enumerate() {
            self.indicator(id, &path.child("indicator", index), indicator);
        }
    }

    fn indicator(&mut self, result: RowId, path: &ElementPath, indicator: &Indicator) {
        let row = NewRow::Indicator(IndicatorRow {
            result,
            measure: indicator.measure.clone(),
            ascending: indicator.ascending,
            aggregation_status: indicator.aggregation_status,
            title: text(indicator.title.as_ref()),
            description: text(indicator.description.as_ref()),
        });
        let Some(id) = self.insert(path, Counter::IndicatorsCreated, Ok(row)) else {
            let children = indicator.references.len()
                + indicator.document_links.len()
                + indicator.baselines.len()
                + indicator.periods.len();
            skip_children(&mut self.summary, path, children);
            return;
        };

        for (index, reference) in indicator.references.iter().enumerate() {
            let row = reference_row(reference).map(|reference| NewRow::IndicatorReference {
                indicator: id,
                reference,
            });
            self.insert(
                &path.child("reference", index),
                Counter::IndicatorReferencesCreated,
                row,
            );
        }
        self.document_links(
            path,
            DocumentOwner::Indicator(id),
            &indicator.document_links,
            Counter::IndicatorDocumentLinksCreated,
        );
        for (index, baseline) in indicator.baselines.iter().enumerate() {
            self.baseline(id, &path.child("baseline", index), baseline);
        }
        for (index, period) in indicator.periods.iter().enumerate() {
            self.period(id, &path.child("period", index), period);
        }
    }

    fn baseline(&mut self, indicator: RowId, path: &ElementPath, baseline: &Baseline) {
        let row = NewRow::Baseline(BaselineRow {
            indicator,
            year: baseline.year,
            iso_date: baseline.iso_date,
            value: baseline.value.clone(),
            comment: text(baseline.comment.as_ref()),
        });
        let Some(id) = self.insert(path, Counter::BaselinesCreated, Ok(row)) else {
            let children = baseline.dimensions.len()
                + baseline.locations.len()
                + baseline.document_links.len();
            skip_children(&mut self.summary, path, children);
            return;
        };
        self.value_children(
            path,
            ValueOwner::Baseline(id),
            DocumentOwner::Baseline(id),
            &BASELINE_COUNTERS,
            (
                baseline.dimensions.as_slice(),
                baseline.locations.as_slice(),
                baseline.document_links.as_slice(),
            ),
        );
    }

    fn period(&mut self, indicator: RowId, path: &ElementPath, period: &Period) {
        let row = NewRow::Period(PeriodRow {
            indicator,
            period_start: period.period_start,
            period_end: period.period_end,
        });
        let Some(id) = self.insert(path, Counter::PeriodsCreated, Ok(row)) else {
            skip_children(
                &mut self.summary,
                path,
                period.targets.len() + period.actuals.len(),
            );
            return;
        };
        for (index, target) in period.targets.iter().enumerate() {
            self.period_value(id, path, PeriodValueKind::Target, index, target);
        }
        for (index, actual) in period.actuals.iter().enumerate() {
            self.period_value(id, path, PeriodValueKind::Actual, index, actual);
        }
    }

    fn period_value(
        &mut self,
        period: RowId,
        period_path: &ElementPath,
        kind: PeriodValueKind,
        index: usize,
        value: &PeriodValue,
    ) {
        let path = period_path.child(kind.element_name(), index);
        let counter = match kind {
            PeriodValueKind::Target => Counter::PeriodTargetsCreated,
            PeriodValueKind::Actual => Counter::PeriodActualsCreated,
        };
        let row = NewRow::PeriodValue(PeriodValueRow {
            period,
            kind,
            value: value.value.clone(),
            comment: text(value.comment.as_ref()),
        });
        let Some(id) = self.insert(&path, counter, Ok(row)) else {
            let children =
                value.dimensions.len() + value.locations.len() + value.document_links.len();
            skip_children(&mut self.summary, &path, children);
            return;
        };
        self.value_children(
            &path,
            ValueOwner::PeriodValue(id),
            DocumentOwner::PeriodValue(id),
            &PERIOD_COUNTERS,
            (
                value.dimensions.as_slice(),
                value.locations.as_slice(),
                value.document_links.as_slice(),
            ),
        );
    }

    fn value_children(
        &mut self,
        path: &ElementPath,
        owner: ValueOwner,
        documents: DocumentOwner,
        counters: &ValueCounters,
        (dimensions, locations, links): (&[Dimension], &[String], &[DocumentLink]),
    ) {
        for (index, dimension) in dimensions.iter().enumerate() {
            self.insert(
                &path.child("dimension", index),
                counters.dimension,
                dimension_row(owner, dimension),
            );
        }
        for (index, location_ref) in locations.iter().enumerate() {
            let row = NewRow::LocationRef {
                owner,
                location_ref: location_ref.clone(),
                location: self.locations.get(location_ref).copied(),
            };
            self.insert(&path.child("location", index), counters.location, Ok(row));
        }
        self.document_links(path, documents, links, counters.document);
    }

    fn document_links(
        &mut self,
        path: &ElementPath,
        owner: DocumentOwner,
        links: &[DocumentLink],
        counter: Counter,
    ) {
        for (index, link) in links.iter().enumerate() {
            let row = NewRow::DocumentLink {
                owner,
                link: link.clone(),
            };
            self.insert(&path.child("document-link", index), counter, Ok(row));
        }
    }
}

fn reference_row(reference: &Reference) -> Result<Reference, ElementImportError> {
    require(reference.code.as_ref(), "code")?;
    Ok(reference.clone())
}

fn dimension_row(owner: ValueOwner, dimension: &Dimension) -> Result<NewRow, ElementImportError> {
    let name = require(dimension.name.clone(), "name")?;
    let value = require(dimension.value.clone(), "value")?;
    Ok(NewRow::Dimension { owner, name, value })
}
