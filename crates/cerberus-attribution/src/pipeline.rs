//! End-to-end merge run: validate, aggregate, merge, recompute, flag,
//! assemble and summarise.

use serde::Serialize;
use serde_json::Value;

use cerberus_core::{AdRecord, AlertThresholds, LeadRecord, Platform};

use crate::aggregate::aggregate;
use crate::assemble::{assemble_batch, AssembledBatch, SchemaDrift};
use crate::error::{AttributionError, SkippedRecord};
use crate::flags::with_flags;
use crate::merge::{merge, MergeOutcome};
use crate::recompute::recompute;
use crate::summary::{summarize, BatchSummary};
use crate::validate::{validate_ad_batch, validate_lead_batch};

/// The three already-fetched batches for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeInput {
    pub meta: Value,
    pub google: Value,
    pub leads: Value,
}

impl Default for MergeInput {
    fn default() -> Self {
        Self {
            meta: Value::Array(Vec::new()),
            google: Value::Array(Vec::new()),
            leads: Value::Array(Vec::new()),
        }
    }
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergeReport {
    pub batch: AssembledBatch,
    pub skipped: Vec<SkippedRecord>,
    pub unattributed_leads: usize,
    pub key_collisions: usize,
    pub schema_drift: Vec<SchemaDrift>,
    pub summary: BatchSummary,
}

/// Aggregates leads, merges them onto `ads` and recomputes the derived
/// metrics. Ads keep their input order.
#[must_use]
pub fn merge_records(ads: &[AdRecord], leads: &[LeadRecord]) -> MergeOutcome {
    let index = aggregate(leads);
    let mut outcome = merge(ads, &index);
    outcome.records = outcome.records.iter().map(recompute).collect();
    outcome
}

/// Runs the full pipeline over raw batches.
///
/// Meta rows come before Google rows in the output. Malformed records are
/// skipped and listed in [`MergeReport::skipped`].
///
/// # Errors
///
/// Returns [`AttributionError::NotASequence`] if any batch is not a JSON
/// array. Nothing is merged in that case.
pub fn run_merge(
    input: &MergeInput,
    thresholds: &AlertThresholds,
) -> Result<MergeReport, AttributionError> {
    let meta = validate_ad_batch(&input.meta, Platform::Meta)?;
    let google = validate_ad_batch(&input.google, Platform::Google)?;
    let leads = validate_lead_batch(&input.leads)?;

    let mut skipped = meta.skipped;
    skipped.extend(google.skipped);
    skipped.extend(leads.skipped);

    let mut ads = meta.records;
    ads.extend(google.records);

    let index = aggregate(&leads.records);
    let unattributed_leads = index.unattributed();
    let outcome = merge(&ads, &index);

    let records: Vec<_> = outcome
        .records
        .iter()
        .map(|r| with_flags(&recompute(r), thresholds))
        .collect();

    let (batch, schema_drift) = assemble_batch(&records);
    let summary = summarize(&records);

    tracing::info!(
        records = summary.total_records,
        matched = summary.matched_records,
        skipped = skipped.len(),
        unattributed_leads,
        key_collisions = outcome.key_collisions,
        columns = batch.columns.len(),
        "merge run complete"
    );

    Ok(MergeReport {
        batch,
        skipped,
        unattributed_leads,
        key_collisions: outcome.key_collisions,
        schema_drift,
        summary,
    })
}
