//! Ad-to-lead attribution for Cerberus.
//!
//! Joins platform ad rows (Meta, Google Ads) to CRM leads on the exact
//! campaign / ad set / ad id triple, recomputes cost and conversion metrics
//! with CRM counts as the source of truth, and flattens the result into rows
//! that share one column set.

pub mod aggregate;
pub mod assemble;
pub mod error;
pub mod flags;
pub mod key;
pub mod merge;
pub mod pipeline;
pub mod recompute;
pub mod summary;
pub mod unified;
pub mod validate;

pub use aggregate::{aggregate, LeadIndex, LeadSummary};
pub use assemble::{
    assemble, assemble_batch, schema_drift, union_schema, AssembledBatch, ExportRow, OutputSchema,
    SchemaDrift,
};
pub use error::{AttributionError, BatchKind, RecordError, SkippedRecord};
pub use flags::evaluate_flags;
pub use key::{build_key, Attributable, AttributionKey};
pub use merge::{merge, MergeOutcome};
pub use pipeline::{merge_records, run_merge, MergeInput, MergeReport};
pub use recompute::recompute;
pub use summary::{summarize, BatchSummary};
pub use unified::{AlertFlags, AttributionQuality, UnifiedRecord};
pub use validate::{validate_ad_batch, validate_lead_batch, ValidatedBatch};
