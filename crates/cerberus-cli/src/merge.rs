//! `merge` command: read the three batches, run the pipeline, print rows.

use std::path::{Path, PathBuf};

use anyhow::Context;
use futures::future;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use cerberus_attribution::{run_merge, MergeInput};
use cerberus_core::AlertThresholds;

use crate::print_json;

/// Input file locations. A missing path means an empty batch.
#[derive(Debug, Clone, Default)]
pub(crate) struct BatchPaths {
    pub meta: Option<PathBuf>,
    pub google: Option<PathBuf>,
    pub leads: Option<PathBuf>,
}

/// Reads one batch file as JSON. `None` yields an empty array.
pub(crate) async fn read_batch(path: Option<&Path>) -> anyhow::Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Array(Vec::new()));
    };
    let body = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&body).with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Loads all three batches concurrently. The merge only starts once every
/// read has finished.
pub(crate) async fn load_input(paths: &BatchPaths) -> anyhow::Result<MergeInput> {
    let (meta, google, leads) = future::try_join3(
        read_batch(paths.meta.as_deref()),
        read_batch(paths.google.as_deref()),
        read_batch(paths.leads.as_deref()),
    )
    .await?;
    Ok(MergeInput { meta, google, leads })
}

pub(crate) async fn run(
    paths: &BatchPaths,
    thresholds: &AlertThresholds,
    full_report: bool,
    pretty: bool,
) -> anyhow::Result<()> {
    let run_id = Uuid::new_v4();
    let span = tracing::info_span!("merge_run", %run_id);

    async {
        let input = load_input(paths).await?;
        let report = run_merge(&input, thresholds)?;

        if !report.skipped.is_empty() {
            tracing::warn!(skipped = report.skipped.len(), "some input records were skipped");
        }
        tracing::info!(
            total_spend = %report.summary.total_spend,
            total_crm_leads = report.summary.total_crm_leads,
            average_cost_per_lead = %report.summary.average_cost_per_lead,
            zero_performance = report.summary.zero_performance_count,
            funnel_mismatch = report.summary.funnel_mismatch_count,
            top_performer = report.summary.top_performer_count,
            "batch summary"
        );

        if full_report {
            print_json(&report, pretty)
        } else {
            print_json(&report.batch.rows, pretty)
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_path_is_empty_batch() {
        let value = read_batch(None).await.unwrap();
        assert_eq!(value, Value::Array(Vec::new()));
    }

    #[tokio::test]
    async fn reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta.json");
        std::fs::write(&path, r#"[{"campaign_id":"C1"}]"#).unwrap();

        let value = read_batch(Some(&path)).await.unwrap();
        assert_eq!(value[0]["campaign_id"], "C1");
    }

    #[tokio::test]
    async fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_batch(Some(&dir.path().join("absent.json")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[tokio::test]
    async fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leads.json");
        std::fs::write(&path, "not json").unwrap();
        let err = read_batch(Some(&path)).await.unwrap_err();
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[tokio::test]
    async fn load_input_fills_missing_batches() {
        let dir = tempfile::tempdir().unwrap();
        let leads = dir.path().join("leads.json");
        std::fs::write(&leads, r#"[{"lead_id":"L1"}]"#).unwrap();

        let input = load_input(&BatchPaths {
            leads: Some(leads),
            ..BatchPaths::default()
        })
        .await
        .unwrap();
        assert_eq!(input.meta, Value::Array(Vec::new()));
        assert_eq!(input.google, Value::Array(Vec::new()));
        assert_eq!(input.leads[0]["lead_id"], "L1");
    }
}
