//! `normalize` command: raw platform response in, merge-ready records out.

use std::path::Path;

use anyhow::Context;
use clap::ValueEnum;

use cerberus_core::AppConfig;
use cerberus_platforms::{
    normalize_google_response, normalize_meta_response, normalize_salesforce_response,
};

use crate::print_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlatformArg {
    Meta,
    Google,
    Salesforce,
}

pub(crate) async fn run(
    platform: PlatformArg,
    input: &Path,
    account_id: &str,
    config: &AppConfig,
    pretty: bool,
) -> anyhow::Result<()> {
    let body = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;

    let dropped = match platform {
        PlatformArg::Meta => {
            let batch = normalize_meta_response(&body, &config.meta_conversion_actions)?;
            print_json(&batch.records, pretty)?;
            batch.dropped
        }
        PlatformArg::Google => {
            if account_id.is_empty() {
                tracing::warn!("no --account-id given; google rows will have an empty account_id");
            }
            let batch = normalize_google_response(&body, account_id)?;
            print_json(&batch.records, pretty)?;
            batch.dropped
        }
        PlatformArg::Salesforce => {
            let batch = normalize_salesforce_response(&body)?;
            print_json(&batch.records, pretty)?;
            batch.dropped
        }
    };

    if dropped > 0 {
        tracing::warn!(?platform, dropped, "rows dropped during normalization");
    }
    Ok(())
}
