//! Whole-response normalization. A row that fails to normalize is logged
//! and dropped; the rest of the response still comes through.

use cerberus_core::{AdRecord, LeadRecord};

use crate::error::NormalizeError;
use crate::normalize::{
    normalize_google_row, normalize_meta_insight, normalize_salesforce_lead, parse_google_rows,
    parse_meta_insights, parse_salesforce_leads,
};

/// Records normalized from one response, with the count of dropped rows.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

fn collect_rows<S, T, F>(source: &'static str, rows: Vec<S>, normalize: F) -> NormalizedBatch<T>
where
    F: Fn(S) -> Result<T, NormalizeError>,
{
    let total = rows.len();
    let mut records = Vec::with_capacity(total);
    let mut dropped = 0;

    for (index, row) in rows.into_iter().enumerate() {
        match normalize(row) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(source, index, %error, "dropping row that failed normalization");
                dropped += 1;
            }
        }
    }

    tracing::debug!(source, total, kept = records.len(), dropped, "normalized response");
    NormalizedBatch { records, dropped }
}

/// Parses and normalizes a Meta insights response body.
///
/// # Errors
///
/// Returns [`NormalizeError::Deserialize`] if the body itself is malformed.
pub fn normalize_meta_response(
    body: &str,
    conversion_actions: &[String],
) -> Result<NormalizedBatch<AdRecord>, NormalizeError> {
    let rows = parse_meta_insights(body)?;
    Ok(collect_rows("meta", rows, |row| {
        normalize_meta_insight(row, conversion_actions)
    }))
}

/// Parses and normalizes a Google Ads search response body.
///
/// # Errors
///
/// Returns [`NormalizeError::Deserialize`] if the body itself is malformed.
pub fn normalize_google_response(
    body: &str,
    customer_id: &str,
) -> Result<NormalizedBatch<AdRecord>, NormalizeError> {
    let rows = parse_google_rows(body)?;
    Ok(collect_rows("google", rows, |row| {
        normalize_google_row(row, customer_id)
    }))
}

/// Parses and normalizes a Salesforce lead query response body.
///
/// # Errors
///
/// Returns [`NormalizeError::Deserialize`] if the body itself is malformed.
pub fn normalize_salesforce_response(
    body: &str,
) -> Result<NormalizedBatch<LeadRecord>, NormalizeError> {
    let rows = parse_salesforce_leads(body)?;
    Ok(collect_rows("salesforce", rows, normalize_salesforce_lead))
}
