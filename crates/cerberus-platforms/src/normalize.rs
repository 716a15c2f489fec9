//! Normalization from raw platform payloads to [`cerberus_core::AdRecord`]
//! and [`cerberus_core::LeadRecord`].
//!
//! Identity fields are copied byte-for-byte. No trimming or case-folding
//! happens here, so join keys stay exactly what each system reported.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use cerberus_core::{AdRecord, LeadRecord, Platform};

use crate::error::NormalizeError;
use crate::types::{
    GoogleAdsRow, GoogleAdsSearchResponse, MetaInsight, MetaInsightsResponse, SalesforceLead,
    SalesforceQueryResponse,
};

/// Parses a Meta insights response body (`{"data": [...]}`).
///
/// # Errors
///
/// Returns [`NormalizeError::Deserialize`] if the body is not a valid response.
pub fn parse_meta_insights(body: &str) -> Result<Vec<MetaInsight>, NormalizeError> {
    serde_json::from_str::<MetaInsightsResponse>(body)
        .map(|r| r.data)
        .map_err(|source| NormalizeError::Deserialize {
            context: "meta insights response".to_string(),
            source,
        })
}

/// Parses a Google Ads search response body (`{"results": [...]}`).
///
/// # Errors
///
/// Returns [`NormalizeError::Deserialize`] if the body is not a valid response.
pub fn parse_google_rows(body: &str) -> Result<Vec<GoogleAdsRow>, NormalizeError> {
    serde_json::from_str::<GoogleAdsSearchResponse>(body)
        .map(|r| r.results)
        .map_err(|source| NormalizeError::Deserialize {
            context: "google ads search response".to_string(),
            source,
        })
}

/// Parses a Salesforce SOQL response body (`{"records": [...]}`).
///
/// # Errors
///
/// Returns [`NormalizeError::Deserialize`] if the body is not a valid response.
pub fn parse_salesforce_leads(body: &str) -> Result<Vec<SalesforceLead>, NormalizeError> {
    serde_json::from_str::<SalesforceQueryResponse>(body)
        .map(|r| r.records)
        .map_err(|source| NormalizeError::Deserialize {
            context: "salesforce lead query response".to_string(),
            source,
        })
}

/// Normalizes one Meta ad-level insight into an [`AdRecord`].
///
/// Only `actions` whose `action_type` appears in `conversion_actions` are
/// counted. `total_conversions` is their sum and `lead_conversions` is the
/// `lead` action alone.
///
/// # Errors
///
/// Returns [`NormalizeError::Normalization`] if an identity id is missing and
/// [`NormalizeError::InvalidNumber`] if a metric string does not parse.
pub fn normalize_meta_insight(
    insight: MetaInsight,
    conversion_actions: &[String],
) -> Result<AdRecord, NormalizeError> {
    let source_id = insight.ad_id.clone().unwrap_or_else(|| "<unknown>".to_string());
    let campaign_id = require_id(insight.campaign_id, "campaign_id", &source_id)?;
    let adset_id = require_id(insight.adset_id, "adset_id", &source_id)?;
    let ad_id = require_id(insight.ad_id, "ad_id", &source_id)?;

    let is_conversion = |action_type: &str| conversion_actions.iter().any(|a| a == action_type);

    let mut conversions: BTreeMap<String, Decimal> = BTreeMap::new();
    for action in insight.actions.iter().filter(|a| is_conversion(&a.action_type)) {
        let value = parse_decimal("actions.value", Some(&action.value))?;
        let slot = conversions.entry(action.action_type.clone()).or_default();
        *slot = checked_sum(*slot, value, "actions.value")?;
    }

    let mut total_conversion_value = Decimal::ZERO;
    for action in insight
        .action_values
        .iter()
        .filter(|a| is_conversion(&a.action_type))
    {
        let value = parse_decimal("action_values.value", Some(&action.value))?;
        total_conversion_value = checked_sum(total_conversion_value, value, "action_values.value")?;
    }

    let total_conversions = conversions
        .values()
        .try_fold(Decimal::ZERO, |acc, v| checked_sum(acc, *v, "actions.value"))?;
    let lead_conversions = conversions.get("lead").copied().unwrap_or_default();

    let mut record = AdRecord::new(
        Platform::Meta,
        campaign_id,
        adset_id,
        ad_id,
        parse_decimal("spend", insight.spend.as_deref())?,
    );
    record.account_id = insight.account_id.unwrap_or_default();
    record.campaign_name = insight.campaign_name.unwrap_or_default();
    record.adset_name = insight.adset_name.unwrap_or_default();
    record.ad_name = insight.ad_name.unwrap_or_default();
    record.date_start = insight.date_start.as_deref().and_then(parse_date);
    record.date_stop = insight.date_stop.as_deref().and_then(parse_date);
    record.impressions = parse_count("impressions", insight.impressions.as_deref())?;
    record.clicks = parse_count("clicks", insight.clicks.as_deref())?;
    record.unique_clicks = parse_count("unique_clicks", insight.unique_clicks.as_deref())?;
    record.reach = parse_count("reach", insight.reach.as_deref())?;
    record.frequency = parse_decimal("frequency", insight.frequency.as_deref())?;
    record.ctr = parse_decimal("ctr", insight.ctr.as_deref())?;
    record.cost_per_unique_click = parse_decimal(
        "cost_per_unique_click",
        insight.cost_per_unique_click.as_deref(),
    )?;
    record.cost_per_1000_people_reached = parse_decimal(
        "cost_per_1000_people_reached",
        insight.cost_per_1000_people_reached.as_deref(),
    )?;
    record.total_conversions = total_conversions;
    record.lead_conversions = lead_conversions;
    record.total_conversion_value = total_conversion_value;
    record.conversions = conversions;
    record.status = insight.status.unwrap_or_default();
    record.effective_status = insight.effective_status.unwrap_or_default();

    Ok(record)
}

/// Normalizes one Google Ads search row into an [`AdRecord`].
///
/// Google has no per-type conversion breakdown at this level, so every
/// conversion is reported as a lead.
///
/// # Errors
///
/// Returns [`NormalizeError::Normalization`] if an identity id is missing and
/// [`NormalizeError::InvalidNumber`] if a metric does not parse.
pub fn normalize_google_row(
    row: GoogleAdsRow,
    customer_id: &str,
) -> Result<AdRecord, NormalizeError> {
    let source_id = row
        .ad_group_ad
        .ad
        .id
        .clone()
        .unwrap_or_else(|| "<unknown>".to_string());
    let campaign_id = require_id(row.campaign.id, "campaign.id", &source_id)?;
    let adset_id = require_id(row.ad_group.id, "adGroup.id", &source_id)?;
    let ad_id = require_id(row.ad_group_ad.ad.id, "adGroupAd.ad.id", &source_id)?;

    let metrics = row.metrics;
    let cost_micros = parse_micros("costMicros", metrics.cost_micros.as_deref())?;
    let clicks = parse_count("clicks", metrics.clicks.as_deref())?;
    let impressions = parse_count("impressions", metrics.impressions.as_deref())?;
    let conversions = decimal_from_f64("conversions", metrics.conversions)?;
    let micros_per_unit = Decimal::from(1_000_000_u32);

    let ad_name = row
        .ad_group_ad
        .ad
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| format!("Ad {ad_id}"));
    let status = row
        .ad_group_ad
        .status
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "UNKNOWN".to_string());
    let date = row.segments.date.as_deref().and_then(parse_date);

    let mut record = AdRecord::new(
        Platform::Google,
        campaign_id,
        adset_id,
        ad_id,
        Decimal::new(cost_micros, 6),
    );
    record.account_id = customer_id.to_string();
    record.campaign_name = row.campaign.name.unwrap_or_default();
    record.adset_name = row.ad_group.name.unwrap_or_default();
    record.ad_name = ad_name;
    record.date_start = date;
    record.date_stop = date;
    record.impressions = impressions;
    record.clicks = clicks;
    record.unique_clicks = clicks;
    record.reach = impressions;
    record.frequency = Decimal::ONE;
    let ctr_fraction = decimal_from_f64("ctr", metrics.ctr)?;
    record.ctr = ctr_fraction
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| invalid("ctr", &ctr_fraction.to_string()))?;
    record.cost_per_unique_click =
        decimal_from_f64("averageCpc", metrics.average_cpc)? / micros_per_unit;
    record.cost_per_1000_people_reached =
        decimal_from_f64("averageCpm", metrics.average_cpm)? / micros_per_unit;
    record.total_conversions = conversions;
    record.lead_conversions = conversions;
    record.total_conversion_value = decimal_from_f64("conversionsValue", metrics.conversions_value)?;
    record.conversions = BTreeMap::from([("lead".to_string(), conversions)]);
    record.status.clone_from(&status);
    record.effective_status = status;

    Ok(record)
}

/// Normalizes one Salesforce lead into a [`LeadRecord`].
///
/// Empty-string fields are treated as absent. UTM ids come from the
/// `FB_*__c` custom fields.
///
/// # Errors
///
/// Returns [`NormalizeError::Normalization`] if the lead has no `Id`.
pub fn normalize_salesforce_lead(lead: SalesforceLead) -> Result<LeadRecord, NormalizeError> {
    let lead_id = require_id(lead.id, "Id", "<unknown lead>")?;

    Ok(LeadRecord {
        lead_id,
        email: non_empty(lead.email),
        status: non_empty(lead.status),
        source: non_empty(lead.lead_source),
        utm_campaign_id: non_empty(lead.fb_campaign_id),
        utm_adset_id: non_empty(lead.fb_adset_id),
        utm_ad_id: non_empty(lead.fb_ad_id),
        converted: lead.is_converted.unwrap_or(false),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn require_id(value: Option<String>, field: &str, source_id: &str) -> Result<String, NormalizeError> {
    non_empty(value).ok_or_else(|| NormalizeError::Normalization {
        source_id: source_id.to_string(),
        reason: format!("missing {field}"),
    })
}

/// Parses a `"YYYY-MM-DD"` date; anything else becomes `None`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn invalid(field: &str, value: &str) -> NormalizeError {
    NormalizeError::InvalidNumber {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// `a + b`, or `InvalidNumber` when the sum leaves `Decimal`'s range.
fn checked_sum(a: Decimal, b: Decimal, field: &str) -> Result<Decimal, NormalizeError> {
    a.checked_add(b)
        .ok_or_else(|| invalid(field, &format!("{a} + {b} overflows")))
}

/// Absent or empty strings are zero: both APIs omit zero-valued metrics.
fn parse_decimal(field: &str, raw: Option<&str>) -> Result<Decimal, NormalizeError> {
    match raw {
        None | Some("") => Ok(Decimal::ZERO),
        Some(s) => Decimal::from_str(s).map_err(|_| invalid(field, s)),
    }
}

fn parse_count(field: &str, raw: Option<&str>) -> Result<u64, NormalizeError> {
    match raw {
        None | Some("") => Ok(0),
        Some(s) => s.parse::<u64>().map_err(|_| invalid(field, s)),
    }
}

fn parse_micros(field: &str, raw: Option<&str>) -> Result<i64, NormalizeError> {
    match raw {
        None | Some("") => Ok(0),
        Some(s) => match s.parse::<i64>() {
            Ok(v) if v >= 0 => Ok(v),
            _ => Err(invalid(field, s)),
        },
    }
}

/// Converts through the shortest decimal rendering so `0.0187` stays `0.0187`.
fn decimal_from_f64(field: &str, raw: Option<f64>) -> Result<Decimal, NormalizeError> {
    match raw {
        None => Ok(Decimal::ZERO),
        Some(v) if v.is_finite() => {
            let rendered = v.to_string();
            Decimal::from_str(&rendered).map_err(|_| invalid(field, &rendered))
        }
        Some(v) => Err(invalid(field, &v.to_string())),
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
