//! Validation of the dictionary-shaped batches handed over by the fetch
//! collaborators.
//!
//! A batch that is not a JSON array is a contract violation and fails the
//! run. Inside a batch, each record is checked on its own: records missing
//! identity fields or `spend` are skipped and reported, the rest continue.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use cerberus_core::{AdRecord, LeadRecord, Platform};

use crate::error::{AttributionError, BatchKind, RecordError, SkippedRecord};

/// Prefix of flattened per-type conversion columns, e.g. `conversions_lead`.
pub const CONVERSION_COLUMN_PREFIX: &str = "conversions_";

/// Records that passed validation, plus the ones that did not.
#[derive(Debug, Clone)]
pub struct ValidatedBatch<T> {
    pub records: Vec<T>,
    pub skipped: Vec<SkippedRecord>,
}

impl<T> ValidatedBatch<T> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Validates a whole ad batch for one platform.
///
/// # Errors
///
/// Returns [`AttributionError::NotASequence`] if `batch` is not a JSON array.
pub fn validate_ad_batch(
    batch: &Value,
    platform: Platform,
) -> Result<ValidatedBatch<AdRecord>, AttributionError> {
    let kind = match platform {
        Platform::Meta => BatchKind::Meta,
        Platform::Google => BatchKind::Google,
    };
    validate_batch(batch, kind, |value| validate_ad_record(value, platform))
}

/// Validates a whole CRM lead batch.
///
/// # Errors
///
/// Returns [`AttributionError::NotASequence`] if `batch` is not a JSON array.
pub fn validate_lead_batch(batch: &Value) -> Result<ValidatedBatch<LeadRecord>, AttributionError> {
    validate_batch(batch, BatchKind::Leads, validate_lead_record)
}

fn validate_batch<T, F>(
    batch: &Value,
    kind: BatchKind,
    validate: F,
) -> Result<ValidatedBatch<T>, AttributionError>
where
    F: Fn(&Value) -> Result<T, RecordError>,
{
    let Value::Array(items) = batch else {
        return Err(AttributionError::NotASequence {
            batch: kind,
            found: value_kind(batch),
        });
    };

    let mut out = ValidatedBatch::empty();
    for (index, item) in items.iter().enumerate() {
        match validate(item) {
            Ok(record) => out.records.push(record),
            Err(error) => {
                tracing::warn!(batch = %kind, index, %error, "skipping malformed record");
                out.skipped.push(SkippedRecord {
                    batch: kind,
                    index,
                    error,
                });
            }
        }
    }
    Ok(out)
}

/// Validates and converts one ad record.
///
/// `campaign_id`, `adset_id`, `ad_id` and `spend` are required; every other
/// field defaults to zero or empty. Per-type conversions are read from a
/// nested `conversions` object and from flat `conversions_<type>` keys, with
/// the nested object winning on conflicts.
///
/// # Errors
///
/// Returns a [`RecordError`] describing the first problem found.
pub fn validate_ad_record(value: &Value, platform: Platform) -> Result<AdRecord, RecordError> {
    let obj = as_object(value)?;

    let campaign_id = required_id(obj, "campaign_id")?;
    let adset_id = required_id(obj, "adset_id")?;
    let ad_id = required_id(obj, "ad_id")?;
    let spend = decimal_field(obj, "spend")?.ok_or_else(|| RecordError::MissingField {
        field: "spend".to_string(),
    })?;
    if spend < Decimal::ZERO {
        return Err(RecordError::NegativeSpend {
            spend: spend.to_string(),
        });
    }

    let conversions = conversion_map(obj)?;
    let total_conversions = match decimal_field(obj, "total_conversions")? {
        Some(total) => total,
        None => conversions
            .values()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| invalid("conversions", "sum of conversion counts is out of range"))?,
    };
    let lead_conversions = match decimal_field(obj, "lead_conversions")? {
        Some(leads) => leads,
        None => conversions.get("lead").copied().unwrap_or_default(),
    };

    let mut record = AdRecord::new(platform, campaign_id, adset_id, ad_id, spend);
    record.account_id = text_field(obj, "account_id")?;
    record.campaign_name = text_field(obj, "campaign_name")?;
    record.adset_name = text_field(obj, "adset_name")?;
    record.ad_name = text_field(obj, "ad_name")?;
    record.date_start = date_field(obj, "date_start")?;
    record.date_stop = date_field(obj, "date_stop")?;
    record.impressions = count_field(obj, "impressions")?;
    record.clicks = count_field(obj, "clicks")?;
    record.unique_clicks = count_field(obj, "unique_clicks")?;
    record.reach = count_field(obj, "reach")?;
    record.frequency = decimal_field(obj, "frequency")?.unwrap_or_default();
    record.ctr = decimal_field(obj, "ctr")?.unwrap_or_default();
    record.cost_per_unique_click = decimal_field(obj, "cost_per_unique_click")?.unwrap_or_default();
    record.cost_per_1000_people_reached =
        decimal_field(obj, "cost_per_1000_people_reached")?.unwrap_or_default();
    record.total_conversions = total_conversions;
    record.lead_conversions = lead_conversions;
    record.total_conversion_value =
        decimal_field(obj, "total_conversion_value")?.unwrap_or_default();
    record.conversions = conversions;
    record.status = text_field(obj, "status")?;
    record.effective_status = text_field(obj, "effective_status")?;

    Ok(record)
}

/// Validates and converts one CRM lead.
///
/// Nothing is required: a lead joins through its UTM tags, so a missing
/// `lead_id` becomes an empty string. `converted` defaults to `false`; empty
/// strings in optional fields are treated as absent.
///
/// This deliberately differs from `cerberus_platforms::normalize_salesforce_lead`,
/// which rejects a Salesforce lead without `Id`: a raw CRM payload always
/// carries one, while pre-shaped lead batches may carry only UTM tags.
///
/// # Errors
///
/// Returns a [`RecordError`] describing the first problem found.
pub fn validate_lead_record(value: &Value) -> Result<LeadRecord, RecordError> {
    let obj = as_object(value)?;

    let converted = match obj.get("converted") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(RecordError::InvalidField {
                field: "converted".to_string(),
                reason: format!("expected boolean, got {}", value_kind(other)),
            })
        }
    };

    Ok(LeadRecord {
        lead_id: text_field(obj, "lead_id")?,
        email: optional_text(obj, "email")?,
        status: optional_text(obj, "status")?,
        source: optional_text(obj, "source")?,
        utm_campaign_id: optional_text(obj, "utm_campaign_id")?,
        utm_adset_id: optional_text(obj, "utm_adset_id")?,
        utm_ad_id: optional_text(obj, "utm_ad_id")?,
        converted,
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn as_object(value: &Value) -> Result<&Map<String, Value>, RecordError> {
    value.as_object().ok_or(RecordError::NotAnObject {
        found: value_kind(value),
    })
}

fn invalid(field: &str, reason: impl Into<String>) -> RecordError {
    RecordError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

/// Ids may arrive as strings or (from Google) as integers.
fn required_id(obj: &Map<String, Value>, field: &str) -> Result<String, RecordError> {
    match obj.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) if n.is_u64() || n.is_i64() => Ok(n.to_string()),
        None | Some(Value::Null) => Err(RecordError::MissingField {
            field: field.to_string(),
        }),
        Some(Value::String(_)) => Err(RecordError::MissingField {
            field: field.to_string(),
        }),
        Some(other) => Err(invalid(
            field,
            format!("expected string id, got {}", value_kind(other)),
        )),
    }
}

fn optional_text(obj: &Map<String, Value>, field: &str) -> Result<Option<String>, RecordError> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(invalid(
            field,
            format!("expected string, got {}", value_kind(other)),
        )),
    }
}

fn text_field(obj: &Map<String, Value>, field: &str) -> Result<String, RecordError> {
    optional_text(obj, field).map(Option::unwrap_or_default)
}

fn parse_decimal_value(field: &str, value: &Value) -> Result<Option<Decimal>, RecordError> {
    let raw = match value {
        Value::Null => return Ok(None),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().to_string(),
        other => {
            return Err(invalid(
                field,
                format!("expected number, got {}", value_kind(other)),
            ))
        }
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map(Some)
        .map_err(|_| invalid(field, format!("\"{raw}\" is not a number")))
}

fn decimal_field(obj: &Map<String, Value>, field: &str) -> Result<Option<Decimal>, RecordError> {
    match obj.get(field) {
        None => Ok(None),
        Some(value) => parse_decimal_value(field, value),
    }
}

fn count_field(obj: &Map<String, Value>, field: &str) -> Result<u64, RecordError> {
    let Some(value) = decimal_field(obj, field)? else {
        return Ok(0);
    };
    if value < Decimal::ZERO || !value.fract().is_zero() {
        return Err(invalid(
            field,
            format!("expected a non-negative whole number, got {value}"),
        ));
    }
    value
        .to_u64()
        .ok_or_else(|| invalid(field, format!("{value} is out of range")))
}

fn date_field(obj: &Map<String, Value>, field: &str) -> Result<Option<NaiveDate>, RecordError> {
    match optional_text(obj, field)? {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| invalid(field, format!("\"{s}\" is not a YYYY-MM-DD date"))),
    }
}

fn conversion_map(obj: &Map<String, Value>) -> Result<BTreeMap<String, Decimal>, RecordError> {
    let mut conversions = BTreeMap::new();

    for (key, value) in obj {
        let Some(kind) = key.strip_prefix(CONVERSION_COLUMN_PREFIX) else {
            continue;
        };
        if kind.is_empty() {
            continue;
        }
        if let Some(count) = parse_decimal_value(key, value)? {
            conversions.insert(kind.to_string(), count);
        }
    }

    match obj.get("conversions") {
        None | Some(Value::Null) => {}
        Some(Value::Object(nested)) => {
            for (kind, value) in nested {
                let field = format!("conversions.{kind}");
                if let Some(count) = parse_decimal_value(&field, value)? {
                    conversions.insert(kind.clone(), count);
                }
            }
        }
        Some(other) => {
            return Err(invalid(
                "conversions",
                format!("expected object, got {}", value_kind(other)),
            ))
        }
    }

    Ok(conversions)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn ad_json() -> Value {
        json!({
            "campaign_id": "C1",
            "adset_id": "AS1",
            "ad_id": "A1",
            "spend": 45.67,
            "clicks": 234,
            "impressions": "12543",
            "lead_conversions": 8,
            "total_conversions": 8,
            "date_start": "2025-01-20"
        })
    }

    #[test]
    fn valid_ad_record_is_converted() {
        let record = validate_ad_record(&ad_json(), Platform::Meta).unwrap();
        assert_eq!(record.campaign_id, "C1");
        assert_eq!(record.spend, Decimal::new(4567, 2));
        assert_eq!(record.clicks, 234);
        assert_eq!(record.impressions, 12_543);
        assert_eq!(record.lead_conversions, Decimal::from(8));
        assert_eq!(record.date_start, NaiveDate::from_ymd_opt(2025, 1, 20));
        assert_eq!(record.platform, Platform::Meta);
    }

    #[test]
    fn numeric_ids_are_accepted() {
        let mut value = ad_json();
        value["campaign_id"] = json!(2001);
        let record = validate_ad_record(&value, Platform::Google).unwrap();
        assert_eq!(record.campaign_id, "2001");
    }

    #[test]
    fn missing_identity_field_is_rejected() {
        for field in ["campaign_id", "adset_id", "ad_id", "spend"] {
            let mut value = ad_json();
            value.as_object_mut().unwrap().remove(field);
            let err = validate_ad_record(&value, Platform::Meta).unwrap_err();
            assert_eq!(
                err,
                RecordError::MissingField {
                    field: field.to_string()
                }
            );
        }
    }

    #[test]
    fn empty_id_counts_as_missing() {
        let mut value = ad_json();
        value["ad_id"] = json!("");
        let err = validate_ad_record(&value, Platform::Meta).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { ref field } if field == "ad_id"));
    }

    #[test]
    fn negative_spend_is_rejected() {
        let mut value = ad_json();
        value["spend"] = json!(-1.5);
        let err = validate_ad_record(&value, Platform::Meta).unwrap_err();
        assert!(matches!(err, RecordError::NegativeSpend { .. }));
    }

    #[test]
    fn fractional_click_count_is_rejected() {
        let mut value = ad_json();
        value["clicks"] = json!(2.5);
        let err = validate_ad_record(&value, Platform::Meta).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "clicks"));
    }

    #[test]
    fn bad_date_is_rejected() {
        let mut value = ad_json();
        value["date_start"] = json!("20/01/2025");
        let err = validate_ad_record(&value, Platform::Meta).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "date_start"));
    }

    #[test]
    fn conversions_read_from_flat_and_nested_keys() {
        let value = json!({
            "campaign_id": "C1",
            "adset_id": "AS1",
            "ad_id": "A1",
            "spend": "10",
            "conversions_purchase": 2,
            "conversions_lead": 1,
            "conversions": {"lead": 3, "contact": "1"}
        });
        let record = validate_ad_record(&value, Platform::Meta).unwrap();
        assert_eq!(record.conversions["purchase"], Decimal::from(2));
        assert_eq!(record.conversions["lead"], Decimal::from(3));
        assert_eq!(record.conversions["contact"], Decimal::ONE);
        assert_eq!(record.total_conversions, Decimal::from(6));
        assert_eq!(record.lead_conversions, Decimal::from(3));
    }

    #[test]
    fn explicit_totals_win_over_conversion_map() {
        let mut value = ad_json();
        value["conversions_purchase"] = json!(5);
        let record = validate_ad_record(&value, Platform::Meta).unwrap();
        assert_eq!(record.total_conversions, Decimal::from(8));
    }

    #[test]
    fn conversion_sum_out_of_range_is_rejected() {
        let huge = "50000000000000000000000000000";
        let value = json!({
            "campaign_id": "C1", "adset_id": "AS1", "ad_id": "A1", "spend": 1,
            "conversions": { "lead": huge, "purchase": huge }
        });
        let err = validate_ad_record(&value, Platform::Meta).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "conversions"));
    }

    #[test]
    fn non_object_record_is_rejected() {
        let err = validate_ad_record(&json!("C1"), Platform::Meta).unwrap_err();
        assert_eq!(err, RecordError::NotAnObject { found: "string" });
    }

    #[test]
    fn batch_skips_bad_records_and_keeps_good_ones() {
        let batch = json!([ad_json(), {"campaign_id": "C2"}, 42, ad_json()]);
        let validated = validate_ad_batch(&batch, Platform::Meta).unwrap();
        assert_eq!(validated.records.len(), 2);
        assert_eq!(validated.skipped.len(), 2);
        assert_eq!(validated.skipped[0].index, 1);
        assert_eq!(validated.skipped[0].batch, BatchKind::Meta);
        assert_eq!(validated.skipped[1].index, 2);
    }

    #[test]
    fn batch_that_is_not_an_array_fails_fast() {
        let err = validate_ad_batch(&json!({"data": []}), Platform::Google).unwrap_err();
        assert!(matches!(
            err,
            AttributionError::NotASequence {
                batch: BatchKind::Google,
                found: "object"
            }
        ));
    }

    #[test]
    fn lead_record_defaults() {
        let lead = validate_lead_record(&json!({"lead_id": "L1", "utm_ad_id": ""})).unwrap();
        assert_eq!(lead.lead_id, "L1");
        assert!(lead.utm_ad_id.is_none());
        assert!(!lead.converted);
    }

    #[test]
    fn lead_record_without_id_is_kept() {
        let lead = validate_lead_record(&json!({
            "utm_campaign_id": "C1", "utm_adset_id": "AS1", "utm_ad_id": "A1", "converted": true
        }))
        .unwrap();
        assert_eq!(lead.lead_id, "");
        assert!(lead.converted);
    }

    #[test]
    fn lead_record_with_non_text_id_is_rejected() {
        let err = validate_lead_record(&json!({"lead_id": {"v": 1}})).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "lead_id"));
    }

    #[test]
    fn lead_record_non_boolean_converted_is_rejected() {
        let err = validate_lead_record(&json!({"lead_id": "L1", "converted": "yes"})).unwrap_err();
        assert!(matches!(err, RecordError::InvalidField { ref field, .. } if field == "converted"));
    }

    #[test]
    fn lead_batch_null_fails_fast() {
        let err = validate_lead_batch(&Value::Null).unwrap_err();
        assert!(matches!(
            err,
            AttributionError::NotASequence {
                batch: BatchKind::Leads,
                found: "null"
            }
        ));
    }
}
