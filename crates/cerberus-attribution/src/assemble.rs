//! Unified Record Assembler: flattens reconciled rows into export rows that
//! all share one column set.
//!
//! The union of conversion types across the batch decides the
//! `conversions_<type>` columns every row gets; a row that never saw a type
//! reports `0` for it.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::unified::{AttributionQuality, UnifiedRecord};
use crate::validate::CONVERSION_COLUMN_PREFIX;

/// Fixed columns, in export order, ahead of the per-type conversion columns.
pub const BASE_COLUMNS: &[&str] = &[
    "platform",
    "platform_key",
    "unified_id",
    "account_id",
    "campaign_id",
    "campaign_name",
    "adset_id",
    "adset_name",
    "ad_id",
    "ad_name",
    "date_start",
    "date_stop",
    "spend",
    "impressions",
    "clicks",
    "unique_clicks",
    "reach",
    "frequency",
    "ctr",
    "cost_per_unique_click",
    "cost_per_1000_people_reached",
    "total_conversions",
    "lead_conversions",
    "total_conversion_value",
    "status",
    "effective_status",
    "has_salesforce_data",
    "attribution_quality",
    "sf_lead_count",
    "sf_converted_count",
    "sf_lead_statuses",
    "sf_lead_sources",
    "sf_first_lead_email",
    "cost_per_lead",
    "cost_per_conversion",
    "click_to_conversion_rate",
    "zero_performance_flag",
    "top_performer_flag",
    "funnel_mismatch_flag",
];

/// Conversion types present anywhere in a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputSchema {
    pub conversion_types: BTreeSet<String>,
}

impl OutputSchema {
    /// Every column name, base columns first, conversion columns sorted.
    #[must_use]
    pub fn columns(&self) -> Vec<String> {
        BASE_COLUMNS
            .iter()
            .map(|c| (*c).to_string())
            .chain(self.conversion_types.iter().map(|t| conversion_column(t)))
            .collect()
    }
}

fn conversion_column(conversion_type: &str) -> String {
    format!("{CONVERSION_COLUMN_PREFIX}{conversion_type}")
}

/// A conversion type that some rows in the batch lack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDrift {
    pub conversion_type: String,
    pub present_in: usize,
    pub missing_in: usize,
}

/// Collects the union of conversion types across `records`.
#[must_use]
pub fn union_schema(records: &[UnifiedRecord]) -> OutputSchema {
    OutputSchema {
        conversion_types: records
            .iter()
            .flat_map(|r| r.ad.conversions.keys().cloned())
            .collect(),
    }
}

/// Lists each conversion type in `schema` that is missing from some rows.
#[must_use]
pub fn schema_drift(records: &[UnifiedRecord], schema: &OutputSchema) -> Vec<SchemaDrift> {
    schema
        .conversion_types
        .iter()
        .filter_map(|conversion_type| {
            let present_in = records
                .iter()
                .filter(|r| r.ad.conversions.contains_key(conversion_type))
                .count();
            let missing_in = records.len() - present_in;
            (missing_in > 0).then(|| SchemaDrift {
                conversion_type: conversion_type.clone(),
                present_in,
                missing_in,
            })
        })
        .collect()
}

/// One flat, export-ready row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub platform: &'static str,
    pub platform_key: &'static str,
    pub unified_id: String,
    pub account_id: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub adset_id: String,
    pub adset_name: String,
    pub ad_id: String,
    pub ad_name: String,
    pub date_start: Option<NaiveDate>,
    pub date_stop: Option<NaiveDate>,
    pub spend: Decimal,
    pub impressions: u64,
    pub clicks: u64,
    pub unique_clicks: u64,
    pub reach: u64,
    pub frequency: Decimal,
    pub ctr: Decimal,
    pub cost_per_unique_click: Decimal,
    pub cost_per_1000_people_reached: Decimal,
    pub total_conversions: Decimal,
    pub lead_conversions: Decimal,
    pub total_conversion_value: Decimal,
    pub status: String,
    pub effective_status: String,
    pub has_salesforce_data: bool,
    pub attribution_quality: AttributionQuality,
    pub sf_lead_count: u32,
    pub sf_converted_count: u32,
    pub sf_lead_statuses: String,
    pub sf_lead_sources: String,
    pub sf_first_lead_email: Option<String>,
    pub cost_per_lead: Decimal,
    pub cost_per_conversion: Decimal,
    pub click_to_conversion_rate: Decimal,
    pub zero_performance_flag: bool,
    pub top_performer_flag: bool,
    pub funnel_mismatch_flag: bool,
    /// `conversions_<type>` columns, one per type in the batch schema.
    #[serde(flatten)]
    pub conversion_columns: BTreeMap<String, Decimal>,
}

/// Flattens one record against the batch schema.
#[must_use]
pub fn assemble(record: &UnifiedRecord, schema: &OutputSchema) -> ExportRow {
    let ad = &record.ad;
    let conversion_columns = schema
        .conversion_types
        .iter()
        .map(|t| {
            let count = ad.conversions.get(t).copied().unwrap_or_default();
            (conversion_column(t), count)
        })
        .collect();

    ExportRow {
        platform: ad.platform.display_name(),
        platform_key: ad.platform.key(),
        unified_id: record.unified_id.clone(),
        account_id: ad.account_id.clone(),
        campaign_id: ad.campaign_id.clone(),
        campaign_name: ad.campaign_name.clone(),
        adset_id: ad.adset_id.clone(),
        adset_name: ad.adset_name.clone(),
        ad_id: ad.ad_id.clone(),
        ad_name: ad.ad_name.clone(),
        date_start: ad.date_start,
        date_stop: ad.date_stop,
        spend: ad.spend,
        impressions: ad.impressions,
        clicks: ad.clicks,
        unique_clicks: ad.unique_clicks,
        reach: ad.reach,
        frequency: ad.frequency,
        ctr: ad.ctr,
        cost_per_unique_click: ad.cost_per_unique_click,
        cost_per_1000_people_reached: ad.cost_per_1000_people_reached,
        total_conversions: ad.total_conversions,
        lead_conversions: ad.lead_conversions,
        total_conversion_value: ad.total_conversion_value,
        status: ad.status.clone(),
        effective_status: ad.effective_status.clone(),
        has_salesforce_data: record.has_salesforce_data,
        attribution_quality: record.attribution_quality(),
        sf_lead_count: record.sf_lead_count,
        sf_converted_count: record.sf_converted_count,
        sf_lead_statuses: record.sf_lead_statuses.clone(),
        sf_lead_sources: record.sf_lead_sources.clone(),
        sf_first_lead_email: record.sf_first_lead_email.clone(),
        cost_per_lead: record.cost_per_lead,
        cost_per_conversion: record.cost_per_conversion,
        click_to_conversion_rate: record.click_to_conversion_rate,
        zero_performance_flag: record.flags.zero_performance,
        top_performer_flag: record.flags.top_performer,
        funnel_mismatch_flag: record.flags.funnel_mismatch,
        conversion_columns,
    }
}

/// A batch of rows sharing one schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssembledBatch {
    pub columns: Vec<String>,
    pub rows: Vec<ExportRow>,
}

/// Builds the union schema, then flattens every record against it.
#[must_use]
pub fn assemble_batch(records: &[UnifiedRecord]) -> (AssembledBatch, Vec<SchemaDrift>) {
    let schema = union_schema(records);
    let drift = schema_drift(records, &schema);
    for d in &drift {
        tracing::info!(
            conversion_type = %d.conversion_type,
            present_in = d.present_in,
            missing_in = d.missing_in,
            "conversion type missing from some rows; defaulting to 0"
        );
    }

    let rows = records.iter().map(|r| assemble(r, &schema)).collect();
    (
        AssembledBatch {
            columns: schema.columns(),
            rows,
        },
        drift,
    )
}
