use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::recompute::round_half_up;
use crate::unified::UnifiedRecord;

/// Batch-level totals and averages over the reconciled rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total_records: usize,
    pub total_spend: Decimal,
    /// Sum of platform-reported `total_conversions`.
    pub total_platform_conversions: Decimal,
    /// Sum of CRM lead counts over matched rows.
    pub total_crm_leads: u64,
    /// Row count per platform key (`meta`, `google`).
    pub records_by_platform: BTreeMap<String, usize>,
    pub matched_records: usize,
    pub zero_performance_count: usize,
    pub funnel_mismatch_count: usize,
    pub top_performer_count: usize,
    pub average_ctr: Decimal,
    /// Averaged over rows with a non-zero cost-per-lead only.
    pub average_cost_per_lead: Decimal,
    pub average_click_to_conversion_rate: Decimal,
    pub date_start: Option<NaiveDate>,
    pub date_stop: Option<NaiveDate>,
}

fn average(sum: Decimal, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    round_half_up(sum.checked_div(Decimal::from(count)).unwrap_or_default())
}

/// Summarises a reconciled batch. An empty batch yields all zeros.
///
/// Decimal totals saturate at `Decimal::MAX` instead of overflowing.
#[must_use]
pub fn summarize(records: &[UnifiedRecord]) -> BatchSummary {
    let mut summary = BatchSummary {
        total_records: records.len(),
        ..BatchSummary::default()
    };

    let mut ctr_sum = Decimal::ZERO;
    let mut cpl_sum = Decimal::ZERO;
    let mut cpl_rows = 0;
    let mut rate_sum = Decimal::ZERO;

    for record in records {
        let ad = &record.ad;
        summary.total_spend = summary.total_spend.saturating_add(ad.spend);
        summary.total_platform_conversions = summary
            .total_platform_conversions
            .saturating_add(ad.total_conversions);
        summary.total_crm_leads += u64::from(record.sf_lead_count);
        *summary
            .records_by_platform
            .entry(ad.platform.key().to_string())
            .or_insert(0) += 1;

        if record.has_salesforce_data {
            summary.matched_records += 1;
        }
        if record.flags.zero_performance {
            summary.zero_performance_count += 1;
        }
        if record.flags.funnel_mismatch {
            summary.funnel_mismatch_count += 1;
        }
        if record.flags.top_performer {
            summary.top_performer_count += 1;
        }

        ctr_sum = ctr_sum.saturating_add(ad.ctr);
        rate_sum = rate_sum.saturating_add(record.click_to_conversion_rate);
        if !record.cost_per_lead.is_zero() {
            cpl_sum = cpl_sum.saturating_add(record.cost_per_lead);
            cpl_rows += 1;
        }
    }

    summary.average_ctr = average(ctr_sum, records.len());
    summary.average_cost_per_lead = average(cpl_sum, cpl_rows);
    summary.average_click_to_conversion_rate = average(rate_sum, records.len());

    if let Some(first) = records.first() {
        summary.date_start = first.ad.date_start;
        summary.date_stop = first.ad.date_stop;
    }

    summary
}
