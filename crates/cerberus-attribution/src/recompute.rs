//! Metric Recomputation: cost-per-lead, cost-per-conversion and
//! click-to-conversion rate from the reconciled counts.
//!
//! CRM counts win whenever the row matched; otherwise the platform's own
//! counts are used. A zero denominator yields `0`, which is a real value
//! the alert layer reads, not an error.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::unified::UnifiedRecord;

/// Rounds half away from zero to two places (`22.835` -> `22.84`).
#[must_use]
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `numerator / denominator`, or zero when the denominator is not positive.
fn guarded_ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Returns a copy of `record` with the three derived metrics recomputed.
/// Platform-reported fields are left untouched.
#[must_use]
pub fn recompute(record: &UnifiedRecord) -> UnifiedRecord {
    let spend = record.ad.spend;
    let leads = record.effective_lead_count();
    let conversions = record.effective_conversion_count();
    let clicks = Decimal::from(record.ad.clicks);

    let mut updated = record.clone();
    updated.cost_per_lead = round_half_up(guarded_ratio(spend, leads));
    updated.cost_per_conversion = round_half_up(guarded_ratio(spend, conversions));
    // A percentage beyond Decimal's range is reported as zero, like a zero denominator.
    let rate = guarded_ratio(leads, clicks)
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO);
    updated.click_to_conversion_rate = round_half_up(rate);
    updated
}
