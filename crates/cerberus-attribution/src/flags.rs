//! Alert flags derived from the reconciled metrics.

use rust_decimal::Decimal;

use cerberus_core::AlertThresholds;

use crate::unified::{AlertFlags, UnifiedRecord};

/// Evaluates the three alert flags against recomputed metrics.
///
/// Conversion counts are the effective (CRM-first) ones, matching what
/// `cost_per_lead` was computed from.
#[must_use]
pub fn evaluate_flags(record: &UnifiedRecord, thresholds: &AlertThresholds) -> AlertFlags {
    let conversions = record.effective_conversion_count();

    let zero_performance =
        record.ad.spend > thresholds.zero_performance_min_spend && conversions.is_zero();

    let funnel_mismatch = record.ad.ctr > thresholds.funnel_min_ctr
        && record.click_to_conversion_rate < thresholds.funnel_max_conversion_rate;

    let top_performer = conversions > thresholds.top_performer_min_conversions
        && record.cost_per_lead > Decimal::ZERO
        && record.cost_per_lead < thresholds.top_performer_max_cost_per_lead;

    AlertFlags {
        zero_performance,
        funnel_mismatch,
        top_performer,
    }
}

/// Returns a copy of `record` with its flags set.
#[must_use]
pub fn with_flags(record: &UnifiedRecord, thresholds: &AlertThresholds) -> UnifiedRecord {
    let mut flagged = record.clone();
    flagged.flags = evaluate_flags(record, thresholds);
    flagged
}

#[cfg(test)]
mod tests {
    use cerberus_core::{AdRecord, Platform};

    use super::*;
    use crate::aggregate::LeadSummary;
    use crate::recompute::recompute;

    fn make_record(spend: i64, clicks: u64, ctr: Decimal, conversions: i64) -> UnifiedRecord {
        let mut ad = AdRecord::new(Platform::Meta, "C1", "AS1", "A1", Decimal::from(spend));
        ad.clicks = clicks;
        ad.ctr = ctr;
        ad.total_conversions = Decimal::from(conversions);
        ad.lead_conversions = Decimal::from(conversions);
        recompute(&UnifiedRecord::unmatched(ad))
    }

    #[test]
    fn zero_performance_when_spend_high_and_no_conversions() {
        let record = make_record(90, 230, Decimal::ONE, 0);
        let flags = evaluate_flags(&record, &AlertThresholds::default());
        assert!(flags.zero_performance);
        assert!(!flags.top_performer);
    }

    #[test]
    fn zero_performance_needs_spend_above_threshold() {
        let record = make_record(50, 230, Decimal::ONE, 0);
        assert!(!evaluate_flags(&record, &AlertThresholds::default()).zero_performance);
    }

    #[test]
    fn zero_performance_uses_crm_conversions_when_matched() {
        let mut ad = AdRecord::new(Platform::Meta, "C1", "AS1", "A1", Decimal::from(80));
        ad.total_conversions = Decimal::from(6);
        let summary = LeadSummary {
            lead_count: 2,
            converted_count: 0,
            statuses: Vec::new(),
            first_lead_email: None,
            lead_sources: Vec::new(),
        };
        let record = recompute(&UnifiedRecord::matched(ad, &summary));
        assert!(evaluate_flags(&record, &AlertThresholds::default()).zero_performance);
    }

    #[test]
    fn funnel_mismatch_when_ctr_high_and_rate_low() {
        // 1 lead over 500 clicks = 0.2%
        let record = make_record(40, 500, Decimal::new(35, 1), 1);
        assert!(evaluate_flags(&record, &AlertThresholds::default()).funnel_mismatch);
    }

    #[test]
    fn no_funnel_mismatch_with_healthy_rate() {
        let record = make_record(40, 100, Decimal::new(35, 1), 5);
        assert!(!evaluate_flags(&record, &AlertThresholds::default()).funnel_mismatch);
    }

    #[test]
    fn top_performer_when_many_cheap_conversions() {
        let record = make_record(60, 200, Decimal::ONE, 8);
        let flags = evaluate_flags(&record, &AlertThresholds::default());
        assert!(flags.top_performer);
        assert!(!flags.zero_performance);
    }

    #[test]
    fn top_performer_respects_custom_thresholds() {
        let record = make_record(60, 200, Decimal::ONE, 8);
        let thresholds = AlertThresholds {
            top_performer_max_cost_per_lead: Decimal::from(5),
            ..AlertThresholds::default()
        };
        assert!(!evaluate_flags(&record, &thresholds).top_performer);
    }

    #[test]
    fn with_flags_sets_flags_on_copy() {
        let record = make_record(90, 230, Decimal::ONE, 0);
        let flagged = with_flags(&record, &AlertThresholds::default());
        assert!(flagged.flags.zero_performance);
        assert!(!record.flags.zero_performance);
    }
}
