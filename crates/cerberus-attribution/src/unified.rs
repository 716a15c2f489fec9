use rust_decimal::Decimal;
use serde::Serialize;

use cerberus_core::AdRecord;

use crate::aggregate::LeadSummary;

/// Separator for multi-valued CRM fields in exported rows.
pub const LIST_SEPARATOR: &str = ", ";

/// How a row's lead figures were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributionQuality {
    /// Joined to CRM leads on the exact campaign / ad set / ad ids.
    #[serde(rename = "ID_Matched")]
    IdMatched,
    /// No CRM leads carried this ad's ids; platform numbers are used.
    #[serde(rename = "No_Attribution")]
    NoAttribution,
}

impl std::fmt::Display for AttributionQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttributionQuality::IdMatched => write!(f, "ID_Matched"),
            AttributionQuality::NoAttribution => write!(f, "No_Attribution"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertFlags {
    pub zero_performance: bool,
    pub funnel_mismatch: bool,
    pub top_performer: bool,
}

/// An ad row after the CRM join, carrying the reconciled metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnifiedRecord {
    pub ad: AdRecord,
    pub unified_id: String,
    pub has_salesforce_data: bool,
    pub sf_lead_count: u32,
    pub sf_converted_count: u32,
    pub sf_lead_statuses: String,
    pub sf_lead_sources: String,
    pub sf_first_lead_email: Option<String>,
    pub cost_per_lead: Decimal,
    pub cost_per_conversion: Decimal,
    /// Percentage of clicks that became leads.
    pub click_to_conversion_rate: Decimal,
    pub flags: AlertFlags,
}

impl UnifiedRecord {
    /// A row with no CRM match: lead fields at their defaults.
    #[must_use]
    pub fn unmatched(ad: AdRecord) -> Self {
        Self {
            unified_id: ad.unified_id(),
            ad,
            has_salesforce_data: false,
            sf_lead_count: 0,
            sf_converted_count: 0,
            sf_lead_statuses: String::new(),
            sf_lead_sources: String::new(),
            sf_first_lead_email: None,
            cost_per_lead: Decimal::ZERO,
            cost_per_conversion: Decimal::ZERO,
            click_to_conversion_rate: Decimal::ZERO,
            flags: AlertFlags::default(),
        }
    }

    /// A row joined to the given lead summary.
    #[must_use]
    pub fn matched(ad: AdRecord, summary: &LeadSummary) -> Self {
        Self {
            has_salesforce_data: true,
            sf_lead_count: summary.lead_count,
            sf_converted_count: summary.converted_count,
            sf_lead_statuses: summary.statuses.join(LIST_SEPARATOR),
            sf_lead_sources: summary.lead_sources.join(LIST_SEPARATOR),
            sf_first_lead_email: summary.first_lead_email.clone(),
            ..Self::unmatched(ad)
        }
    }

    #[must_use]
    pub fn attribution_quality(&self) -> AttributionQuality {
        if self.has_salesforce_data {
            AttributionQuality::IdMatched
        } else {
            AttributionQuality::NoAttribution
        }
    }

    /// CRM lead count when matched, platform-reported leads otherwise.
    #[must_use]
    pub fn effective_lead_count(&self) -> Decimal {
        if self.has_salesforce_data {
            Decimal::from(self.sf_lead_count)
        } else {
            self.ad.lead_conversions
        }
    }

    /// CRM converted count when matched, platform-reported conversions otherwise.
    #[must_use]
    pub fn effective_conversion_count(&self) -> Decimal {
        if self.has_salesforce_data {
            Decimal::from(self.sf_converted_count)
        } else {
            self.ad.total_conversions
        }
    }
}
