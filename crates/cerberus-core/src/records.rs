use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Advertising platform an [`AdRecord`] was reported by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Meta,
    Google,
}

impl Platform {
    /// Short machine key used in `unified_id` values, e.g. `"meta"`.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Platform::Meta => "meta",
            Platform::Google => "google",
        }
    }

    /// Human-readable platform name shown in exported rows.
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Platform::Meta => "Meta",
            Platform::Google => "Google Ads",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One ad's daily performance, normalized to a shape shared by every platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub platform: Platform,
    pub account_id: String,
    pub campaign_id: String,
    pub campaign_name: String,
    /// Meta ad set id; Google ad group id.
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
    /// Click-through rate as a percentage (`1.87` means 1.87%).
    pub ctr: Decimal,
    pub cost_per_unique_click: Decimal,
    pub cost_per_1000_people_reached: Decimal,
    /// Platform-reported conversions. Fractional for Google (data-driven attribution).
    pub total_conversions: Decimal,
    pub lead_conversions: Decimal,
    pub total_conversion_value: Decimal,
    /// Conversion counts keyed by conversion type, e.g. `"lead"` or `"purchase"`.
    pub conversions: BTreeMap<String, Decimal>,
    pub status: String,
    pub effective_status: String,
}

impl AdRecord {
    /// Builds a record carrying only identity and spend, with every metric zeroed.
    #[must_use]
    pub fn new(
        platform: Platform,
        campaign_id: impl Into<String>,
        adset_id: impl Into<String>,
        ad_id: impl Into<String>,
        spend: Decimal,
    ) -> Self {
        Self {
            platform,
            account_id: String::new(),
            campaign_id: campaign_id.into(),
            campaign_name: String::new(),
            adset_id: adset_id.into(),
            adset_name: String::new(),
            ad_id: ad_id.into(),
            ad_name: String::new(),
            date_start: None,
            date_stop: None,
            spend,
            impressions: 0,
            clicks: 0,
            unique_clicks: 0,
            reach: 0,
            frequency: Decimal::ZERO,
            ctr: Decimal::ZERO,
            cost_per_unique_click: Decimal::ZERO,
            cost_per_1000_people_reached: Decimal::ZERO,
            total_conversions: Decimal::ZERO,
            lead_conversions: Decimal::ZERO,
            total_conversion_value: Decimal::ZERO,
            conversions: BTreeMap::new(),
            status: String::new(),
            effective_status: String::new(),
        }
    }

    /// Cross-platform row identifier: `{platform}_{campaign}_{adset}_{ad}`.
    #[must_use]
    pub fn unified_id(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.platform.key(),
            self.campaign_id,
            self.adset_id,
            self.ad_id
        )
    }
}

/// A CRM lead, optionally tagged with the ad that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRecord {
    pub lead_id: String,
    pub email: Option<String>,
    /// Free-form CRM status, e.g. `"Qualified"` or `"New"`.
    pub status: Option<String>,
    pub source: Option<String>,
    pub utm_campaign_id: Option<String>,
    pub utm_adset_id: Option<String>,
    pub utm_ad_id: Option<String>,
    /// `true` once the lead reached a converted / closed-won state.
    pub converted: bool,
}

impl LeadRecord {
    #[must_use]
    pub fn new(lead_id: impl Into<String>) -> Self {
        Self {
            lead_id: lead_id.into(),
            email: None,
            status: None,
            source: None,
            utm_campaign_id: None,
            utm_adset_id: None,
            utm_ad_id: None,
            converted: false,
        }
    }
}
