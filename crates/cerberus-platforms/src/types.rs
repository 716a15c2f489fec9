//! Raw payload shapes as the platform and CRM APIs return them.
//!
//! ## Meta Marketing API (`/insights?level=ad`)
//! Every numeric metric arrives as a **JSON string** (`"spend": "45.67"`,
//! `"impressions": "12543"`), so they are modelled as `Option<String>` and
//! parsed during normalization. Conversions are not top-level fields; they
//! live in the `actions` / `action_values` arrays as
//! `{"action_type": "lead", "value": "8"}` pairs, and only the action types
//! the caller cares about are kept.
//!
//! ## Google Ads API (`googleAds:search`, REST JSON)
//! Field names are camelCase. `int64` values (ids, `costMicros`,
//! `impressions`, `clicks`) are JSON strings; `double` values (`ctr`,
//! `conversions`, `averageCpc`) are JSON numbers. Money is in micros.
//! `ctr` is a fraction (`0.0187`), not a percentage. Ad groups play the role
//! Meta ad sets play.
//!
//! ## Salesforce (`SOQL query` on `Lead`)
//! PascalCase standard fields plus custom `__c` fields holding the Meta
//! campaign / ad set / ad ids captured from the landing-page UTM tags. Unset
//! custom fields come back as `null`, occasionally as `""`.

use serde::Deserialize;

/// Top-level response from the Meta insights endpoint.
#[derive(Debug, Deserialize)]
pub struct MetaInsightsResponse {
    #[serde(default)]
    pub data: Vec<MetaInsight>,
}

/// A single ad-level insight row.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct MetaInsight {
    pub account_id: Option<String>,
    pub campaign_id: Option<String>,
    pub campaign_name: Option<String>,
    pub adset_id: Option<String>,
    pub adset_name: Option<String>,
    pub ad_id: Option<String>,
    pub ad_name: Option<String>,
    /// `"YYYY-MM-DD"`.
    pub date_start: Option<String>,
    pub date_stop: Option<String>,
    pub spend: Option<String>,
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub unique_clicks: Option<String>,
    pub reach: Option<String>,
    pub frequency: Option<String>,
    /// Already a percentage, e.g. `"1.87"`.
    pub ctr: Option<String>,
    pub cost_per_unique_click: Option<String>,
    pub cost_per_1000_people_reached: Option<String>,
    pub actions: Vec<MetaAction>,
    pub action_values: Vec<MetaAction>,
    pub status: Option<String>,
    pub effective_status: Option<String>,
}

/// One `{action_type, value}` pair from `actions` or `action_values`.
#[derive(Debug, Clone, Deserialize)]
pub struct MetaAction {
    pub action_type: String,
    pub value: String,
}

/// Top-level response from `googleAds:search`.
#[derive(Debug, Deserialize)]
pub struct GoogleAdsSearchResponse {
    #[serde(default)]
    pub results: Vec<GoogleAdsRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleAdsRow {
    pub campaign: GoogleResource,
    pub ad_group: GoogleResource,
    pub ad_group_ad: GoogleAdGroupAd,
    pub metrics: GoogleMetrics,
    pub segments: GoogleSegments,
}

/// A campaign or ad group reference: id plus display name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoogleResource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoogleAdGroupAd {
    pub ad: GoogleResource,
    /// `ENABLED`, `PAUSED`, `REMOVED`. Absent on some rows.
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GoogleMetrics {
    pub cost_micros: Option<String>,
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    /// Fraction of impressions clicked; multiply by 100 for a percentage.
    pub ctr: Option<f64>,
    /// Micros.
    pub average_cpc: Option<f64>,
    /// Micros.
    pub average_cpm: Option<f64>,
    pub conversions: Option<f64>,
    pub conversions_value: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GoogleSegments {
    pub date: Option<String>,
}

/// Top-level SOQL query response.
#[derive(Debug, Deserialize)]
pub struct SalesforceQueryResponse {
    #[serde(default)]
    pub records: Vec<SalesforceLead>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SalesforceLead {
    #[serde(rename = "Id")]
    pub id: Option<String>,
    #[serde(rename = "Status")]
    pub status: Option<String>,
    #[serde(rename = "Email")]
    pub email: Option<String>,
    #[serde(rename = "LeadSource")]
    pub lead_source: Option<String>,
    #[serde(rename = "IsConverted")]
    pub is_converted: Option<bool>,
    #[serde(rename = "FB_Campaign_ID__c")]
    pub fb_campaign_id: Option<String>,
    #[serde(rename = "FB_Adset_ID__c")]
    pub fb_adset_id: Option<String>,
    #[serde(rename = "FB_Ad_ID__c")]
    pub fb_ad_id: Option<String>,
}
