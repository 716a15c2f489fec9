//! The campaign / ad set / ad triple that joins ad rows to CRM leads.
//!
//! Matching is exact and case-sensitive. `"Camp_A"` and `"camp_a"` are
//! different keys, so upstream systems must agree on casing; a mismatch
//! shows up as a missed join, never as an error.

use serde::Serialize;

use cerberus_core::{AdRecord, LeadRecord};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AttributionKey {
    campaign_id: String,
    adset_id: String,
    ad_id: String,
}

impl AttributionKey {
    /// Builds a key, or `None` if any component is empty.
    #[must_use]
    pub fn new(campaign_id: &str, adset_id: &str, ad_id: &str) -> Option<Self> {
        if campaign_id.is_empty() || adset_id.is_empty() || ad_id.is_empty() {
            return None;
        }
        Some(Self {
            campaign_id: campaign_id.to_string(),
            adset_id: adset_id.to_string(),
            ad_id: ad_id.to_string(),
        })
    }

    /// Key for an ad row, built from its own ids.
    ///
    /// Never absent: validated ad records always carry all three ids. A
    /// hand-built record with an empty id still gets a key, it just cannot
    /// match any lead because lead keys never contain empty components.
    #[must_use]
    pub fn for_ad(ad: &AdRecord) -> Self {
        Self {
            campaign_id: ad.campaign_id.clone(),
            adset_id: ad.adset_id.clone(),
            ad_id: ad.ad_id.clone(),
        }
    }

    /// Key for a lead, or `None` when any UTM tag is absent or empty.
    #[must_use]
    pub fn for_lead(lead: &LeadRecord) -> Option<Self> {
        Self::new(
            lead.utm_campaign_id.as_deref()?,
            lead.utm_adset_id.as_deref()?,
            lead.utm_ad_id.as_deref()?,
        )
    }

    #[must_use]
    pub fn campaign_id(&self) -> &str {
        &self.campaign_id
    }

    #[must_use]
    pub fn adset_id(&self) -> &str {
        &self.adset_id
    }

    #[must_use]
    pub fn ad_id(&self) -> &str {
        &self.ad_id
    }
}

impl std::fmt::Display for AttributionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.campaign_id, self.adset_id, self.ad_id)
    }
}

/// Anything that can be joined on an [`AttributionKey`].
pub trait Attributable {
    fn attribution_key(&self) -> Option<AttributionKey>;
}

impl Attributable for AdRecord {
    fn attribution_key(&self) -> Option<AttributionKey> {
        Some(AttributionKey::for_ad(self))
    }
}

impl Attributable for LeadRecord {
    fn attribution_key(&self) -> Option<AttributionKey> {
        AttributionKey::for_lead(self)
    }
}

/// Derives the join key for an ad or a lead.
#[must_use]
pub fn build_key<T: Attributable + ?Sized>(record: &T) -> Option<AttributionKey> {
    record.attribution_key()
}
