//! Lead Aggregator: folds a CRM lead batch into one [`LeadSummary`] per
//! attribution key.

use std::collections::HashMap;

use serde::Serialize;

use cerberus_core::LeadRecord;

use crate::key::AttributionKey;

/// Everything the merge needs to know about the leads behind one ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadSummary {
    pub lead_count: u32,
    pub converted_count: u32,
    /// Distinct statuses in first-seen order.
    pub statuses: Vec<String>,
    /// Email of the first lead seen for this key (may itself be absent).
    pub first_lead_email: Option<String>,
    /// Distinct lead sources in first-seen order.
    pub lead_sources: Vec<String>,
}

impl LeadSummary {
    fn starting_with(lead: &LeadRecord) -> Self {
        let mut summary = Self {
            lead_count: 0,
            converted_count: 0,
            statuses: Vec::new(),
            first_lead_email: lead.email.clone(),
            lead_sources: Vec::new(),
        };
        summary.absorb(lead);
        summary
    }

    fn absorb(&mut self, lead: &LeadRecord) {
        self.lead_count = self.lead_count.saturating_add(1);
        if lead.converted {
            self.converted_count = self.converted_count.saturating_add(1);
        }
        push_distinct(&mut self.statuses, lead.status.as_deref());
        push_distinct(&mut self.lead_sources, lead.source.as_deref());
    }
}

fn push_distinct(list: &mut Vec<String>, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        if !list.iter().any(|existing| existing == value) {
            list.push(value.to_string());
        }
    }
}

/// Lead summaries keyed by attribution key, built once per merge run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadIndex {
    summaries: HashMap<AttributionKey, LeadSummary>,
    unattributed: usize,
}

impl LeadIndex {
    #[must_use]
    pub fn get(&self, key: &AttributionKey) -> Option<&LeadSummary> {
        self.summaries.get(key)
    }

    /// Number of distinct attribution keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }

    /// Leads dropped because their UTM tags were incomplete.
    #[must_use]
    pub fn unattributed(&self) -> usize {
        self.unattributed
    }

    /// Total leads folded into summaries.
    #[must_use]
    pub fn attributed_leads(&self) -> u64 {
        self.summaries
            .values()
            .map(|s| u64::from(s.lead_count))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttributionKey, &LeadSummary)> {
        self.summaries.iter()
    }
}

/// Groups leads by attribution key.
///
/// Leads without a complete key are counted in [`LeadIndex::unattributed`]
/// and otherwise ignored. Input order decides `first_lead_email` and the
/// order of `statuses` / `lead_sources`.
#[must_use]
pub fn aggregate(leads: &[LeadRecord]) -> LeadIndex {
    let mut index = LeadIndex::default();

    for lead in leads {
        let Some(key) = AttributionKey::for_lead(lead) else {
            tracing::debug!(lead_id = %lead.lead_id, "lead has incomplete UTM tags; not attributable");
            index.unattributed += 1;
            continue;
        };
        index
            .summaries
            .entry(key)
            .and_modify(|summary| summary.absorb(lead))
            .or_insert_with(|| LeadSummary::starting_with(lead));
    }

    tracing::debug!(
        keys = index.summaries.len(),
        unattributed = index.unattributed,
        "aggregated leads"
    );
    index
}
