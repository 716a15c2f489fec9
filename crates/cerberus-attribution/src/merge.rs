//! Merge Engine: left-outer join of ad rows onto lead summaries.

use std::collections::HashMap;

use cerberus_core::{AdRecord, Platform};

use crate::aggregate::LeadIndex;
use crate::key::AttributionKey;
use crate::unified::UnifiedRecord;

/// Result of one merge pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// One record per input ad, in input order.
    pub records: Vec<UnifiedRecord>,
    /// Rows that found a lead summary.
    pub matched: usize,
    /// Distinct keys reported by more than one platform. Such keys share a
    /// lead summary because the join key carries no platform.
    pub key_collisions: usize,
}

/// Joins every ad to its lead summary, if any.
///
/// Never drops, duplicates or reorders ads. Unmatched ads keep zero/empty
/// lead fields and `has_salesforce_data = false`.
#[must_use]
pub fn merge(ads: &[AdRecord], leads: &LeadIndex) -> MergeOutcome {
    let mut records = Vec::with_capacity(ads.len());
    let mut matched = 0;
    let mut seen: HashMap<AttributionKey, (Platform, bool)> = HashMap::new();
    let mut key_collisions = 0;

    for ad in ads {
        let key = AttributionKey::for_ad(ad);

        match seen.get_mut(&key) {
            Some((first_platform, reported)) if *first_platform != ad.platform && !*reported => {
                tracing::warn!(
                    key = %key,
                    first = %first_platform,
                    second = %ad.platform,
                    "attribution key reported by more than one platform"
                );
                *reported = true;
                key_collisions += 1;
            }
            Some(_) => {}
            None => {
                seen.insert(key.clone(), (ad.platform, false));
            }
        }

        let record = match leads.get(&key) {
            Some(summary) => {
                matched += 1;
                UnifiedRecord::matched(ad.clone(), summary)
            }
            None => UnifiedRecord::unmatched(ad.clone()),
        };
        records.push(record);
    }

    tracing::info!(
        ads = ads.len(),
        matched,
        unmatched = ads.len() - matched,
        key_collisions,
        "merged ad records with lead summaries"
    );

    MergeOutcome {
        records,
        matched,
        key_collisions,
    }
}
