//! Normalization of platform and CRM payloads into the shared record shapes
//! from `cerberus-core`. Fetching those payloads is someone else's job; this
//! crate only reshapes what was already fetched.

pub mod batch;
pub mod error;
pub mod normalize;
pub mod types;

pub use batch::{
    normalize_google_response, normalize_meta_response, normalize_salesforce_response,
    NormalizedBatch,
};
pub use error::NormalizeError;
pub use normalize::{
    normalize_google_row, normalize_meta_insight, normalize_salesforce_lead, parse_google_rows,
    parse_meta_insights, parse_salesforce_leads,
};
pub use types::{GoogleAdsRow, MetaInsight, SalesforceLead};
