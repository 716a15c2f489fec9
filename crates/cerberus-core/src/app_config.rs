use rust_decimal::Decimal;

/// Meta action types that count as conversions when no override is configured.
pub const DEFAULT_META_CONVERSION_ACTIONS: &[&str] = &[
    "lead",
    "complete_registration",
    "submit_application",
    "schedule",
    "contact",
    "find_location",
    "customize_product",
    "add_to_cart",
    "initiate_checkout",
    "add_payment_info",
    "purchase",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Thresholds for the per-ad alert flags consumed by the alert layer.
///
/// All comparisons are strict (`>` / `<`), so a record sitting exactly on a
/// threshold never raises the flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertThresholds {
    /// Zero-performance fires when spend exceeds this and no conversions landed.
    pub zero_performance_min_spend: Decimal,
    /// CTR (percent) above which a weak conversion rate counts as a funnel mismatch.
    pub funnel_min_ctr: Decimal,
    /// Click-to-conversion rate (percent) below which the funnel is considered leaking.
    pub funnel_max_conversion_rate: Decimal,
    pub top_performer_min_conversions: Decimal,
    pub top_performer_max_cost_per_lead: Decimal,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            zero_performance_min_spend: Decimal::new(50, 0),
            funnel_min_ctr: Decimal::new(20, 1),
            funnel_max_conversion_rate: Decimal::new(10, 1),
            top_performer_min_conversions: Decimal::new(5, 0),
            top_performer_max_cost_per_lead: Decimal::new(10, 0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub thresholds: AlertThresholds,
    pub meta_conversion_actions: Vec<String>,
}
