//! Policy layer configuration.

/// Configuration for the reservation state machine.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    /// Seconds a claim blocks the record before it goes stale
    /// (default: 1800 = 30 minutes).
    pub reservation_ttl_secs: u64,
    /// Collection holding the reservable records (default: "projects").
    pub reservable_collection: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            reservation_ttl_secs: 1800,
            reservable_collection: "projects".into(),
        }
    }
}
