//! Schemaless stored record and its reservation field views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A request or record payload: field name → JSON value, in submission
/// order.
pub type FieldMap = serde_json::Map<String, Value>;

/// Data key holding the ordered claim history.
pub const RESERVATIONS_BY: &str = "reservationsBy";
/// Data key holding the accepting user id. Presence is terminal.
pub const ACCEPTED_BY: &str = "acceptedBy";
/// Data key holding the ordered decline history.
pub const DECLINED_BY: &str = "declinedBy";

/// One claim or decline: who, and when in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationEntry {
    pub user_id: Uuid,
    pub timestamp: i64,
}

impl ReservationEntry {
    /// Whether this entry still falls inside the TTL window at `now`.
    ///
    /// An entry aged exactly `ttl_secs` is stale.
    pub fn is_live(&self, now: i64, ttl_secs: i64) -> bool {
        now - self.timestamp < ttl_secs
    }
}

/// A schemaless record stored in a named collection.
///
/// Reservation state is data-encoded in three optional fields
/// ([`RESERVATIONS_BY`], [`ACCEPTED_BY`], [`DECLINED_BY`]) that appear
/// lazily on first use; every other field is opaque to the policy
/// layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    /// Optimistic-concurrency revision. 1 on insert, bumped by every
    /// successful save. Seed data may omit it; the store assigns it.
    #[serde(default)]
    pub revision: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Document {
    /// A fresh document with no fields. The store assigns the real
    /// revision and timestamps on insert.
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            revision: 0,
            created_at: now,
            updated_at: now,
            fields: FieldMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Every claim made on this record, oldest first. Entries that fail
    /// to decode are ignored.
    pub fn reservations(&self) -> Vec<ReservationEntry> {
        self.entries(RESERVATIONS_BY)
    }

    /// Every decline recorded on this record, oldest first. Entries
    /// that fail to decode are ignored.
    pub fn declines(&self) -> Vec<ReservationEntry> {
        self.entries(DECLINED_BY)
    }

    /// The accepting user id, once the record is terminal.
    pub fn accepted_by(&self) -> Option<Uuid> {
        self.fields
            .get(ACCEPTED_BY)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn push_reservation(&mut self, entry: ReservationEntry) {
        self.push_entry(RESERVATIONS_BY, entry);
    }

    pub fn push_decline(&mut self, entry: ReservationEntry) {
        self.push_entry(DECLINED_BY, entry);
    }

    pub fn set_accepted_by(&mut self, user_id: Uuid) {
        self.fields
            .insert(ACCEPTED_BY.into(), Value::String(user_id.to_string()));
    }

    fn entries(&self, key: &str) -> Vec<ReservationEntry> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    fn push_entry(&mut self, key: &str, entry: ReservationEntry) {
        let value = serde_json::json!({
            "user_id": entry.user_id,
            "timestamp": entry.timestamp,
        });
        match self.fields.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                self.fields.insert(key.into(), Value::Array(vec![value]));
            }
        }
    }
}
