//! Fieldwarden Policy — the dynamic validation/ACL engine and the
//! TTL-windowed reservation state machine.

pub mod config;
pub mod engine;
pub mod error;
pub mod reservation;
pub mod rules;

pub use config::PolicyConfig;
pub use engine::{FieldDecision, ValidationEngine};
pub use error::RuleError;
pub use reservation::ReservationService;
pub use rules::{Rule, RuleSet, Violation};
