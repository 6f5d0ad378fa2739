//! Reservation state machine: TTL-windowed soft locks over a single
//! stored record.

use fieldwarden_core::{
    Caller, ConflictReason, Document, DocumentStore, PolicyError, PolicyResult, ReservationEntry,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::PolicyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Claim,
    Accept,
    Decline,
}

/// Reservation service.
///
/// Each operation loads the record, checks the preconditions in their
/// fixed order (missing record, already accepted, caller already
/// declined, live-claim check), mutates the reservation fields, and
/// persists with a revision-checked save.
pub struct ReservationService<S: DocumentStore> {
    store: S,
    config: PolicyConfig,
}

impl<S: DocumentStore> ReservationService<S> {
    pub fn new(store: S, config: PolicyConfig) -> Self {
        Self { store, config }
    }

    /// Claim the record for `caller` at `now` (Unix seconds).
    ///
    /// Any live claim blocks, the caller's own included; a stale claim
    /// does not, so claim history can hold several expired entries.
    pub async fn claim(&self, caller: &Caller, id: Uuid, now: i64) -> PolicyResult<Document> {
        self.apply(caller, id, now, Transition::Claim).await
    }

    /// Accept the record, making it terminal for everyone.
    ///
    /// Only a live claim held by a different user blocks. The accepter
    /// does not have to be among the claimants.
    pub async fn accept(&self, caller: &Caller, id: Uuid, now: i64) -> PolicyResult<Document> {
        self.apply(caller, id, now, Transition::Accept).await
    }

    /// Decline the record for this caller, permanently.
    ///
    /// Shares accept's preconditions; a caller who never claimed may
    /// still decline. Declining twice is a conflict, not a no-op.
    pub async fn decline(&self, caller: &Caller, id: Uuid, now: i64) -> PolicyResult<Document> {
        self.apply(caller, id, now, Transition::Decline).await
    }

    async fn apply(
        &self,
        caller: &Caller,
        id: Uuid,
        now: i64,
        transition: Transition,
    ) -> PolicyResult<Document> {
        let collection = self.config.reservable_collection.as_str();
        let ttl = self.config.reservation_ttl_secs as i64;
        let mut retried = false;
        loop {
            let mut document = self
                .store
                .find(collection, id)
                .await?
                .ok_or(PolicyError::NotFound)?;

            if document.accepted_by().is_some() {
                return Err(PolicyError::ReservationConflict(
                    ConflictReason::AlreadyAccepted,
                ));
            }
            if document.declines().iter().any(|d| d.user_id == caller.id) {
                return Err(PolicyError::ReservationConflict(
                    ConflictReason::AlreadyDeclined,
                ));
            }

            let claims = document.reservations();
            match transition {
                Transition::Claim => {
                    if claims.iter().any(|c| c.is_live(now, ttl)) {
                        return Err(PolicyError::ReservationConflict(
                            ConflictReason::AlreadyReserved,
                        ));
                    }
                    document.push_reservation(ReservationEntry {
                        user_id: caller.id,
                        timestamp: now,
                    });
                }
                Transition::Accept | Transition::Decline => {
                    if claims
                        .iter()
                        .any(|c| c.user_id != caller.id && c.is_live(now, ttl))
                    {
                        return Err(PolicyError::ReservationConflict(
                            ConflictReason::HeldByAnother,
                        ));
                    }
                    if transition == Transition::Accept {
                        document.set_accepted_by(caller.id);
                    } else {
                        document.push_decline(ReservationEntry {
                            user_id: caller.id,
                            timestamp: now,
                        });
                    }
                }
            }

            let expected = document.revision;
            match self.store.save(collection, document, expected).await {
                Ok(saved) => {
                    info!(
                        record = %id,
                        user = %caller.id,
                        ?transition,
                        "reservation transition applied"
                    );
                    return Ok(saved);
                }
                // One full re-read and re-validate after losing a
                // revision race; the second loss is a storage fault.
                Err(PolicyError::StaleWrite { .. }) if !retried => {
                    retried = true;
                    warn!(record = %id, ?transition, "lost revision race, retrying once");
                }
                Err(PolicyError::StaleWrite { .. }) => {
                    return Err(PolicyError::Store(format!(
                        "revision conflict persisted on {collection}/{id}"
                    )));
                }
                Err(err) => return Err(err),
            }
        }
    }
}
