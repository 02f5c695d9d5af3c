//! # Application Services
//!
//! One service per use-case cluster:
//!
//! - [`IdentityService`](identity::IdentityService): profile registration,
//!   credential resolution, dual-profile links
//! - [`NegotiationService`](negotiation::NegotiationService): the
//!   append-only message channel and proposal acceptance
//! - [`DealLifecycleService`](deal_lifecycle::DealLifecycleService): deal
//!   creation and the state machine, payment verification, settlement
//! - [`LedgerService`](ledger::LedgerService): balanced posting of
//!   financial transactions with per-account balance chains

pub mod deal_lifecycle;
pub mod identity;
pub mod ledger;
pub mod negotiation;

pub use deal_lifecycle::{CreateDealRequest, DealItemRequest, DealLifecycleService};
pub use identity::IdentityService;
pub use ledger::LedgerService;
pub use negotiation::NegotiationService;

use crate::domain::audit::{AuditRecord, AuditSink};
use crate::domain::events::domain_event::DomainEvent;
use crate::domain::value_objects::DealId;
use crate::infrastructure::persistence::event_store::{EventStore, StoredEvent};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// Keyed registry of per-deal exclusive locks.
///
/// One lock serializes everything that reads a deal's status or negotiated
/// amount and then writes: state transitions, settlement, and proposal
/// acceptance. Services that touch the same deals must share one registry,
/// so two concurrent `APPROVED -> PAID` attempts (or a confirmation racing
/// an acceptance) resolve to exactly one winner.
#[derive(Debug, Default)]
pub struct DealLocks {
    locks: DashMap<DealId, Arc<Mutex<()>>>,
}

impl DealLocks {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive lock for one deal, waiting for the current
    /// holder if there is one.
    pub async fn acquire(&self, deal_id: DealId) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(deal_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

/// Emits one audit record, logging and dropping it on sink failure.
///
/// The primary operation has already happened (or already been rejected)
/// by the time this runs; nothing here can change its outcome.
pub(crate) async fn emit_audit(sink: &dyn AuditSink, record: AuditRecord) {
    let summary = record.to_string();
    if let Err(err) = sink.emit(record).await {
        warn!(record = %summary, error = %err, "audit emission failed, record dropped");
    }
}

/// Appends one domain event to the store, logging and dropping it on
/// failure. Event delivery is best-effort, like audit emission.
pub(crate) async fn publish_event<E>(store: &dyn EventStore, event: &E)
where
    E: DomainEvent + Serialize,
{
    match StoredEvent::from_event(event) {
        Ok(stored) => {
            if let Err(err) = store.append(stored).await {
                warn!(event = event.event_name(), error = %err, "event append failed, event dropped");
            }
        }
        Err(err) => {
            warn!(event = event.event_name(), error = %err, "event serialization failed, event dropped");
        }
    }
}
