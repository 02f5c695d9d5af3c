//! # Audit Trail Port
//!
//! Append-only activity records forwarded to the external audit
//! collaborator.
//!
//! Every deal transition, message post, payment verification, and ledger
//! write produces one [`AuditRecord`]. Emission is fire-and-forget: a
//! failing sink is logged and swallowed, and never rolls back the primary
//! operation. That inconsistency tolerance is deliberate; failed records
//! are dropped, not queued.

use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::Actor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One appended activity record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Who acted. Absent for system-driven writes.
    pub actor: Option<Actor>,
    /// What happened, e.g. `deal.approve` or `ledger.record`.
    pub action: String,
    /// Kind of the touched entity, e.g. `Deal` or `Payment`.
    pub entity_type: String,
    /// Identifier of the touched entity.
    pub entity_id: String,
    /// Serialized state before the action, when meaningful.
    pub old_value: Option<serde_json::Value>,
    /// Serialized state after the action, when meaningful.
    pub new_value: Option<serde_json::Value>,
    /// Whether the action succeeded.
    pub success: bool,
    /// When the action happened.
    pub timestamp: Timestamp,
}

impl AuditRecord {
    /// Creates a record for a successful action.
    #[must_use]
    pub fn success(
        actor: Option<Actor>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl fmt::Display,
    ) -> Self {
        Self::build(actor, action, entity_type, entity_id, true)
    }

    /// Creates a record for a rejected action.
    #[must_use]
    pub fn rejection(
        actor: Option<Actor>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl fmt::Display,
    ) -> Self {
        Self::build(actor, action, entity_type, entity_id, false)
    }

    fn build(
        actor: Option<Actor>,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl fmt::Display,
        success: bool,
    ) -> Self {
        Self {
            actor,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.to_string(),
            old_value: None,
            new_value: None,
            success,
            timestamp: Timestamp::now(),
        }
    }

    /// Attaches the pre-action state.
    #[must_use]
    pub fn with_old_value(mut self, value: serde_json::Value) -> Self {
        self.old_value = Some(value);
        self
    }

    /// Attaches the post-action state.
    #[must_use]
    pub fn with_new_value(mut self, value: serde_json::Value) -> Self {
        self.new_value = Some(value);
        self
    }
}

impl fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}[{}] success={}",
            self.action, self.entity_type, self.entity_id, self.success
        )
    }
}

/// Error from an audit sink.
///
/// Callers log and drop it; it is the crate's only intentionally non-fatal
/// failure category.
#[derive(Debug, Clone, Error)]
#[error("audit emission failed: {0}")]
pub struct AuditError(pub String);

/// Port to the external audit trail.
#[async_trait]
pub trait AuditSink: Send + Sync + fmt::Debug {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] when the sink cannot take the record; the
    /// caller logs and continues.
    async fn emit(&self, record: AuditRecord) -> Result<(), AuditError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{ClientId, DealId};
    use serde_json::json;

    #[test]
    fn success_record() {
        let record = AuditRecord::success(
            Some(Actor::Client(ClientId::new_v4())),
            "deal.create",
            "Deal",
            DealId::new_v4(),
        );
        assert!(record.success);
        assert_eq!(record.action, "deal.create");
        assert!(record.old_value.is_none());
    }

    #[test]
    fn rejection_record_with_values() {
        let record = AuditRecord::rejection(None, "deal.cancel", "Deal", DealId::new_v4())
            .with_old_value(json!({"status": "PAID"}))
            .with_new_value(json!({"status": "PAID"}));
        assert!(!record.success);
        assert_eq!(record.old_value, record.new_value);
    }

    #[test]
    fn display_summarizes() {
        let record = AuditRecord::success(None, "ledger.record", "LedgerEntry", "abc");
        let text = record.to_string();
        assert!(text.contains("ledger.record"));
        assert!(text.contains("success=true"));
    }
}
