//! # Audit Sinks
//!
//! Implementations of the [`AuditSink`] port.
//!
//! - [`TracingAuditSink`]: forwards records to the `tracing` subscriber,
//!   the default in-process destination.
//! - [`InMemoryAuditSink`]: collects records for test assertions.
//! - [`FailingAuditSink`]: always fails; tests use it to prove audit
//!   emission never blocks a primary operation.

use crate::domain::audit::{AuditError, AuditRecord, AuditSink};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Audit sink that logs each record through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct TracingAuditSink;

impl TracingAuditSink {
    /// Creates the sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn emit(&self, record: AuditRecord) -> Result<(), AuditError> {
        info!(
            action = %record.action,
            entity_type = %record.entity_type,
            entity_id = %record.entity_id,
            success = record.success,
            "audit"
        );
        Ok(())
    }
}

/// Audit sink that stores records for inspection in tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditSink {
    records: Arc<RwLock<Vec<AuditRecord>>>,
}

impl InMemoryAuditSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected records in emission order.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }

    /// Returns the records for one action name.
    pub async fn records_for_action(&self, action: &str) -> Vec<AuditRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.action == action)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn emit(&self, record: AuditRecord) -> Result<(), AuditError> {
        self.records.write().await.push(record);
        Ok(())
    }
}

/// Audit sink that rejects every record.
///
/// Exists to exercise the fire-and-forget contract: operations must succeed
/// even when every audit emission fails.
#[derive(Debug, Clone, Default)]
pub struct FailingAuditSink;

impl FailingAuditSink {
    /// Creates the sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditSink for FailingAuditSink {
    async fn emit(&self, _record: AuditRecord) -> Result<(), AuditError> {
        Err(AuditError("audit trail unavailable".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_sink_collects() {
        let sink = InMemoryAuditSink::new();
        sink.emit(AuditRecord::success(None, "deal.create", "Deal", "d1"))
            .await
            .unwrap();
        sink.emit(AuditRecord::rejection(None, "deal.cancel", "Deal", "d1"))
            .await
            .unwrap();

        assert_eq!(sink.records().await.len(), 2);
        let creates = sink.records_for_action("deal.create").await;
        assert_eq!(creates.len(), 1);
        assert!(creates.first().unwrap().success);
    }

    #[tokio::test]
    async fn failing_sink_fails() {
        let sink = FailingAuditSink::new();
        let result = sink
            .emit(AuditRecord::success(None, "x", "Deal", "d1"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn tracing_sink_accepts() {
        let sink = TracingAuditSink::new();
        let result = sink
            .emit(AuditRecord::success(None, "x", "Deal", "d1"))
            .await;
        assert!(result.is_ok());
    }
}
