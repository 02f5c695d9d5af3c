//! # In-Memory Ledger Repository
//!
//! Append-only transaction and entry storage for tests. Entries live in a
//! single `Vec` in append order, which is exactly the creation-time order
//! the balance-chain invariant is defined over.

use crate::domain::entities::ledger::{FinancialTransaction, LedgerAccount, LedgerEntry};
use crate::domain::value_objects::DealId;
use crate::infrastructure::persistence::traits::{
    LedgerRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct LedgerStorage {
    transactions: Vec<FinancialTransaction>,
    entries: Vec<LedgerEntry>,
}

/// In-memory implementation of [`LedgerRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerRepository {
    storage: Arc<RwLock<LedgerStorage>>,
}

impl InMemoryLedgerRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored entry in append order.
    pub async fn all_entries(&self) -> Vec<LedgerEntry> {
        self.storage.read().await.entries.clone()
    }
}

#[async_trait]
impl LedgerRepository for InMemoryLedgerRepository {
    async fn insert_transaction(
        &self,
        transaction: &FinancialTransaction,
    ) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage
            .transactions
            .iter()
            .any(|stored| stored.id() == transaction.id())
        {
            return Err(RepositoryError::duplicate(
                "FinancialTransaction",
                transaction.id(),
            ));
        }
        storage.transactions.push(transaction.clone());
        Ok(())
    }

    async fn save_transaction(&self, transaction: &FinancialTransaction) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let stored = storage
            .transactions
            .iter_mut()
            .find(|stored| stored.id() == transaction.id())
            .ok_or_else(|| {
                RepositoryError::not_found("FinancialTransaction", transaction.id())
            })?;
        *stored = transaction.clone();
        Ok(())
    }

    async fn transactions_for_deal(
        &self,
        deal_id: DealId,
    ) -> RepositoryResult<Vec<FinancialTransaction>> {
        let storage = self.storage.read().await;
        Ok(storage
            .transactions
            .iter()
            .filter(|tx| tx.deal_id() == deal_id)
            .cloned()
            .collect())
    }

    async fn append_entry(&self, entry: &LedgerEntry) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.entries.iter().any(|stored| stored.id() == entry.id()) {
            return Err(RepositoryError::duplicate("LedgerEntry", entry.id()));
        }
        storage.entries.push(entry.clone());
        Ok(())
    }

    async fn entries_for_account(
        &self,
        account: LedgerAccount,
    ) -> RepositoryResult<Vec<LedgerEntry>> {
        let storage = self.storage.read().await;
        Ok(storage
            .entries
            .iter()
            .filter(|entry| entry.account() == account)
            .cloned()
            .collect())
    }

    async fn entries_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<LedgerEntry>> {
        let storage = self.storage.read().await;
        Ok(storage
            .entries
            .iter()
            .filter(|entry| entry.deal_id() == deal_id)
            .cloned()
            .collect())
    }

    async fn latest_balance(&self, account: LedgerAccount) -> RepositoryResult<Decimal> {
        let storage = self.storage.read().await;
        Ok(storage
            .entries
            .iter()
            .rev()
            .find(|entry| entry.account() == account)
            .map_or(Decimal::ZERO, LedgerEntry::balance_after))
    }
}
