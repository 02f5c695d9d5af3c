//! # Ledger Service
//!
//! Posts financial transactions as balanced, append-only ledger entries.
//!
//! Each [`FinancialTransaction`] maps to exactly one entry against an
//! account stream (deposit and commission against the platform, commission
//! and payout credits against the employee and trader). The service owns
//! the per-account serialization the balance-chain invariant needs: the
//! read of the stream's latest balance and the append of the new entry
//! happen under one per-account lock, so concurrent settlements of
//! different deals can never interleave within a stream.
//!
//! Entries are never updated or deleted. [`verify_account_chain`] replays a
//! stream and proves `balance_before[n] == balance_after[n-1]` with no
//! gaps; [`reconcile_deal`] proves that a deal's deposit was fully and
//! exactly distributed.
//!
//! [`verify_account_chain`]: LedgerService::verify_account_chain
//! [`reconcile_deal`]: LedgerService::reconcile_deal

use crate::application::error::ApplicationResult;
use crate::application::services::emit_audit;
use crate::domain::audit::{AuditRecord, AuditSink};
use crate::domain::entities::ledger::{FinancialTransaction, LedgerAccount, LedgerEntry};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ArithmeticError, DealId, DealNumber, EntrySide};
use crate::infrastructure::audit::TracingAuditSink;
use crate::infrastructure::persistence::traits::LedgerRepository;
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::info;

/// Application service for the double-entry ledger.
///
/// # Examples
///
/// ```
/// use deal_desk::application::LedgerService;
/// use deal_desk::domain::entities::LedgerAccount;
/// use deal_desk::infrastructure::persistence::in_memory::InMemoryLedgerRepository;
/// use std::sync::Arc;
///
/// tokio_test::block_on(async {
///     let service = LedgerService::new(Arc::new(InMemoryLedgerRepository::new()));
///     let balance = service.account_balance(LedgerAccount::Platform).await.unwrap();
///     assert!(balance.is_zero());
/// });
/// ```
#[derive(Debug)]
pub struct LedgerService {
    ledger: Arc<dyn LedgerRepository>,
    audit: Arc<dyn AuditSink>,
    account_locks: DashMap<LedgerAccount, Arc<Mutex<()>>>,
}

impl LedgerService {
    /// Creates the service with the default tracing audit sink.
    #[must_use]
    pub fn new(ledger: Arc<dyn LedgerRepository>) -> Self {
        Self {
            ledger,
            audit: Arc::new(TracingAuditSink::new()),
            account_locks: DashMap::new(),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    async fn lock_account(&self, account: LedgerAccount) -> OwnedMutexGuard<()> {
        let lock = self
            .account_locks
            .entry(account)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Records one transaction as a ledger entry.
    ///
    /// The account stream's latest balance is read and the entry appended
    /// under the stream's lock; the transaction is marked completed once
    /// its entry is durably written.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for a party-scoped transaction missing
    ///   its party id
    /// - [`RepositoryError`] variants from the storage backend
    ///
    /// [`RepositoryError`]: crate::infrastructure::persistence::traits::RepositoryError
    pub async fn record_transaction(
        &self,
        transaction: &mut FinancialTransaction,
        reference: &str,
    ) -> ApplicationResult<LedgerEntry> {
        let (account, side) = transaction.posting()?;
        self.ledger.insert_transaction(transaction).await?;

        let entry = {
            let _stream = self.lock_account(account).await;
            let balance_before = self.ledger.latest_balance(account).await?;
            let entry = LedgerEntry::post(transaction, account, side, balance_before, reference)?;
            self.ledger.append_entry(&entry).await?;
            entry
        };

        transaction.mark_completed();
        self.ledger.save_transaction(transaction).await?;

        info!(
            transaction = %transaction.id(),
            account = %account,
            side = %side,
            amount = %entry.amount(),
            "ledger entry recorded"
        );
        emit_audit(
            self.audit.as_ref(),
            AuditRecord::success(None, "ledger.record", "LedgerEntry", entry.id())
                .with_new_value(serde_json::json!({
                    "account": account.to_string(),
                    "side": side.to_string(),
                    "amount": entry.amount().to_string(),
                    "reference": reference,
                })),
        )
        .await;

        Ok(entry)
    }

    /// Records one settlement's full transaction set.
    ///
    /// Postings reference the deal's display number
    /// (`DEAL-2026-000001/TRADER_PAYOUT`). Entries are appended in the
    /// order the transactions were built: deposit, commission, employee
    /// commission when present, trader payout.
    ///
    /// # Errors
    ///
    /// Everything [`record_transaction`](Self::record_transaction) returns;
    /// the first failure stops the sequence.
    pub async fn record_settlement(
        &self,
        deal_number: DealNumber,
        transactions: &mut [FinancialTransaction],
    ) -> ApplicationResult<Vec<LedgerEntry>> {
        let mut entries = Vec::with_capacity(transactions.len());
        for transaction in transactions.iter_mut() {
            let reference = format!("{deal_number}/{}", transaction.kind());
            entries.push(self.record_transaction(transaction, &reference).await?);
        }
        Ok(entries)
    }

    /// Returns an account stream's current balance, 0 for a fresh stream.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the backend.
    pub async fn account_balance(&self, account: LedgerAccount) -> ApplicationResult<Decimal> {
        Ok(self.ledger.latest_balance(account).await?)
    }

    /// Replays an account stream and proves the balance chain is gapless.
    ///
    /// Checks, for every entry in append order, that `balance_before`
    /// equals the previous entry's `balance_after` (0 for the first) and
    /// that `balance_after` applies the entry's signed amount. Returns the
    /// final balance.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] naming the first entry that
    /// breaks the chain.
    pub async fn verify_account_chain(&self, account: LedgerAccount) -> ApplicationResult<Decimal> {
        let entries = self.ledger.entries_for_account(account).await?;
        let mut balance = Decimal::ZERO;
        for entry in &entries {
            if entry.balance_before() != balance {
                return Err(DomainError::validation(format!(
                    "balance chain broken at entry {}: expected balance {}, found {}",
                    entry.id(),
                    balance,
                    entry.balance_before()
                ))
                .into());
            }
            let expected_after = entry
                .side()
                .apply(entry.balance_before(), entry.amount().amount())
                .ok_or(DomainError::Arithmetic(ArithmeticError::Overflow))?;
            if entry.balance_after() != expected_after {
                return Err(DomainError::validation(format!(
                    "entry {} does not apply its amount: {} {} {} != {}",
                    entry.id(),
                    entry.balance_before(),
                    entry.side(),
                    entry.amount(),
                    entry.balance_after()
                ))
                .into());
            }
            balance = entry.balance_after();
        }
        Ok(balance)
    }

    /// Proves a deal's deposit was exactly distributed.
    ///
    /// With the fixed entry mapping (deposit credited to the platform,
    /// platform commission debited, employee and trader credited onward),
    /// conservation means the platform's inbound credits equal its debits
    /// plus everything credited out to the parties — no unit of the deposit
    /// is lost or duplicated. A deal with no entries reconciles trivially.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::SettlementImbalance`] when the sums diverge.
    pub async fn reconcile_deal(&self, deal_id: DealId) -> ApplicationResult<()> {
        let entries = self.ledger.entries_for_deal(deal_id).await?;

        let mut deposited = Decimal::ZERO;
        let mut distributed = Decimal::ZERO;
        for entry in &entries {
            match (entry.account(), entry.side()) {
                (LedgerAccount::Platform, EntrySide::Credit) => {
                    deposited += entry.amount().amount();
                }
                _ => distributed += entry.amount().amount(),
            }
        }

        if deposited != distributed {
            return Err(DomainError::SettlementImbalance {
                deal_id,
                split_total: distributed.to_string(),
                expected: deposited.to_string(),
            }
            .into());
        }
        Ok(())
    }
}
