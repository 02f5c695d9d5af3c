//! # Financial Transactions and Ledger Entries
//!
//! The durable records a settlement produces.
//!
//! One settlement event yields one [`FinancialTransaction`] per applicable
//! kind (1 DEPOSIT + 1 COMMISSION + 0/1 EMPLOYEE_COMMISSION +
//! 1 TRADER_PAYOUT), and each transaction posts exactly one [`LedgerEntry`]
//! against an account stream. Entries are append-only: no entry is ever
//! updated or deleted, and each carries the account balance before and after
//! the posting.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    AccountKind, ArithmeticError, DealId, EmployeeId, EntrySide, LedgerEntryId, Money, TraderId,
    TransactionId, TransactionKind, TransactionStatus,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A ledger account stream: the platform's held funds, or a party's
/// commission/payout stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerAccount {
    /// The platform's held-funds stream.
    Platform,
    /// An employee's commission stream.
    Employee(EmployeeId),
    /// A trader's payout stream.
    Trader(TraderId),
}

impl LedgerAccount {
    /// Returns the account kind.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> AccountKind {
        match self {
            Self::Platform => AccountKind::Platform,
            Self::Employee(_) => AccountKind::Employee,
            Self::Trader(_) => AccountKind::Trader,
        }
    }

    /// Returns the owning profile's UUID, if the stream has an owner.
    #[inline]
    #[must_use]
    pub const fn owner_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Platform => None,
            Self::Employee(id) => Some(id.as_uuid()),
            Self::Trader(id) => Some(id.as_uuid()),
        }
    }
}

impl fmt::Display for LedgerAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform => write!(f, "PLATFORM"),
            Self::Employee(id) => write!(f, "EMPLOYEE:{id}"),
            Self::Trader(id) => write!(f, "TRADER:{id}"),
        }
    }
}

/// A money movement produced by settling a deal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialTransaction {
    /// Unique identifier.
    id: TransactionId,
    /// The settled deal.
    deal_id: DealId,
    /// What kind of movement this is.
    kind: TransactionKind,
    /// The moved amount.
    amount: Money,
    /// Posting status.
    status: TransactionStatus,
    /// The commissioned employee, for employee commissions.
    employee_id: Option<EmployeeId>,
    /// The paid trader, for trader payouts.
    trader_id: Option<TraderId>,
    /// Split context: platform commission of the settlement.
    platform_commission: Option<Money>,
    /// Split context: employee commission of the settlement.
    employee_commission: Option<Money>,
    /// Split context: trader payout of the settlement.
    trader_amount: Option<Money>,
    /// When the transaction was created.
    created_at: Timestamp,
}

impl FinancialTransaction {
    fn base(deal_id: DealId, kind: TransactionKind, amount: Money) -> Self {
        Self {
            id: TransactionId::new_v4(),
            deal_id,
            kind,
            amount,
            status: TransactionStatus::Pending,
            employee_id: None,
            trader_id: None,
            platform_commission: None,
            employee_commission: None,
            trader_amount: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates the DEPOSIT transaction, carrying the full split context.
    #[must_use]
    pub fn deposit(
        deal_id: DealId,
        amount: Money,
        platform_commission: Money,
        employee_commission: Money,
        trader_amount: Money,
    ) -> Self {
        let mut tx = Self::base(deal_id, TransactionKind::Deposit, amount);
        tx.platform_commission = Some(platform_commission);
        tx.employee_commission = Some(employee_commission);
        tx.trader_amount = Some(trader_amount);
        tx
    }

    /// Creates the COMMISSION transaction for the platform's cut.
    #[must_use]
    pub fn commission(deal_id: DealId, amount: Money) -> Self {
        Self::base(deal_id, TransactionKind::Commission, amount)
    }

    /// Creates the EMPLOYEE_COMMISSION transaction.
    #[must_use]
    pub fn employee_commission(deal_id: DealId, employee_id: EmployeeId, amount: Money) -> Self {
        let mut tx = Self::base(deal_id, TransactionKind::EmployeeCommission, amount);
        tx.employee_id = Some(employee_id);
        tx
    }

    /// Creates the TRADER_PAYOUT transaction.
    #[must_use]
    pub fn trader_payout(deal_id: DealId, trader_id: TraderId, amount: Money) -> Self {
        let mut tx = Self::base(deal_id, TransactionKind::TraderPayout, amount);
        tx.trader_id = Some(trader_id);
        tx
    }

    /// Returns the transaction id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the settled deal.
    #[inline]
    #[must_use]
    pub fn deal_id(&self) -> DealId {
        self.deal_id
    }

    /// Returns the movement kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Returns the moved amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the posting status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Returns the commissioned employee, for employee commissions.
    #[inline]
    #[must_use]
    pub fn employee_id(&self) -> Option<EmployeeId> {
        self.employee_id
    }

    /// Returns the paid trader, for trader payouts.
    #[inline]
    #[must_use]
    pub fn trader_id(&self) -> Option<TraderId> {
        self.trader_id
    }

    /// Returns the split's platform commission, on the deposit.
    #[inline]
    #[must_use]
    pub fn platform_commission(&self) -> Option<Money> {
        self.platform_commission
    }

    /// Returns the split's employee commission, on the deposit.
    #[inline]
    #[must_use]
    pub fn employee_commission(&self) -> Option<Money> {
        self.employee_commission
    }

    /// Returns the split's trader payout, on the deposit.
    #[inline]
    #[must_use]
    pub fn trader_amount(&self) -> Option<Money> {
        self.trader_amount
    }

    /// Returns when the transaction was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// The single posting this transaction maps to: account and side.
    ///
    /// - DEPOSIT → CREDIT PLATFORM
    /// - COMMISSION → DEBIT PLATFORM
    /// - EMPLOYEE_COMMISSION → CREDIT EMPLOYEE
    /// - TRADER_PAYOUT → CREDIT TRADER
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] if a party-scoped transaction
    /// lost its party id (possible only through hand-built storage data).
    pub fn posting(&self) -> DomainResult<(LedgerAccount, EntrySide)> {
        match self.kind {
            TransactionKind::Deposit => Ok((LedgerAccount::Platform, EntrySide::Credit)),
            TransactionKind::Commission => Ok((LedgerAccount::Platform, EntrySide::Debit)),
            TransactionKind::EmployeeCommission => {
                let employee_id = self.employee_id.ok_or_else(|| {
                    DomainError::validation("employee commission without an employee id")
                })?;
                Ok((LedgerAccount::Employee(employee_id), EntrySide::Credit))
            }
            TransactionKind::TraderPayout => {
                let trader_id = self.trader_id.ok_or_else(|| {
                    DomainError::validation("trader payout without a trader id")
                })?;
                Ok((LedgerAccount::Trader(trader_id), EntrySide::Credit))
            }
        }
    }

    /// Marks the transaction posted to the ledger.
    pub fn mark_completed(&mut self) {
        self.status = TransactionStatus::Completed;
    }
}

impl fmt::Display for FinancialTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction[{}] deal={} {} {}",
            self.id, self.deal_id, self.kind, self.amount
        )
    }
}

/// One balanced posting against an account stream.
///
/// # Invariants
///
/// - `balance_after == balance_before + amount` for credits and
///   `balance_before - amount` for debits.
/// - Within an account stream ordered by creation,
///   `balance_before[n] == balance_after[n-1]` (0 for the first entry).
/// - Entries are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    id: LedgerEntryId,
    /// The transaction this entry posts.
    transaction_id: TransactionId,
    /// The deal the transaction settled.
    deal_id: DealId,
    /// Credit or debit.
    side: EntrySide,
    /// The account stream posted against.
    account: LedgerAccount,
    /// The posted amount.
    amount: Money,
    /// Stream balance before this entry.
    balance_before: Decimal,
    /// Stream balance after this entry.
    balance_after: Decimal,
    /// Human-readable posting reference.
    reference: String,
    /// When the entry was appended.
    created_at: Timestamp,
}

impl LedgerEntry {
    /// Posts an entry, deriving `balance_after` from the prior balance.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Arithmetic`] if the balance arithmetic leaves
    /// the decimal range.
    pub fn post(
        transaction: &FinancialTransaction,
        account: LedgerAccount,
        side: EntrySide,
        balance_before: Decimal,
        reference: impl Into<String>,
    ) -> DomainResult<Self> {
        let amount = transaction.amount();
        let balance_after = side
            .apply(balance_before, amount.amount())
            .ok_or(ArithmeticError::Overflow)?;
        Ok(Self {
            id: LedgerEntryId::new_v4(),
            transaction_id: transaction.id(),
            deal_id: transaction.deal_id(),
            side,
            account,
            amount,
            balance_before,
            balance_after,
            reference: reference.into(),
            created_at: Timestamp::now(),
        })
    }

    /// Returns the entry id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> LedgerEntryId {
        self.id
    }

    /// Returns the posted transaction.
    #[inline]
    #[must_use]
    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    /// Returns the settled deal.
    #[inline]
    #[must_use]
    pub fn deal_id(&self) -> DealId {
        self.deal_id
    }

    /// Returns the posting side.
    #[inline]
    #[must_use]
    pub fn side(&self) -> EntrySide {
        self.side
    }

    /// Returns the account stream.
    #[inline]
    #[must_use]
    pub fn account(&self) -> LedgerAccount {
        self.account
    }

    /// Returns the posted amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the stream balance before this entry.
    #[inline]
    #[must_use]
    pub fn balance_before(&self) -> Decimal {
        self.balance_before
    }

    /// Returns the stream balance after this entry.
    #[inline]
    #[must_use]
    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    /// Returns the posting reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns when the entry was appended.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }
}

impl fmt::Display for LedgerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entry[{}] {} {} {} {} -> {}",
            self.id, self.account, self.side, self.amount, self.balance_before, self.balance_after
        )
    }
}
