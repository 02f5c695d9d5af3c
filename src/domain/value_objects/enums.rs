//! # Domain Enums
//!
//! Enumeration types for deal, payment, and ledger concepts:
//!
//! - [`MessageKind`] - Plain text vs. price proposal
//! - [`PaymentStatus`] / [`PaymentMethod`] - Payment lifecycle
//! - [`TransactionKind`] / [`TransactionStatus`] - Settlement transactions
//! - [`EntrySide`] / [`AccountKind`] - Ledger postings
//! - [`CommissionMethod`] - Platform commission base selection
//!
//! All enums implement `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`,
//! `Display`, and Serde traits with `SCREAMING_SNAKE_CASE` wire names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a negotiation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum MessageKind {
    /// Free-form text.
    Text = 0,
    /// Carries a proposed price and/or quantity.
    PriceProposal = 1,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "TEXT"),
            Self::PriceProposal => write!(f, "PRICE_PROPOSAL"),
        }
    }
}

/// Payment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PaymentStatus {
    /// Evidence submitted, awaiting verification.
    #[default]
    Pending = 0,
    /// Verified by an employee or admin.
    Completed = 1,
    /// Rejected by verification or the gateway.
    Failed = 2,
}

impl PaymentStatus {
    /// Returns true if the payment can still be verified or failed.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns true if the payment has been verified.
    #[inline]
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        };
        write!(f, "{s}")
    }
}

/// How a client paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum PaymentMethod {
    /// Wire/bank transfer.
    BankTransfer = 0,
    /// Documentary letter of credit.
    LetterOfCredit = 1,
    /// Third-party escrow.
    Escrow = 2,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::BankTransfer => "BANK_TRANSFER",
            Self::LetterOfCredit => "LETTER_OF_CREDIT",
            Self::Escrow => "ESCROW",
        };
        write!(f, "{s}")
    }
}

/// Kind of financial transaction produced by one settlement event.
///
/// One settlement produces exactly one transaction of each applicable kind:
/// 1 `Deposit` + 1 `Commission` + 0/1 `EmployeeCommission` + 1 `TraderPayout`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TransactionKind {
    /// The client's verified payment held by the platform.
    Deposit = 0,
    /// The platform's commission taken from the deposit.
    Commission = 1,
    /// The mediating employee's commission.
    EmployeeCommission = 2,
    /// The trader's payout.
    TraderPayout = 3,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deposit => "DEPOSIT",
            Self::Commission => "COMMISSION",
            Self::EmployeeCommission => "EMPLOYEE_COMMISSION",
            Self::TraderPayout => "TRADER_PAYOUT",
        };
        write!(f, "{s}")
    }
}

/// Status of a financial transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum TransactionStatus {
    /// Created but not yet posted to the ledger.
    #[default]
    Pending = 0,
    /// Posted to the ledger.
    Completed = 1,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Side of a ledger posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum EntrySide {
    /// Adds to the account balance.
    Credit = 0,
    /// Subtracts from the account balance.
    Debit = 1,
}

impl EntrySide {
    /// Applies a signed amount to a running balance.
    ///
    /// Credit adds, debit subtracts. Returns `None` on decimal-range
    /// overflow.
    #[must_use]
    pub fn apply(self, balance: Decimal, amount: Decimal) -> Option<Decimal> {
        match self {
            Self::Credit => balance.checked_add(amount),
            Self::Debit => balance.checked_sub(amount),
        }
    }
}

impl fmt::Display for EntrySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credit => write!(f, "CREDIT"),
            Self::Debit => write!(f, "DEBIT"),
        }
    }
}

/// Kind of ledger account a posting targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum AccountKind {
    /// The platform's held-funds stream.
    Platform = 0,
    /// An employee's commission stream.
    Employee = 1,
    /// A trader's payout stream.
    Trader = 2,
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Platform => "PLATFORM",
            Self::Employee => "EMPLOYEE",
            Self::Trader => "TRADER",
        };
        write!(f, "{s}")
    }
}

/// How the platform commission is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum CommissionMethod {
    /// Percentage of the negotiated amount.
    #[default]
    Percentage = 0,
    /// Per-CBM rate applied to the cargo volume.
    Cbm = 1,
    /// The greater of the percentage and CBM commissions.
    Both = 2,
}

impl CommissionMethod {
    /// Returns true if this method needs a configured CBM rate.
    #[inline]
    #[must_use]
    pub const fn requires_cbm_rate(&self) -> bool {
        matches!(self, Self::Cbm | Self::Both)
    }
}

impl fmt::Display for CommissionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Percentage => "PERCENTAGE",
            Self::Cbm => "CBM",
            Self::Both => "BOTH",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_formats() {
        assert_eq!(MessageKind::PriceProposal.to_string(), "PRICE_PROPOSAL");
        assert_eq!(PaymentStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(PaymentMethod::LetterOfCredit.to_string(), "LETTER_OF_CREDIT");
        assert_eq!(
            TransactionKind::EmployeeCommission.to_string(),
            "EMPLOYEE_COMMISSION"
        );
        assert_eq!(EntrySide::Debit.to_string(), "DEBIT");
        assert_eq!(AccountKind::Platform.to_string(), "PLATFORM");
        assert_eq!(CommissionMethod::Both.to_string(), "BOTH");
    }

    #[test]
    fn entry_side_applies_signed_amount() {
        let balance = dec!(100.00);
        assert_eq!(
            EntrySide::Credit.apply(balance, dec!(25.00)),
            Some(dec!(125.00))
        );
        assert_eq!(
            EntrySide::Debit.apply(balance, dec!(25.00)),
            Some(dec!(75.00))
        );
    }

    #[test]
    fn commission_method_cbm_requirement() {
        assert!(!CommissionMethod::Percentage.requires_cbm_rate());
        assert!(CommissionMethod::Cbm.requires_cbm_rate());
        assert!(CommissionMethod::Both.requires_cbm_rate());
    }

    #[test]
    fn payment_status_predicates() {
        assert!(PaymentStatus::Pending.is_pending());
        assert!(PaymentStatus::Completed.is_completed());
        assert!(!PaymentStatus::Failed.is_pending());
    }

    #[test]
    fn serde_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&TransactionKind::TraderPayout).unwrap(),
            "\"TRADER_PAYOUT\""
        );
        let back: CommissionMethod = serde_json::from_str("\"PERCENTAGE\"").unwrap();
        assert_eq!(back, CommissionMethod::Percentage);
    }
}
