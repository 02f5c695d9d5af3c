//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`DealId`], [`OfferId`], [`OfferItemId`], [`MessageId`], [`PaymentId`],
//!   [`TransactionId`], [`LedgerEntryId`], [`EventId`]: UUID-based record ids
//! - [`ClientId`], [`TraderId`], [`EmployeeId`], [`AdminId`]: profile ids
//! - [`DealNumber`], [`TraderCode`]: sequential human-readable codes
//!
//! ## Numeric Types
//!
//! - [`Money`]: non-negative decimal amount with checked arithmetic
//! - [`Volume`]: non-negative cargo volume in CBM
//!
//! ## State & Attribution
//!
//! - [`DealStatus`]: deal lifecycle state machine
//! - [`Actor`] / [`ActorKind`]: tagged actor attribution
//! - Domain enums: message, payment, transaction, ledger, and commission
//!   classifications

pub mod actor;
pub mod deal_number;
pub mod deal_status;
pub mod enums;
pub mod ids;
pub mod money;
pub mod timestamp;

pub use actor::{Actor, ActorKind, InvalidActorKindError};
pub use deal_number::{DealNumber, InvalidCodeError, TraderCode};
pub use deal_status::{DealStatus, InvalidDealStatusError};
pub use enums::{
    AccountKind, CommissionMethod, EntrySide, MessageKind, PaymentMethod, PaymentStatus,
    TransactionKind, TransactionStatus,
};
pub use ids::{
    AdminId, ClientId, DealId, EmployeeId, EventId, LedgerEntryId, MessageId, OfferId,
    OfferItemId, PaymentId, ShippingCompanyId, TraderId, TransactionId,
};
pub use money::{ArithmeticError, ArithmeticResult, Money, Volume};
pub use timestamp::Timestamp;
