//! # Domain Entities
//!
//! Aggregate roots and entities representing core business concepts.
//!
//! ## Aggregates
//!
//! - [`Deal`]: the central transaction unit with its lifecycle state machine
//! - [`Payment`]: client payment evidence with explicit verification
//!
//! ## Entities & Records
//!
//! - [`NegotiationMessage`]: one entry in a deal's append-only channel
//! - [`Offer`] / [`OfferItem`]: read-only catalog records
//! - [`FinancialTransaction`] / [`LedgerEntry`]: settlement records
//! - Profiles and [`DualProfileLink`]: the identity model

pub mod deal;
pub mod ledger;
pub mod negotiation_message;
pub mod offer;
pub mod payment;
pub mod profile;

pub use deal::{Deal, DealBuilder, DealItem, DealRole};
pub use ledger::{FinancialTransaction, LedgerAccount, LedgerEntry};
pub use negotiation_message::NegotiationMessage;
pub use offer::{Offer, OfferItem, OfferStatus};
pub use payment::Payment;
pub use profile::{
    AdminProfile, ClientProfile, CredentialHash, DualProfileLink, EmployeeProfile, TraderProfile,
    DEFAULT_EMPLOYEE_COMMISSION_RATE,
};
