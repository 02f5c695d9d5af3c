//! # Domain Services
//!
//! Stateless domain logic that does not belong to a single aggregate.
//!
//! - [`settlement`]: pure commission-split derivation for paid deals
//! - [`numbering`]: atomic per-year sequences for deal numbers and trader
//!   codes

pub mod numbering;
pub mod settlement;

pub use numbering::{DealNumberSequence, TraderCodeSequence};
pub use settlement::{build_transactions, settle, settle_amounts, PlatformSettings, SettlementSplit};
