//! # Application Layer
//!
//! Use-case services orchestrating domain objects over the repository
//! ports: identity resolution, negotiation, the deal lifecycle, and ledger
//! posting.
//!
//! Services hold `Arc`s to the repository and sink ports and own the
//! concurrency discipline the domain requires: per-deal locks around state
//! transitions and settlement, per-account locks around ledger appends.
//! Audit and event emission from this layer is fire-and-forget — failures
//! are logged and never roll back the primary operation.

pub mod error;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use services::deal_lifecycle::{CreateDealRequest, DealItemRequest, DealLifecycleService};
pub use services::identity::IdentityService;
pub use services::ledger::LedgerService;
pub use services::negotiation::NegotiationService;
pub use services::DealLocks;
