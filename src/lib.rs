//! # Deal Desk
//!
//! Brokered B2B deal lifecycle and financial settlement engine.
//!
//! Deal Desk connects four actor kinds — traders (sellers), clients (buyers),
//! employees (mediators), and a platform operator — around a central
//! transaction unit, the [`Deal`](domain::entities::Deal). The crate owns:
//!
//! - the deal **state machine** (`NEGOTIATION → APPROVED → PAID → SETTLED`,
//!   with `CANCELLED` reachable while unpaid) and the authorization rules for
//!   each transition;
//! - the **negotiation channel**: an append-only message log between exactly
//!   one client and one trader, observed by the assigned employee, carrying
//!   optional price/quantity proposals;
//! - the **identity model** allowing one natural person to hold both a Client
//!   and a Trader account (dual-profile linking);
//! - the **commission & settlement engine** deriving platform, employee, and
//!   shipping commissions plus the trader payout from a deal's negotiated
//!   amount and cargo volume;
//! - the **ledger** recording every money movement as append-only postings
//!   with a per-account running-balance invariant.
//!
//! # Architecture
//!
//! The crate follows a layered design:
//!
//! - [`domain`] - Entities, value objects, domain services, and events.
//!   Pure business logic with no infrastructure dependencies.
//! - [`application`] - Use-case services orchestrating domain objects over
//!   repository ports: identity resolution, negotiation, deal lifecycle,
//!   and ledger posting.
//! - [`infrastructure`] - Repository ports and in-memory implementations,
//!   plus audit sinks.
//!
//! # Example
//!
//! ```
//! use deal_desk::domain::value_objects::{DealStatus, Money};
//!
//! // The state machine rejects any jump that skips a lifecycle stage.
//! assert!(DealStatus::Negotiation.can_transition_to(DealStatus::Approved));
//! assert!(!DealStatus::Negotiation.can_transition_to(DealStatus::Paid));
//!
//! let amount = Money::new(50_000, 2).unwrap(); // 500.00
//! assert!(amount.is_positive());
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
