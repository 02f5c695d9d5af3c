//! # Deal Status
//!
//! Deal lifecycle state machine.
//!
//! # State Machine
//!
//! ```text
//! Negotiation → Approved → Paid → Settled
//!      ↓            ↓
//!      └────────────┴→ Cancelled
//! ```
//!
//! `Settled` and `Cancelled` are terminal. Cancellation is only reachable
//! while the deal is unpaid; a completed payment makes the deal irreversible.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::value_objects::DealStatus;
//!
//! assert!(DealStatus::Negotiation.can_transition_to(DealStatus::Approved));
//! assert!(!DealStatus::Negotiation.can_transition_to(DealStatus::Paid));
//! assert!(DealStatus::Settled.is_terminal());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deal lifecycle status.
///
/// Transitions are enforced via [`can_transition_to`](DealStatus::can_transition_to);
/// the [`Deal`](crate::domain::entities::Deal) aggregate additionally checks
/// actor authorization and transition-specific guards.
///
/// # Terminal States
///
/// - [`Settled`](DealStatus::Settled) — payout recorded and delivery closed
/// - [`Cancelled`](DealStatus::Cancelled) — abandoned while unpaid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum DealStatus {
    /// Parties are negotiating price and quantities.
    #[default]
    Negotiation = 0,

    /// Terms agreed; awaiting payment and verification.
    Approved = 1,

    /// Payment verified and settlement recorded.
    Paid = 2,

    /// Administratively closed after delivery (terminal).
    Settled = 3,

    /// Abandoned before payment (terminal).
    Cancelled = 4,
}

impl DealStatus {
    /// Returns true if this is a terminal status.
    #[inline]
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Settled | Self::Cancelled)
    }

    /// Returns true if this status can transition to the target status.
    ///
    /// Enforces the lifecycle graph:
    /// - Negotiation → Approved, Cancelled
    /// - Approved → Paid, Cancelled
    /// - Paid → Settled
    /// - Terminal states → (none)
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Negotiation, Self::Approved)
                | (Self::Negotiation, Self::Cancelled)
                | (Self::Approved, Self::Paid)
                | (Self::Approved, Self::Cancelled)
                | (Self::Paid, Self::Settled)
        )
    }

    /// Returns the valid next statuses from this status.
    #[must_use]
    pub fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Self::Negotiation => vec![Self::Approved, Self::Cancelled],
            Self::Approved => vec![Self::Paid, Self::Cancelled],
            Self::Paid => vec![Self::Settled],
            Self::Settled | Self::Cancelled => vec![],
        }
    }

    /// Returns true if the negotiation channel is open for new messages.
    ///
    /// Messages (including price proposals) are refused once the deal is
    /// paid, settled, or cancelled.
    #[inline]
    #[must_use]
    pub const fn accepts_messages(&self) -> bool {
        matches!(self, Self::Negotiation | Self::Approved)
    }

    /// Returns true if the deal may still be cancelled by its parties.
    #[inline]
    #[must_use]
    pub const fn is_cancellable(&self) -> bool {
        matches!(self, Self::Negotiation | Self::Approved)
    }

    /// Returns the numeric value of this status.
    #[inline]
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for DealStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Negotiation => "NEGOTIATION",
            Self::Approved => "APPROVED",
            Self::Paid => "PAID",
            Self::Settled => "SETTLED",
            Self::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// Error returned when converting an invalid u8 to [`DealStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidDealStatusError(
    /// The invalid u8 value.
    pub u8,
);

impl fmt::Display for InvalidDealStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid deal status value: {}", self.0)
    }
}

impl std::error::Error for InvalidDealStatusError {}

impl TryFrom<u8> for DealStatus {
    type Error = InvalidDealStatusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Negotiation),
            1 => Ok(Self::Approved),
            2 => Ok(Self::Paid),
            3 => Ok(Self::Settled),
            4 => Ok(Self::Cancelled),
            _ => Err(InvalidDealStatusError(value)),
        }
    }
}
