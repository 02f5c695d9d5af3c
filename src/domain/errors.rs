//! # Domain Errors
//!
//! Error taxonomy for business-rule violations.
//!
//! Every rejected operation surfaces one of these kinds and leaves all
//! entities exactly as they were before the call. The only deliberately
//! non-fatal failure category in the crate is audit emission, which is not
//! represented here (see [`crate::domain::audit`]).

use crate::domain::value_objects::deal_status::DealStatus;
use crate::domain::value_objects::money::ArithmeticError;
use crate::domain::value_objects::{ActorKind, DealId, MessageId, PaymentId};
use thiserror::Error;

/// Error type for domain-rule violations.
///
/// Guard and authorization failures are recoverable: the caller receives the
/// specific kind and no state has changed. [`SettlementImbalance`] and
/// arithmetic faults are data-integrity errors and abort the triggering
/// transition entirely.
///
/// [`SettlementImbalance`]: DomainError::SettlementImbalance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// A deal state transition violated the lifecycle graph.
    #[error("invalid transition for deal {deal_id}: {from} -> {to}")]
    InvalidTransition {
        /// The deal whose transition was rejected.
        deal_id: DealId,
        /// Current status.
        from: DealStatus,
        /// Requested status.
        to: DealStatus,
    },

    /// The acting party is not permitted to perform the operation.
    #[error("unauthorized: {actor_kind} {reason}")]
    Unauthorized {
        /// Kind of the acting profile.
        actor_kind: ActorKind,
        /// Why the action was refused.
        reason: String,
    },

    /// A negotiation message failed validation.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The negotiation channel no longer accepts messages.
    #[error("negotiation channel for deal {deal_id} is closed in status {status}")]
    ChannelClosed {
        /// The deal whose channel was addressed.
        deal_id: DealId,
        /// The status that closed the channel.
        status: DealStatus,
    },

    /// The commission method requires a CBM rate, but none is configured.
    #[error("commission method {method} requires a CBM rate, none configured")]
    MissingCbmRate {
        /// The method that needed the rate.
        method: String,
    },

    /// The settlement split does not sum back to the negotiated amount.
    ///
    /// Data-integrity fault: must abort the `APPROVED -> PAID` transition,
    /// never be rounded away.
    #[error("settlement imbalance for deal {deal_id}: split sums to {split_total}, expected {expected}")]
    SettlementImbalance {
        /// The deal being settled.
        deal_id: DealId,
        /// Sum of platform + employee commissions + trader payout.
        split_total: String,
        /// The negotiated amount the split must reproduce.
        expected: String,
    },

    /// Cancellation blocked because a completed payment exists.
    #[error("deal {deal_id} has a completed payment and can no longer be cancelled")]
    IrreversiblePayment {
        /// The deal whose cancellation was refused.
        deal_id: DealId,
    },

    /// No profile with the given email matches the presented credential.
    #[error("invalid credential for {email}")]
    InvalidCredential {
        /// The email the credential was presented for.
        email: String,
    },

    /// A payment was already verified; verifying again never double-settles.
    #[error("payment {payment_id} is already verified")]
    PaymentAlreadyVerified {
        /// The payment in question.
        payment_id: PaymentId,
    },

    /// A referenced message does not carry what the operation needs.
    #[error("message {message_id} carries no price proposal")]
    NotAProposal {
        /// The message in question.
        message_id: MessageId,
    },

    /// Input failed a structural validation check.
    #[error("validation error: {0}")]
    Validation(String),

    /// Checked money arithmetic failed.
    #[error("arithmetic error: {0}")]
    Arithmetic(#[from] ArithmeticError),
}

impl DomainError {
    /// Creates an unauthorized error.
    #[must_use]
    pub fn unauthorized(actor_kind: ActorKind, reason: impl Into<String>) -> Self {
        Self::Unauthorized {
            actor_kind,
            reason: reason.into(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    /// Creates an invalid-message error.
    #[must_use]
    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Self::InvalidMessage(reason.into())
    }

    /// Returns true if this is a transition-guard failure.
    #[must_use]
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Self::InvalidTransition { .. })
    }

    /// Returns true if this is an authorization failure.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Returns true if this error must abort a settlement transition.
    ///
    /// Integrity faults are never recovered locally; the deal stays in its
    /// pre-transition status.
    #[must_use]
    pub fn is_integrity_fault(&self) -> bool {
        matches!(
            self,
            Self::SettlementImbalance { .. } | Self::Arithmetic(_) | Self::MissingCbmRate { .. }
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
