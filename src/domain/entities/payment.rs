//! # Payment
//!
//! A client's payment evidence for a deal.
//!
//! Payments are created `PENDING` when the client submits evidence and move
//! to `COMPLETED` only through an explicit verification action by an
//! employee or admin. The core never initiates payment capture itself.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::entities::Payment;
//! use deal_desk::domain::value_objects::*;
//!
//! let mut payment = Payment::submit(
//!     DealId::new_v4(),
//!     ClientId::new_v4(),
//!     Money::new(50_000_00, 2).unwrap(),
//!     PaymentMethod::BankTransfer,
//!     "WIRE-778812",
//! )
//! .unwrap();
//!
//! payment.verify(&Actor::Employee(EmployeeId::new_v4())).unwrap();
//! assert_eq!(payment.status(), PaymentStatus::Completed);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Actor, ClientId, DealId, Money, PaymentId, PaymentMethod, PaymentStatus,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment evidence submitted by a client for a deal.
///
/// # Invariants
///
/// - `transaction_ref` is unique across all payments (enforced at the
///   repository).
/// - `PENDING -> COMPLETED` happens only via [`verify`](Payment::verify);
///   verifying a completed payment again is rejected, never re-applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier.
    id: PaymentId,
    /// The deal being paid.
    deal_id: DealId,
    /// The paying client.
    client_id: ClientId,
    /// Amount paid.
    amount: Money,
    /// How the client paid.
    method: PaymentMethod,
    /// Verification status.
    status: PaymentStatus,
    /// External gateway/bank reference, unique.
    transaction_ref: String,
    /// When the evidence was submitted.
    created_at: Timestamp,
    /// When verification happened, if it did.
    verified_at: Option<Timestamp>,
    /// Who verified, if anyone.
    verified_by: Option<Actor>,
    /// Gateway or reviewer note on failure.
    failure_reason: Option<String>,
}

impl Payment {
    /// Records newly submitted payment evidence in `PENDING` status.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a zero amount or a blank
    /// transaction reference.
    pub fn submit(
        deal_id: DealId,
        client_id: ClientId,
        amount: Money,
        method: PaymentMethod,
        transaction_ref: impl Into<String>,
    ) -> DomainResult<Self> {
        let transaction_ref = transaction_ref.into();
        if amount.is_zero() {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if transaction_ref.trim().is_empty() {
            return Err(DomainError::validation(
                "payment needs a transaction reference",
            ));
        }
        Ok(Self {
            id: PaymentId::new_v4(),
            deal_id,
            client_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            transaction_ref,
            created_at: Timestamp::now(),
            verified_at: None,
            verified_by: None,
            failure_reason: None,
        })
    }

    // ========== Accessors ==========

    /// Returns the payment id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> PaymentId {
        self.id
    }

    /// Returns the deal being paid.
    #[inline]
    #[must_use]
    pub fn deal_id(&self) -> DealId {
        self.deal_id
    }

    /// Returns the paying client.
    #[inline]
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Returns the paid amount.
    #[inline]
    #[must_use]
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Returns the payment method.
    #[inline]
    #[must_use]
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Returns the verification status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Returns the unique external reference.
    #[must_use]
    pub fn transaction_ref(&self) -> &str {
        &self.transaction_ref
    }

    /// Returns when the evidence was submitted.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when the payment was verified, if it was.
    #[inline]
    #[must_use]
    pub fn verified_at(&self) -> Option<Timestamp> {
        self.verified_at
    }

    /// Returns who verified the payment, if anyone.
    #[inline]
    #[must_use]
    pub fn verified_by(&self) -> Option<Actor> {
        self.verified_by
    }

    /// Returns the failure note, if the payment failed.
    #[must_use]
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    // ========== Transitions ==========

    /// Verifies the payment: `PENDING -> COMPLETED`.
    ///
    /// Only employees and admins may verify. Verifying an already-completed
    /// payment is rejected so a retried verification can never settle twice.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Unauthorized`] for client/trader actors
    /// - [`DomainError::PaymentAlreadyVerified`] if already completed
    /// - [`DomainError::Validation`] if the payment already failed
    pub fn verify(&mut self, actor: &Actor) -> DomainResult<()> {
        if !actor.is_staff() {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only employees or admins verify payments",
            ));
        }
        match self.status {
            PaymentStatus::Completed => Err(DomainError::PaymentAlreadyVerified {
                payment_id: self.id,
            }),
            PaymentStatus::Failed => Err(DomainError::validation(
                "a failed payment cannot be verified",
            )),
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Completed;
                self.verified_at = Some(Timestamp::now());
                self.verified_by = Some(*actor);
                Ok(())
            }
        }
    }

    /// Marks the payment failed: `PENDING -> FAILED`.
    ///
    /// # Errors
    ///
    /// - [`DomainError::PaymentAlreadyVerified`] if already completed
    /// - [`DomainError::Validation`] if already failed
    pub fn fail(&mut self, reason: impl Into<String>) -> DomainResult<()> {
        match self.status {
            PaymentStatus::Completed => Err(DomainError::PaymentAlreadyVerified {
                payment_id: self.id,
            }),
            PaymentStatus::Failed => {
                Err(DomainError::validation("payment has already failed"))
            }
            PaymentStatus::Pending => {
                self.status = PaymentStatus::Failed;
                self.failure_reason = Some(reason.into());
                Ok(())
            }
        }
    }
}

impl fmt::Display for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Payment[{}] deal={} {} {} ref={}",
            self.id, self.deal_id, self.amount, self.status, self.transaction_ref
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{AdminId, EmployeeId, TraderId};

    fn pending_payment() -> Payment {
        Payment::submit(
            DealId::new_v4(),
            ClientId::new_v4(),
            Money::new(50_000_00, 2).unwrap(),
            PaymentMethod::BankTransfer,
            "WIRE-1",
        )
        .unwrap()
    }

    #[test]
    fn submit_starts_pending() {
        let payment = pending_payment();
        assert_eq!(payment.status(), PaymentStatus::Pending);
        assert!(payment.verified_at().is_none());
        assert!(payment.verified_by().is_none());
    }

    #[test]
    fn submit_rejects_zero_amount() {
        let result = Payment::submit(
            DealId::new_v4(),
            ClientId::new_v4(),
            Money::ZERO,
            PaymentMethod::Escrow,
            "WIRE-2",
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn submit_rejects_blank_reference() {
        let result = Payment::submit(
            DealId::new_v4(),
            ClientId::new_v4(),
            Money::new(100, 2).unwrap(),
            PaymentMethod::Escrow,
            "  ",
        );
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn employee_verifies() {
        let mut payment = pending_payment();
        let verifier = Actor::Employee(EmployeeId::new_v4());
        payment.verify(&verifier).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Completed);
        assert_eq!(payment.verified_by(), Some(verifier));
        assert!(payment.verified_at().is_some());
    }

    #[test]
    fn admin_verifies() {
        let mut payment = pending_payment();
        payment.verify(&Actor::Admin(AdminId::new_v4())).unwrap();
        assert_eq!(payment.status(), PaymentStatus::Completed);
    }

    #[test]
    fn trader_cannot_verify() {
        let mut payment = pending_payment();
        let result = payment.verify(&Actor::Trader(TraderId::new_v4()));
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
        assert_eq!(payment.status(), PaymentStatus::Pending);
    }

    #[test]
    fn double_verification_rejected() {
        let mut payment = pending_payment();
        let verifier = Actor::Employee(EmployeeId::new_v4());
        payment.verify(&verifier).unwrap();
        let first_verified_at = payment.verified_at();

        let result = payment.verify(&verifier);
        assert!(matches!(
            result,
            Err(DomainError::PaymentAlreadyVerified { .. })
        ));
        // Nothing about the original verification changed.
        assert_eq!(payment.verified_at(), first_verified_at);
    }

    #[test]
    fn failed_payment_cannot_be_verified() {
        let mut payment = pending_payment();
        payment.fail("gateway rejected the wire").unwrap();
        let result = payment.verify(&Actor::Admin(AdminId::new_v4()));
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(payment.failure_reason(), Some("gateway rejected the wire"));
    }

    #[test]
    fn completed_payment_cannot_fail() {
        let mut payment = pending_payment();
        payment.verify(&Actor::Admin(AdminId::new_v4())).unwrap();
        let result = payment.fail("too late");
        assert!(matches!(
            result,
            Err(DomainError::PaymentAlreadyVerified { .. })
        ));
    }

    #[test]
    fn serde_roundtrip() {
        let payment = pending_payment();
        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payment);
    }
}
