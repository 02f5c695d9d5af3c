//! # Deal Lifecycle Service
//!
//! Deal creation and every transition of the deal state machine, including
//! the settlement that turns a verified payment into ledger postings.
//!
//! # Serialization
//!
//! Transitions and settlement are serialized per deal: each operation runs
//! under a deal-scoped lock held from the status read to the final status
//! write. Of two concurrent `APPROVED -> PAID` attempts on one deal,
//! exactly one settles; the loser reads the advanced status and fails with
//! `InvalidTransition`, never double-settling.
//!
//! # Atomicity
//!
//! `confirm_payment` computes the settlement split before writing anything.
//! Split faults (a missing CBM rate, an imbalance) therefore reject the
//! transition with zero ledger writes, and the status flip to PAID is the
//! last write of the sequence — a deal is never PAID without its full
//! entry set durably recorded.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::ledger::LedgerService;
use crate::application::services::{emit_audit, publish_event, DealLocks};
use crate::domain::audit::{AuditRecord, AuditSink};
use crate::domain::entities::deal::{Deal, DealBuilder};
use crate::domain::entities::offer::{Offer, OfferItem, OfferStatus};
use crate::domain::entities::payment::Payment;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::deal_events::{DealCreated, DealStatusChanged};
use crate::domain::events::settlement_events::{PaymentVerified, SettlementRecorded};
use crate::domain::services::numbering::DealNumberSequence;
use crate::domain::services::settlement::{build_transactions, settle, PlatformSettings, SettlementSplit};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Actor, ArithmeticError, ClientId, DealId, DealStatus, EmployeeId, Money, OfferId, OfferItemId,
    PaymentId, PaymentMethod, ShippingCompanyId, Volume,
};
use crate::infrastructure::audit::TracingAuditSink;
use crate::infrastructure::persistence::event_store::EventStore;
use crate::infrastructure::persistence::in_memory::InMemoryEventStore;
use crate::infrastructure::persistence::traits::{
    DealRepository, OfferRepository, PaymentRepository, ProfileRepository,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// One requested line of a new deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealItemRequest {
    /// The offer item to draw from.
    pub offer_item_id: OfferItemId,
    /// Units requested; must fit what the item still offers.
    pub quantity: u32,
}

/// Input for opening a deal over an offer.
#[derive(Debug, Clone)]
pub struct CreateDealRequest {
    /// The offer the deal draws items from.
    pub offer_id: OfferId,
    /// The buying client.
    pub client_id: ClientId,
    /// The assigned mediating employee.
    pub employee_id: EmployeeId,
    /// Carrier for the cargo, if already chosen.
    pub shipping_company_id: Option<ShippingCompanyId>,
    /// The requested lines.
    pub items: Vec<DealItemRequest>,
}

/// Application service owning the deal state machine.
#[derive(Debug)]
pub struct DealLifecycleService {
    deals: Arc<dyn DealRepository>,
    offers: Arc<dyn OfferRepository>,
    payments: Arc<dyn PaymentRepository>,
    profiles: Arc<dyn ProfileRepository>,
    ledger: Arc<LedgerService>,
    numbers: Arc<DealNumberSequence>,
    audit: Arc<dyn AuditSink>,
    events: Arc<dyn EventStore>,
    locks: Arc<DealLocks>,
}

impl DealLifecycleService {
    /// Creates the service with a fresh deal-number sequence, a tracing
    /// audit sink, and an in-memory event feed.
    #[must_use]
    pub fn new(
        deals: Arc<dyn DealRepository>,
        offers: Arc<dyn OfferRepository>,
        payments: Arc<dyn PaymentRepository>,
        profiles: Arc<dyn ProfileRepository>,
        ledger: Arc<LedgerService>,
    ) -> Self {
        Self {
            deals,
            offers,
            payments,
            profiles,
            ledger,
            numbers: Arc::new(DealNumberSequence::new()),
            audit: Arc::new(TracingAuditSink::new()),
            events: Arc::new(InMemoryEventStore::new()),
            locks: Arc::new(DealLocks::new()),
        }
    }

    /// Replaces the deal-number sequence, e.g. one seeded from persisted
    /// deals at startup.
    #[must_use]
    pub fn with_numbering(mut self, numbers: Arc<DealNumberSequence>) -> Self {
        self.numbers = numbers;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the event store.
    #[must_use]
    pub fn with_event_store(mut self, events: Arc<dyn EventStore>) -> Self {
        self.events = events;
        self
    }

    /// Shares a deal-lock registry with other services touching the same
    /// deals, e.g. the negotiation service accepting proposals.
    #[must_use]
    pub fn with_locks(mut self, locks: Arc<DealLocks>) -> Self {
        self.locks = locks;
        self
    }

    async fn load_deal(&self, deal_id: DealId) -> ApplicationResult<Deal> {
        self.deals
            .get(deal_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Deal", deal_id))
    }

    async fn audit_transition(
        &self,
        action: &'static str,
        deal_id: DealId,
        actor: &Actor,
        from: Option<DealStatus>,
        to: Option<DealStatus>,
    ) {
        let record = match to {
            Some(status) => {
                let mut record = AuditRecord::success(Some(*actor), action, "Deal", deal_id)
                    .with_new_value(serde_json::json!({ "status": status.to_string() }));
                if let Some(old) = from {
                    record =
                        record.with_old_value(serde_json::json!({ "status": old.to_string() }));
                }
                record
            }
            None => AuditRecord::rejection(Some(*actor), action, "Deal", deal_id),
        };
        emit_audit(self.audit.as_ref(), record).await;
    }

    // ========== Creation ==========

    /// Opens a deal over an offer, in NEGOTIATION status.
    ///
    /// Only the named client or the named employee may open the deal. Every
    /// requested line must reference an item of the offer, and the
    /// requested quantity must fit what the item still offers; cartons and
    /// cargo volume are taken pro rata from the item's totals. The deal
    /// number comes from the per-year sequence and is never reused, even if
    /// the deal is later cancelled.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Unauthorized`] for any other actor
    /// - [`ApplicationError::NotFound`] for an unknown offer or employee
    /// - [`DomainError::Validation`] for a withdrawn offer, an empty or
    ///   invalid item set, or an exceeded quantity
    pub async fn create_deal(
        &self,
        actor: &Actor,
        request: CreateDealRequest,
    ) -> ApplicationResult<Deal> {
        let outcome = self.create_inner(actor, request).await;
        if let Ok(deal) = &outcome {
            emit_audit(
                self.audit.as_ref(),
                AuditRecord::success(Some(*actor), "deal.create", "Deal", deal.id())
                    .with_new_value(serde_json::json!({
                        "deal_number": deal.deal_number().to_string(),
                        "status": deal.status().to_string(),
                    })),
            )
            .await;
        }
        outcome
    }

    async fn create_inner(
        &self,
        actor: &Actor,
        request: CreateDealRequest,
    ) -> ApplicationResult<Deal> {
        match actor {
            Actor::Client(id) if *id == request.client_id => {}
            Actor::Employee(id) if *id == request.employee_id => {}
            _ => {
                return Err(DomainError::unauthorized(
                    actor.kind(),
                    "deals are opened by their client or their brokering employee",
                )
                .into());
            }
        }

        let offer = self
            .offers
            .get(request.offer_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Offer", request.offer_id))?;
        if offer.status != OfferStatus::Published {
            return Err(DomainError::validation(format!(
                "offer {} is not published",
                offer.id
            ))
            .into());
        }
        self.profiles
            .get_employee(request.employee_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Employee", request.employee_id))?;

        let number = self
            .numbers
            .next(Timestamp::now().year())
            .map_err(|err| DomainError::validation(err.to_string()))?;

        let mut builder = DealBuilder::new(
            number,
            offer.id,
            offer.trader_id,
            request.client_id,
            request.employee_id,
        );
        if let Some(carrier) = request.shipping_company_id {
            builder = builder.shipping_company(carrier);
        }
        for line in &request.items {
            let item = resolve_item(&offer, line)?;
            let (cartons, cbm) = prorate(item, line.quantity)?;
            builder = builder.item(item.id, line.quantity, cartons, cbm, None);
        }
        let deal = builder.build()?;
        self.deals.insert(&deal).await?;

        info!(deal = %deal.id(), number = %deal.deal_number(), "deal created");
        publish_event(
            self.events.as_ref(),
            &DealCreated::new(
                deal.id(),
                deal.deal_number(),
                deal.client_id(),
                deal.trader_id(),
                deal.employee_id(),
                *actor,
            ),
        )
        .await;
        Ok(deal)
    }

    // ========== Transitions ==========

    /// Approves a deal: `NEGOTIATION -> APPROVED`.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal
    /// - [`DomainError::Validation`] without a negotiated amount
    /// - [`DomainError::Unauthorized`] unless the actor is the deal's
    ///   trader or assigned employee
    /// - [`DomainError::InvalidTransition`] from any status but NEGOTIATION
    pub async fn approve(&self, deal_id: DealId, actor: &Actor) -> ApplicationResult<Deal> {
        let _guard = self.locks.acquire(deal_id).await;
        let outcome = self.approve_inner(deal_id, actor).await;
        self.audit_transition(
            "deal.approve",
            deal_id,
            actor,
            Some(DealStatus::Negotiation),
            outcome.as_ref().ok().map(Deal::status),
        )
        .await;
        outcome
    }

    async fn approve_inner(&self, deal_id: DealId, actor: &Actor) -> ApplicationResult<Deal> {
        let mut deal = self.load_deal(deal_id).await?;
        let from = deal.status();
        deal.approve(actor)?;
        self.deals.save(&mut deal).await?;

        info!(deal = %deal_id, from = %from, to = %deal.status(), "deal approved");
        publish_event(
            self.events.as_ref(),
            &DealStatusChanged::new(deal_id, from, deal.status(), Some(*actor)),
        )
        .await;
        Ok(deal)
    }

    /// Confirms the verified payment and settles: `APPROVED -> PAID`.
    ///
    /// Requires exactly one COMPLETED payment. The settlement split is
    /// computed first; its transactions are posted through the ledger, and
    /// only then is the status persisted as PAID. Any split fault rejects
    /// the transition with the deal still APPROVED and nothing written.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal or employee
    /// - [`DomainError::Unauthorized`] unless the actor is an admin or the
    ///   deal's assigned employee
    /// - [`DomainError::InvalidTransition`] from any status but APPROVED —
    ///   including the loser of a confirmation race
    /// - [`DomainError::Validation`] without exactly one completed payment
    /// - [`DomainError::MissingCbmRate`] /
    ///   [`DomainError::SettlementImbalance`] /
    ///   [`DomainError::Arithmetic`] from the split computation
    pub async fn confirm_payment(
        &self,
        deal_id: DealId,
        actor: &Actor,
        settings: &PlatformSettings,
    ) -> ApplicationResult<SettlementSplit> {
        let _guard = self.locks.acquire(deal_id).await;
        let outcome = self.confirm_inner(deal_id, actor, settings).await;
        self.audit_transition(
            "deal.confirm_payment",
            deal_id,
            actor,
            Some(DealStatus::Approved),
            outcome.as_ref().ok().map(|_| DealStatus::Paid),
        )
        .await;
        outcome
    }

    async fn confirm_inner(
        &self,
        deal_id: DealId,
        actor: &Actor,
        settings: &PlatformSettings,
    ) -> ApplicationResult<SettlementSplit> {
        let mut deal = self.load_deal(deal_id).await?;

        let authorized = matches!(actor, Actor::Admin(_))
            || matches!(actor, Actor::Employee(id) if *id == deal.employee_id());
        if !authorized {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only an admin or the assigned employee may confirm payment",
            )
            .into());
        }
        if deal.status() != DealStatus::Approved {
            return Err(DomainError::InvalidTransition {
                deal_id,
                from: deal.status(),
                to: DealStatus::Paid,
            }
            .into());
        }

        let completed = self.payments.completed_for_deal(deal_id).await?;
        match completed.len() {
            1 => {}
            0 => {
                return Err(
                    DomainError::validation("deal has no completed payment to confirm").into(),
                );
            }
            n => {
                return Err(DomainError::validation(format!(
                    "deal has {n} completed payments, expected exactly one"
                ))
                .into());
            }
        }

        let employee = self
            .profiles
            .get_employee(deal.employee_id())
            .await?
            .ok_or_else(|| ApplicationError::not_found("Employee", deal.employee_id()))?;

        // The split either balances or rejects the whole transition here,
        // before the first ledger write.
        let split = settle(&deal, employee.commission_rate, settings)?;
        let amount = deal
            .negotiated_amount()
            .ok_or_else(|| DomainError::validation("cannot settle a deal without an amount"))?;

        let mut transactions = build_transactions(
            deal_id,
            deal.trader_id(),
            deal.employee_id(),
            amount,
            &split,
        );
        let entries = self
            .ledger
            .record_settlement(deal.deal_number(), &mut transactions)
            .await?;

        deal.mark_paid(Timestamp::now())?;
        self.deals.save(&mut deal).await?;

        info!(
            deal = %deal_id,
            amount = %amount,
            split = %split,
            entries = entries.len(),
            "payment confirmed, deal settled"
        );
        publish_event(
            self.events.as_ref(),
            &DealStatusChanged::new(deal_id, DealStatus::Approved, DealStatus::Paid, Some(*actor)),
        )
        .await;
        publish_event(
            self.events.as_ref(),
            &SettlementRecorded::new(deal_id, amount, split, entries.len()),
        )
        .await;
        Ok(split)
    }

    /// Closes a paid deal after delivery: `PAID -> SETTLED`.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal
    /// - [`DomainError::Unauthorized`] unless the actor is an admin or the
    ///   assigned employee
    /// - [`DomainError::InvalidTransition`] from any status but PAID
    pub async fn close(&self, deal_id: DealId, actor: &Actor) -> ApplicationResult<Deal> {
        let _guard = self.locks.acquire(deal_id).await;
        let outcome = self.close_inner(deal_id, actor).await;
        self.audit_transition(
            "deal.close",
            deal_id,
            actor,
            Some(DealStatus::Paid),
            outcome.as_ref().ok().map(Deal::status),
        )
        .await;
        outcome
    }

    async fn close_inner(&self, deal_id: DealId, actor: &Actor) -> ApplicationResult<Deal> {
        let mut deal = self.load_deal(deal_id).await?;
        let from = deal.status();
        deal.close(actor)?;
        self.deals.save(&mut deal).await?;

        info!(deal = %deal_id, "deal closed");
        publish_event(
            self.events.as_ref(),
            &DealStatusChanged::new(deal_id, from, deal.status(), Some(*actor)),
        )
        .await;
        Ok(deal)
    }

    /// Cancels an unpaid deal.
    ///
    /// Any deal party or an admin may cancel from NEGOTIATION or APPROVED.
    /// Once a completed payment exists the deal is irreversible.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal
    /// - [`DomainError::Unauthorized`] for actors without a role on the
    ///   deal
    /// - [`DomainError::IrreversiblePayment`] once a completed payment
    ///   exists
    /// - [`DomainError::InvalidTransition`] from PAID or a terminal status
    pub async fn cancel(&self, deal_id: DealId, actor: &Actor) -> ApplicationResult<Deal> {
        let _guard = self.locks.acquire(deal_id).await;
        let outcome = self.cancel_inner(deal_id, actor).await;
        self.audit_transition(
            "deal.cancel",
            deal_id,
            actor,
            None,
            outcome.as_ref().ok().map(Deal::status),
        )
        .await;
        outcome
    }

    async fn cancel_inner(&self, deal_id: DealId, actor: &Actor) -> ApplicationResult<Deal> {
        let mut deal = self.load_deal(deal_id).await?;
        let from = deal.status();
        let has_completed_payment = !self.payments.completed_for_deal(deal_id).await?.is_empty();
        deal.cancel(actor, has_completed_payment)?;
        self.deals.save(&mut deal).await?;

        info!(deal = %deal_id, from = %from, "deal cancelled");
        publish_event(
            self.events.as_ref(),
            &DealStatusChanged::new(deal_id, from, deal.status(), Some(*actor)),
        )
        .await;
        Ok(deal)
    }

    // ========== Payments ==========

    /// Records the client's payment evidence for an approved deal.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal
    /// - [`DomainError::Unauthorized`] unless the actor is the deal's
    ///   client
    /// - [`DomainError::Validation`] before approval, for a zero amount,
    ///   or for a blank reference
    /// - [`RepositoryError::Duplicate`] for a reused transaction reference
    ///
    /// [`RepositoryError::Duplicate`]: crate::infrastructure::persistence::traits::RepositoryError::Duplicate
    pub async fn submit_payment(
        &self,
        deal_id: DealId,
        actor: &Actor,
        amount: Money,
        method: PaymentMethod,
        transaction_ref: impl Into<String>,
    ) -> ApplicationResult<Payment> {
        let deal = self.load_deal(deal_id).await?;
        if !matches!(actor, Actor::Client(id) if *id == deal.client_id()) {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only the deal's client submits payment evidence",
            )
            .into());
        }
        if deal.status() != DealStatus::Approved {
            return Err(DomainError::validation(
                "payment evidence is accepted once the deal is approved",
            )
            .into());
        }

        let payment = Payment::submit(deal_id, deal.client_id(), amount, method, transaction_ref)?;
        self.payments.insert(&payment).await?;

        info!(deal = %deal_id, payment = %payment.id(), amount = %amount, "payment submitted");
        emit_audit(
            self.audit.as_ref(),
            AuditRecord::success(Some(*actor), "payment.submit", "Payment", payment.id())
                .with_new_value(serde_json::json!({
                    "amount": amount.to_string(),
                    "method": method.to_string(),
                })),
        )
        .await;
        Ok(payment)
    }

    /// Verifies a pending payment: `PENDING -> COMPLETED`.
    ///
    /// Verifying an already-completed payment is rejected, so a retried
    /// verification can never settle twice.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown payment
    /// - [`DomainError::Unauthorized`] for client/trader actors
    /// - [`DomainError::PaymentAlreadyVerified`] on re-verification
    /// - [`DomainError::Validation`] for an already-failed payment
    pub async fn verify_payment(
        &self,
        payment_id: PaymentId,
        actor: &Actor,
    ) -> ApplicationResult<Payment> {
        let outcome = self.verify_inner(payment_id, actor).await;
        let record = match &outcome {
            Ok(_) => AuditRecord::success(Some(*actor), "payment.verify", "Payment", payment_id),
            Err(_) => AuditRecord::rejection(Some(*actor), "payment.verify", "Payment", payment_id),
        };
        emit_audit(self.audit.as_ref(), record).await;
        outcome
    }

    async fn verify_inner(
        &self,
        payment_id: PaymentId,
        actor: &Actor,
    ) -> ApplicationResult<Payment> {
        let mut payment = self
            .payments
            .get(payment_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Payment", payment_id))?;
        payment.verify(actor)?;
        self.payments.save(&payment).await?;

        info!(payment = %payment_id, deal = %payment.deal_id(), "payment verified");
        publish_event(
            self.events.as_ref(),
            &PaymentVerified::new(payment.deal_id(), payment_id, *actor, payment.amount()),
        )
        .await;
        Ok(payment)
    }

    /// Marks a pending payment failed, with the gateway's or reviewer's
    /// reason.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown payment
    /// - [`DomainError::Unauthorized`] for client/trader actors
    /// - [`DomainError::PaymentAlreadyVerified`] /
    ///   [`DomainError::Validation`] for settled states
    pub async fn fail_payment(
        &self,
        payment_id: PaymentId,
        actor: &Actor,
        reason: impl Into<String>,
    ) -> ApplicationResult<Payment> {
        if !actor.is_staff() {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only employees or admins record payment failures",
            )
            .into());
        }
        let mut payment = self
            .payments
            .get(payment_id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Payment", payment_id))?;
        payment.fail(reason)?;
        self.payments.save(&payment).await?;

        emit_audit(
            self.audit.as_ref(),
            AuditRecord::success(Some(*actor), "payment.fail", "Payment", payment_id),
        )
        .await;
        Ok(payment)
    }
}

fn resolve_item<'a>(offer: &'a Offer, line: &DealItemRequest) -> DomainResult<&'a OfferItem> {
    let item = offer.item(line.offer_item_id).ok_or_else(|| {
        DomainError::validation(format!(
            "offer item {} does not belong to offer {}",
            line.offer_item_id, offer.id
        ))
    })?;
    if line.quantity > item.quantity {
        return Err(DomainError::validation(format!(
            "requested quantity {} exceeds the {} units item {} still offers",
            line.quantity, item.quantity, item.id
        )));
    }
    Ok(item)
}

/// Takes cartons and cargo volume pro rata from an item's full-quantity
/// totals. Cartons round up; a partial carton still ships.
fn prorate(item: &OfferItem, quantity: u32) -> DomainResult<(u32, Volume)> {
    if quantity == item.quantity {
        return Ok((item.cartons, item.total_cbm));
    }
    let cartons = u64::from(item.cartons)
        .checked_mul(u64::from(quantity))
        .map(|scaled| scaled.div_ceil(u64::from(item.quantity)))
        .and_then(|scaled| u32::try_from(scaled).ok())
        .ok_or(ArithmeticError::Overflow)?;
    let ratio = Decimal::from(quantity)
        .checked_div(Decimal::from(item.quantity))
        .ok_or(ArithmeticError::DivisionByZero)?;
    let cbm = item
        .total_cbm
        .value()
        .checked_mul(ratio)
        .ok_or(ArithmeticError::Overflow)?;
    Ok((cartons, Volume::new(cbm)?))
}
