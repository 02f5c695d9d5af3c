//! # Deal Aggregate
//!
//! The central transaction unit linking one offer, one trader, one client,
//! and one mediating employee, with its own negotiated price and lifecycle.
//!
//! # State Machine
//!
//! ```text
//! Negotiation → Approved → Paid → Settled
//!      ↓            ↓
//!      └────────────┴→ Cancelled
//! ```
//!
//! All status changes go through the guard methods on [`Deal`]; each checks
//! the lifecycle graph, the transition-specific preconditions, and the
//! acting party's authorization before anything is mutated. A rejected
//! transition leaves the aggregate untouched.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::entities::DealBuilder;
//! use deal_desk::domain::value_objects::*;
//! use rust_decimal_macros::dec;
//!
//! let trader = TraderId::new_v4();
//! let employee = EmployeeId::new_v4();
//! let mut deal = DealBuilder::new(
//!     DealNumber::new(2026, 1).unwrap(),
//!     OfferId::new_v4(),
//!     trader,
//!     ClientId::new_v4(),
//!     employee,
//! )
//! .item(OfferItemId::new_v4(), 100, 10, Volume::new(dec!(4.2)).unwrap(), None)
//! .build()
//! .unwrap();
//!
//! deal.set_negotiated_amount(Money::from_decimal(dec!(50000)).unwrap()).unwrap();
//! deal.approve(&Actor::Trader(trader)).unwrap();
//! assert_eq!(deal.status(), DealStatus::Approved);
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::deal_status::DealStatus;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{
    Actor, ClientId, DealId, DealNumber, EmployeeId, Money, OfferId, OfferItemId,
    ShippingCompanyId, TraderId, Volume,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role an actor holds on a specific deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DealRole {
    /// The attached buyer.
    Client,
    /// The attached seller.
    Trader,
    /// The assigned mediating employee.
    Mediator,
}

/// A line item of a deal, referencing one offer item.
///
/// `quantity` must not exceed the referenced offer item's offerable quantity;
/// that precondition is enforced at deal creation against the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealItem {
    /// The offer item this line references.
    pub offer_item_id: OfferItemId,
    /// Units requested.
    pub quantity: u32,
    /// Cartons for the requested units.
    pub cartons: u32,
    /// Cargo volume for the requested units.
    pub cbm: Volume,
    /// Per-unit price agreed for this line, if renegotiated.
    pub negotiated_price: Option<Money>,
}

/// Deal aggregate root.
///
/// # Invariants
///
/// - Status only changes along the lifecycle graph.
/// - `negotiated_amount` is mutable only while the channel is open
///   (NEGOTIATION/APPROVED) and must be positive.
/// - The deal number is assigned at creation and never changes.
/// - Deals are never deleted; cancellation is a terminal status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Unique identifier.
    id: DealId,
    /// Sequential human-readable number, never reused.
    deal_number: DealNumber,
    /// The offer this deal draws items from.
    offer_id: OfferId,
    /// The selling trader.
    trader_id: TraderId,
    /// The buying client.
    client_id: ClientId,
    /// The assigned mediating employee.
    employee_id: EmployeeId,
    /// Carrier chosen for the cargo, if any.
    shipping_company_id: Option<ShippingCompanyId>,
    /// Current lifecycle status.
    status: DealStatus,
    /// The amount the parties agreed on, once reached.
    negotiated_amount: Option<Money>,
    /// Total cartons across all items.
    total_cartons: u32,
    /// Total cargo volume across all items.
    total_cbm: Volume,
    /// The deal's line items.
    items: Vec<DealItem>,
    /// When the deal was created.
    created_at: Timestamp,
    /// When payment was verified and settlement recorded.
    paid_at: Option<Timestamp>,
    /// When the deal was administratively closed.
    settled_at: Option<Timestamp>,
    /// Optimistic-locking version, bumped on every persisted write.
    version: u64,
}

impl Deal {
    fn transition_to(&mut self, target: DealStatus) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTransition {
                deal_id: self.id,
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        Ok(())
    }

    // ========== Accessors ==========

    /// Returns the deal id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> DealId {
        self.id
    }

    /// Returns the human-readable deal number.
    #[inline]
    #[must_use]
    pub fn deal_number(&self) -> DealNumber {
        self.deal_number
    }

    /// Returns the referenced offer id.
    #[inline]
    #[must_use]
    pub fn offer_id(&self) -> OfferId {
        self.offer_id
    }

    /// Returns the selling trader's id.
    #[inline]
    #[must_use]
    pub fn trader_id(&self) -> TraderId {
        self.trader_id
    }

    /// Returns the buying client's id.
    #[inline]
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Returns the assigned employee's id.
    #[inline]
    #[must_use]
    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns the chosen shipping company, if any.
    #[inline]
    #[must_use]
    pub fn shipping_company_id(&self) -> Option<ShippingCompanyId> {
        self.shipping_company_id
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> DealStatus {
        self.status
    }

    /// Returns the negotiated amount, once set.
    #[inline]
    #[must_use]
    pub fn negotiated_amount(&self) -> Option<Money> {
        self.negotiated_amount
    }

    /// Returns the total carton count.
    #[inline]
    #[must_use]
    pub fn total_cartons(&self) -> u32 {
        self.total_cartons
    }

    /// Returns the total cargo volume.
    #[inline]
    #[must_use]
    pub fn total_cbm(&self) -> Volume {
        self.total_cbm
    }

    /// Returns the deal's line items.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[DealItem] {
        &self.items
    }

    /// Returns when the deal was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when payment was verified, if it was.
    #[inline]
    #[must_use]
    pub fn paid_at(&self) -> Option<Timestamp> {
        self.paid_at
    }

    /// Returns when the deal was closed, if it was.
    #[inline]
    #[must_use]
    pub fn settled_at(&self) -> Option<Timestamp> {
        self.settled_at
    }

    /// Returns the optimistic-locking version.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Bumps the optimistic-locking version. Called by repositories on save.
    pub fn bump_version(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    // ========== Authorization ==========

    /// Returns the role `actor` holds on this deal, if any.
    ///
    /// Admins hold no deal role; their authority is platform-wide and is
    /// checked per operation instead.
    #[must_use]
    pub fn role_of(&self, actor: &Actor) -> Option<DealRole> {
        match actor {
            Actor::Client(id) if *id == self.client_id => Some(DealRole::Client),
            Actor::Trader(id) if *id == self.trader_id => Some(DealRole::Trader),
            Actor::Employee(id) if *id == self.employee_id => Some(DealRole::Mediator),
            _ => None,
        }
    }

    /// Returns true if `actor` is a party to this deal (client, trader, or
    /// the assigned employee).
    #[must_use]
    pub fn is_party(&self, actor: &Actor) -> bool {
        self.role_of(actor).is_some()
    }

    /// Returns true if `actor` may read this deal's negotiation channel.
    ///
    /// Employees and admins observe every deal; clients and traders only
    /// deals they are attached to.
    #[must_use]
    pub fn may_observe(&self, actor: &Actor) -> bool {
        match actor {
            Actor::Admin(_) | Actor::Employee(_) => true,
            Actor::Client(_) | Actor::Trader(_) => self.is_party(actor),
        }
    }

    // ========== Negotiated amount ==========

    /// Sets the negotiated amount from an accepted price proposal.
    ///
    /// # Errors
    ///
    /// - [`DomainError::InvalidTransition`] if the channel is closed
    ///   (PAID or terminal)
    /// - [`DomainError::Validation`] for a zero amount
    pub fn set_negotiated_amount(&mut self, amount: Money) -> DomainResult<()> {
        if !self.status.accepts_messages() {
            return Err(DomainError::InvalidTransition {
                deal_id: self.id,
                from: self.status,
                to: self.status,
            });
        }
        if amount.is_zero() {
            return Err(DomainError::validation("negotiated amount must be positive"));
        }
        self.negotiated_amount = Some(amount);
        Ok(())
    }

    // ========== State Transitions ==========

    /// Approves the deal: `NEGOTIATION -> APPROVED`.
    ///
    /// The transition actor must be the deal's trader or its assigned
    /// employee, and the negotiated amount must be set.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] if no positive amount has been agreed
    /// - [`DomainError::Unauthorized`] for any other actor
    /// - [`DomainError::InvalidTransition`] from any status but NEGOTIATION
    pub fn approve(&mut self, actor: &Actor) -> DomainResult<()> {
        if self.status == DealStatus::Negotiation && self.negotiated_amount.is_none() {
            return Err(DomainError::validation(
                "cannot approve a deal without a negotiated amount",
            ));
        }
        match self.role_of(actor) {
            Some(DealRole::Trader | DealRole::Mediator) => {}
            _ => {
                return Err(DomainError::unauthorized(
                    actor.kind(),
                    "only the deal's trader or assigned employee may approve",
                ));
            }
        }
        self.transition_to(DealStatus::Approved)
    }

    /// Marks the deal paid: `APPROVED -> PAID`.
    ///
    /// Invoked by the lifecycle service only after the settlement split has
    /// been computed and every ledger entry durably written; the status write
    /// is the last step of the all-or-nothing sequence.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTransition`] from any status but
    /// APPROVED.
    pub fn mark_paid(&mut self, at: Timestamp) -> DomainResult<()> {
        self.transition_to(DealStatus::Paid)?;
        self.paid_at = Some(at);
        Ok(())
    }

    /// Closes the deal after delivery: `PAID -> SETTLED`.
    ///
    /// Administrative action; no financial computation.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Unauthorized`] unless the actor is an admin or the
    ///   assigned employee
    /// - [`DomainError::InvalidTransition`] from any status but PAID
    pub fn close(&mut self, actor: &Actor) -> DomainResult<()> {
        let authorized = matches!(actor, Actor::Admin(_))
            || matches!(self.role_of(actor), Some(DealRole::Mediator));
        if !authorized {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only an admin or the assigned employee may close a deal",
            ));
        }
        self.transition_to(DealStatus::Settled)?;
        self.settled_at = Some(Timestamp::now());
        Ok(())
    }

    /// Cancels the deal while unpaid.
    ///
    /// Any party with a role on the deal, or an admin, may cancel from
    /// NEGOTIATION or APPROVED. `has_completed_payment` is the caller's
    /// answer from the payment store; once a completed payment exists the
    /// deal is irreversible.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Unauthorized`] for actors without a role on the deal
    /// - [`DomainError::IrreversiblePayment`] once a completed payment exists
    /// - [`DomainError::InvalidTransition`] from PAID or a terminal status
    pub fn cancel(&mut self, actor: &Actor, has_completed_payment: bool) -> DomainResult<()> {
        let authorized = matches!(actor, Actor::Admin(_)) || self.is_party(actor);
        if !authorized {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only a deal party or an admin may cancel",
            ));
        }
        if !self.status.is_cancellable() {
            return Err(DomainError::InvalidTransition {
                deal_id: self.id,
                from: self.status,
                to: DealStatus::Cancelled,
            });
        }
        if has_completed_payment {
            return Err(DomainError::IrreversiblePayment { deal_id: self.id });
        }
        self.transition_to(DealStatus::Cancelled)
    }

    /// Reconstructs a deal from stored parts, bypassing creation validation.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: DealId,
        deal_number: DealNumber,
        offer_id: OfferId,
        trader_id: TraderId,
        client_id: ClientId,
        employee_id: EmployeeId,
        shipping_company_id: Option<ShippingCompanyId>,
        status: DealStatus,
        negotiated_amount: Option<Money>,
        items: Vec<DealItem>,
        total_cartons: u32,
        total_cbm: Volume,
        created_at: Timestamp,
        paid_at: Option<Timestamp>,
        settled_at: Option<Timestamp>,
        version: u64,
    ) -> Self {
        Self {
            id,
            deal_number,
            offer_id,
            trader_id,
            client_id,
            employee_id,
            shipping_company_id,
            status,
            negotiated_amount,
            total_cartons,
            total_cbm,
            items,
            created_at,
            paid_at,
            settled_at,
            version,
        }
    }
}

impl fmt::Display for Deal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Deal[{}] {} status={} items={}",
            self.deal_number,
            self.id,
            self.status,
            self.items.len()
        )
    }
}

/// Builder for new deals.
///
/// Validates the item set and aggregates carton/volume totals. Catalog-level
/// validation (items belong to the offer, quantities fit) happens in the
/// lifecycle service, which sees the referenced [`Offer`].
///
/// [`Offer`]: crate::domain::entities::Offer
#[derive(Debug)]
pub struct DealBuilder {
    deal_number: DealNumber,
    offer_id: OfferId,
    trader_id: TraderId,
    client_id: ClientId,
    employee_id: EmployeeId,
    shipping_company_id: Option<ShippingCompanyId>,
    items: Vec<DealItem>,
}

impl DealBuilder {
    /// Starts a builder for a deal over the given offer and parties.
    #[must_use]
    pub fn new(
        deal_number: DealNumber,
        offer_id: OfferId,
        trader_id: TraderId,
        client_id: ClientId,
        employee_id: EmployeeId,
    ) -> Self {
        Self {
            deal_number,
            offer_id,
            trader_id,
            client_id,
            employee_id,
            shipping_company_id: None,
            items: Vec::new(),
        }
    }

    /// Adds a line item.
    #[must_use]
    pub fn item(
        mut self,
        offer_item_id: OfferItemId,
        quantity: u32,
        cartons: u32,
        cbm: Volume,
        negotiated_price: Option<Money>,
    ) -> Self {
        self.items.push(DealItem {
            offer_item_id,
            quantity,
            cartons,
            cbm,
            negotiated_price,
        });
        self
    }

    /// Sets the shipping company.
    #[must_use]
    pub fn shipping_company(mut self, id: ShippingCompanyId) -> Self {
        self.shipping_company_id = Some(id);
        self
    }

    /// Builds the deal in NEGOTIATION status.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for an empty item set, a zero-quantity
    ///   item, or a duplicated offer-item reference
    /// - [`DomainError::Arithmetic`] if volume totals overflow
    pub fn build(self) -> DomainResult<Deal> {
        if self.items.is_empty() {
            return Err(DomainError::validation("a deal needs at least one item"));
        }
        let mut total_cartons: u32 = 0;
        let mut total_cbm = Volume::ZERO;
        for (idx, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(DomainError::validation(format!(
                    "item {idx} has zero quantity"
                )));
            }
            if self.items[..idx]
                .iter()
                .any(|prior| prior.offer_item_id == item.offer_item_id)
            {
                return Err(DomainError::validation(format!(
                    "offer item {} referenced more than once",
                    item.offer_item_id
                )));
            }
            total_cartons = total_cartons.checked_add(item.cartons).ok_or_else(|| {
                DomainError::validation("total carton count overflows")
            })?;
            total_cbm = total_cbm.checked_add(item.cbm)?;
        }
        Ok(Deal {
            id: DealId::new_v4(),
            deal_number: self.deal_number,
            offer_id: self.offer_id,
            trader_id: self.trader_id,
            client_id: self.client_id,
            employee_id: self.employee_id,
            shipping_company_id: self.shipping_company_id,
            status: DealStatus::Negotiation,
            negotiated_amount: None,
            total_cartons,
            total_cbm,
            items: self.items,
            created_at: Timestamp::now(),
            paid_at: None,
            settled_at: None,
            version: 0,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::domain::value_objects::AdminId;
    use rust_decimal_macros::dec;

    fn parties() -> (TraderId, ClientId, EmployeeId) {
        (TraderId::new_v4(), ClientId::new_v4(), EmployeeId::new_v4())
    }

    fn build_deal(trader: TraderId, client: ClientId, employee: EmployeeId) -> Deal {
        DealBuilder::new(
            DealNumber::new(2026, 1).unwrap(),
            OfferId::new_v4(),
            trader,
            client,
            employee,
        )
        .item(
            OfferItemId::new_v4(),
            100,
            10,
            Volume::new(dec!(4.2)).unwrap(),
            None,
        )
        .item(
            OfferItemId::new_v4(),
            50,
            5,
            Volume::new(dec!(2.1)).unwrap(),
            None,
        )
        .build()
        .unwrap()
    }

    fn amount(value: &str) -> Money {
        Money::from_decimal(value.parse().unwrap()).unwrap()
    }

    mod construction {
        use super::*;

        #[test]
        fn builder_aggregates_totals() {
            let (t, c, e) = parties();
            let deal = build_deal(t, c, e);
            assert_eq!(deal.status(), DealStatus::Negotiation);
            assert_eq!(deal.total_cartons(), 15);
            assert_eq!(deal.total_cbm(), Volume::new(dec!(6.3)).unwrap());
            assert_eq!(deal.items().len(), 2);
            assert!(deal.negotiated_amount().is_none());
            assert_eq!(deal.version(), 0);
        }

        #[test]
        fn builder_rejects_empty_items() {
            let (t, c, e) = parties();
            let result = DealBuilder::new(
                DealNumber::new(2026, 1).unwrap(),
                OfferId::new_v4(),
                t,
                c,
                e,
            )
            .build();
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        #[test]
        fn builder_rejects_zero_quantity() {
            let (t, c, e) = parties();
            let result = DealBuilder::new(
                DealNumber::new(2026, 1).unwrap(),
                OfferId::new_v4(),
                t,
                c,
                e,
            )
            .item(OfferItemId::new_v4(), 0, 1, Volume::ZERO, None)
            .build();
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        #[test]
        fn builder_rejects_duplicate_item_reference() {
            let (t, c, e) = parties();
            let item_id = OfferItemId::new_v4();
            let result = DealBuilder::new(
                DealNumber::new(2026, 1).unwrap(),
                OfferId::new_v4(),
                t,
                c,
                e,
            )
            .item(item_id, 10, 1, Volume::ZERO, None)
            .item(item_id, 20, 2, Volume::ZERO, None)
            .build();
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }
    }

    mod authorization {
        use super::*;

        #[test]
        fn roles_resolve_for_parties() {
            let (t, c, e) = parties();
            let deal = build_deal(t, c, e);
            assert_eq!(deal.role_of(&Actor::Client(c)), Some(DealRole::Client));
            assert_eq!(deal.role_of(&Actor::Trader(t)), Some(DealRole::Trader));
            assert_eq!(deal.role_of(&Actor::Employee(e)), Some(DealRole::Mediator));
            assert_eq!(deal.role_of(&Actor::Client(ClientId::new_v4())), None);
            assert_eq!(deal.role_of(&Actor::Admin(AdminId::new_v4())), None);
        }

        #[test]
        fn observation_rules() {
            let (t, c, e) = parties();
            let deal = build_deal(t, c, e);
            // Staff observe every deal, even unassigned employees.
            assert!(deal.may_observe(&Actor::Employee(EmployeeId::new_v4())));
            assert!(deal.may_observe(&Actor::Admin(AdminId::new_v4())));
            // Attached parties observe, outsiders do not.
            assert!(deal.may_observe(&Actor::Client(c)));
            assert!(!deal.may_observe(&Actor::Client(ClientId::new_v4())));
            assert!(!deal.may_observe(&Actor::Trader(TraderId::new_v4())));
        }
    }

    mod approve {
        use super::*;

        #[test]
        fn trader_approves_with_amount() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("50000.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            assert_eq!(deal.status(), DealStatus::Approved);
        }

        #[test]
        fn assigned_employee_approves() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Employee(e)).unwrap();
            assert_eq!(deal.status(), DealStatus::Approved);
        }

        #[test]
        fn unassigned_employee_cannot_approve() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            let result = deal.approve(&Actor::Employee(EmployeeId::new_v4()));
            assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
            assert_eq!(deal.status(), DealStatus::Negotiation);
        }

        #[test]
        fn client_cannot_approve() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            let result = deal.approve(&Actor::Client(c));
            assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
        }

        #[test]
        fn approval_requires_amount() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            let result = deal.approve(&Actor::Trader(t));
            assert!(matches!(result, Err(DomainError::Validation(_))));
            assert_eq!(deal.status(), DealStatus::Negotiation);
        }
    }

    mod amount {
        use super::*;

        #[test]
        fn amount_rejected_once_paid() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            deal.mark_paid(Timestamp::now()).unwrap();
            let result = deal.set_negotiated_amount(amount("90.00"));
            assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
            assert_eq!(deal.negotiated_amount(), Some(amount("100.00")));
        }

        #[test]
        fn zero_amount_rejected() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            let result = deal.set_negotiated_amount(Money::ZERO);
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        #[test]
        fn amount_may_change_while_approved() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            deal.set_negotiated_amount(amount("95.00")).unwrap();
            assert_eq!(deal.negotiated_amount(), Some(amount("95.00")));
        }
    }

    mod lifecycle {
        use super::*;

        #[test]
        fn full_happy_path() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("50000.00")).unwrap();
            deal.approve(&Actor::Employee(e)).unwrap();
            deal.mark_paid(Timestamp::now()).unwrap();
            assert!(deal.paid_at().is_some());
            deal.close(&Actor::Admin(AdminId::new_v4())).unwrap();
            assert_eq!(deal.status(), DealStatus::Settled);
            assert!(deal.settled_at().is_some());
        }

        #[test]
        fn mark_paid_requires_approved() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            let result = deal.mark_paid(Timestamp::now());
            assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
            assert!(deal.paid_at().is_none());
        }

        #[test]
        fn close_requires_staff() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            deal.mark_paid(Timestamp::now()).unwrap();
            let result = deal.close(&Actor::Trader(t));
            assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
            assert_eq!(deal.status(), DealStatus::Paid);
        }
    }

    mod cancel {
        use super::*;

        #[test]
        fn any_party_cancels_while_unpaid() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.cancel(&Actor::Client(c), false).unwrap();
            assert_eq!(deal.status(), DealStatus::Cancelled);
        }

        #[test]
        fn admin_cancels_approved_deal() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            deal.cancel(&Actor::Admin(AdminId::new_v4()), false).unwrap();
            assert_eq!(deal.status(), DealStatus::Cancelled);
        }

        #[test]
        fn outsider_cannot_cancel() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            let result = deal.cancel(&Actor::Client(ClientId::new_v4()), false);
            assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
            assert_eq!(deal.status(), DealStatus::Negotiation);
        }

        #[test]
        fn completed_payment_blocks_cancellation() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            let result = deal.cancel(&Actor::Client(c), true);
            assert!(matches!(
                result,
                Err(DomainError::IrreversiblePayment { .. })
            ));
            assert_eq!(deal.status(), DealStatus::Approved);
        }

        #[test]
        fn paid_deal_cannot_be_cancelled() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("100.00")).unwrap();
            deal.approve(&Actor::Trader(t)).unwrap();
            deal.mark_paid(Timestamp::now()).unwrap();
            let result = deal.cancel(&Actor::Client(c), true);
            assert!(matches!(result, Err(DomainError::InvalidTransition { .. })));
        }
    }

    mod serde_roundtrip {
        use super::*;

        #[test]
        fn deal_roundtrips() {
            let (t, c, e) = parties();
            let mut deal = build_deal(t, c, e);
            deal.set_negotiated_amount(amount("50000.00")).unwrap();
            let json = serde_json::to_string(&deal).unwrap();
            let back: Deal = serde_json::from_str(&json).unwrap();
            assert_eq!(back, deal);
        }
    }
}
