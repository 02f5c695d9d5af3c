//! # Negotiation Service
//!
//! The append-only message channel attached to each deal.
//!
//! Exactly one client and one trader talk on a channel, observed by the
//! deal's assigned employee. Messages optionally carry a price/quantity
//! proposal; posting never touches the deal's negotiated amount. The
//! amount changes only when the counter-party or the assigned employee
//! explicitly accepts a proposal, which copies its price into the deal.
//!
//! The channel closes once the deal leaves the negotiable statuses: no
//! posting on PAID, SETTLED, or CANCELLED deals.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::application::services::{emit_audit, publish_event, DealLocks};
use crate::domain::audit::{AuditRecord, AuditSink};
use crate::domain::entities::deal::{Deal, DealRole};
use crate::domain::entities::negotiation_message::NegotiationMessage;
use crate::domain::errors::DomainError;
use crate::domain::events::negotiation_events::{MessagePosted, ProposalAccepted};
use crate::domain::value_objects::{Actor, DealId, MessageId, Money};
use crate::infrastructure::audit::TracingAuditSink;
use crate::infrastructure::persistence::event_store::EventStore;
use crate::infrastructure::persistence::in_memory::InMemoryEventStore;
use crate::infrastructure::persistence::traits::{DealRepository, MessageRepository};
use std::sync::Arc;
use tracing::info;

/// Application service for the negotiation channel.
#[derive(Debug)]
pub struct NegotiationService {
    deals: Arc<dyn DealRepository>,
    messages: Arc<dyn MessageRepository>,
    audit: Arc<dyn AuditSink>,
    events: Arc<dyn EventStore>,
    locks: Arc<DealLocks>,
}

impl NegotiationService {
    /// Creates the service with a tracing audit sink and an in-memory
    /// event feed.
    #[must_use]
    pub fn new(deals: Arc<dyn DealRepository>, messages: Arc<dyn MessageRepository>) -> Self {
        Self {
            deals,
            messages,
            audit: Arc::new(TracingAuditSink::new()),
            events: Arc::new(InMemoryEventStore::new()),
            locks: Arc::new(DealLocks::new()),
        }
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

    /// Shares a deal-lock registry with the lifecycle service, so a
    /// proposal acceptance never races a transition on the same deal.
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

    // ========== Posting ==========

    /// Appends a message to a deal's channel.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal
    /// - [`DomainError::ChannelClosed`] once the deal is PAID or terminal
    /// - [`DomainError::Unauthorized`] unless the sender is the deal's
    ///   client, trader, or assigned employee
    /// - [`DomainError::InvalidMessage`] when content and both proposal
    ///   fields are empty, or a proposal field is zero
    pub async fn post_message(
        &self,
        deal_id: DealId,
        sender: Actor,
        content: Option<String>,
        proposed_price: Option<Money>,
        proposed_quantity: Option<u32>,
    ) -> ApplicationResult<NegotiationMessage> {
        let outcome = self
            .post_inner(deal_id, sender, content, proposed_price, proposed_quantity)
            .await;

        let record = match &outcome {
            Ok(message) => {
                AuditRecord::success(Some(sender), "negotiation.post", "NegotiationMessage", message.id())
            }
            Err(_) => AuditRecord::rejection(Some(sender), "negotiation.post", "Deal", deal_id),
        };
        emit_audit(self.audit.as_ref(), record).await;
        outcome
    }

    async fn post_inner(
        &self,
        deal_id: DealId,
        sender: Actor,
        content: Option<String>,
        proposed_price: Option<Money>,
        proposed_quantity: Option<u32>,
    ) -> ApplicationResult<NegotiationMessage> {
        let deal = self.load_deal(deal_id).await?;
        if !deal.status().accepts_messages() {
            return Err(DomainError::ChannelClosed {
                deal_id,
                status: deal.status(),
            }
            .into());
        }
        if !deal.is_party(&sender) {
            return Err(DomainError::unauthorized(
                sender.kind(),
                "not a party to this deal's channel",
            )
            .into());
        }

        let message =
            NegotiationMessage::compose(deal_id, sender, content, proposed_price, proposed_quantity)?;
        let message = self.messages.append(message).await?;

        info!(deal = %deal_id, message = %message.id(), kind = %message.kind(), "message posted");
        publish_event(
            self.events.as_ref(),
            &MessagePosted::new(deal_id, message.id(), sender, message.kind()),
        )
        .await;
        Ok(message)
    }

    // ========== Reading ==========

    /// Lists a deal's messages ordered by creation time, ties broken by
    /// insertion sequence.
    ///
    /// Employees and admins read any deal's channel; clients and traders
    /// only channels of deals they are attached to.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal
    /// - [`DomainError::Unauthorized`] for readers outside the deal
    pub async fn list_messages(
        &self,
        deal_id: DealId,
        reader: &Actor,
    ) -> ApplicationResult<Vec<NegotiationMessage>> {
        let deal = self.load_deal(deal_id).await?;
        if !deal.may_observe(reader) {
            return Err(
                DomainError::unauthorized(reader.kind(), "may not read this deal's channel").into(),
            );
        }
        Ok(self.messages.list_for_deal(deal_id).await?)
    }

    /// Counts channel messages the reader has not yet seen.
    ///
    /// A reader's own messages never count as unread.
    ///
    /// # Errors
    ///
    /// Same as [`list_messages`](Self::list_messages).
    pub async fn unread_count(&self, deal_id: DealId, reader: &Actor) -> ApplicationResult<usize> {
        let messages = self.list_messages(deal_id, reader).await?;
        Ok(messages
            .iter()
            .filter(|message| !message.is_read() && message.sender() != *reader)
            .count())
    }

    /// Marks every message the reader has not sent as read. Returns how
    /// many messages the call flipped.
    ///
    /// # Errors
    ///
    /// Same as [`list_messages`](Self::list_messages).
    pub async fn mark_read(&self, deal_id: DealId, reader: &Actor) -> ApplicationResult<usize> {
        let messages = self.list_messages(deal_id, reader).await?;
        let mut flipped = 0;
        for mut message in messages {
            if !message.is_read() && message.sender() != *reader {
                message.mark_read();
                self.messages.save(&message).await?;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    // ========== Acceptance ==========

    /// Accepts a price proposal, copying its price into the deal.
    ///
    /// Only the proposal's counter-party or the deal's assigned employee
    /// may accept. Acceptance is the sole path by which the channel moves
    /// the deal's negotiated amount.
    ///
    /// # Errors
    ///
    /// - [`ApplicationError::NotFound`] for an unknown deal or message
    /// - [`DomainError::NotAProposal`] when the message carries no price
    /// - [`DomainError::Unauthorized`] for the proposer's own side or
    ///   outsiders
    /// - [`DomainError::InvalidTransition`] once the channel is closed
    pub async fn accept_proposal(
        &self,
        deal_id: DealId,
        message_id: MessageId,
        actor: Actor,
    ) -> ApplicationResult<Deal> {
        let _guard = self.locks.acquire(deal_id).await;
        let outcome = self.accept_inner(deal_id, message_id, actor).await;

        let record = match &outcome {
            Ok(_) => {
                AuditRecord::success(Some(actor), "negotiation.accept", "NegotiationMessage", message_id)
            }
            Err(_) => {
                AuditRecord::rejection(Some(actor), "negotiation.accept", "NegotiationMessage", message_id)
            }
        };
        emit_audit(self.audit.as_ref(), record).await;
        outcome
    }

    async fn accept_inner(
        &self,
        deal_id: DealId,
        message_id: MessageId,
        actor: Actor,
    ) -> ApplicationResult<Deal> {
        let mut deal = self.load_deal(deal_id).await?;
        let message = self
            .messages
            .get(message_id)
            .await?
            .filter(|message| message.deal_id() == deal_id)
            .ok_or_else(|| ApplicationError::not_found("NegotiationMessage", message_id))?;

        if !message.is_acceptable_proposal() {
            return Err(DomainError::NotAProposal { message_id }.into());
        }
        let price = message
            .proposed_price()
            .ok_or(DomainError::NotAProposal { message_id })?;

        let actor_role = deal.role_of(&actor);
        let sender_role = deal.role_of(&message.sender());
        let authorized = match actor_role {
            Some(DealRole::Mediator) => true,
            Some(role) => sender_role != Some(role),
            None => false,
        };
        if !authorized {
            return Err(DomainError::unauthorized(
                actor.kind(),
                "only the counter-party or the assigned employee may accept a proposal",
            )
            .into());
        }

        let previous = deal.negotiated_amount();
        deal.set_negotiated_amount(price)?;
        self.deals.save(&mut deal).await?;

        info!(
            deal = %deal_id,
            message = %message_id,
            price = %price,
            previous = ?previous.map(|amount| amount.to_string()),
            "proposal accepted"
        );
        publish_event(
            self.events.as_ref(),
            &ProposalAccepted::new(deal_id, message_id, actor, price),
        )
        .await;
        Ok(deal)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::entities::deal::DealBuilder;
    use crate::domain::value_objects::{
        AdminId, ClientId, DealNumber, DealStatus, EmployeeId, MessageKind, OfferId, OfferItemId,
        Timestamp, TraderId, Volume,
    };
    use crate::infrastructure::audit::{FailingAuditSink, InMemoryAuditSink};
    use crate::infrastructure::persistence::in_memory::{
        InMemoryDealRepository, InMemoryMessageRepository,
    };
    use rust_decimal_macros::dec;

    struct Channel {
        service: NegotiationService,
        deals: Arc<InMemoryDealRepository>,
        deal_id: DealId,
        client: Actor,
        trader: Actor,
        employee: Actor,
    }

    async fn channel() -> Channel {
        let deals = Arc::new(InMemoryDealRepository::new());
        let messages = Arc::new(InMemoryMessageRepository::new());

        let trader = TraderId::new_v4();
        let client = ClientId::new_v4();
        let employee = EmployeeId::new_v4();
        let deal = DealBuilder::new(
            DealNumber::new(2026, 1).unwrap(),
            OfferId::new_v4(),
            trader,
            client,
            employee,
        )
        .item(OfferItemId::new_v4(), 100, 10, Volume::new(dec!(4.2)).unwrap(), None)
        .build()
        .unwrap();
        let deal_id = deal.id();
        deals.insert(&deal).await.unwrap();

        Channel {
            service: NegotiationService::new(deals.clone(), messages),
            deals,
            deal_id,
            client: Actor::Client(client),
            trader: Actor::Trader(trader),
            employee: Actor::Employee(employee),
        }
    }

    fn price(value: &str) -> Money {
        Money::from_decimal(value.parse().unwrap()).unwrap()
    }

    mod posting {
        use super::*;

        #[tokio::test]
        async fn parties_converse_in_order() {
            let ch = channel().await;
            ch.service
                .post_message(ch.deal_id, ch.client, Some("can you do 48k?".into()), None, None)
                .await
                .unwrap();
            ch.service
                .post_message(ch.deal_id, ch.trader, None, Some(price("48500.00")), None)
                .await
                .unwrap();
            ch.service
                .post_message(ch.deal_id, ch.employee, Some("looks fair".into()), None, None)
                .await
                .unwrap();

            let messages = ch.service.list_messages(ch.deal_id, &ch.employee).await.unwrap();
            assert_eq!(messages.len(), 3);
            assert_eq!(messages[0].sender(), ch.client);
            assert_eq!(messages[1].kind(), MessageKind::PriceProposal);
            assert!(messages[0].sequence() < messages[1].sequence());
        }

        #[tokio::test]
        async fn outsiders_cannot_post() {
            let ch = channel().await;
            let stranger = Actor::Client(ClientId::new_v4());
            let err = ch
                .service
                .post_message(ch.deal_id, stranger, Some("hi".into()), None, None)
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());

            // Unassigned employees may read but not post.
            let other_employee = Actor::Employee(EmployeeId::new_v4());
            let err = ch
                .service
                .post_message(ch.deal_id, other_employee, Some("hi".into()), None, None)
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());
        }

        #[tokio::test]
        async fn empty_proposal_rejected_and_not_stored() {
            let ch = channel().await;
            let err = ch
                .service
                .post_message(ch.deal_id, ch.client, None, None, None)
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_domain(),
                Some(DomainError::InvalidMessage(_))
            ));
            assert!(
                ch.service
                    .list_messages(ch.deal_id, &ch.employee)
                    .await
                    .unwrap()
                    .is_empty()
            );
        }

        #[tokio::test]
        async fn channel_closes_once_paid() {
            let ch = channel().await;
            let mut deal = ch.deals.get(ch.deal_id).await.unwrap().unwrap();
            deal.set_negotiated_amount(price("48000.00")).unwrap();
            deal.approve(&ch.trader).unwrap();
            deal.mark_paid(Timestamp::now()).unwrap();
            ch.deals.save(&mut deal).await.unwrap();

            let err = ch
                .service
                .post_message(ch.deal_id, ch.client, Some("wait".into()), None, None)
                .await
                .unwrap_err();
            assert!(matches!(
                err.as_domain(),
                Some(DomainError::ChannelClosed {
                    status: DealStatus::Paid,
                    ..
                })
            ));
        }

        #[tokio::test]
        async fn unknown_deal_not_found() {
            let ch = channel().await;
            let err = ch
                .service
                .post_message(DealId::new_v4(), ch.client, Some("hi".into()), None, None)
                .await
                .unwrap_err();
            assert!(matches!(err, ApplicationError::NotFound { .. }));
        }
    }

    mod reading {
        use super::*;

        #[tokio::test]
        async fn observation_is_scoped() {
            let ch = channel().await;
            ch.service
                .post_message(ch.deal_id, ch.client, Some("hello".into()), None, None)
                .await
                .unwrap();

            // Staff see everything, even unassigned.
            let other_employee = Actor::Employee(EmployeeId::new_v4());
            assert_eq!(
                ch.service
                    .list_messages(ch.deal_id, &other_employee)
                    .await
                    .unwrap()
                    .len(),
                1
            );
            assert_eq!(
                ch.service
                    .list_messages(ch.deal_id, &Actor::Admin(AdminId::new_v4()))
                    .await
                    .unwrap()
                    .len(),
                1
            );

            // Unattached clients/traders see nothing.
            let err = ch
                .service
                .list_messages(ch.deal_id, &Actor::Client(ClientId::new_v4()))
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());
        }

        #[tokio::test]
        async fn unread_tracking() {
            let ch = channel().await;
            ch.service
                .post_message(ch.deal_id, ch.client, Some("one".into()), None, None)
                .await
                .unwrap();
            ch.service
                .post_message(ch.deal_id, ch.client, Some("two".into()), None, None)
                .await
                .unwrap();
            ch.service
                .post_message(ch.deal_id, ch.trader, Some("reply".into()), None, None)
                .await
                .unwrap();

            // Own messages never count as unread.
            assert_eq!(ch.service.unread_count(ch.deal_id, &ch.client).await.unwrap(), 1);
            assert_eq!(ch.service.unread_count(ch.deal_id, &ch.trader).await.unwrap(), 2);

            assert_eq!(ch.service.mark_read(ch.deal_id, &ch.trader).await.unwrap(), 2);
            assert_eq!(ch.service.unread_count(ch.deal_id, &ch.trader).await.unwrap(), 0);
            // Marking is idempotent.
            assert_eq!(ch.service.mark_read(ch.deal_id, &ch.trader).await.unwrap(), 0);
        }
    }

    mod acceptance {
        use super::*;

        #[tokio::test]
        async fn posting_never_moves_the_amount() {
            let ch = channel().await;
            ch.service
                .post_message(ch.deal_id, ch.trader, None, Some(price("48500.00")), None)
                .await
                .unwrap();
            let deal = ch.deals.get(ch.deal_id).await.unwrap().unwrap();
            assert!(deal.negotiated_amount().is_none());
        }

        #[tokio::test]
        async fn counter_party_accepts() {
            let ch = channel().await;
            let message = ch
                .service
                .post_message(ch.deal_id, ch.trader, None, Some(price("48500.00")), Some(100))
                .await
                .unwrap();

            let deal = ch
                .service
                .accept_proposal(ch.deal_id, message.id(), ch.client)
                .await
                .unwrap();
            assert_eq!(deal.negotiated_amount(), Some(price("48500.00")));
        }

        #[tokio::test]
        async fn proposer_side_cannot_accept_its_own() {
            let ch = channel().await;
            let message = ch
                .service
                .post_message(ch.deal_id, ch.trader, None, Some(price("48500.00")), None)
                .await
                .unwrap();

            let err = ch
                .service
                .accept_proposal(ch.deal_id, message.id(), ch.trader)
                .await
                .unwrap_err();
            assert!(err.is_unauthorized());
            let deal = ch.deals.get(ch.deal_id).await.unwrap().unwrap();
            assert!(deal.negotiated_amount().is_none());
        }

        #[tokio::test]
        async fn assigned_employee_accepts() {
            let ch = channel().await;
            let message = ch
                .service
                .post_message(ch.deal_id, ch.client, None, Some(price("47000.00")), None)
                .await
                .unwrap();

            let deal = ch
                .service
                .accept_proposal(ch.deal_id, message.id(), ch.employee)
                .await
                .unwrap();
            assert_eq!(deal.negotiated_amount(), Some(price("47000.00")));
        }

        #[tokio::test]
        async fn text_and_quantity_only_messages_are_not_acceptable() {
            let ch = channel().await;
            let text = ch
                .service
                .post_message(ch.deal_id, ch.trader, Some("hello".into()), None, None)
                .await
                .unwrap();
            let err = ch
                .service
                .accept_proposal(ch.deal_id, text.id(), ch.client)
                .await
                .unwrap_err();
            assert!(matches!(err.as_domain(), Some(DomainError::NotAProposal { .. })));

            let quantity_only = ch
                .service
                .post_message(ch.deal_id, ch.trader, None, None, Some(50))
                .await
                .unwrap();
            let err = ch
                .service
                .accept_proposal(ch.deal_id, quantity_only.id(), ch.client)
                .await
                .unwrap_err();
            assert!(matches!(err.as_domain(), Some(DomainError::NotAProposal { .. })));
        }
    }

    mod auditing {
        use super::*;

        #[tokio::test]
        async fn posts_and_rejections_are_recorded() {
            let ch = channel().await;
            let sink = Arc::new(InMemoryAuditSink::new());
            let service = NegotiationService::new(
                ch.deals.clone(),
                Arc::new(InMemoryMessageRepository::new()),
            )
            .with_audit(sink.clone());

            service
                .post_message(ch.deal_id, ch.client, Some("hi".into()), None, None)
                .await
                .unwrap();
            let _ = service
                .post_message(ch.deal_id, ch.client, None, None, None)
                .await;

            let records = sink.records_for_action("negotiation.post").await;
            assert_eq!(records.len(), 2);
            assert!(records[0].success);
            assert!(!records[1].success);
        }

        #[tokio::test]
        async fn failing_sink_never_blocks_posting() {
            let ch = channel().await;
            let messages = Arc::new(InMemoryMessageRepository::new());
            let service = NegotiationService::new(ch.deals.clone(), messages)
                .with_audit(Arc::new(FailingAuditSink::new()));

            let message = service
                .post_message(ch.deal_id, ch.client, Some("still works".into()), None, None)
                .await
                .unwrap();
            assert_eq!(message.content(), Some("still works"));
        }
    }
}
