//! # Negotiation Message
//!
//! One immutable entry in a deal's append-only negotiation channel.
//!
//! A message is either free text or a price proposal carrying a proposed
//! price and/or quantity. Messages never mutate the deal by themselves;
//! the negotiated amount only changes when the counter-party or the
//! assigned employee explicitly accepts a proposal.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::entities::NegotiationMessage;
//! use deal_desk::domain::value_objects::{Actor, ClientId, DealId, MessageKind, Money};
//!
//! let sender = Actor::Client(ClientId::new_v4());
//! let msg = NegotiationMessage::compose(
//!     DealId::new_v4(),
//!     sender,
//!     None,
//!     Some(Money::new(48_000_00, 2).unwrap()),
//!     None,
//! )
//! .unwrap();
//!
//! assert_eq!(msg.kind(), MessageKind::PriceProposal);
//! assert!(!msg.is_read());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{Actor, DealId, MessageId, MessageKind, Money};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable negotiation-channel message.
///
/// # Invariants
///
/// - The sender is a client, trader, or employee — never an admin.
/// - A `PRICE_PROPOSAL` carries at least one of proposed price / quantity.
/// - A `TEXT` message carries non-blank content.
/// - Ordering is `created_at` ascending, ties broken by the insertion
///   sequence the message repository assigns on append.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationMessage {
    /// Unique identifier.
    id: MessageId,
    /// The deal whose channel this message belongs to.
    deal_id: DealId,
    /// Who posted the message.
    sender: Actor,
    /// Text or price proposal.
    kind: MessageKind,
    /// Free-form content, if any.
    content: Option<String>,
    /// Proposed total price, for proposals.
    proposed_price: Option<Money>,
    /// Proposed quantity, for proposals.
    proposed_quantity: Option<u32>,
    /// Whether the counter-party has read the message.
    is_read: bool,
    /// Insertion sequence within the channel; assigned on append.
    sequence: u64,
    /// When the message was posted.
    created_at: Timestamp,
}

impl NegotiationMessage {
    /// Composes a message from the raw channel inputs.
    ///
    /// The kind is derived: any proposal field makes it a
    /// [`MessageKind::PriceProposal`], otherwise it is plain text.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Unauthorized`] if the sender is an admin profile
    /// - [`DomainError::InvalidMessage`] if content and both proposal fields
    ///   are empty, if text content is blank, or if a proposed price or
    ///   quantity is zero
    pub fn compose(
        deal_id: DealId,
        sender: Actor,
        content: Option<String>,
        proposed_price: Option<Money>,
        proposed_quantity: Option<u32>,
    ) -> DomainResult<Self> {
        if matches!(sender, Actor::Admin(_)) {
            return Err(DomainError::unauthorized(
                sender.kind(),
                "admin profiles do not post negotiation messages",
            ));
        }
        let content = content
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let kind = if proposed_price.is_some() || proposed_quantity.is_some() {
            MessageKind::PriceProposal
        } else {
            MessageKind::Text
        };

        match kind {
            MessageKind::Text => {
                if content.is_none() {
                    return Err(DomainError::invalid_message(
                        "a message needs content or a proposal",
                    ));
                }
            }
            MessageKind::PriceProposal => {
                if let Some(price) = proposed_price
                    && price.is_zero()
                {
                    return Err(DomainError::invalid_message(
                        "a proposed price must be positive",
                    ));
                }
                if proposed_quantity == Some(0) {
                    return Err(DomainError::invalid_message(
                        "a proposed quantity must be positive",
                    ));
                }
            }
        }

        Ok(Self {
            id: MessageId::new_v4(),
            deal_id,
            sender,
            kind,
            content,
            proposed_price,
            proposed_quantity,
            is_read: false,
            sequence: 0,
            created_at: Timestamp::now(),
        })
    }

    /// Convenience constructor for a plain text message.
    ///
    /// # Errors
    ///
    /// Same as [`compose`](Self::compose).
    pub fn text(deal_id: DealId, sender: Actor, content: impl Into<String>) -> DomainResult<Self> {
        Self::compose(deal_id, sender, Some(content.into()), None, None)
    }

    // ========== Accessors ==========

    /// Returns the message id.
    #[inline]
    #[must_use]
    pub fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the deal this message belongs to.
    #[inline]
    #[must_use]
    pub fn deal_id(&self) -> DealId {
        self.deal_id
    }

    /// Returns the sender.
    #[inline]
    #[must_use]
    pub fn sender(&self) -> Actor {
        self.sender
    }

    /// Returns the message kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    /// Returns the text content, if any.
    #[must_use]
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Returns the proposed price, for proposals.
    #[inline]
    #[must_use]
    pub fn proposed_price(&self) -> Option<Money> {
        self.proposed_price
    }

    /// Returns the proposed quantity, for proposals.
    #[inline]
    #[must_use]
    pub fn proposed_quantity(&self) -> Option<u32> {
        self.proposed_quantity
    }

    /// Returns true once the counter-party has read the message.
    #[inline]
    #[must_use]
    pub fn is_read(&self) -> bool {
        self.is_read
    }

    /// Returns the channel insertion sequence.
    #[inline]
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns when the message was posted.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns true if this message carries a price usable for acceptance.
    #[must_use]
    pub fn is_acceptable_proposal(&self) -> bool {
        self.kind == MessageKind::PriceProposal && self.proposed_price.is_some()
    }

    /// Marks the message read.
    pub fn mark_read(&mut self) {
        self.is_read = true;
    }

    /// Assigns the channel insertion sequence. Called once on append.
    pub(crate) fn assign_sequence(&mut self, sequence: u64) {
        self.sequence = sequence;
    }
}

impl fmt::Display for NegotiationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message[{}] deal={} {} from={}",
            self.id, self.deal_id, self.kind, self.sender
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{AdminId, ClientId, TraderId};
    use rust_decimal_macros::dec;

    fn client() -> Actor {
        Actor::Client(ClientId::new_v4())
    }

    fn price(value: &str) -> Money {
        Money::from_decimal(value.parse().unwrap()).unwrap()
    }

    #[test]
    fn text_message_composes() {
        let msg = NegotiationMessage::text(DealId::new_v4(), client(), "can you do 48k?").unwrap();
        assert_eq!(msg.kind(), MessageKind::Text);
        assert_eq!(msg.content(), Some("can you do 48k?"));
        assert!(!msg.is_read());
        assert_eq!(msg.sequence(), 0);
    }

    #[test]
    fn proposal_with_price_only() {
        let msg = NegotiationMessage::compose(
            DealId::new_v4(),
            Actor::Trader(TraderId::new_v4()),
            None,
            Some(price("48000.00")),
            None,
        )
        .unwrap();
        assert_eq!(msg.kind(), MessageKind::PriceProposal);
        assert!(msg.is_acceptable_proposal());
    }

    #[test]
    fn proposal_with_quantity_only() {
        let msg = NegotiationMessage::compose(DealId::new_v4(), client(), None, None, Some(250))
            .unwrap();
        assert_eq!(msg.kind(), MessageKind::PriceProposal);
        // No price attached, so nothing to accept into the deal.
        assert!(!msg.is_acceptable_proposal());
    }

    #[test]
    fn empty_message_rejected() {
        let result = NegotiationMessage::compose(DealId::new_v4(), client(), None, None, None);
        assert!(matches!(result, Err(DomainError::InvalidMessage(_))));
    }

    #[test]
    fn blank_text_rejected() {
        let result =
            NegotiationMessage::compose(DealId::new_v4(), client(), Some("   ".into()), None, None);
        assert!(matches!(result, Err(DomainError::InvalidMessage(_))));
    }

    #[test]
    fn zero_price_proposal_rejected() {
        let result = NegotiationMessage::compose(
            DealId::new_v4(),
            client(),
            None,
            Some(Money::ZERO),
            None,
        );
        assert!(matches!(result, Err(DomainError::InvalidMessage(_))));
    }

    #[test]
    fn zero_quantity_proposal_rejected() {
        let result =
            NegotiationMessage::compose(DealId::new_v4(), client(), None, None, Some(0));
        assert!(matches!(result, Err(DomainError::InvalidMessage(_))));
    }

    #[test]
    fn admin_sender_rejected() {
        let result = NegotiationMessage::text(
            DealId::new_v4(),
            Actor::Admin(AdminId::new_v4()),
            "observing",
        );
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[test]
    fn proposal_may_carry_content_too() {
        let msg = NegotiationMessage::compose(
            DealId::new_v4(),
            client(),
            Some("final offer".into()),
            Some(price("47500.00")),
            Some(200),
        )
        .unwrap();
        assert_eq!(msg.kind(), MessageKind::PriceProposal);
        assert_eq!(msg.content(), Some("final offer"));
        assert_eq!(msg.proposed_price(), Some(price("47500.00")));
        assert_eq!(msg.proposed_quantity(), Some(200));
    }

    #[test]
    fn mark_read_flips_flag() {
        let mut msg = NegotiationMessage::text(DealId::new_v4(), client(), "hello").unwrap();
        msg.mark_read();
        assert!(msg.is_read());
    }

    #[test]
    fn serde_roundtrip() {
        let msg = NegotiationMessage::compose(
            DealId::new_v4(),
            client(),
            Some("counter".into()),
            Some(Money::from_decimal(dec!(42.00)).unwrap()),
            None,
        )
        .unwrap();
        let json = serde_json::to_string(&msg).unwrap();
        let back: NegotiationMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }
}
