//! # Identifier Types
//!
//! UUID-based identifier newtypes for every aggregate and record kind.
//!
//! Each identifier is a transparent wrapper around a v4 UUID. Distinct types
//! keep a `TraderId` from ever being passed where a `ClientId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new_v4() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// The nil identifier (all zeros).
            #[must_use]
            pub const fn nil() -> Self {
                Self(Uuid::nil())
            }

            /// Returns the underlying UUID.
            #[inline]
            #[must_use]
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }
    };
}

uuid_id!(
    /// Identifier for a [`Deal`](crate::domain::entities::Deal).
    DealId
);
uuid_id!(
    /// Identifier for an [`Offer`](crate::domain::entities::Offer).
    OfferId
);
uuid_id!(
    /// Identifier for an [`OfferItem`](crate::domain::entities::OfferItem).
    OfferItemId
);
uuid_id!(
    /// Identifier for a client (buyer) profile.
    ClientId
);
uuid_id!(
    /// Identifier for a trader (seller) profile.
    TraderId
);
uuid_id!(
    /// Identifier for an employee (mediator) profile.
    EmployeeId
);
uuid_id!(
    /// Identifier for a platform-operator profile.
    AdminId
);
uuid_id!(
    /// Identifier for a negotiation message.
    MessageId
);
uuid_id!(
    /// Identifier for a [`Payment`](crate::domain::entities::Payment).
    PaymentId
);
uuid_id!(
    /// Identifier for a financial transaction.
    TransactionId
);
uuid_id!(
    /// Identifier for a ledger entry.
    LedgerEntryId
);
uuid_id!(
    /// Identifier for a domain event.
    EventId
);
uuid_id!(
    /// Identifier for a shipping company referenced by a deal.
    ShippingCompanyId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_v4_is_unique() {
        assert_ne!(DealId::new_v4(), DealId::new_v4());
    }

    #[test]
    fn nil_is_zero() {
        assert_eq!(DealId::nil().as_uuid(), Uuid::nil());
    }

    #[test]
    fn display_matches_uuid() {
        let raw = Uuid::new_v4();
        let id = TraderId::from_uuid(raw);
        assert_eq!(id.to_string(), raw.to_string());
    }

    #[test]
    fn serde_is_transparent() {
        let id = ClientId::new_v4();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let back: ClientId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
