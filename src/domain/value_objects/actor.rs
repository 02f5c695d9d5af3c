//! # Actor Attribution
//!
//! Tagged actor variant used wherever an action must be attributed to one of
//! the four profile kinds interchangeably (authorization checks, audit
//! records, event payloads). Dispatch is on the variant, never on a nullable
//! foreign key per kind.
//!
//! # Examples
//!
//! ```
//! use deal_desk::domain::value_objects::{Actor, ActorKind, EmployeeId};
//!
//! let actor = Actor::Employee(EmployeeId::new_v4());
//! assert_eq!(actor.kind(), ActorKind::Employee);
//! assert!(actor.is_staff());
//! ```

use crate::domain::value_objects::ids::{AdminId, ClientId, EmployeeId, TraderId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kind of profile performing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum ActorKind {
    /// Platform operator.
    Admin = 0,
    /// Mediator/validator assigned to deals.
    Employee = 1,
    /// Seller profile.
    Trader = 2,
    /// Buyer profile.
    Client = 3,
}

impl fmt::Display for ActorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Admin => "ADMIN",
            Self::Employee => "EMPLOYEE",
            Self::Trader => "TRADER",
            Self::Client => "CLIENT",
        };
        write!(f, "{s}")
    }
}

/// Error returned when parsing an unknown actor kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidActorKindError(
    /// The unrecognized input.
    pub String,
);

impl fmt::Display for InvalidActorKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid actor kind: {}", self.0)
    }
}

impl std::error::Error for InvalidActorKindError {}

impl FromStr for ActorKind {
    type Err = InvalidActorKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Self::Admin),
            "EMPLOYEE" => Ok(Self::Employee),
            "TRADER" => Ok(Self::Trader),
            "CLIENT" => Ok(Self::Client),
            other => Err(InvalidActorKindError(other.to_string())),
        }
    }
}

/// An acting party: profile kind plus profile identifier.
///
/// Used for transition authorization, message attribution, and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Actor {
    /// A platform operator.
    Admin(AdminId),
    /// An employee mediator.
    Employee(EmployeeId),
    /// A trader (seller).
    Trader(TraderId),
    /// A client (buyer).
    Client(ClientId),
}

impl Actor {
    /// Returns the kind of this actor.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ActorKind {
        match self {
            Self::Admin(_) => ActorKind::Admin,
            Self::Employee(_) => ActorKind::Employee,
            Self::Trader(_) => ActorKind::Trader,
            Self::Client(_) => ActorKind::Client,
        }
    }

    /// Returns the raw profile UUID regardless of kind.
    #[inline]
    #[must_use]
    pub const fn profile_uuid(&self) -> Uuid {
        match self {
            Self::Admin(id) => id.as_uuid(),
            Self::Employee(id) => id.as_uuid(),
            Self::Trader(id) => id.as_uuid(),
            Self::Client(id) => id.as_uuid(),
        }
    }

    /// Returns true for platform staff (admin or employee).
    #[inline]
    #[must_use]
    pub const fn is_staff(&self) -> bool {
        matches!(self, Self::Admin(_) | Self::Employee(_))
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.profile_uuid())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(Actor::Admin(AdminId::new_v4()).kind(), ActorKind::Admin);
        assert_eq!(
            Actor::Employee(EmployeeId::new_v4()).kind(),
            ActorKind::Employee
        );
        assert_eq!(Actor::Trader(TraderId::new_v4()).kind(), ActorKind::Trader);
        assert_eq!(Actor::Client(ClientId::new_v4()).kind(), ActorKind::Client);
    }

    #[test]
    fn staff_classification() {
        assert!(Actor::Admin(AdminId::new_v4()).is_staff());
        assert!(Actor::Employee(EmployeeId::new_v4()).is_staff());
        assert!(!Actor::Trader(TraderId::new_v4()).is_staff());
        assert!(!Actor::Client(ClientId::new_v4()).is_staff());
    }

    #[test]
    fn kind_parse_roundtrip() {
        for kind in [
            ActorKind::Admin,
            ActorKind::Employee,
            ActorKind::Trader,
            ActorKind::Client,
        ] {
            assert_eq!(kind.to_string().parse::<ActorKind>().unwrap(), kind);
        }
        assert!("OTHER".parse::<ActorKind>().is_err());
    }

    #[test]
    fn serde_tags_by_kind() {
        let id = ClientId::new_v4();
        let actor = Actor::Client(id);
        let json = serde_json::to_string(&actor).unwrap();
        assert!(json.contains("\"kind\":\"CLIENT\""));
        let back: Actor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, actor);
    }

    #[test]
    fn display_includes_kind_and_id() {
        let id = TraderId::new_v4();
        let text = Actor::Trader(id).to_string();
        assert!(text.starts_with("TRADER:"));
        assert!(text.contains(&id.to_string()));
    }
}
