//! # Actor Profiles and Dual-Profile Links
//!
//! Account profiles for the four actor kinds, credential digests, and the
//! immutable one-to-one link between a Client and a Trader profile held by
//! the same natural person.
//!
//! A dual-profile link exists only when both profiles carry byte-equal
//! emails and the same credential secret. The link is resolved once, at
//! link-creation time, and stored explicitly — it is never re-derived from
//! email equality on later reads.

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{AdminId, ClientId, EmployeeId, TraderCode, TraderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA-256 digest of a login secret.
///
/// Profiles never store the secret itself; resolution hashes the presented
/// secret and compares digests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Digests a secret.
    #[must_use]
    pub fn from_secret(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        Self(format!("{digest:x}"))
    }

    /// Returns true if the presented secret digests to this hash.
    #[must_use]
    pub fn matches(&self, secret: &str) -> bool {
        Self::from_secret(secret) == *self
    }
}

impl fmt::Display for CredentialHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Digest prefix only; full hashes stay out of logs.
        write!(f, "sha256:{}…", self.0.get(..8).unwrap_or(""))
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::validation(format!(
            "malformed email: {email:?}"
        )));
    }
    Ok(())
}

/// A buyer profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    /// Unique identifier.
    pub id: ClientId,
    /// Login email, unique among clients.
    pub email: String,
    /// Credential digest.
    pub credential: CredentialHash,
    /// When the profile was created.
    pub created_at: Timestamp,
}

impl ClientProfile {
    /// Creates a client profile.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a malformed email.
    pub fn new(email: impl Into<String>, credential: CredentialHash) -> DomainResult<Self> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self {
            id: ClientId::new_v4(),
            email,
            credential,
            created_at: Timestamp::now(),
        })
    }
}

/// A seller profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderProfile {
    /// Unique identifier.
    pub id: TraderId,
    /// Login email, unique among traders.
    pub email: String,
    /// Credential digest.
    pub credential: CredentialHash,
    /// Sequential display code.
    pub code: TraderCode,
    /// When the profile was created.
    pub created_at: Timestamp,
}

impl TraderProfile {
    /// Creates a trader profile.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a malformed email.
    pub fn new(
        email: impl Into<String>,
        credential: CredentialHash,
        code: TraderCode,
    ) -> DomainResult<Self> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self {
            id: TraderId::new_v4(),
            email,
            credential,
            code,
            created_at: Timestamp::now(),
        })
    }
}

/// Default employee commission rate, percent of the negotiated amount.
pub const DEFAULT_EMPLOYEE_COMMISSION_RATE: Decimal = Decimal::ONE;

/// A mediator/validator profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Unique identifier.
    pub id: EmployeeId,
    /// Login email, unique among employees.
    pub email: String,
    /// Credential digest.
    pub credential: CredentialHash,
    /// Employee-specific commission rate in percent.
    pub commission_rate: Decimal,
    /// When the profile was created.
    pub created_at: Timestamp,
}

impl EmployeeProfile {
    /// Creates an employee profile with the default commission rate.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a malformed email.
    pub fn new(email: impl Into<String>, credential: CredentialHash) -> DomainResult<Self> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self {
            id: EmployeeId::new_v4(),
            email,
            credential,
            commission_rate: DEFAULT_EMPLOYEE_COMMISSION_RATE,
            created_at: Timestamp::now(),
        })
    }

    /// Overrides the commission rate.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for negative rates.
    pub fn with_commission_rate(mut self, rate: Decimal) -> DomainResult<Self> {
        if rate.is_sign_negative() {
            return Err(DomainError::validation(
                "employee commission rate must not be negative",
            ));
        }
        self.commission_rate = rate;
        Ok(self)
    }
}

/// A platform-operator profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    /// Unique identifier.
    pub id: AdminId,
    /// Login email, unique among admins.
    pub email: String,
    /// Credential digest.
    pub credential: CredentialHash,
    /// When the profile was created.
    pub created_at: Timestamp,
}

impl AdminProfile {
    /// Creates an admin profile.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] for a malformed email.
    pub fn new(email: impl Into<String>, credential: CredentialHash) -> DomainResult<Self> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self {
            id: AdminId::new_v4(),
            email,
            credential,
            created_at: Timestamp::now(),
        })
    }
}

/// The immutable one-to-one link between a Client and a Trader profile.
///
/// # Invariants
///
/// - Both profiles carry byte-equal emails and the same credential digest.
/// - A trader links to at most one client and vice versa (enforced at the
///   profile registry).
/// - Established at profile-creation time; never re-linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DualProfileLink {
    /// The linked client.
    pub client_id: ClientId,
    /// The linked trader.
    pub trader_id: TraderId,
    /// The shared email, captured at link time.
    pub email: String,
    /// When the link was established.
    pub linked_at: Timestamp,
}

impl DualProfileLink {
    /// Establishes the link between two profiles of the same person.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] unless the profiles share a
    /// byte-equal email and the same credential digest.
    pub fn establish(client: &ClientProfile, trader: &TraderProfile) -> DomainResult<Self> {
        if client.email != trader.email {
            return Err(DomainError::validation(
                "dual-profile link requires byte-equal emails",
            ));
        }
        if client.credential != trader.credential {
            return Err(DomainError::validation(
                "dual-profile link requires matching credentials",
            ));
        }
        Ok(Self {
            client_id: client.id,
            trader_id: trader.id,
            email: client.email.clone(),
            linked_at: Timestamp::now(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn secret_hash() -> CredentialHash {
        CredentialHash::from_secret("hunter2")
    }

    mod credentials {
        use super::*;

        #[test]
        fn digest_matches_original_secret() {
            let hash = secret_hash();
            assert!(hash.matches("hunter2"));
            assert!(!hash.matches("hunter3"));
        }

        #[test]
        fn equal_secrets_equal_digests() {
            assert_eq!(secret_hash(), CredentialHash::from_secret("hunter2"));
        }

        #[test]
        fn display_truncates() {
            let shown = secret_hash().to_string();
            assert!(shown.starts_with("sha256:"));
            assert!(shown.len() < 20);
        }
    }

    mod profiles {
        use super::*;

        #[test]
        fn client_profile_validates_email() {
            assert!(ClientProfile::new("u@x.com", secret_hash()).is_ok());
            assert!(ClientProfile::new("not-an-email", secret_hash()).is_err());
            assert!(ClientProfile::new("", secret_hash()).is_err());
        }

        #[test]
        fn employee_default_rate() {
            let employee = EmployeeProfile::new("emp@x.com", secret_hash()).unwrap();
            assert_eq!(employee.commission_rate, dec!(1));
        }

        #[test]
        fn employee_rate_override() {
            let employee = EmployeeProfile::new("emp@x.com", secret_hash())
                .unwrap()
                .with_commission_rate(dec!(2.5))
                .unwrap();
            assert_eq!(employee.commission_rate, dec!(2.5));
        }

        #[test]
        fn employee_rejects_negative_rate() {
            let result = EmployeeProfile::new("emp@x.com", secret_hash())
                .unwrap()
                .with_commission_rate(dec!(-1));
            assert!(result.is_err());
        }
    }

    mod links {
        use super::*;
        use crate::domain::value_objects::TraderCode;

        fn trader(email: &str, credential: CredentialHash) -> TraderProfile {
            TraderProfile::new(email, credential, TraderCode::new(2026, 1).unwrap()).unwrap()
        }

        #[test]
        fn link_requires_equal_emails() {
            let client = ClientProfile::new("u@x.com", secret_hash()).unwrap();
            let other = trader("v@x.com", secret_hash());
            assert!(DualProfileLink::establish(&client, &other).is_err());
        }

        #[test]
        fn link_requires_equal_credentials() {
            let client = ClientProfile::new("u@x.com", secret_hash()).unwrap();
            let other = trader("u@x.com", CredentialHash::from_secret("different"));
            assert!(DualProfileLink::establish(&client, &other).is_err());
        }

        #[test]
        fn link_captures_both_ids() {
            let client = ClientProfile::new("u@x.com", secret_hash()).unwrap();
            let seller = trader("u@x.com", secret_hash());
            let link = DualProfileLink::establish(&client, &seller).unwrap();
            assert_eq!(link.client_id, client.id);
            assert_eq!(link.trader_id, seller.id);
            assert_eq!(link.email, "u@x.com");
        }

        #[test]
        fn email_comparison_is_byte_exact() {
            // Case differs: not byte-equal, no link.
            let client = ClientProfile::new("U@x.com", secret_hash()).unwrap();
            let seller = trader("u@x.com", secret_hash());
            assert!(DualProfileLink::establish(&client, &seller).is_err());
        }
    }
}
