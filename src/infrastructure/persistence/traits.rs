//! # Repository Ports
//!
//! Persistence abstraction for the deal core.
//!
//! These traits define the storage operations the application services
//! depend on. Implementations may target a database or in-memory storage;
//! the in-memory implementations under
//! [`in_memory`](crate::infrastructure::persistence::in_memory) back the
//! test suite.
//!
//! # Available Repositories
//!
//! - [`DealRepository`]: deals with optimistic version checks
//! - [`MessageRepository`]: append-only negotiation channels
//! - [`PaymentRepository`]: payments with unique transaction references
//! - [`LedgerRepository`]: financial transactions and append-only entries
//! - [`ProfileRepository`]: actor profiles and dual-profile links
//! - [`OfferRepository`]: read access to the external offer catalog

use crate::domain::entities::deal::Deal;
use crate::domain::entities::ledger::{FinancialTransaction, LedgerAccount, LedgerEntry};
use crate::domain::entities::negotiation_message::NegotiationMessage;
use crate::domain::entities::offer::Offer;
use crate::domain::entities::payment::Payment;
use crate::domain::entities::profile::{
    AdminProfile, ClientProfile, DualProfileLink, EmployeeProfile, TraderProfile,
};
use crate::domain::value_objects::{
    AdminId, ClientId, DealId, DealNumber, EmployeeId, MessageId, OfferId, PaymentId, TraderId,
};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use thiserror::Error;

/// Error type for repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Entity not found.
    #[error("entity not found: {entity_type} with id {id}")]
    NotFound {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
    },

    /// Duplicate entity or unique-key violation.
    #[error("duplicate entity: {entity_type} with key {key} already exists")]
    Duplicate {
        /// Type of entity.
        entity_type: &'static str,
        /// The violated key.
        key: String,
    },

    /// Optimistic locking conflict.
    #[error("version conflict: {entity_type} with id {id} expected v{expected}, found v{actual}")]
    VersionConflict {
        /// Type of entity.
        entity_type: &'static str,
        /// Entity identifier.
        id: String,
        /// Version the caller loaded.
        expected: u64,
        /// Version in storage.
        actual: u64,
    },

    /// Storage-level failure.
    #[error("storage error: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Creates a not-found error.
    #[must_use]
    pub fn not_found(entity_type: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(entity_type: &'static str, key: impl fmt::Display) -> Self {
        Self::Duplicate {
            entity_type,
            key: key.to_string(),
        }
    }

    /// Creates a version-conflict error.
    #[must_use]
    pub fn version_conflict(
        entity_type: &'static str,
        id: impl fmt::Display,
        expected: u64,
        actual: u64,
    ) -> Self {
        Self::VersionConflict {
            entity_type,
            id: id.to_string(),
            expected,
            actual,
        }
    }

    /// Creates a storage error.
    #[must_use]
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Returns true if this is a not-found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this is a duplicate error.
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }

    /// Returns true if this is a version conflict.
    #[must_use]
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Repository for [`Deal`] aggregates.
#[async_trait]
pub trait DealRepository: Send + Sync + fmt::Debug {
    /// Inserts a freshly created deal.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused id or deal
    /// number.
    async fn insert(&self, deal: &Deal) -> RepositoryResult<()>;

    /// Gets a deal by id, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get(&self, id: DealId) -> RepositoryResult<Option<Deal>>;

    /// Finds a deal by its display number.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn find_by_number(&self, number: DealNumber) -> RepositoryResult<Option<Deal>>;

    /// Persists a modified deal under an optimistic version check and bumps
    /// the caller's copy to the stored version.
    ///
    /// # Errors
    ///
    /// - [`RepositoryError::NotFound`] if the deal was never inserted
    /// - [`RepositoryError::VersionConflict`] if storage moved past the
    ///   caller's loaded version
    async fn save(&self, deal: &mut Deal) -> RepositoryResult<()>;

    /// Lists deals a client is attached to.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn list_by_client(&self, client_id: ClientId) -> RepositoryResult<Vec<Deal>>;

    /// Lists deals a trader is attached to.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn list_by_trader(&self, trader_id: TraderId) -> RepositoryResult<Vec<Deal>>;
}

/// Repository for negotiation channels.
///
/// Channels are append-only: `save` exists solely for the read-marker,
/// never for content.
#[async_trait]
pub trait MessageRepository: Send + Sync + fmt::Debug {
    /// Appends a message to its deal's channel, assigning the insertion
    /// sequence, and returns the stored message.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused message id.
    async fn append(&self, message: NegotiationMessage) -> RepositoryResult<NegotiationMessage>;

    /// Gets a message by id, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get(&self, id: MessageId) -> RepositoryResult<Option<NegotiationMessage>>;

    /// Lists a deal's messages ordered by `created_at`, ties by insertion
    /// sequence.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn list_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<NegotiationMessage>>;

    /// Persists an updated read-marker.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown message.
    async fn save(&self, message: &NegotiationMessage) -> RepositoryResult<()>;
}

/// Repository for payments.
#[async_trait]
pub trait PaymentRepository: Send + Sync + fmt::Debug {
    /// Inserts newly submitted payment evidence.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused id or
    /// transaction reference.
    async fn insert(&self, payment: &Payment) -> RepositoryResult<()>;

    /// Gets a payment by id, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get(&self, id: PaymentId) -> RepositoryResult<Option<Payment>>;

    /// Persists a payment status change.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown payment.
    async fn save(&self, payment: &Payment) -> RepositoryResult<()>;

    /// Lists a deal's payments in submission order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn list_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>>;

    /// Lists a deal's COMPLETED payments.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn completed_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>>;
}

/// Repository for financial transactions and ledger entries.
///
/// Entries are strictly append-only; there is no update or delete.
#[async_trait]
pub trait LedgerRepository: Send + Sync + fmt::Debug {
    /// Inserts a financial transaction.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused id.
    async fn insert_transaction(&self, transaction: &FinancialTransaction)
        -> RepositoryResult<()>;

    /// Persists a transaction status change.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] for an unknown transaction.
    async fn save_transaction(&self, transaction: &FinancialTransaction) -> RepositoryResult<()>;

    /// Lists a deal's transactions in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn transactions_for_deal(
        &self,
        deal_id: DealId,
    ) -> RepositoryResult<Vec<FinancialTransaction>>;

    /// Appends a ledger entry.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused id.
    async fn append_entry(&self, entry: &LedgerEntry) -> RepositoryResult<()>;

    /// Lists an account stream's entries in append order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn entries_for_account(
        &self,
        account: LedgerAccount,
    ) -> RepositoryResult<Vec<LedgerEntry>>;

    /// Lists a deal's entries in append order.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn entries_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<LedgerEntry>>;

    /// Returns an account stream's latest balance, 0 for a fresh stream.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn latest_balance(&self, account: LedgerAccount) -> RepositoryResult<Decimal>;
}

/// Repository for actor profiles and dual-profile links.
#[async_trait]
pub trait ProfileRepository: Send + Sync + fmt::Debug {
    /// Inserts a client profile.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused email among
    /// clients.
    async fn insert_client(&self, profile: &ClientProfile) -> RepositoryResult<()>;

    /// Inserts a trader profile.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused email among
    /// traders.
    async fn insert_trader(&self, profile: &TraderProfile) -> RepositoryResult<()>;

    /// Inserts an employee profile.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused email among
    /// employees.
    async fn insert_employee(&self, profile: &EmployeeProfile) -> RepositoryResult<()>;

    /// Inserts an admin profile.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] for a reused email among
    /// admins.
    async fn insert_admin(&self, profile: &AdminProfile) -> RepositoryResult<()>;

    /// Gets a client by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get_client(&self, id: ClientId) -> RepositoryResult<Option<ClientProfile>>;

    /// Gets a trader by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get_trader(&self, id: TraderId) -> RepositoryResult<Option<TraderProfile>>;

    /// Gets an employee by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get_employee(&self, id: EmployeeId) -> RepositoryResult<Option<EmployeeProfile>>;

    /// Gets an admin by id.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get_admin(&self, id: AdminId) -> RepositoryResult<Option<AdminProfile>>;

    /// Finds a client by email.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn find_client_by_email(&self, email: &str) -> RepositoryResult<Option<ClientProfile>>;

    /// Finds a trader by email.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn find_trader_by_email(&self, email: &str) -> RepositoryResult<Option<TraderProfile>>;

    /// Finds an employee by email.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn find_employee_by_email(
        &self,
        email: &str,
    ) -> RepositoryResult<Option<EmployeeProfile>>;

    /// Finds an admin by email.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminProfile>>;

    /// Inserts a dual-profile link.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Duplicate`] if either side is already
    /// linked.
    async fn insert_link(&self, link: &DualProfileLink) -> RepositoryResult<()>;

    /// Gets the link a client participates in, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn link_for_client(&self, id: ClientId) -> RepositoryResult<Option<DualProfileLink>>;

    /// Gets the link a trader participates in, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn link_for_trader(&self, id: TraderId) -> RepositoryResult<Option<DualProfileLink>>;
}

/// Read access to the external offer catalog.
#[async_trait]
pub trait OfferRepository: Send + Sync + fmt::Debug {
    /// Gets an offer with its items, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] on backend failure.
    async fn get(&self, id: OfferId) -> RepositoryResult<Option<Offer>>;
}
