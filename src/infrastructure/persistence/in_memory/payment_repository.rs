//! # In-Memory Payment Repository
//!
//! Thread-safe `HashMap` implementation of [`PaymentRepository`] enforcing
//! transaction-reference uniqueness.

use crate::domain::entities::payment::Payment;
use crate::domain::value_objects::{DealId, PaymentId, PaymentStatus};
use crate::infrastructure::persistence::traits::{
    PaymentRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`PaymentRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentRepository {
    storage: Arc<RwLock<HashMap<PaymentId, Payment>>>,
}

impl InMemoryPaymentRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn insert(&self, payment: &Payment) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(&payment.id()) {
            return Err(RepositoryError::duplicate("Payment", payment.id()));
        }
        if storage
            .values()
            .any(|stored| stored.transaction_ref() == payment.transaction_ref())
        {
            return Err(RepositoryError::duplicate(
                "Payment",
                payment.transaction_ref(),
            ));
        }
        storage.insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn get(&self, id: PaymentId) -> RepositoryResult<Option<Payment>> {
        let storage = self.storage.read().await;
        Ok(storage.get(&id).cloned())
    }

    async fn save(&self, payment: &Payment) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if !storage.contains_key(&payment.id()) {
            return Err(RepositoryError::not_found("Payment", payment.id()));
        }
        storage.insert(payment.id(), payment.clone());
        Ok(())
    }

    async fn list_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>> {
        let storage = self.storage.read().await;
        let mut payments: Vec<Payment> = storage
            .values()
            .filter(|payment| payment.deal_id() == deal_id)
            .cloned()
            .collect();
        payments.sort_by_key(Payment::created_at);
        Ok(payments)
    }

    async fn completed_for_deal(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>> {
        let payments = self.list_for_deal(deal_id).await?;
        Ok(payments
            .into_iter()
            .filter(|payment| payment.status() == PaymentStatus::Completed)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{Actor, ClientId, EmployeeId, Money, PaymentMethod};

    fn sample_payment(deal_id: DealId, reference: &str) -> Payment {
        Payment::submit(
            deal_id,
            ClientId::new_v4(),
            Money::new(100_00, 2).unwrap(),
            PaymentMethod::BankTransfer,
            reference,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryPaymentRepository::new();
        let payment = sample_payment(DealId::new_v4(), "WIRE-1");
        repo.insert(&payment).await.unwrap();
        assert_eq!(repo.get(payment.id()).await.unwrap().unwrap(), payment);
    }

    #[tokio::test]
    async fn duplicate_reference_rejected() {
        let repo = InMemoryPaymentRepository::new();
        repo.insert(&sample_payment(DealId::new_v4(), "WIRE-1"))
            .await
            .unwrap();
        let result = repo.insert(&sample_payment(DealId::new_v4(), "WIRE-1")).await;
        assert!(result.unwrap_err().is_duplicate());
    }

    #[tokio::test]
    async fn completed_filter_tracks_verification() {
        let repo = InMemoryPaymentRepository::new();
        let deal_id = DealId::new_v4();
        let mut payment = sample_payment(deal_id, "WIRE-1");
        repo.insert(&payment).await.unwrap();

        assert!(repo.completed_for_deal(deal_id).await.unwrap().is_empty());

        payment
            .verify(&Actor::Employee(EmployeeId::new_v4()))
            .unwrap();
        repo.save(&payment).await.unwrap();

        let completed = repo.completed_for_deal(deal_id).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed.first().unwrap().id(), payment.id());
    }

    #[tokio::test]
    async fn save_unknown_payment_fails() {
        let repo = InMemoryPaymentRepository::new();
        let payment = sample_payment(DealId::new_v4(), "WIRE-9");
        assert!(repo.save(&payment).await.unwrap_err().is_not_found());
    }
}
