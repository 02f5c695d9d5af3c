//! # In-Memory Deal Repository
//!
//! Thread-safe `HashMap` implementation of [`DealRepository`], suitable for
//! tests without database dependencies. Saves enforce the optimistic
//! version check the port requires.

use crate::domain::entities::deal::Deal;
use crate::domain::value_objects::{ClientId, DealId, DealNumber, TraderId};
use crate::infrastructure::persistence::traits::{
    DealRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of [`DealRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDealRepository {
    storage: Arc<RwLock<HashMap<DealId, Deal>>>,
}

impl InMemoryDealRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored deals.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    /// Returns true if no deals are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl DealRepository for InMemoryDealRepository {
    async fn insert(&self, deal: &Deal) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.contains_key(&deal.id()) {
            return Err(RepositoryError::duplicate("Deal", deal.id()));
        }
        if storage
            .values()
            .any(|stored| stored.deal_number() == deal.deal_number())
        {
            return Err(RepositoryError::duplicate("Deal", deal.deal_number()));
        }
        storage.insert(deal.id(), deal.clone());
        Ok(())
    }

    async fn get(&self, id: DealId) -> RepositoryResult<Option<Deal>> {
        let storage = self.storage.read().await;
        Ok(storage.get(&id).cloned())
    }

    async fn find_by_number(&self, number: DealNumber) -> RepositoryResult<Option<Deal>> {
        let storage = self.storage.read().await;
        Ok(storage
            .values()
            .find(|deal| deal.deal_number() == number)
            .cloned())
    }

    async fn save(&self, deal: &mut Deal) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        let stored = storage
            .get(&deal.id())
            .ok_or_else(|| RepositoryError::not_found("Deal", deal.id()))?;
        if stored.version() != deal.version() {
            return Err(RepositoryError::version_conflict(
                "Deal",
                deal.id(),
                deal.version(),
                stored.version(),
            ));
        }
        deal.bump_version();
        storage.insert(deal.id(), deal.clone());
        Ok(())
    }

    async fn list_by_client(&self, client_id: ClientId) -> RepositoryResult<Vec<Deal>> {
        let storage = self.storage.read().await;
        let mut deals: Vec<Deal> = storage
            .values()
            .filter(|deal| deal.client_id() == client_id)
            .cloned()
            .collect();
        deals.sort_by_key(Deal::deal_number);
        Ok(deals)
    }

    async fn list_by_trader(&self, trader_id: TraderId) -> RepositoryResult<Vec<Deal>> {
        let storage = self.storage.read().await;
        let mut deals: Vec<Deal> = storage
            .values()
            .filter(|deal| deal.trader_id() == trader_id)
            .cloned()
            .collect();
        deals.sort_by_key(Deal::deal_number);
        Ok(deals)
    }
}
