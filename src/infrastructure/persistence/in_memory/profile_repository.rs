//! # In-Memory Profile Repository
//!
//! Profile and dual-profile-link storage for tests. Email uniqueness is
//! enforced per profile kind; a link may attach each profile at most once.

use crate::domain::entities::profile::{
    AdminProfile, ClientProfile, DualProfileLink, EmployeeProfile, TraderProfile,
};
use crate::domain::value_objects::{AdminId, ClientId, EmployeeId, TraderId};
use crate::infrastructure::persistence::traits::{
    ProfileRepository, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct ProfileStorage {
    clients: HashMap<ClientId, ClientProfile>,
    traders: HashMap<TraderId, TraderProfile>,
    employees: HashMap<EmployeeId, EmployeeProfile>,
    admins: HashMap<AdminId, AdminProfile>,
    links: Vec<DualProfileLink>,
}

/// In-memory implementation of [`ProfileRepository`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileRepository {
    storage: Arc<RwLock<ProfileStorage>>,
}

impl InMemoryProfileRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn insert_client(&self, profile: &ClientProfile) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.clients.values().any(|c| c.email == profile.email) {
            return Err(RepositoryError::duplicate("ClientProfile", &profile.email));
        }
        storage.clients.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn insert_trader(&self, profile: &TraderProfile) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.traders.values().any(|t| t.email == profile.email) {
            return Err(RepositoryError::duplicate("TraderProfile", &profile.email));
        }
        storage.traders.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn insert_employee(&self, profile: &EmployeeProfile) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.employees.values().any(|e| e.email == profile.email) {
            return Err(RepositoryError::duplicate(
                "EmployeeProfile",
                &profile.email,
            ));
        }
        storage.employees.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn insert_admin(&self, profile: &AdminProfile) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage.admins.values().any(|a| a.email == profile.email) {
            return Err(RepositoryError::duplicate("AdminProfile", &profile.email));
        }
        storage.admins.insert(profile.id, profile.clone());
        Ok(())
    }

    async fn get_client(&self, id: ClientId) -> RepositoryResult<Option<ClientProfile>> {
        Ok(self.storage.read().await.clients.get(&id).cloned())
    }

    async fn get_trader(&self, id: TraderId) -> RepositoryResult<Option<TraderProfile>> {
        Ok(self.storage.read().await.traders.get(&id).cloned())
    }

    async fn get_employee(&self, id: EmployeeId) -> RepositoryResult<Option<EmployeeProfile>> {
        Ok(self.storage.read().await.employees.get(&id).cloned())
    }

    async fn get_admin(&self, id: AdminId) -> RepositoryResult<Option<AdminProfile>> {
        Ok(self.storage.read().await.admins.get(&id).cloned())
    }

    async fn find_client_by_email(&self, email: &str) -> RepositoryResult<Option<ClientProfile>> {
        let storage = self.storage.read().await;
        Ok(storage.clients.values().find(|c| c.email == email).cloned())
    }

    async fn find_trader_by_email(&self, email: &str) -> RepositoryResult<Option<TraderProfile>> {
        let storage = self.storage.read().await;
        Ok(storage.traders.values().find(|t| t.email == email).cloned())
    }

    async fn find_employee_by_email(
        &self,
        email: &str,
    ) -> RepositoryResult<Option<EmployeeProfile>> {
        let storage = self.storage.read().await;
        Ok(storage
            .employees
            .values()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> RepositoryResult<Option<AdminProfile>> {
        let storage = self.storage.read().await;
        Ok(storage.admins.values().find(|a| a.email == email).cloned())
    }

    async fn insert_link(&self, link: &DualProfileLink) -> RepositoryResult<()> {
        let mut storage = self.storage.write().await;
        if storage
            .links
            .iter()
            .any(|stored| stored.client_id == link.client_id || stored.trader_id == link.trader_id)
        {
            return Err(RepositoryError::duplicate("DualProfileLink", &link.email));
        }
        storage.links.push(link.clone());
        Ok(())
    }

    async fn link_for_client(&self, id: ClientId) -> RepositoryResult<Option<DualProfileLink>> {
        let storage = self.storage.read().await;
        Ok(storage
            .links
            .iter()
            .find(|link| link.client_id == id)
            .cloned())
    }

    async fn link_for_trader(&self, id: TraderId) -> RepositoryResult<Option<DualProfileLink>> {
        let storage = self.storage.read().await;
        Ok(storage
            .links
            .iter()
            .find(|link| link.trader_id == id)
            .cloned())
    }
}
