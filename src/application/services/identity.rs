//! # Identity & Dual-Profile Resolver
//!
//! Profile registration and credential resolution across the four actor
//! kinds, plus the immutable link between a Client and a Trader profile
//! held by the same natural person.
//!
//! Resolution is side-effect free: presenting an email and secret returns
//! every profile that pair unlocks — a dual-profile person gets both their
//! Client and Trader identities back from one credential. The link itself
//! is established once, at registration time, when the second profile
//! arrives with a byte-equal email and the same secret; it is stored
//! explicitly and never re-derived from email equality on later reads.
//!
//! Trader display codes (`TR-<year>-<4-digit-seq>`) are allocated from the
//! same atomic per-year sequence mechanism deal numbers use.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::entities::profile::{
    AdminProfile, ClientProfile, CredentialHash, DualProfileLink, EmployeeProfile, TraderProfile,
};
use crate::domain::errors::DomainError;
use crate::domain::services::numbering::TraderCodeSequence;
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{Actor, EmployeeId};
use crate::infrastructure::persistence::traits::ProfileRepository;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

/// Application service for identity resolution and profile registration.
#[derive(Debug)]
pub struct IdentityService {
    profiles: Arc<dyn ProfileRepository>,
    trader_codes: Arc<TraderCodeSequence>,
}

impl IdentityService {
    /// Creates the service over a profile repository.
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            trader_codes: Arc::new(TraderCodeSequence::new()),
        }
    }

    /// Replaces the trader-code sequence, e.g. one seeded from persisted
    /// profiles at startup.
    #[must_use]
    pub fn with_trader_codes(mut self, trader_codes: Arc<TraderCodeSequence>) -> Self {
        self.trader_codes = trader_codes;
        self
    }

    // ========== Registration ==========

    /// Registers a client profile.
    ///
    /// If a trader already holds the same email with the same secret, the
    /// dual-profile link is established as part of registration.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for a malformed email
    /// - [`RepositoryError::Duplicate`] for an email already used by a
    ///   client
    ///
    /// [`RepositoryError::Duplicate`]: crate::infrastructure::persistence::traits::RepositoryError::Duplicate
    pub async fn register_client(
        &self,
        email: &str,
        secret: &str,
    ) -> ApplicationResult<ClientProfile> {
        let profile = ClientProfile::new(email, CredentialHash::from_secret(secret))?;
        self.profiles.insert_client(&profile).await?;

        if let Some(trader) = self.profiles.find_trader_by_email(email).await?
            && trader.credential.matches(secret)
        {
            let link = DualProfileLink::establish(&profile, &trader)?;
            self.profiles.insert_link(&link).await?;
            info!(email, client = %profile.id, trader = %trader.id, "dual profile linked");
        }
        Ok(profile)
    }

    /// Registers a trader profile, allocating its display code.
    ///
    /// If a client already holds the same email with the same secret, the
    /// dual-profile link is established as part of registration.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for a malformed email or an exhausted
    ///   code sequence
    /// - [`RepositoryError::Duplicate`] for an email already used by a
    ///   trader
    ///
    /// [`RepositoryError::Duplicate`]: crate::infrastructure::persistence::traits::RepositoryError::Duplicate
    pub async fn register_trader(
        &self,
        email: &str,
        secret: &str,
    ) -> ApplicationResult<TraderProfile> {
        let code = self
            .trader_codes
            .next(Timestamp::now().year())
            .map_err(|err| DomainError::validation(err.to_string()))?;
        let profile = TraderProfile::new(email, CredentialHash::from_secret(secret), code)?;
        self.profiles.insert_trader(&profile).await?;

        if let Some(client) = self.profiles.find_client_by_email(email).await?
            && client.credential.matches(secret)
        {
            let link = DualProfileLink::establish(&client, &profile)?;
            self.profiles.insert_link(&link).await?;
            info!(email, client = %client.id, trader = %profile.id, "dual profile linked");
        }
        Ok(profile)
    }

    /// Registers an employee profile.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for a malformed email or a negative
    ///   commission rate
    /// - [`RepositoryError::Duplicate`] for an email already used by an
    ///   employee
    ///
    /// [`RepositoryError::Duplicate`]: crate::infrastructure::persistence::traits::RepositoryError::Duplicate
    pub async fn register_employee(
        &self,
        email: &str,
        secret: &str,
        commission_rate: Option<Decimal>,
    ) -> ApplicationResult<EmployeeProfile> {
        let mut profile = EmployeeProfile::new(email, CredentialHash::from_secret(secret))?;
        if let Some(rate) = commission_rate {
            profile = profile.with_commission_rate(rate)?;
        }
        self.profiles.insert_employee(&profile).await?;
        Ok(profile)
    }

    /// Registers an admin profile.
    ///
    /// # Errors
    ///
    /// - [`DomainError::Validation`] for a malformed email
    /// - [`RepositoryError::Duplicate`] for an email already used by an
    ///   admin
    ///
    /// [`RepositoryError::Duplicate`]: crate::infrastructure::persistence::traits::RepositoryError::Duplicate
    pub async fn register_admin(
        &self,
        email: &str,
        secret: &str,
    ) -> ApplicationResult<AdminProfile> {
        let profile = AdminProfile::new(email, CredentialHash::from_secret(secret))?;
        self.profiles.insert_admin(&profile).await?;
        Ok(profile)
    }

    // ========== Resolution ==========

    /// Resolves a credential to every profile it unlocks.
    ///
    /// A dual-profile person gets both their Client and Trader identities;
    /// staff get their Employee or Admin identity. Resolution mutates
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCredential`] when no profile with the
    /// email matches the secret — including when profiles with the email
    /// exist under a different secret.
    pub async fn resolve_profiles(
        &self,
        email: &str,
        secret: &str,
    ) -> ApplicationResult<Vec<Actor>> {
        let mut actors = Vec::new();

        if let Some(admin) = self.profiles.find_admin_by_email(email).await?
            && admin.credential.matches(secret)
        {
            actors.push(Actor::Admin(admin.id));
        }
        if let Some(employee) = self.profiles.find_employee_by_email(email).await?
            && employee.credential.matches(secret)
        {
            actors.push(Actor::Employee(employee.id));
        }
        if let Some(trader) = self.profiles.find_trader_by_email(email).await?
            && trader.credential.matches(secret)
        {
            actors.push(Actor::Trader(trader.id));
        }
        if let Some(client) = self.profiles.find_client_by_email(email).await?
            && client.credential.matches(secret)
        {
            actors.push(Actor::Client(client.id));
        }

        if actors.is_empty() {
            return Err(DomainError::InvalidCredential {
                email: email.to_string(),
            }
            .into());
        }
        Ok(actors)
    }

    /// Returns the other half of a dual profile, if the actor has one.
    ///
    /// Employees and admins never link; a client resolves to their linked
    /// trader and vice versa.
    ///
    /// # Errors
    ///
    /// Returns storage errors from the backend.
    pub async fn linked_profile(&self, actor: &Actor) -> ApplicationResult<Option<Actor>> {
        match actor {
            Actor::Client(id) => Ok(self
                .profiles
                .link_for_client(*id)
                .await?
                .map(|link| Actor::Trader(link.trader_id))),
            Actor::Trader(id) => Ok(self
                .profiles
                .link_for_trader(*id)
                .await?
                .map(|link| Actor::Client(link.client_id))),
            Actor::Employee(_) | Actor::Admin(_) => Ok(None),
        }
    }

    /// Looks up an employee's commission rate.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::NotFound`] for an unknown employee.
    pub async fn employee_commission_rate(&self, id: EmployeeId) -> ApplicationResult<Decimal> {
        let employee = self
            .profiles
            .get_employee(id)
            .await?
            .ok_or_else(|| ApplicationError::not_found("Employee", id))?;
        Ok(employee.commission_rate)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ActorKind;
    use crate::infrastructure::persistence::in_memory::InMemoryProfileRepository;
    use rust_decimal_macros::dec;

    fn service() -> IdentityService {
        IdentityService::new(Arc::new(InMemoryProfileRepository::new()))
    }

    #[tokio::test]
    async fn resolves_a_single_profile() {
        let service = service();
        let client = service.register_client("c@x.com", "pw-1").await.unwrap();

        let actors = service.resolve_profiles("c@x.com", "pw-1").await.unwrap();
        assert_eq!(actors, vec![Actor::Client(client.id)]);
    }

    #[tokio::test]
    async fn wrong_secret_is_invalid_credential() {
        let service = service();
        service.register_client("c@x.com", "pw-1").await.unwrap();

        let err = service
            .resolve_profiles("c@x.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InvalidCredential { .. })
        ));

        let err = service
            .resolve_profiles("nobody@x.com", "pw-1")
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_domain(),
            Some(DomainError::InvalidCredential { .. })
        ));
    }

    #[tokio::test]
    async fn dual_profile_resolves_both_ways() {
        let service = service();
        let client = service.register_client("u@x.com", "pw-1").await.unwrap();
        let trader = service.register_trader("u@x.com", "pw-1").await.unwrap();

        // One credential unlocks both identities.
        let actors = service.resolve_profiles("u@x.com", "pw-1").await.unwrap();
        assert_eq!(actors.len(), 2);
        assert!(actors.contains(&Actor::Client(client.id)));
        assert!(actors.contains(&Actor::Trader(trader.id)));

        // The link is mutual and exclusive.
        assert_eq!(
            service
                .linked_profile(&Actor::Client(client.id))
                .await
                .unwrap(),
            Some(Actor::Trader(trader.id))
        );
        assert_eq!(
            service
                .linked_profile(&Actor::Trader(trader.id))
                .await
                .unwrap(),
            Some(Actor::Client(client.id))
        );
    }

    #[tokio::test]
    async fn same_email_different_secret_never_links() {
        let service = service();
        let client = service.register_client("u@x.com", "pw-1").await.unwrap();
        let trader = service.register_trader("u@x.com", "other").await.unwrap();

        assert_eq!(
            service
                .linked_profile(&Actor::Client(client.id))
                .await
                .unwrap(),
            None
        );
        assert_eq!(
            service
                .linked_profile(&Actor::Trader(trader.id))
                .await
                .unwrap(),
            None
        );

        // Each secret resolves only its own profile.
        let actors = service.resolve_profiles("u@x.com", "pw-1").await.unwrap();
        assert_eq!(actors, vec![Actor::Client(client.id)]);
    }

    #[tokio::test]
    async fn client_registered_second_links_too() {
        let service = service();
        let trader = service.register_trader("u@x.com", "pw-1").await.unwrap();
        let client = service.register_client("u@x.com", "pw-1").await.unwrap();

        assert_eq!(
            service
                .linked_profile(&Actor::Trader(trader.id))
                .await
                .unwrap(),
            Some(Actor::Client(client.id))
        );
    }

    #[tokio::test]
    async fn trader_codes_are_sequential() {
        let service = service();
        let first = service.register_trader("a@x.com", "pw").await.unwrap();
        let second = service.register_trader("b@x.com", "pw").await.unwrap();
        assert_eq!(first.code.seq() + 1, second.code.seq());
    }

    #[tokio::test]
    async fn staff_profiles_never_link() {
        let service = service();
        let employee = service
            .register_employee("e@x.com", "pw", Some(dec!(1.5)))
            .await
            .unwrap();
        assert_eq!(employee.commission_rate, dec!(1.5));
        assert_eq!(
            service
                .linked_profile(&Actor::Employee(employee.id))
                .await
                .unwrap(),
            None
        );

        let actors = service.resolve_profiles("e@x.com", "pw").await.unwrap();
        assert_eq!(actors.first().unwrap().kind(), ActorKind::Employee);
    }

    #[tokio::test]
    async fn employee_rate_lookup() {
        let service = service();
        let employee = service
            .register_employee("e@x.com", "pw", None)
            .await
            .unwrap();
        assert_eq!(
            service
                .employee_commission_rate(employee.id)
                .await
                .unwrap(),
            dec!(1)
        );

        let err = service
            .employee_commission_rate(EmployeeId::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound { .. }));
    }
}
