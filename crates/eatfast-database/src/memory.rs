//! In-memory credential store.
//!
//! Enforces the same constraints as the Postgres schema (case-insensitive
//! unique email, unique Google id, at least one credential) so flows behave
//! identically against either backend.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use eatfast_core::error::{AppError, ErrorKind};
use eatfast_core::result::AppResult;
use eatfast_core::types::{AccountId, RoleId};
use eatfast_entity::account::{Account, AccountStatus, GoogleLink, NewAccount};
use eatfast_entity::role::{Role, RoleName};

use crate::repositories::{AccountRepository, RoleRepository};

/// In-memory account repository.
#[derive(Debug, Default)]
pub struct MemoryAccountRepository {
    accounts: RwLock<HashMap<AccountId, Account>>,
}

impl MemoryAccountRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `change` to a stored account and return the updated copy.
    async fn modify<F>(&self, id: AccountId, change: F) -> AppResult<Account>
    where
        F: FnOnce(&mut Account) -> AppResult<()> + Send,
    {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))?;

        let mut updated = account.clone();
        change(&mut updated)?;
        updated.updated_at = Utc::now();
        *account = updated.clone();
        Ok(updated)
    }

    /// Change an account's lifecycle status, as staff tooling would.
    pub async fn set_status(&self, id: AccountId, status: AccountStatus) -> AppResult<Account> {
        self.modify(id, |a| {
            a.status = status;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl AccountRepository for MemoryAccountRepository {
    async fn find_by_id(&self, id: AccountId) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_google_id(&self, google_id: &str) -> AppResult<Option<Account>> {
        Ok(self
            .accounts
            .read()
            .await
            .values()
            .find(|a| a.google_id.as_deref() == Some(google_id))
            .cloned())
    }

    async fn create(&self, data: &NewAccount) -> AppResult<Account> {
        let email = data.email.trim().to_lowercase();
        let mut accounts = self.accounts.write().await;

        if accounts.values().any(|a| a.email == email) {
            return Err(AppError::duplicate_account());
        }
        if let Some(google_id) = data.google_id.as_deref() {
            if accounts
                .values()
                .any(|a| a.google_id.as_deref() == Some(google_id))
            {
                return Err(AppError::account_already_linked());
            }
        }
        if data.password_hash.is_none() && data.google_id.is_none() {
            return Err(AppError::validation(
                "An account needs a password or an external identity",
            ));
        }

        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            email,
            password_hash: data.password_hash.clone(),
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            phone: data.phone.clone(),
            role_id: data.role_id,
            status: data.status,
            is_verified: data.is_verified,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            google_id: data.google_id.clone(),
            profile_picture: data.profile_picture.clone(),
            provider: data.provider,
            created_at: now,
            updated_at: now,
        };
        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn record_failed_login(
        &self,
        id: AccountId,
        attempts: i32,
        locked_until: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        self.modify(id, |a| {
            a.failed_login_attempts = attempts;
            a.locked_until = locked_until;
            Ok(())
        })
        .await
        .map(|_| ())
    }

    async fn clear_failed_logins(&self, id: AccountId) -> AppResult<()> {
        self.modify(id, |a| {
            a.failed_login_attempts = 0;
            a.locked_until = None;
            Ok(())
        })
        .await
        .map(|_| ())
    }

    async fn activate(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<Account> {
        self.modify(id, |a| {
            a.status = AccountStatus::Active;
            a.is_verified = true;
            a.last_login_at = Some(at);
            Ok(())
        })
        .await
    }

    async fn touch_last_login(&self, id: AccountId, at: DateTime<Utc>) -> AppResult<Account> {
        self.modify(id, |a| {
            a.last_login_at = Some(at);
            Ok(())
        })
        .await
    }

    async fn link_google(&self, id: AccountId, link: &GoogleLink) -> AppResult<Account> {
        let taken = self
            .accounts
            .read()
            .await
            .values()
            .any(|a| a.id != id && a.google_id.as_deref() == Some(link.google_id.as_str()));
        if taken {
            return Err(AppError::account_already_linked());
        }

        let link = link.clone();
        self.modify(id, move |a| {
            a.google_id = Some(link.google_id);
            if link.profile_picture.is_some() {
                a.profile_picture = link.profile_picture;
            }
            if link.verify {
                a.is_verified = true;
                if a.status == AccountStatus::Pending {
                    a.status = AccountStatus::Active;
                }
            }
            Ok(())
        })
        .await
    }

    async fn unlink_google(&self, id: AccountId) -> AppResult<Account> {
        self.modify(id, |a| {
            if !a.has_password() {
                return Err(AppError::new(
                    ErrorKind::LastCredential,
                    "Set a password before removing your only sign-in method",
                ));
            }
            a.google_id = None;
            a.profile_picture = None;
            Ok(())
        })
        .await
    }

    async fn update_password(&self, id: AccountId, password_hash: &str) -> AppResult<()> {
        let password_hash = password_hash.to_string();
        self.modify(id, move |a| {
            a.password_hash = Some(password_hash);
            a.failed_login_attempts = 0;
            a.locked_until = None;
            Ok(())
        })
        .await
        .map(|_| ())
    }
}

/// In-memory role repository.
#[derive(Debug, Default)]
pub struct MemoryRoleRepository {
    roles: RwLock<Vec<Role>>,
}

impl MemoryRoleRepository {
    /// Create a repository holding the same five roles the migrations seed.
    pub fn seeded() -> Self {
        let roles = RoleName::ALL
            .iter()
            .map(|name| Role {
                id: RoleId::new(),
                name: *name,
                description: None,
                permissions: seed_permissions(*name)
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            })
            .collect();
        Self {
            roles: RwLock::new(roles),
        }
    }

    /// Create a repository holding exactly `roles`.
    pub fn with_roles(roles: Vec<Role>) -> Self {
        Self {
            roles: RwLock::new(roles),
        }
    }
}

/// Permissions seeded for each role.
pub fn seed_permissions(name: RoleName) -> &'static [&'static str] {
    match name {
        RoleName::Admin => &["*"],
        RoleName::Customer => &[
            "orders:read",
            "orders:create",
            "profile:read",
            "profile:update",
        ],
        RoleName::RestaurantOwner => &[
            "restaurants:manage",
            "menus:manage",
            "orders:read",
            "orders:update_status",
        ],
        RoleName::DeliveryPerson => &["deliveries:read", "orders:read", "orders:update_status"],
        RoleName::SupportAgent => &["contacts:read", "contacts:reply", "orders:read"],
    }
}

#[async_trait]
impl RoleRepository for MemoryRoleRepository {
    async fn find_by_id(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.roles.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_name(&self, name: RoleName) -> AppResult<Option<Role>> {
        Ok(self
            .roles
            .read()
            .await
            .iter()
            .find(|r| r.name == name)
            .cloned())
    }

    async fn list_by_names(&self, names: &[RoleName]) -> AppResult<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .roles
            .read()
            .await
            .iter()
            .filter(|r| names.contains(&r.name))
            .cloned()
            .collect();
        roles.sort_by(|a, b| a.name.as_str().cmp(b.name.as_str()));
        Ok(roles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eatfast_entity::account::AuthProvider;

    fn new_account(email: &str, role_id: RoleId) -> NewAccount {
        NewAccount {
            email: email.to_string(),
            password_hash: Some("hash".to_string()),
            first_name: "Jo".to_string(),
            last_name: "Do".to_string(),
            phone: None,
            role_id,
            status: AccountStatus::Pending,
            is_verified: false,
            google_id: None,
            profile_picture: None,
            provider: AuthProvider::Local,
        }
    }

    #[tokio::test]
    async fn test_email_uniqueness_ignores_case() {
        let repo = MemoryAccountRepository::new();
        let role = RoleId::new();
        let created = repo
            .create(&new_account("Jo@Example.com", role))
            .await
            .unwrap();
        assert_eq!(created.email, "jo@example.com");

        let err = repo
            .create(&new_account("JO@example.COM", role))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateAccount);

        let found = repo.find_by_email(" jo@EXAMPLE.com ").await.unwrap();
        assert_eq!(found.map(|a| a.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_google_id_belongs_to_one_account() {
        let repo = MemoryAccountRepository::new();
        let role = RoleId::new();
        let a = repo.create(&new_account("a@example.com", role)).await.unwrap();
        let b = repo.create(&new_account("b@example.com", role)).await.unwrap();

        let link = GoogleLink {
            google_id: "sub-1".to_string(),
            profile_picture: None,
            verify: true,
        };
        let linked = repo.link_google(a.id, &link).await.unwrap();
        assert_eq!(linked.status, AccountStatus::Active);
        assert!(linked.is_verified);

        let err = repo.link_google(b.id, &link).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountAlreadyLinked);
    }

    #[tokio::test]
    async fn test_unlink_requires_password() {
        let repo = MemoryAccountRepository::new();
        let mut data = new_account("g@example.com", RoleId::new());
        data.password_hash = None;
        data.google_id = Some("sub-2".to_string());
        let account = repo.create(&data).await.unwrap();

        let err = repo.unlink_google(account.id).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::LastCredential);

        repo.update_password(account.id, "new-hash").await.unwrap();
        let unlinked = repo.unlink_google(account.id).await.unwrap();
        assert!(unlinked.google_id.is_none());
    }

    #[tokio::test]
    async fn test_missing_account_is_not_found() {
        let repo = MemoryAccountRepository::new();
        let err = repo
            .touch_last_login(AccountId::new(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_seeded_roles() {
        let repo = MemoryRoleRepository::seeded();
        let admin = repo.find_by_name(RoleName::Admin).await.unwrap().unwrap();
        assert!(admin.grants("anything:at_all"));

        let listed = repo.list_by_names(&RoleName::SELF_ASSIGNABLE).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().all(|r| r.name.is_self_assignable()));
    }
}
