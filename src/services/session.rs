use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::storage::{KeyValueStorage, StorageKey};
use super::store::RentalStore;
use crate::error::{AppError, AppResult};
use crate::models::{User, UserRole};

pub const OWNER_ID: &str = "owner-123";
pub const DEMO_TENANT_ID: &str = "tenant-demo";

fn owner_identity() -> User {
    User {
        id: OWNER_ID.to_string(),
        name: "Rajesh Owner".to_string(),
        phone: "9999999999".to_string(),
        role: UserRole::Owner,
        aadhaar_number: None,
    }
}

fn demo_tenant_identity() -> User {
    User {
        id: DEMO_TENANT_ID.to_string(),
        name: "Demo Tenant".to_string(),
        phone: "9999999999".to_string(),
        role: UserRole::Tenant,
        aadhaar_number: None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    /// A login is in flight.
    Pending,
    Active(User),
}

/// Simulated login. Resolves an identity for a role without any credential
/// check and keeps it under `currentUser` so a restart keeps the session.
pub struct SessionService {
    origin: Uuid,
    storage: Arc<dyn KeyValueStorage>,
    store: Arc<RentalStore>,
    state: RwLock<SessionState>,
    login_delay: Duration,
}

impl SessionService {
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        store: Arc<RentalStore>,
        login_delay: Duration,
    ) -> Self {
        Self {
            origin: store.origin(),
            storage,
            store,
            state: RwLock::new(SessionState::LoggedOut),
            login_delay,
        }
    }

    /// Picks up a persisted identity. Unreadable data counts as logged out.
    pub async fn restore(&self) -> AppResult<Option<User>> {
        let raw = self.storage.get(StorageKey::CurrentUser.as_str()).await?;
        let user = raw.and_then(|raw| match serde_json::from_str::<User>(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!("Stored session is malformed, staying logged out: {}", e);
                None
            }
        });

        *self.state.write().await = match &user {
            Some(user) => SessionState::Active(user.clone()),
            None => SessionState::LoggedOut,
        };
        if let Some(user) = &user {
            tracing::info!("Restored session for {} ({:?})", user.id, user.role);
        }
        Ok(user)
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        match &*self.state.read().await {
            SessionState::Active(user) => Some(user.clone()),
            SessionState::LoggedOut | SessionState::Pending => None,
        }
    }

    pub async fn login(&self, role: UserRole) -> AppResult<User> {
        *self.state.write().await = SessionState::Pending;

        match self.resolve_and_persist(role).await {
            Ok(user) => {
                tracing::info!("Logged in as {} ({:?})", user.id, user.role);
                *self.state.write().await = SessionState::Active(user.clone());
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("Login as {:?} failed: {}", role, e);
                *self.state.write().await = SessionState::LoggedOut;
                Err(e)
            }
        }
    }

    async fn resolve_and_persist(&self, role: UserRole) -> AppResult<User> {
        if !self.login_delay.is_zero() {
            tokio::time::sleep(self.login_delay).await;
        }

        let user = match role {
            UserRole::Owner => owner_identity(),
            UserRole::Tenant => match self.store.first_tenant().await {
                Some(first) => User {
                    role: UserRole::Tenant,
                    ..first
                },
                None => demo_tenant_identity(),
            },
            UserRole::Broker => {
                return Err(AppError::Login(
                    "Broker accounts are not supported".to_string(),
                ))
            }
        };

        let encoded = serde_json::to_string(&user)?;
        self.storage
            .set(StorageKey::CurrentUser.as_str(), encoded, self.origin)
            .await
            .map_err(|e| AppError::Login(e.to_string()))?;

        Ok(user)
    }

    pub async fn logout(&self) -> AppResult<()> {
        *self.state.write().await = SessionState::LoggedOut;
        self.storage
            .remove(StorageKey::CurrentUser.as_str(), self.origin)
            .await?;
        tracing::info!("Logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::clock::SystemClock;
    use crate::services::rental_ops::tests::{flat_302, john, owner};
    use crate::services::storage::MemoryStorage;
    use async_trait::async_trait;
    use tokio::sync::broadcast;

    async fn service(storage: &MemoryStorage) -> (Arc<RentalStore>, SessionService) {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(storage.clone());
        let store = RentalStore::open(storage.clone(), Arc::new(SystemClock))
            .await
            .unwrap();
        let session = SessionService::new(storage, store.clone(), Duration::ZERO);
        (store, session)
    }

    #[tokio::test]
    async fn owner_login_yields_fixed_identity_and_persists_it() {
        let storage = MemoryStorage::new();
        let (_, session) = service(&storage).await;

        let user = session.login(UserRole::Owner).await.unwrap();

        assert_eq!(user, owner());
        assert_eq!(session.current_user().await, Some(owner()));
        let raw = storage.get("currentUser").await.unwrap().unwrap();
        assert_eq!(serde_json::from_str::<User>(&raw).unwrap(), owner());
    }

    #[tokio::test]
    async fn tenant_login_without_tenants_uses_placeholder() {
        let storage = MemoryStorage::new();
        let (_, session) = service(&storage).await;

        let user = session.login(UserRole::Tenant).await.unwrap();

        assert_eq!(user.id, DEMO_TENANT_ID);
        assert_eq!(user.role, UserRole::Tenant);
    }

    #[tokio::test]
    async fn tenant_login_picks_first_known_tenant() {
        let storage = MemoryStorage::new();
        let (store, session) = service(&storage).await;
        let property = store
            .add_property(Some(&owner()), flat_302())
            .await
            .unwrap()
            .unwrap();
        let (john, _) = store.add_tenant(&property.id, john()).await.unwrap().unwrap();

        let user = session.login(UserRole::Tenant).await.unwrap();

        assert_eq!(user.id, john.id);
        assert_eq!(user.name, "John");
    }

    #[tokio::test]
    async fn broker_login_fails_and_stays_logged_out() {
        let storage = MemoryStorage::new();
        let (_, session) = service(&storage).await;

        let result = session.login(UserRole::Broker).await;

        assert!(matches!(result, Err(AppError::Login(_))));
        assert_eq!(session.state().await, SessionState::LoggedOut);
        assert!(storage.get("currentUser").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn session_survives_restart_until_logout() {
        let storage = MemoryStorage::new();
        let (_, session) = service(&storage).await;
        session.login(UserRole::Owner).await.unwrap();

        let (_, restarted) = service(&storage).await;
        assert_eq!(restarted.restore().await.unwrap(), Some(owner()));

        restarted.logout().await.unwrap();
        assert_eq!(restarted.current_user().await, None);

        let (_, again) = service(&storage).await;
        assert_eq!(again.restore().await.unwrap(), None);
    }

    #[tokio::test]
    async fn malformed_session_restores_as_logged_out() {
        let storage = MemoryStorage::new();
        storage
            .set("currentUser", "not-a-user".into(), Uuid::new_v4())
            .await
            .unwrap();
        let (_, session) = service(&storage).await;

        assert_eq!(session.restore().await.unwrap(), None);
        assert_eq!(session.state().await, SessionState::LoggedOut);
    }

    #[tokio::test]
    async fn login_is_pending_during_the_delay() {
        let storage = MemoryStorage::new();
        let shared: Arc<dyn KeyValueStorage> = Arc::new(storage.clone());
        let store = RentalStore::open(shared.clone(), Arc::new(SystemClock))
            .await
            .unwrap();
        let session = Arc::new(SessionService::new(
            shared,
            store,
            Duration::from_millis(200),
        ));

        let pending = {
            let session = session.clone();
            tokio::spawn(async move { session.login(UserRole::Owner).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(session.state().await, SessionState::Pending);
        assert_eq!(session.current_user().await, None);

        pending.await.unwrap().unwrap();
        assert_eq!(session.current_user().await, Some(owner()));
    }

    struct ReadOnlyStorage(MemoryStorage);

    #[async_trait]
    impl KeyValueStorage for ReadOnlyStorage {
        async fn get(&self, key: &str) -> AppResult<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: String, _origin: Uuid) -> AppResult<()> {
            Err(AppError::Storage("read-only".to_string()))
        }

        async fn remove(&self, key: &str, origin: Uuid) -> AppResult<()> {
            self.0.remove(key, origin).await
        }

        fn subscribe(&self) -> broadcast::Receiver<crate::services::storage::StorageEvent> {
            self.0.subscribe()
        }
    }

    #[tokio::test]
    async fn storage_failure_surfaces_as_login_failure() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(ReadOnlyStorage(MemoryStorage::new()));
        let store = RentalStore::open(storage.clone(), Arc::new(SystemClock))
            .await
            .unwrap();
        let session = SessionService::new(storage, store, Duration::ZERO);

        let result = session.login(UserRole::Owner).await;

        assert!(matches!(result, Err(AppError::Login(_))));
        assert_eq!(session.current_user().await, None);
    }
}
