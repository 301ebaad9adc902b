use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::clock::{month_label, Clock, Moment};
use super::rental_ops::RentalData;
use super::storage::{KeyValueStorage, StorageKey};
use crate::error::AppResult;
use crate::models::{
    AddTenantRequest, Complaint, ComplaintStatus, CreatePropertyRequest, OwnerDashboard, Payment,
    Property, PropertyOverview, RaiseComplaintRequest, TenantDashboard, User,
};

use super::storage::StorageKey::{Complaints, Payments, Properties, Tenants};

/// The four rental collections, mirrored to key/value storage.
///
/// Mutations are the only writers. Each one applies to the in-memory
/// collections and then writes back the collections it touched. Write-back stays
/// off until [`RentalStore::load`] has populated memory from storage, so an
/// empty default can never overwrite persisted data.
pub struct RentalStore {
    origin: Uuid,
    storage: Arc<dyn KeyValueStorage>,
    clock: Arc<dyn Clock>,
    data: RwLock<RentalData>,
    loaded: AtomicBool,
}

impl RentalStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            origin: Uuid::new_v4(),
            storage,
            clock,
            data: RwLock::new(RentalData::default()),
            loaded: AtomicBool::new(false),
        }
    }

    /// New store with every collection loaded.
    pub async fn open(
        storage: Arc<dyn KeyValueStorage>,
        clock: Arc<dyn Clock>,
    ) -> AppResult<Arc<Self>> {
        let store = Arc::new(Self::new(storage, clock));
        store.load().await?;
        Ok(store)
    }

    /// Identifies this instance's writes in storage events.
    pub fn origin(&self) -> Uuid {
        self.origin
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    pub fn current_month(&self) -> String {
        month_label(self.clock.now())
    }

    pub async fn load(&self) -> AppResult<()> {
        let mut data = self.data.write().await;
        for key in StorageKey::COLLECTIONS {
            self.read_into(&mut data, key).await?;
        }
        self.loaded.store(true, Ordering::Release);
        tracing::info!(
            properties = data.properties.len(),
            payments = data.payments.len(),
            complaints = data.complaints.len(),
            tenants = data.tenants.len(),
            "Rental data loaded"
        );
        Ok(())
    }

    /// Re-reads one collection after another instance changed it.
    pub async fn reload_key(&self, key: StorageKey) -> AppResult<()> {
        if !key.is_collection() {
            return Ok(());
        }
        let mut data = self.data.write().await;
        self.read_into(&mut data, key).await?;
        tracing::debug!("Reloaded '{}' after external change", key);
        Ok(())
    }

    async fn read_into(&self, data: &mut RentalData, key: StorageKey) -> AppResult<()> {
        match key {
            Properties => data.properties = self.read_collection(key).await?,
            Payments => data.payments = self.read_collection(key).await?,
            Complaints => data.complaints = self.read_collection(key).await?,
            Tenants => data.tenants = self.read_collection(key).await?,
            StorageKey::CurrentUser => {}
        }
        Ok(())
    }

    /// Missing or unreadable values load as an empty collection.
    async fn read_collection<T: DeserializeOwned>(&self, key: StorageKey) -> AppResult<Vec<T>> {
        let Some(raw) = self.storage.get(key.as_str()).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!("Stored '{}' is malformed, using empty list: {}", key, e);
                Ok(Vec::new())
            }
        }
    }

    /// Follows changes made by other instances until the storage feed closes.
    ///
    /// Reloads once right after subscribing, so writes that landed between
    /// [`RentalStore::load`] and the subscription are not missed.
    pub fn spawn_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut events = store.storage.subscribe();

        tokio::spawn(async move {
            if let Err(e) = store.load().await {
                tracing::error!("Failed to catch up on rental data: {}", e);
            }
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if event.origin == store.origin {
                            continue;
                        }
                        let Ok(key) = event.key.parse::<StorageKey>() else {
                            continue;
                        };
                        if let Err(e) = store.reload_key(key).await {
                            tracing::error!("Failed to reload '{}': {}", key, e);
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} storage events, reloading everything", skipped);
                        if let Err(e) = store.load().await {
                            tracing::error!("Failed to reload rental data: {}", e);
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    async fn write_back(&self, data: &RentalData, keys: &[StorageKey]) {
        if !self.is_loaded() {
            tracing::debug!("Write-back suppressed until initial load completes");
            return;
        }
        for &key in keys {
            let encoded = match key {
                Properties => encode(&data.properties),
                Payments => encode(&data.payments),
                Complaints => encode(&data.complaints),
                Tenants => encode(&data.tenants),
                StorageKey::CurrentUser => continue,
            };
            let result = match encoded {
                Ok(value) => self.storage.set(key.as_str(), value, self.origin).await,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = result {
                tracing::error!("Failed to persist '{}': {}", key, e);
            }
        }
    }

    fn moment(&self) -> Moment {
        Moment::new(self.clock.now())
    }

    // Mutations

    pub async fn add_property(
        &self,
        actor: Option<&User>,
        req: CreatePropertyRequest,
    ) -> AppResult<Option<Property>> {
        let mut data = self.data.write().await;
        let property = data.add_property(&self.moment(), actor, req)?;
        if let Some(p) = &property {
            self.write_back(&data, &[Properties]).await;
            tracing::info!("Property {} added", p.id);
        }
        Ok(property)
    }

    pub async fn add_tenant(
        &self,
        property_id: &str,
        req: AddTenantRequest,
    ) -> AppResult<Option<(User, Option<Payment>)>> {
        let mut data = self.data.write().await;
        let added = data.add_tenant(&self.moment(), property_id, req)?;
        if let Some((tenant, _)) = &added {
            self.write_back(&data, &[Tenants, Properties, Payments]).await;
            tracing::info!("Tenant {} moved into property {}", tenant.id, property_id);
        }
        Ok(added)
    }

    pub async fn rent_property(
        &self,
        actor: Option<&User>,
        property_id: &str,
    ) -> AppResult<Option<(Property, Option<Payment>)>> {
        let mut data = self.data.write().await;
        let rented = data.rent_property(&self.moment(), actor, property_id)?;
        if rented.is_some() {
            self.write_back(&data, &[Properties, Payments, Tenants]).await;
            tracing::info!("Property {} rented", property_id);
        }
        Ok(rented)
    }

    pub async fn pay_rent(&self, payment_id: &str) -> Option<Payment> {
        let mut data = self.data.write().await;
        let payment = data.pay_rent(&self.moment(), payment_id)?;
        self.write_back(&data, &[Payments]).await;
        tracing::info!("Payment {} marked paid", payment_id);
        Some(payment)
    }

    pub async fn raise_complaint(
        &self,
        actor: Option<&User>,
        req: RaiseComplaintRequest,
    ) -> AppResult<Option<Complaint>> {
        let mut data = self.data.write().await;
        let complaint = data.raise_complaint(&self.moment(), actor, req)?;
        if let Some(c) = &complaint {
            self.write_back(&data, &[Complaints]).await;
            tracing::info!("Complaint {} raised for property {}", c.id, c.property_id);
        }
        Ok(complaint)
    }

    pub async fn send_reminder(&self, payment_id: &str) -> Option<Payment> {
        let mut data = self.data.write().await;
        let payment = data.send_reminder(payment_id)?;
        self.write_back(&data, &[Payments]).await;
        Some(payment)
    }

    pub async fn update_complaint_status(
        &self,
        complaint_id: &str,
        status: ComplaintStatus,
    ) -> Option<Complaint> {
        let mut data = self.data.write().await;
        let complaint = data.update_complaint_status(complaint_id, status)?;
        self.write_back(&data, &[Complaints]).await;
        tracing::info!("Complaint {} is now {:?}", complaint_id, status);
        Some(complaint)
    }

    pub async fn advance_complaint(&self, complaint_id: &str) -> Option<Complaint> {
        let mut data = self.data.write().await;
        let complaint = data.advance_complaint(complaint_id)?;
        self.write_back(&data, &[Complaints]).await;
        tracing::info!("Complaint {} is now {:?}", complaint_id, complaint.status);
        Some(complaint)
    }

    pub async fn generate_monthly_rent(&self, property_id: &str) -> AppResult<Payment> {
        let mut data = self.data.write().await;
        let payment = data.generate_monthly_rent(&self.moment(), property_id)?;
        self.write_back(&data, &[Payments]).await;
        tracing::info!("Rent generated for {} on property {}", payment.month, property_id);
        Ok(payment)
    }

    pub async fn remove_tenant(&self, property_id: &str) -> Option<String> {
        let mut data = self.data.write().await;
        let tenant_id = data.remove_tenant(property_id)?;
        self.write_back(&data, &[Properties, Tenants]).await;
        tracing::info!("Tenant {} removed from property {}", tenant_id, property_id);
        Some(tenant_id)
    }

    // Views

    pub async fn snapshot(&self) -> RentalData {
        self.data.read().await.clone()
    }

    pub async fn properties(&self) -> Vec<Property> {
        self.data.read().await.properties.clone()
    }

    pub async fn payments(&self) -> Vec<Payment> {
        self.data.read().await.payments.clone()
    }

    pub async fn complaints(&self) -> Vec<Complaint> {
        self.data.read().await.complaints.clone()
    }

    pub async fn tenants(&self) -> Vec<User> {
        self.data.read().await.tenants.clone()
    }

    pub async fn first_tenant(&self) -> Option<User> {
        self.data.read().await.tenants.first().cloned()
    }

    pub async fn payment(&self, payment_id: &str) -> Option<Payment> {
        self.data.read().await.payment(payment_id).cloned()
    }

    pub async fn available_properties(&self) -> Vec<Property> {
        self.data.read().await.available_properties()
    }

    /// Dashboard for `month`, or the current month when not given.
    pub async fn owner_dashboard(&self, month: Option<&str>) -> OwnerDashboard {
        let month = month.map(str::to_string).unwrap_or_else(|| self.current_month());
        self.data.read().await.owner_dashboard(&month)
    }

    pub async fn property_overview(&self, property_id: &str) -> Option<PropertyOverview> {
        self.data.read().await.property_overview(property_id)
    }

    pub async fn tenant_dashboard(&self, user: &User) -> TenantDashboard {
        self.data.read().await.tenant_dashboard(user)
    }
}

fn encode<T: Serialize>(items: &[T]) -> serde_json::Result<String> {
    serde_json::to_string(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use crate::services::clock::FixedClock;
    use crate::services::rental_ops::tests::{flat_302, john, owner, tenant};
    use crate::services::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn october_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2023, 10, 15, 10, 0, 0).unwrap(),
        ))
    }

    async fn open(storage: &MemoryStorage) -> Arc<RentalStore> {
        RentalStore::open(Arc::new(storage.clone()), october_clock())
            .await
            .unwrap()
    }

    async fn stored(storage: &MemoryStorage, key: StorageKey) -> Option<serde_json::Value> {
        storage
            .get(key.as_str())
            .await
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[tokio::test]
    async fn empty_storage_loads_empty_collections() {
        let storage = MemoryStorage::new();
        let store = open(&storage).await;

        assert!(store.is_loaded());
        assert_eq!(store.snapshot().await, RentalData::default());
        assert!(stored(&storage, Properties).await.is_none());
    }

    #[tokio::test]
    async fn malformed_collection_falls_back_to_empty() {
        let storage = MemoryStorage::new();
        let origin = Uuid::new_v4();
        storage
            .set("properties", "{not json".into(), origin)
            .await
            .unwrap();
        storage
            .set(
                "tenants",
                r#"[{"id":"t1","name":"John","phone":"9876543210","role":"TENANT"}]"#.into(),
                origin,
            )
            .await
            .unwrap();

        let store = open(&storage).await;

        assert!(store.properties().await.is_empty());
        assert_eq!(store.tenants().await.len(), 1);
    }

    #[tokio::test]
    async fn mutations_are_written_back_under_their_keys() {
        let storage = MemoryStorage::new();
        let store = open(&storage).await;

        let property = assert_ok!(store.add_property(Some(&owner()), flat_302()).await).unwrap();
        assert_ok!(store.add_tenant(&property.id, john()).await);

        let properties = stored(&storage, Properties).await.unwrap();
        assert_eq!(properties[0]["id"], property.id.as_str());
        assert_eq!(properties[0]["isOccupied"], true);
        let payments = stored(&storage, Payments).await.unwrap();
        assert_eq!(payments[0]["status"], "DUE");
        assert_eq!(payments[0]["month"], "October 2023");
        assert_eq!(stored(&storage, Tenants).await.unwrap()[0]["name"], "John");
        assert!(stored(&storage, Complaints).await.is_none());
    }

    #[tokio::test]
    async fn no_write_back_before_initial_load() {
        let storage = MemoryStorage::new();
        let origin = Uuid::new_v4();
        storage
            .set("properties", "[]".into(), origin)
            .await
            .unwrap();
        let store = RentalStore::new(Arc::new(storage.clone()), october_clock());

        store.add_property(Some(&owner()), flat_302()).await.unwrap();

        assert!(!store.is_loaded());
        assert_eq!(storage.get("properties").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn data_survives_reopening() {
        let storage = MemoryStorage::new();
        let store = open(&storage).await;
        let property = store
            .add_property(Some(&owner()), flat_302())
            .await
            .unwrap()
            .unwrap();
        store.add_tenant(&property.id, john()).await.unwrap();
        drop(store);

        let reopened = open(&storage).await;

        let properties = reopened.properties().await;
        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].id, property.id);
        assert!(properties[0].is_occupied);
        assert_eq!(reopened.payments().await.len(), 1);
        assert_eq!(reopened.tenants().await.len(), 1);
    }

    #[tokio::test]
    async fn changes_from_another_instance_are_picked_up() {
        let storage = MemoryStorage::new();
        let first = open(&storage).await;
        let second = open(&storage).await;
        let sync = second.spawn_sync();

        first
            .add_property(Some(&owner()), flat_302())
            .await
            .unwrap();

        let mut seen = false;
        for _ in 0..50 {
            if second.properties().await.len() == 1 {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen, "second instance never saw the new property");
        sync.abort();
    }

    #[tokio::test]
    async fn writes_before_sync_starts_are_not_missed() {
        let storage = MemoryStorage::new();
        let first = open(&storage).await;
        let second = open(&storage).await;

        first
            .add_property(Some(&owner()), flat_302())
            .await
            .unwrap();
        assert!(second.properties().await.is_empty());
        let sync = second.spawn_sync();

        let mut seen = false;
        for _ in 0..50 {
            if second.properties().await.len() == 1 {
                seen = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(seen, "write made before sync started was never loaded");
        sync.abort();
    }

    #[tokio::test]
    async fn writes_are_announced_with_own_origin() {
        let storage = MemoryStorage::new();
        let store = open(&storage).await;
        let mut events = storage.subscribe();

        store
            .add_property(Some(&owner()), flat_302())
            .await
            .unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(event.origin, store.origin());
        assert_eq!(event.key, "properties");
    }

    #[tokio::test]
    async fn scenario_owner_bills_and_collects_rent() {
        let storage = MemoryStorage::new();
        let clock = october_clock();
        let store = RentalStore::open(Arc::new(storage.clone()), clock.clone())
            .await
            .unwrap();

        let property = store
            .add_property(Some(&owner()), flat_302())
            .await
            .unwrap()
            .unwrap();
        assert!(!property.is_occupied);

        let (_, payment) = store.add_tenant(&property.id, john()).await.unwrap().unwrap();
        let payment = payment.unwrap();
        assert_eq!(payment.amount, 15000);
        assert_eq!(payment.status, PaymentStatus::Due);

        let paid = store.pay_rent(&payment.id).await.unwrap();
        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.date_paid.unwrap().to_string(), "2023-10-15");

        assert!(store.generate_monthly_rent(&property.id).await.is_err());

        clock.set(Utc.with_ymd_and_hms(2023, 11, 1, 8, 0, 0).unwrap());
        let next = store.generate_monthly_rent(&property.id).await.unwrap();
        assert_eq!(next.month, "November 2023");

        let for_property = store
            .payments()
            .await
            .into_iter()
            .filter(|p| p.property_id == property.id)
            .count();
        assert_eq!(for_property, 2);
        assert_eq!(store.owner_dashboard(None).await.month, "November 2023");
    }

    #[tokio::test]
    async fn tenant_without_home_cannot_complain() {
        let storage = MemoryStorage::new();
        let store = open(&storage).await;

        let result = store
            .raise_complaint(
                Some(&tenant("t1")),
                RaiseComplaintRequest {
                    title: "No water".into(),
                    description: String::new(),
                    property_id: None,
                    images: None,
                },
            )
            .await;

        assert!(result.is_err());
        assert!(store.complaints().await.is_empty());
        assert!(stored(&storage, Complaints).await.is_none());
    }
}
