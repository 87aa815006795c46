use crate::{
    cache::InMemoryCache,
    entities::{
        inventory::{self, Entity as Inventory, DELETED_SENTINEL},
        store::{self, Entity as Store},
        sync_log::{self, Entity as SyncLog},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, NotSet, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

const STORES_CACHE_KEY: &str = "stores:summaries";

/// A store enriched with its active item count and latest completed sync.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StoreSummary {
    pub id: i32,
    pub name: String,
    pub store_code: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
    pub is_active: bool,
    pub item_count: i64,
    pub last_sync: Option<DateTime<Utc>>,
    pub sync_status: String,
}

#[derive(Debug, Clone)]
pub struct CreateStoreInput {
    pub store_code: String,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, FromQueryResult)]
struct StoreItemCount {
    store_id: String,
    item_count: i64,
}

/// Read-through store directory with cached summaries.
#[derive(Clone)]
pub struct StoreService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    cache: Arc<InMemoryCache>,
    cache_ttl: Duration,
}

impl StoreService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        cache: Arc<InMemoryCache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            db,
            event_sender,
            cache,
            cache_ttl,
        }
    }

    /// Lists all stores with per-store active item counts and the latest
    /// completed sync run. Stores change rarely, so summaries are cached.
    #[instrument(skip(self))]
    pub async fn list_stores(&self) -> Result<Vec<StoreSummary>, ServiceError> {
        if let Ok(Some(cached)) = self.cache.get(STORES_CACHE_KEY).await {
            if let Ok(summaries) = serde_json::from_str::<Vec<StoreSummary>>(&cached) {
                return Ok(summaries);
            }
        }

        let db = &*self.db;

        let stores = Store::find()
            .order_by_asc(store::Column::StoreName)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let counts: HashMap<String, i64> = Inventory::find()
            .select_only()
            .column(inventory::Column::StoreId)
            .column_as(
                Expr::col((Inventory, inventory::Column::Id)).count(),
                "item_count",
            )
            .filter(inventory::Column::ItemName.ne(DELETED_SENTINEL))
            .group_by(inventory::Column::StoreId)
            .into_model::<StoreItemCount>()
            .all(db)
            .await
            .map_err(ServiceError::db_error)?
            .into_iter()
            .map(|row| (row.store_id, row.item_count))
            .collect();

        let sync_runs = SyncLog::find()
            .filter(sync_log::Column::Status.eq("completed"))
            .order_by_desc(sync_log::Column::CompletedAt)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut last_sync: HashMap<String, DateTime<Utc>> = HashMap::new();
        for run in sync_runs {
            if let Some(completed_at) = run.completed_at {
                last_sync.entry(run.store_id).or_insert(completed_at);
            }
        }

        let summaries: Vec<StoreSummary> = stores
            .into_iter()
            .map(|store| {
                let sync = last_sync.get(&store.store_id).copied();
                StoreSummary {
                    id: store.id,
                    name: store.store_name,
                    item_count: counts.get(&store.store_id).copied().unwrap_or(0),
                    sync_status: if sync.is_some() { "online" } else { "offline" }.to_string(),
                    last_sync: sync,
                    store_code: store.store_id,
                    address: store.address,
                    phone: store.phone,
                    manager: store.manager_email,
                    is_active: store.is_active,
                }
            })
            .collect();

        if let Ok(serialized) = serde_json::to_string(&summaries) {
            if let Err(e) = self
                .cache
                .set(STORES_CACHE_KEY, &serialized, Some(self.cache_ttl))
                .await
            {
                warn!(error = %e, "Failed to cache store summaries");
            }
        }

        Ok(summaries)
    }

    /// Registers a new store and invalidates the cached summaries.
    #[instrument(skip(self, input), fields(store_code = %input.store_code))]
    pub async fn create_store(&self, input: CreateStoreInput) -> Result<store::Model, ServiceError> {
        if input.store_code.trim().is_empty() || input.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Store code and name are required".to_string(),
            ));
        }

        let existing = Store::find()
            .filter(store::Column::StoreId.eq(input.store_code.clone()))
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Store {} already exists",
                input.store_code
            )));
        }

        let model = store::ActiveModel {
            id: NotSet,
            store_id: Set(input.store_code.clone()),
            store_name: Set(input.name),
            address: Set(input.address),
            phone: Set(input.phone),
            manager_email: Set(input.manager),
            is_active: Set(true),
            created_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Err(e) = self.cache.delete(STORES_CACHE_KEY).await {
            warn!(error = %e, "Failed to invalidate store cache");
        }
        if let Err(e) = self
            .event_sender
            .send(Event::StoreCreated(created.store_id.clone()))
            .await
        {
            warn!(error = %e, "Failed to publish store created event");
        }

        info!("Created store {} ({})", created.store_id, created.id);
        Ok(created)
    }
}
