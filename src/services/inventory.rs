use crate::{
    cache::InMemoryCache,
    entities::inventory::{self, Entity as Inventory, DELETED_SENTINEL, UNASSIGNED_DEPT},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 50;
pub const MAX_PAGE_SIZE: u64 = 200;

/// Items with less stock than this show up under the low-stock filter.
const LOW_STOCK_THRESHOLD: i64 = 10;

/// Filters accepted by the inventory listing.
#[derive(Debug, Clone, Default)]
pub struct InventoryFilters {
    pub store: Option<String>,
    pub search: Option<String>,
    pub low_stock: bool,
    pub department: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

impl InventoryFilters {
    fn cache_key(&self, page: u64, page_size: u64) -> String {
        format!(
            "inventory:{}:{}:{}:{}:{}:{}:{}:{}",
            self.store.as_deref().unwrap_or("all"),
            self.search.as_deref().unwrap_or(""),
            self.low_stock,
            self.department.as_deref().unwrap_or("all"),
            self.price_min.map(|p| p.to_string()).unwrap_or_default(),
            self.price_max.map(|p| p.to_string()).unwrap_or_default(),
            page,
            page_size,
        )
    }
}

/// One page of inventory records plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryPage {
    pub items: Vec<inventory::Model>,
    pub page: u64,
    pub page_size: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub struct CreateInventoryInput {
    pub item_num: String,
    pub item_name: String,
    pub store_ids: Vec<String>,
    pub dept_id: Option<String>,
    pub item_type: Option<i32>,
    pub in_stock: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// Per-store outcome of a multi-store create.
#[derive(Debug)]
pub struct CreateInventoryOutcome {
    pub created: Vec<inventory::Model>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateInventoryInput {
    pub item_name: Option<String>,
    pub dept_id: Option<String>,
    pub item_type: Option<i32>,
    pub in_stock: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
}

impl UpdateInventoryInput {
    fn is_empty(&self) -> bool {
        self.item_name.is_none()
            && self.dept_id.is_none()
            && self.item_type.is_none()
            && self.in_stock.is_none()
            && self.cost.is_none()
            && self.price.is_none()
    }
}

/// Service for the per-(store, item) inventory catalog.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    cache: Arc<InMemoryCache>,
    cache_ttl: Duration,
}

impl InventoryService {
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

    /// Lists inventory with filtering and pagination. Soft-deleted rows are
    /// always excluded; results are ordered by item name and served through
    /// the TTL cache.
    #[instrument(skip(self))]
    pub async fn list_inventory(
        &self,
        filters: InventoryFilters,
        page: u64,
        page_size: u64,
    ) -> Result<InventoryPage, ServiceError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);

        let cache_key = filters.cache_key(page, page_size);
        if let Ok(Some(cached)) = self.cache.get(&cache_key).await {
            if let Ok(page) = serde_json::from_str::<InventoryPage>(&cached) {
                return Ok(page);
            }
        }

        let db = &*self.db;

        let mut query = Inventory::find()
            .filter(inventory::Column::ItemName.ne(DELETED_SENTINEL));

        if let Some(store) = &filters.store {
            if store != "all" {
                query = query.filter(inventory::Column::StoreId.eq(store.clone()));
            }
        }
        if let Some(search) = &filters.search {
            let term: String = search.replace([',', '(', ')'], "");
            if !term.is_empty() {
                query = query.filter(
                    Condition::any()
                        .add(inventory::Column::ItemName.contains(&term))
                        .add(inventory::Column::ItemNum.contains(&term)),
                );
            }
        }
        if filters.low_stock {
            query = query.filter(inventory::Column::InStock.lt(Decimal::from(LOW_STOCK_THRESHOLD)));
        }
        if let Some(department) = &filters.department {
            if department != "all" {
                query = query.filter(inventory::Column::DeptId.eq(department.clone()));
            }
        }
        if let Some(min) = filters.price_min {
            query = query.filter(inventory::Column::Price.gte(min));
        }
        if let Some(max) = filters.price_max {
            query = query.filter(inventory::Column::Price.lte(max));
        }

        let paginator = query
            .order_by_asc(inventory::Column::ItemName)
            .paginate(db, page_size);

        let total_items = paginator.num_items().await.map_err(|e| {
            error!(error = %e, "Failed to count inventory items");
            ServiceError::db_error(e)
        })?;
        let items = paginator.fetch_page(page - 1).await.map_err(|e| {
            error!(page = %page, page_size = %page_size, error = %e, "Failed to fetch inventory page");
            ServiceError::db_error(e)
        })?;

        let total_pages = total_items.div_ceil(page_size);
        let result = InventoryPage {
            has_more: page * page_size < total_items,
            items,
            page,
            page_size,
            total_items,
            total_pages,
        };

        if let Ok(serialized) = serde_json::to_string(&result) {
            if let Err(e) = self
                .cache
                .set(&cache_key, &serialized, Some(self.cache_ttl))
                .await
            {
                warn!(error = %e, "Failed to cache inventory page");
            }
        }

        Ok(result)
    }

    /// Direct lookup by id. Returns soft-deleted rows too, so the external
    /// sync agent (and operators) can inspect tombstones.
    #[instrument(skip(self))]
    pub async fn get_inventory(&self, id: Uuid) -> Result<inventory::Model, ServiceError> {
        Inventory::find_by_id(id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {} not found", id)))
    }

    /// Creates one record per requested store. A duplicate `(store, item_num)`
    /// is reported as a per-store conflict and does not abort the sibling
    /// stores' inserts.
    #[instrument(skip(self, input), fields(item_num = %input.item_num))]
    pub async fn create_inventory(
        &self,
        input: CreateInventoryInput,
    ) -> Result<CreateInventoryOutcome, ServiceError> {
        if input.item_num.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Item number is required".to_string(),
            ));
        }
        if input.store_ids.is_empty() {
            return Err(ServiceError::ValidationError(
                "At least one store is required".to_string(),
            ));
        }

        let db = &*self.db;
        let mut created = Vec::new();
        let mut errors = Vec::new();

        for store_id in &input.store_ids {
            let existing = Inventory::find()
                .filter(inventory::Column::StoreId.eq(store_id.clone()))
                .filter(inventory::Column::ItemNum.eq(input.item_num.clone()))
                .one(db)
                .await
                .map_err(ServiceError::db_error)?;

            if existing.is_some() {
                errors.push(format!(
                    "Item {} already exists in {}",
                    input.item_num, store_id
                ));
                continue;
            }

            let now = Utc::now();
            let price = input.price.unwrap_or(Decimal::ZERO);
            let record = inventory::ActiveModel {
                id: Set(Uuid::new_v4()),
                item_num: Set(input.item_num.clone()),
                item_name: Set(input.item_name.clone()),
                store_id: Set(store_id.clone()),
                dept_id: Set(input
                    .dept_id
                    .clone()
                    .unwrap_or_else(|| UNASSIGNED_DEPT.to_string())),
                item_type: Set(input.item_type.unwrap_or(0)),
                in_stock: Set(input.in_stock.unwrap_or(Decimal::ZERO)),
                cost: Set(input.cost.unwrap_or(Decimal::ZERO)),
                price: Set(price),
                retail_price: Set(price),
                last_synced_at: Set(Some(now)),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match record.insert(db).await {
                Ok(model) => {
                    if let Err(e) = self
                        .event_sender
                        .send(Event::InventoryCreated {
                            inventory_id: model.id,
                            store_id: model.store_id.clone(),
                            item_num: model.item_num.clone(),
                        })
                        .await
                    {
                        warn!(error = %e, "Failed to publish inventory created event");
                    }
                    created.push(model);
                }
                Err(e) => {
                    error!(store_id = %store_id, error = %e, "Failed to create inventory record");
                    errors.push(format!("Failed to add to {}: {}", store_id, e));
                }
            }
        }

        self.invalidate_list_cache().await;

        info!(
            "Created item {} in {}/{} stores",
            input.item_num,
            created.len(),
            input.store_ids.len()
        );

        Ok(CreateInventoryOutcome { created, errors })
    }

    /// Updates the named fields only. `updated_at` is always stamped so the
    /// external sync agent picks the row up on its next poll; a price change
    /// keeps `retail_price` aligned.
    #[instrument(skip(self, input))]
    pub async fn update_inventory(
        &self,
        id: Uuid,
        input: UpdateInventoryInput,
    ) -> Result<inventory::Model, ServiceError> {
        if input.is_empty() {
            return Err(ServiceError::ValidationError(
                "No updatable fields provided".to_string(),
            ));
        }

        let db = &*self.db;
        let existing = Inventory::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {} not found", id)))?;

        let mut active: inventory::ActiveModel = existing.into();
        if let Some(item_name) = input.item_name {
            active.item_name = Set(item_name);
        }
        if let Some(dept_id) = input.dept_id {
            active.dept_id = Set(dept_id);
        }
        if let Some(item_type) = input.item_type {
            active.item_type = Set(item_type);
        }
        if let Some(in_stock) = input.in_stock {
            active.in_stock = Set(in_stock);
        }
        if let Some(cost) = input.cost {
            active.cost = Set(cost);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
            active.retail_price = Set(price);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        if let Err(e) = self.event_sender.send(Event::InventoryUpdated(id)).await {
            warn!(error = %e, "Failed to publish inventory updated event");
        }
        self.invalidate_list_cache().await;

        Ok(updated)
    }

    /// Soft delete: rewrites the item name to the reserved sentinel and
    /// stamps `updated_at`. The row must remain visible to the sync agent as
    /// a mutation, never as a disappearance.
    #[instrument(skip(self))]
    pub async fn soft_delete_inventory(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let existing = Inventory::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {} not found", id)))?;

        let mut active: inventory::ActiveModel = existing.into();
        active.item_name = Set(DELETED_SENTINEL.to_string());
        active.updated_at = Set(Utc::now());
        active.update(db).await.map_err(ServiceError::db_error)?;

        if let Err(e) = self.event_sender.send(Event::InventorySoftDeleted(id)).await {
            warn!(error = %e, "Failed to publish inventory soft-delete event");
        }
        self.invalidate_list_cache().await;

        info!("Soft-deleted inventory item {}", id);
        Ok(())
    }

    async fn invalidate_list_cache(&self) {
        if let Err(e) = self.cache.clear().await {
            warn!(error = %e, "Failed to invalidate inventory cache");
        }
    }
}
