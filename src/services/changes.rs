use crate::{
    entities::inventory_change::{self, ChangeType, Entity as InventoryChange},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{instrument, warn};
use uuid::Uuid;

/// Hard cap on a single ledger read; the table is append-only and unbounded.
const MAX_CHANGE_ROWS: u64 = 500;

#[derive(Debug, Clone)]
pub struct NewChangeEntry {
    pub item_num: String,
    pub item_name: String,
    pub store_id: String,
    pub change_type: ChangeType,
    pub quantity_change: Decimal,
    pub old_stock: Decimal,
    pub new_stock: Decimal,
    pub transfer_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeFilters {
    pub store: Option<String>,
    pub change_type: Option<ChangeType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Service over the append-only inventory change ledger. Entries are never
/// mutated or deleted; summaries are derived by scanning, never stored.
#[derive(Clone)]
pub struct ChangeLedgerService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ChangeLedgerService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Appends one ledger entry.
    #[instrument(skip(self, entry), fields(store_id = %entry.store_id, change_type = %entry.change_type))]
    pub async fn record_change(
        &self,
        entry: NewChangeEntry,
    ) -> Result<inventory_change::Model, ServiceError> {
        if entry.item_num.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Item number is required".to_string(),
            ));
        }
        if entry.store_id.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Store id is required".to_string(),
            ));
        }

        let model = inventory_change::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_num: Set(entry.item_num),
            item_name: Set(entry.item_name),
            store_id: Set(entry.store_id),
            change_type: Set(entry.change_type.to_string()),
            quantity_change: Set(entry.quantity_change),
            old_stock: Set(entry.old_stock),
            new_stock: Set(entry.new_stock),
            transfer_id: Set(entry.transfer_id),
            notes: Set(entry.notes),
            created_at: Set(Utc::now()),
        };

        let created = model
            .insert(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Err(e) = self
            .event_sender
            .send(Event::ChangeRecorded {
                change_id: created.id,
                store_id: created.store_id.clone(),
                change_type: created.change_type.clone(),
            })
            .await
        {
            warn!(error = %e, "Failed to publish change recorded event");
        }

        Ok(created)
    }

    /// Reads ledger entries newest-first, capped at [`MAX_CHANGE_ROWS`].
    #[instrument(skip(self))]
    pub async fn list_changes(
        &self,
        filters: ChangeFilters,
    ) -> Result<Vec<inventory_change::Model>, ServiceError> {
        let mut query = InventoryChange::find().order_by_desc(inventory_change::Column::CreatedAt);

        if let Some(store) = &filters.store {
            if store != "all" {
                query = query.filter(inventory_change::Column::StoreId.eq(store.clone()));
            }
        }
        if let Some(change_type) = filters.change_type {
            query = query
                .filter(inventory_change::Column::ChangeType.eq(change_type.to_string()));
        }
        if let Some(start) = filters.start_date {
            query = query.filter(inventory_change::Column::CreatedAt.gte(start));
        }
        if let Some(end) = filters.end_date {
            query = query.filter(inventory_change::Column::CreatedAt.lte(end));
        }

        query
            .limit(MAX_CHANGE_ROWS)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }
}
