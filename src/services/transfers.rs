use crate::{
    entities::{
        inventory::{self, Entity as Inventory, UNASSIGNED_DEPT},
        inventory_change::{self, ChangeType},
        transfer::{self, Entity as Transfer, TransferStatus},
        transfer_item::{self, Entity as TransferItem},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::counter;
use rand::Rng;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ASCII")
}

/// Generates a human-readable transfer number, e.g. `TRF-MB3K2V9H-7Q1Z`.
fn generate_transfer_number() -> String {
    let timestamp = to_base36(Utc::now().timestamp_millis().max(0) as u64);
    let mut rng = rand::thread_rng();
    let suffix: String = (0..4)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("TRF-{}-{}", timestamp, suffix)
}

#[derive(Debug, Clone)]
pub struct NewTransferItem {
    pub item_num: String,
    pub item_name: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone)]
pub struct CreateTransferInput {
    pub from_store: String,
    pub to_store: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub items: Vec<NewTransferItem>,
}

/// A transfer header with its line items in creation order.
#[derive(Debug, Clone)]
pub struct TransferRecord {
    pub transfer: transfer::Model,
    pub items: Vec<transfer_item::Model>,
}

/// Outcome of a settlement pass over a transfer's line items.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementSummary {
    pub items_settled: usize,
    pub items_failed: usize,
}

/// Service owning the transfer lifecycle: creation, the status state
/// machine, and the inventory settlement that fires on completion.
#[derive(Clone)]
pub struct TransferService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl TransferService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a transfer in `pending` with all of its line items.
    ///
    /// The header and item inserts are deliberately not wrapped in a single
    /// transaction; if any line item fails to insert, the already-written
    /// rows are removed by a compensating delete so no header survives
    /// without its items.
    #[instrument(skip(self, input), fields(from = %input.from_store, to = %input.to_store))]
    pub async fn create_transfer(
        &self,
        input: CreateTransferInput,
    ) -> Result<TransferRecord, ServiceError> {
        if input.from_store.trim().is_empty() || input.to_store.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Source and destination stores are required".to_string(),
            ));
        }
        if input.from_store == input.to_store {
            return Err(ServiceError::ValidationError(
                "Source and destination stores must differ".to_string(),
            ));
        }
        if input.items.is_empty() {
            return Err(ServiceError::ValidationError(
                "A transfer requires at least one line item".to_string(),
            ));
        }
        if let Some(bad) = input
            .items
            .iter()
            .find(|item| item.quantity <= Decimal::ZERO)
        {
            return Err(ServiceError::ValidationError(format!(
                "Quantity for item {} must be positive",
                bad.item_num
            )));
        }

        let db = &*self.db;
        let transfer_id = Uuid::new_v4();
        let header = transfer::ActiveModel {
            id: Set(transfer_id),
            transfer_number: Set(generate_transfer_number()),
            from_store_id: Set(input.from_store.clone()),
            to_store_id: Set(input.to_store.clone()),
            status: Set(TransferStatus::Pending.to_string()),
            notes: Set(input.notes.clone()),
            created_by: Set(input
                .created_by
                .clone()
                .unwrap_or_else(|| "system".to_string())),
            created_at: Set(Utc::now()),
            approved_at: Set(None),
            shipped_at: Set(None),
            completed_at: Set(None),
        };
        let header = header.insert(db).await.map_err(ServiceError::db_error)?;

        let mut items = Vec::with_capacity(input.items.len());
        for (index, item) in input.items.iter().enumerate() {
            let line = transfer_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                transfer_id: Set(transfer_id),
                line_number: Set(index as i32 + 1),
                item_num: Set(item.item_num.clone()),
                item_name: Set(item.item_name.clone()),
                quantity: Set(item.quantity),
            };
            match line.insert(db).await {
                Ok(model) => items.push(model),
                Err(e) => {
                    error!(
                        transfer_id = %transfer_id,
                        item_num = %item.item_num,
                        error = %e,
                        "Line item insert failed; rolling back transfer header"
                    );
                    self.compensate_failed_create(transfer_id).await;
                    return Err(ServiceError::db_error(e));
                }
            }
        }

        if let Err(e) = self
            .event_sender
            .send(Event::TransferCreated {
                transfer_id,
                transfer_number: header.transfer_number.clone(),
                from_store_id: header.from_store_id.clone(),
                to_store_id: header.to_store_id.clone(),
                item_count: items.len(),
            })
            .await
        {
            warn!(error = %e, "Failed to publish transfer created event");
        }

        info!(
            "Created transfer {} ({}) with {} items",
            transfer_id,
            header.transfer_number,
            items.len()
        );

        Ok(TransferRecord {
            transfer: header,
            items,
        })
    }

    /// Compensating delete for a half-created transfer: items first, then the
    /// header. Best effort; leftovers are logged for operator cleanup.
    async fn compensate_failed_create(&self, transfer_id: Uuid) {
        let db = &*self.db;
        if let Err(e) = TransferItem::delete_many()
            .filter(transfer_item::Column::TransferId.eq(transfer_id))
            .exec(db)
            .await
        {
            error!(transfer_id = %transfer_id, error = %e, "Compensating item delete failed");
        }
        if let Err(e) = Transfer::delete_by_id(transfer_id).exec(db).await {
            error!(transfer_id = %transfer_id, error = %e, "Compensating header delete failed");
        }
    }

    /// Lists transfers newest-first with embedded line items. The status
    /// filter is pushed to SQL; free-text search is applied to the loaded
    /// rows across id, transfer number, notes, and both store codes.
    #[instrument(skip(self))]
    pub async fn list_transfers(
        &self,
        status: Option<TransferStatus>,
        search: Option<String>,
    ) -> Result<Vec<TransferRecord>, ServiceError> {
        let db = &*self.db;

        let mut query = Transfer::find().order_by_desc(transfer::Column::CreatedAt);
        if let Some(status) = status {
            query = query.filter(transfer::Column::Status.eq(status.to_string()));
        }

        let rows = query
            .find_with_related(TransferItem)
            .all(db)
            .await
            .map_err(ServiceError::db_error)?;

        let mut records: Vec<TransferRecord> = rows
            .into_iter()
            .map(|(transfer, mut items)| {
                items.sort_by_key(|item| item.line_number);
                TransferRecord { transfer, items }
            })
            .collect();

        // find_with_related re-sorts by primary key; restore newest-first.
        records.sort_by(|a, b| b.transfer.created_at.cmp(&a.transfer.created_at));

        if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
            let needle = search.to_lowercase();
            records.retain(|record| {
                let t = &record.transfer;
                t.id.to_string().to_lowercase().contains(&needle)
                    || t.transfer_number.to_lowercase().contains(&needle)
                    || t.notes
                        .as_deref()
                        .map(|n| n.to_lowercase().contains(&needle))
                        .unwrap_or(false)
                    || t.from_store_id.to_lowercase().contains(&needle)
                    || t.to_store_id.to_lowercase().contains(&needle)
            });
        }

        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn get_transfer(&self, id: Uuid) -> Result<TransferRecord, ServiceError> {
        let db = &*self.db;
        let transfer = Transfer::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", id)))?;

        let items = self.load_items(id).await?;
        Ok(TransferRecord { transfer, items })
    }

    async fn load_items(&self, transfer_id: Uuid) -> Result<Vec<transfer_item::Model>, ServiceError> {
        TransferItem::find()
            .filter(transfer_item::Column::TransferId.eq(transfer_id))
            .order_by_asc(transfer_item::Column::LineNumber)
            .all(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Applies a status transition after validating it against the explicit
    /// transition table. A transition into `completed` triggers settlement
    /// immediately before the status row is persisted; settlement failures
    /// are logged but never block the transition.
    ///
    /// Because terminal states have no successors, a second `completed`
    /// request is rejected with `InvalidTransition` rather than re-running
    /// settlement.
    #[instrument(skip(self), fields(transfer_id = %id, target = %target))]
    pub async fn update_status(
        &self,
        id: Uuid,
        target: TransferStatus,
    ) -> Result<transfer::Model, ServiceError> {
        let db = &*self.db;

        let transfer = Transfer::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", id)))?;

        let current = transfer.status_enum()?;
        if !current.can_transition_to(target) {
            warn!(
                "Rejected transfer {} transition '{}' -> '{}'",
                id, current, target
            );
            return Err(ServiceError::InvalidTransition(format!(
                "Cannot transition transfer from '{}' to '{}'",
                current, target
            )));
        }

        if target == TransferStatus::Completed {
            let items = self.load_items(id).await?;
            let summary = self.settle(&transfer, &items).await;
            if let Err(e) = self
                .event_sender
                .send(Event::TransferSettled {
                    transfer_id: id,
                    items_settled: summary.items_settled,
                    items_failed: summary.items_failed,
                })
                .await
            {
                warn!(error = %e, "Failed to publish transfer settled event");
            }
        }

        let now = Utc::now();
        let mut active: transfer::ActiveModel = transfer.into();
        active.status = Set(target.to_string());
        match target {
            TransferStatus::Approved => active.approved_at = Set(Some(now)),
            TransferStatus::InTransit => active.shipped_at = Set(Some(now)),
            TransferStatus::Completed => active.completed_at = Set(Some(now)),
            _ => {}
        }

        let updated = active.update(db).await.map_err(ServiceError::db_error)?;

        if let Err(e) = self
            .event_sender
            .send(Event::TransferStatusChanged {
                transfer_id: id,
                old_status: current.to_string(),
                new_status: target.to_string(),
            })
            .await
        {
            warn!(error = %e, "Failed to publish status change event");
        }

        info!(
            "Transfer {} status updated from '{}' to '{}'",
            id, current, target
        );

        Ok(updated)
    }

    /// Applies the net stock effect of every line item to both stores, in
    /// line order, and writes the matching ledger entries. One item's failure
    /// does not stop the remaining items: partial settlement plus an operator
    /// alert beats none at all.
    async fn settle(
        &self,
        transfer: &transfer::Model,
        items: &[transfer_item::Model],
    ) -> SettlementSummary {
        let mut summary = SettlementSummary::default();

        for item in items {
            match self.settle_item(transfer, item).await {
                Ok(()) => summary.items_settled += 1,
                Err(e) => {
                    summary.items_failed += 1;
                    counter!("stockroom_settlement.item_failures", 1);
                    error!(
                        transfer_id = %transfer.id,
                        item_num = %item.item_num,
                        line = item.line_number,
                        error = %e,
                        "Settlement failed for line item"
                    );
                }
            }
        }

        counter!(
            "stockroom_settlement.items_settled",
            summary.items_settled as u64
        );
        summary
    }

    async fn settle_item(
        &self,
        transfer: &transfer::Model,
        item: &transfer_item::Model,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;
        let now = Utc::now();

        // Source store: decrement when a record exists. No floor at zero;
        // negative stock marks an over-transfer for the sync process to
        // reconcile. A missing source record is tolerated.
        let source = Inventory::find()
            .filter(inventory::Column::StoreId.eq(transfer.from_store_id.clone()))
            .filter(inventory::Column::ItemNum.eq(item.item_num.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Some(source) = source {
            let new_stock = source.in_stock - item.quantity;
            Inventory::update_many()
                .col_expr(
                    inventory::Column::InStock,
                    Expr::col(inventory::Column::InStock).sub(item.quantity),
                )
                .col_expr(inventory::Column::UpdatedAt, Expr::value(now))
                .filter(inventory::Column::Id.eq(source.id))
                .exec(db)
                .await
                .map_err(ServiceError::db_error)?;

            self.record_settlement_change(
                transfer,
                item,
                &transfer.from_store_id,
                ChangeType::TransferOut,
                -item.quantity,
                source.in_stock,
                new_stock,
            )
            .await?;
            self.publish_stock_adjusted(&transfer.from_store_id, item, -item.quantity, new_stock)
                .await;
        }

        // Destination store: increment, or originate the SKU with zeroed
        // cost/price and no department when the store never carried it.
        let destination = Inventory::find()
            .filter(inventory::Column::StoreId.eq(transfer.to_store_id.clone()))
            .filter(inventory::Column::ItemNum.eq(item.item_num.clone()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        let (old_stock, new_stock) = match destination {
            Some(destination) => {
                let new_stock = destination.in_stock + item.quantity;
                Inventory::update_many()
                    .col_expr(
                        inventory::Column::InStock,
                        Expr::col(inventory::Column::InStock).add(item.quantity),
                    )
                    .col_expr(inventory::Column::UpdatedAt, Expr::value(now))
                    .filter(inventory::Column::Id.eq(destination.id))
                    .exec(db)
                    .await
                    .map_err(ServiceError::db_error)?;
                (destination.in_stock, new_stock)
            }
            None => {
                let record = inventory::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    item_num: Set(item.item_num.clone()),
                    item_name: Set(item.item_name.clone()),
                    store_id: Set(transfer.to_store_id.clone()),
                    dept_id: Set(UNASSIGNED_DEPT.to_string()),
                    item_type: Set(0),
                    in_stock: Set(item.quantity),
                    cost: Set(Decimal::ZERO),
                    price: Set(Decimal::ZERO),
                    retail_price: Set(Decimal::ZERO),
                    last_synced_at: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                record.insert(db).await.map_err(ServiceError::db_error)?;
                (Decimal::ZERO, item.quantity)
            }
        };

        self.record_settlement_change(
            transfer,
            item,
            &transfer.to_store_id,
            ChangeType::TransferIn,
            item.quantity,
            old_stock,
            new_stock,
        )
        .await?;
        self.publish_stock_adjusted(&transfer.to_store_id, item, item.quantity, new_stock)
            .await;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_settlement_change(
        &self,
        transfer: &transfer::Model,
        item: &transfer_item::Model,
        store_id: &str,
        change_type: ChangeType,
        quantity_change: Decimal,
        old_stock: Decimal,
        new_stock: Decimal,
    ) -> Result<(), ServiceError> {
        let entry = inventory_change::ActiveModel {
            id: Set(Uuid::new_v4()),
            item_num: Set(item.item_num.clone()),
            item_name: Set(item.item_name.clone()),
            store_id: Set(store_id.to_string()),
            change_type: Set(change_type.to_string()),
            quantity_change: Set(quantity_change),
            old_stock: Set(old_stock),
            new_stock: Set(new_stock),
            transfer_id: Set(Some(transfer.id)),
            notes: Set(Some(format!("Transfer {}", transfer.transfer_number))),
            created_at: Set(Utc::now()),
        };
        entry
            .insert(&*self.db)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(())
    }

    async fn publish_stock_adjusted(
        &self,
        store_id: &str,
        item: &transfer_item::Model,
        quantity_change: Decimal,
        new_stock: Decimal,
    ) {
        if let Err(e) = self
            .event_sender
            .send(Event::StockAdjusted {
                store_id: store_id.to_string(),
                item_num: item.item_num.clone(),
                quantity_change,
                new_stock,
            })
            .await
        {
            warn!(error = %e, "Failed to publish stock adjusted event");
        }
    }

    /// Deletes a transfer and its line items. Completed transfers are
    /// refused: their settlement is irreversible and ledger entries keep a
    /// back-reference to the route.
    #[instrument(skip(self))]
    pub async fn delete_transfer(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let transfer = Transfer::find_by_id(id)
            .one(db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Transfer {} not found", id)))?;

        if transfer.status_enum()? == TransferStatus::Completed {
            return Err(ServiceError::Conflict(format!(
                "Transfer {} has been settled and cannot be deleted",
                id
            )));
        }

        TransferItem::delete_many()
            .filter(transfer_item::Column::TransferId.eq(id))
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;
        Transfer::delete_by_id(id)
            .exec(db)
            .await
            .map_err(ServiceError::db_error)?;

        if let Err(e) = self.event_sender.send(Event::TransferDeleted(id)).await {
            warn!(error = %e, "Failed to publish transfer deleted event");
        }

        info!("Deleted transfer {}", id);
        Ok(())
    }
}
