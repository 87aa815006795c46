use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Kinds of stock movement the ledger records.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    TransferOut,
    TransferIn,
    Adjustment,
    Sale,
    Receipt,
}

/// Append-only audit row. Never mutated or deleted; `transfer_id` is a weak
/// back-reference (a deleted transfer leaves its ledger entries in place).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_changes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_num: String,
    pub item_name: String,
    pub store_id: String,
    pub change_type: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_change: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub old_stock: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub new_stock: Decimal,
    pub transfer_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
