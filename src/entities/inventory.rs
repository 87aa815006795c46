use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reserved item name marking a soft-deleted record. The row stays in place
/// (with a fresh `updated_at`) so the external sync agent observes the
/// deletion as a mutation; list queries must exclude it.
pub const DELETED_SENTINEL: &str = "DELETED";

/// Department code for records originated by a transfer into a store that
/// never stocked the item before.
pub const UNASSIGNED_DEPT: &str = "NONE";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub item_num: String,
    pub item_name: String,
    pub store_id: String,
    pub dept_id: String,
    pub item_type: i32,
    /// May go negative: an over-transfer out of a depleted store is recorded
    /// as-is and reconciled by the external sync process.
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub in_stock: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub cost: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub retail_price: Decimal,
    pub last_synced_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_soft_deleted(&self) -> bool {
        self.item_name == DELETED_SENTINEL
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
