use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A tenant's stock position for one item, tracked in stock units.
///
/// `price` is the running weighted-average cost per stock unit across all
/// merged batches. `item_name_key` and `stock_unit_key` hold the lowercased
/// forms backing the per-owner case-insensitive uniqueness of
/// (item name, stock unit); the display columns keep the caller's casing.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub item_name: String,
    pub item_name_key: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub stock_unit: String,
    pub stock_unit_key: String,
    pub selling_unit: String,
    pub conversion_factor: Decimal,
    pub default_selling_price_per_unit: Decimal,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
