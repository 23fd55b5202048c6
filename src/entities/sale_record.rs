use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An immutable record of one sale.
///
/// `item_name` and `unit_sold` are denormalized snapshots taken at sale time;
/// they survive later edits or deletion of the referenced inventory item, so
/// `item_id` is deliberately not a foreign key. `quantity_sold`,
/// `selling_price` and `cost_price_at_time_of_sale` are all denominated in
/// the selling unit captured in `unit_sold`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sale_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity_sold: Decimal,
    pub selling_price: Decimal,
    pub cost_price_at_time_of_sale: Decimal,
    pub profit: Decimal,
    pub unit_sold: String,
    pub sale_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
