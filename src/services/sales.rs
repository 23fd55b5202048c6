use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        inventory_item::{self, Entity as InventoryItem},
        sale_record::{self, Entity as SaleRecord},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::units,
};

/// Slack applied to sufficiency checks, in selling units. Absorbs the drift
/// a client accumulates when it round-trips converted quantities; anything
/// beyond it is a genuine oversell.
pub const STOCK_SUFFICIENCY_TOLERANCE: Decimal = dec!(0.00001);

/// A sale request. Quantity and price are denominated in the item's selling
/// unit.
///
/// `declared_cost_price` and `declared_profit` are figures the client
/// computed for display; they are untrusted hints. The service recomputes
/// both from the item's current state and persists its own values, logging
/// any divergence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSaleRequest {
    pub item_id: Uuid,
    pub quantity_sold: Decimal,
    pub selling_price: Decimal,
    pub declared_cost_price: Option<Decimal>,
    pub declared_profit: Option<Decimal>,
}

/// What deleting a sale does to inventory.
///
/// The default treats deletion as a historical-record correction: the sale
/// row disappears, stock stays where it is. `RestockInventory` additionally
/// re-credits the sold quantity, converted with the item's current factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DeletePolicy {
    #[default]
    HistoricalOnly,
    RestockInventory,
}

/// Service recording and deleting sales against the owner's inventory.
#[derive(Clone)]
pub struct SaleService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl SaleService {
    /// Creates a new sale service instance
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a sale: checks sufficiency, snapshots the cost per selling
    /// unit, computes profit, debits stock and persists the sale record.
    ///
    /// The stock decrement and the sale insert share one transaction; a
    /// failure at any step leaves both tables untouched. The sufficiency
    /// check runs inside the same transaction, so a concurrent sale cannot
    /// observe the pre-decrement quantity.
    #[instrument(skip(self, request), fields(%owner_id, item_id = %request.item_id))]
    pub async fn record_sale(
        &self,
        owner_id: Uuid,
        request: RecordSaleRequest,
    ) -> Result<sale_record::Model, ServiceError> {
        if request.quantity_sold <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity sold must be a positive number".to_string(),
            ));
        }
        if request.selling_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Selling price must be a non-negative number".to_string(),
            ));
        }

        let db = &*self.db;
        let sale = db
            .transaction::<_, sale_record::Model, ServiceError>(|txn| {
                let request = request.clone();
                Box::pin(async move {
                    let item = InventoryItem::find_by_id(request.item_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Inventory item {} not found",
                                request.item_id
                            ))
                        })?;
                    if item.owner_id != owner_id {
                        return Err(ServiceError::Forbidden(
                            "you cannot sell an inventory item you do not own".to_string(),
                        ));
                    }

                    let factor = item.conversion_factor;
                    let available_selling = units::to_selling_units(item.quantity, factor)?;
                    if available_selling + STOCK_SUFFICIENCY_TOLERANCE <= request.quantity_sold {
                        return Err(ServiceError::InsufficientStock {
                            item_name: item.item_name.clone(),
                            unit: item.selling_unit.clone(),
                            available: available_selling,
                            requested: request.quantity_sold,
                        });
                    }

                    let quantity_in_stock_units =
                        units::to_stock_units(request.quantity_sold, factor)?;
                    let cost_price = units::cost_per_selling_unit(item.price, factor)?;
                    let profit = (request.selling_price - cost_price) * request.quantity_sold;

                    if let Some(declared) = request.declared_cost_price {
                        if (declared - cost_price).abs() > STOCK_SUFFICIENCY_TOLERANCE {
                            warn!(
                                %declared,
                                computed = %cost_price,
                                "client-declared cost price diverges, persisting computed value"
                            );
                        }
                    }
                    if let Some(declared) = request.declared_profit {
                        if (declared - profit).abs() > STOCK_SUFFICIENCY_TOLERANCE {
                            warn!(
                                %declared,
                                computed = %profit,
                                "client-declared profit diverges, persisting computed value"
                            );
                        }
                    }

                    // Oversells inside the tolerance band round to empty
                    // rather than going negative.
                    let mut remaining = item.quantity - quantity_in_stock_units;
                    if remaining < Decimal::ZERO {
                        remaining = Decimal::ZERO;
                    }

                    let now = Utc::now();
                    let item_name = item.item_name.clone();
                    let unit_sold = item.selling_unit.clone();
                    let item_id = item.id;

                    let mut active = item.into_active_model();
                    active.quantity = Set(remaining);
                    active.updated_at = Set(now);
                    active.update(txn).await?;

                    let sale = sale_record::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        owner_id: Set(owner_id),
                        item_id: Set(item_id),
                        item_name: Set(item_name),
                        quantity_sold: Set(request.quantity_sold),
                        selling_price: Set(request.selling_price),
                        cost_price_at_time_of_sale: Set(cost_price),
                        profit: Set(profit),
                        unit_sold: Set(unit_sold),
                        sale_date: Set(now),
                        created_at: Set(now),
                        updated_at: Set(now),
                    }
                    .insert(txn)
                    .await?;

                    Ok(sale)
                })
            })
            .await?;

        info!(sale_id = %sale.id, item_id = %sale.item_id, profit = %sale.profit, "sale recorded");
        if let Err(e) = self
            .event_sender
            .send(Event::SaleRecorded {
                sale_id: sale.id,
                item_id: sale.item_id,
                profit: sale.profit,
            })
            .await
        {
            warn!(error = %e, sale_id = %sale.id, "failed to send sale recorded event");
        }

        Ok(sale)
    }

    /// Deletes a sale record under the given policy.
    ///
    /// `HistoricalOnly` never touches inventory. `RestockInventory`
    /// re-credits the converted quantity when the referenced item still
    /// exists and belongs to the same owner; the delete and the credit share
    /// one transaction.
    #[instrument(skip(self), fields(%owner_id, %sale_id, %policy))]
    pub async fn delete_sale(
        &self,
        owner_id: Uuid,
        sale_id: Uuid,
        policy: DeletePolicy,
    ) -> Result<(), ServiceError> {
        let db = &*self.db;
        let restocked = db
            .transaction::<_, bool, ServiceError>(|txn| {
                Box::pin(async move {
                    let sale = SaleRecord::find_by_id(sale_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Sale record {sale_id} not found"))
                        })?;
                    if sale.owner_id != owner_id {
                        return Err(ServiceError::Forbidden(
                            "you do not own this sale record".to_string(),
                        ));
                    }

                    let mut restocked = false;
                    if policy == DeletePolicy::RestockInventory {
                        if let Some(item) = InventoryItem::find_by_id(sale.item_id).one(txn).await?
                        {
                            if item.owner_id == owner_id {
                                let credited =
                                    units::to_stock_units(sale.quantity_sold, item.conversion_factor)?;
                                let new_quantity = item.quantity + credited;
                                let mut active = item.into_active_model();
                                active.quantity = Set(new_quantity);
                                active.updated_at = Set(Utc::now());
                                active.update(txn).await?;
                                restocked = true;
                            }
                        }
                    }

                    SaleRecord::delete_by_id(sale.id).exec(txn).await?;
                    Ok(restocked)
                })
            })
            .await?;

        info!(%sale_id, restocked, "sale deleted");
        if let Err(e) = self
            .event_sender
            .send(Event::SaleDeleted { sale_id, restocked })
            .await
        {
            warn!(error = %e, %sale_id, "failed to send sale deleted event");
        }
        Ok(())
    }

    /// Fetches a single sale record, owner-scoped.
    pub async fn get_sale(
        &self,
        owner_id: Uuid,
        sale_id: Uuid,
    ) -> Result<sale_record::Model, ServiceError> {
        let sale = SaleRecord::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Sale record {sale_id} not found")))?;
        if sale.owner_id != owner_id {
            return Err(ServiceError::Forbidden(
                "you do not own this sale record".to_string(),
            ));
        }
        Ok(sale)
    }

    /// Lists the owner's sales, most recent sale first.
    pub async fn list_sales(&self, owner_id: Uuid) -> Result<Vec<sale_record::Model>, ServiceError> {
        let sales = SaleRecord::find()
            .filter(sale_record::Column::OwnerId.eq(owner_id))
            .order_by_desc(sale_record::Column::SaleDate)
            .all(&*self.db)
            .await?;
        Ok(sales)
    }
}
