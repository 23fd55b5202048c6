use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, IntoActiveModel, QueryFilter, QueryOrder,
    Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::inventory_item::{self, Entity as InventoryItem},
    errors::ServiceError,
    events::{Event, EventSender},
    services::valuation::{self, StockBatch},
};

/// A stock entry: either the first batch of a new item or a restock batch
/// merged into an existing one. Quantities and cost are denominated in the
/// stock unit; `default_selling_price_per_unit` is per selling unit.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddStockRequest {
    #[validate(length(min = 1, message = "Item name is required"))]
    pub item_name: String,
    pub quantity: Decimal,
    pub price: Decimal,
    #[validate(length(min = 1, message = "Stock unit is required"))]
    pub stock_unit: String,
    pub selling_unit: Option<String>,
    pub conversion_factor: Option<Decimal>,
    pub default_selling_price_per_unit: Option<Decimal>,
    pub supplier: Option<String>,
}

/// A sparse patch of an item's descriptive fields.
///
/// Quantity is deliberately not a member: stock levels change only through
/// [`InventoryService::add_or_merge_stock`] increments or recorded sales.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    pub item_name: Option<String>,
    pub price: Option<Decimal>,
    pub stock_unit: Option<String>,
    pub selling_unit: Option<String>,
    pub conversion_factor: Option<Decimal>,
    pub default_selling_price_per_unit: Option<Decimal>,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum StockEntryOutcome {
    Created,
    Merged,
}

#[derive(Debug, Clone, Serialize)]
pub struct StockEntryResult {
    pub outcome: StockEntryOutcome,
    pub item: inventory_item::Model,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum UpdateOutcome {
    Updated,
    NoChange,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateResult {
    pub outcome: UpdateOutcome,
    pub item: inventory_item::Model,
}

/// Validated and trimmed form of an [`AddStockRequest`] with the effective
/// selling unit and conversion factor derived.
#[derive(Debug, Clone)]
struct NormalizedStockEntry {
    item_name: String,
    quantity: Decimal,
    price: Decimal,
    stock_unit: String,
    selling_unit: String,
    conversion_factor: Decimal,
    default_selling_price_per_unit: Option<Decimal>,
    supplier: Option<String>,
}

impl AddStockRequest {
    fn normalize(&self) -> Result<NormalizedStockEntry, ServiceError> {
        let item_name = self.item_name.trim();
        if item_name.is_empty() {
            return Err(ServiceError::ValidationError(
                "Item name is required".to_string(),
            ));
        }
        let stock_unit = self.stock_unit.trim();
        if stock_unit.is_empty() {
            return Err(ServiceError::ValidationError(
                "Stock unit is required".to_string(),
            ));
        }
        if self.quantity < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity to add must be a non-negative number".to_string(),
            ));
        }
        if self.price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Cost price must be a non-negative number".to_string(),
            ));
        }
        let default_selling_price_per_unit = match self.default_selling_price_per_unit {
            Some(price) if price < Decimal::ZERO => {
                return Err(ServiceError::ValidationError(
                    "Default selling price must be a non-negative number if provided".to_string(),
                ));
            }
            other => other,
        };

        // A missing or non-positive factor falls back to 1.
        let requested_factor = self
            .conversion_factor
            .filter(|factor| *factor > Decimal::ZERO)
            .unwrap_or(Decimal::ONE);
        let selling_unit = self
            .selling_unit
            .as_deref()
            .map(str::trim)
            .filter(|unit| !unit.is_empty())
            .unwrap_or(stock_unit)
            .to_string();
        // Identical units leave nothing to convert; the factor is pinned to 1
        // no matter what the caller sent.
        let conversion_factor = if selling_unit.to_lowercase() == stock_unit.to_lowercase() {
            Decimal::ONE
        } else {
            requested_factor
        };

        let supplier = self
            .supplier
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(NormalizedStockEntry {
            item_name: item_name.to_string(),
            quantity: self.quantity,
            price: self.price,
            stock_unit: stock_unit.to_string(),
            selling_unit,
            conversion_factor,
            default_selling_price_per_unit,
            supplier,
        })
    }
}

fn map_insert_error(err: DbErr) -> ServiceError {
    // The composite unique index turns a concurrent create/create race into a
    // constraint violation; the caller retries and lands on the merge path.
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        ServiceError::Conflict(
            "a stock entry for this item was recorded concurrently, retry the operation"
                .to_string(),
        )
    } else {
        ServiceError::DatabaseError(err)
    }
}

/// Service governing the inventory item lifecycle: stock entries, field
/// edits, deletion and owner-scoped reads.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records a stock entry for the given owner.
    ///
    /// The item is looked up by (owner, item name, stock unit), compared
    /// case-insensitively. An existing item absorbs the batch: quantity adds,
    /// cost reweights to the quantity-weighted average, and the descriptive
    /// unit fields take the incoming values (last write wins). A missing item
    /// is created. Lookup and write share one transaction so the merge always
    /// computes from a consistent prior state.
    #[instrument(skip(self, request), fields(%owner_id, item_name = %request.item_name))]
    pub async fn add_or_merge_stock(
        &self,
        owner_id: Uuid,
        request: AddStockRequest,
    ) -> Result<StockEntryResult, ServiceError> {
        request.validate()?;
        let entry = request.normalize()?;

        let db = &*self.db;
        let result = db
            .transaction::<_, StockEntryResult, ServiceError>(|txn| {
                let entry = entry.clone();
                Box::pin(async move {
                    let existing = InventoryItem::find()
                        .filter(inventory_item::Column::OwnerId.eq(owner_id))
                        .filter(
                            inventory_item::Column::ItemNameKey.eq(entry.item_name.to_lowercase()),
                        )
                        .filter(
                            inventory_item::Column::StockUnitKey
                                .eq(entry.stock_unit.to_lowercase()),
                        )
                        .one(txn)
                        .await?;

                    match existing {
                        Some(item) => {
                            if entry.quantity <= Decimal::ZERO {
                                return Err(ServiceError::ValidationError(
                                    "Quantity to add must be a positive number when restocking an existing item"
                                        .to_string(),
                                ));
                            }
                            let merged = valuation::merge_batch(
                                StockBatch {
                                    quantity: item.quantity,
                                    price: item.price,
                                },
                                StockBatch {
                                    quantity: entry.quantity,
                                    price: entry.price,
                                },
                            );

                            let mut active = item.into_active_model();
                            active.quantity = Set(merged.quantity);
                            active.price = Set(merged.price);
                            active.stock_unit = Set(entry.stock_unit.clone());
                            active.stock_unit_key = Set(entry.stock_unit.to_lowercase());
                            active.selling_unit = Set(entry.selling_unit.clone());
                            active.conversion_factor = Set(entry.conversion_factor);
                            if let Some(price) = entry.default_selling_price_per_unit {
                                active.default_selling_price_per_unit = Set(price);
                            }
                            if let Some(supplier) = entry.supplier.clone() {
                                active.supplier = Set(Some(supplier));
                            }
                            active.updated_at = Set(Utc::now());
                            let item = active.update(txn).await?;

                            Ok(StockEntryResult {
                                outcome: StockEntryOutcome::Merged,
                                item,
                            })
                        }
                        None => {
                            let now = Utc::now();
                            let active = inventory_item::ActiveModel {
                                id: Set(Uuid::new_v4()),
                                owner_id: Set(owner_id),
                                item_name: Set(entry.item_name.clone()),
                                item_name_key: Set(entry.item_name.to_lowercase()),
                                quantity: Set(entry.quantity),
                                price: Set(entry.price),
                                stock_unit: Set(entry.stock_unit.clone()),
                                stock_unit_key: Set(entry.stock_unit.to_lowercase()),
                                selling_unit: Set(entry.selling_unit.clone()),
                                conversion_factor: Set(entry.conversion_factor),
                                default_selling_price_per_unit: Set(entry
                                    .default_selling_price_per_unit
                                    .unwrap_or(Decimal::ZERO)),
                                supplier: Set(entry.supplier.clone()),
                                created_at: Set(now),
                                updated_at: Set(now),
                            };
                            let item = active.insert(txn).await.map_err(map_insert_error)?;

                            Ok(StockEntryResult {
                                outcome: StockEntryOutcome::Created,
                                item,
                            })
                        }
                    }
                })
            })
            .await?;

        let event = match result.outcome {
            StockEntryOutcome::Created => {
                info!(item_id = %result.item.id, "inventory item created");
                Event::ItemCreated {
                    item_id: result.item.id,
                    owner_id,
                }
            }
            StockEntryOutcome::Merged => {
                info!(
                    item_id = %result.item.id,
                    new_quantity = %result.item.quantity,
                    new_unit_cost = %result.item.price,
                    "stock batch merged"
                );
                Event::StockMerged {
                    item_id: result.item.id,
                    owner_id,
                    quantity_added: entry.quantity,
                    new_quantity: result.item.quantity,
                    new_unit_cost: result.item.price,
                }
            }
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, item_id = %result.item.id, "failed to send stock entry event");
        }

        Ok(result)
    }

    /// Applies a sparse patch to an item's descriptive fields.
    ///
    /// Unit consistency is re-derived whenever the stock or selling unit
    /// changes; an effectively empty patch reports `NoChange` and leaves
    /// `updated_at` untouched.
    #[instrument(skip(self, patch), fields(%owner_id, %item_id))]
    pub async fn update_fields(
        &self,
        owner_id: Uuid,
        item_id: Uuid,
        patch: UpdateItemRequest,
    ) -> Result<UpdateResult, ServiceError> {
        let db = &*self.db;
        let result = db
            .transaction::<_, UpdateResult, ServiceError>(|txn| {
                Box::pin(async move {
                    let item = InventoryItem::find_by_id(item_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Inventory item {item_id} not found"))
                        })?;
                    if item.owner_id != owner_id {
                        return Err(ServiceError::Forbidden(
                            "you do not own this inventory item".to_string(),
                        ));
                    }

                    let mut changed = false;
                    let mut active = item.clone().into_active_model();

                    if let Some(name) = patch.item_name.as_deref() {
                        let name = name.trim();
                        if name.is_empty() {
                            return Err(ServiceError::ValidationError(
                                "Item name cannot be empty".to_string(),
                            ));
                        }
                        if name != item.item_name {
                            active.item_name = Set(name.to_string());
                            active.item_name_key = Set(name.to_lowercase());
                            changed = true;
                        }
                    }

                    if let Some(price) = patch.price {
                        if price < Decimal::ZERO {
                            return Err(ServiceError::ValidationError(
                                "Cost price must be a non-negative number".to_string(),
                            ));
                        }
                        if price != item.price {
                            active.price = Set(price);
                            changed = true;
                        }
                    }

                    let effective_stock_unit = match patch.stock_unit.as_deref() {
                        Some(unit) => {
                            let unit = unit.trim();
                            if unit.is_empty() {
                                return Err(ServiceError::ValidationError(
                                    "Stock unit cannot be empty".to_string(),
                                ));
                            }
                            if unit != item.stock_unit {
                                active.stock_unit = Set(unit.to_string());
                                active.stock_unit_key = Set(unit.to_lowercase());
                                changed = true;
                            }
                            unit.to_string()
                        }
                        None => item.stock_unit.clone(),
                    };

                    // An empty selling unit falls back to the (possibly new)
                    // stock unit; identical units pin the factor to 1.
                    let mut final_selling_unit = item.selling_unit.clone();
                    if let Some(unit) = patch.selling_unit.as_deref() {
                        let unit = unit.trim();
                        final_selling_unit = if unit.is_empty() {
                            effective_stock_unit.clone()
                        } else {
                            unit.to_string()
                        };
                    }
                    let mut final_factor = item.conversion_factor;
                    if let Some(factor) = patch.conversion_factor {
                        if factor <= Decimal::ZERO {
                            return Err(ServiceError::ValidationError(
                                "Conversion factor must be a positive number if provided"
                                    .to_string(),
                            ));
                        }
                        final_factor = factor;
                    }
                    if final_selling_unit.to_lowercase() == effective_stock_unit.to_lowercase() {
                        final_factor = Decimal::ONE;
                    }
                    if final_selling_unit != item.selling_unit {
                        active.selling_unit = Set(final_selling_unit);
                        changed = true;
                    }
                    if final_factor != item.conversion_factor {
                        active.conversion_factor = Set(final_factor);
                        changed = true;
                    }

                    if let Some(price) = patch.default_selling_price_per_unit {
                        if price < Decimal::ZERO {
                            return Err(ServiceError::ValidationError(
                                "Default selling price must be a non-negative number if provided"
                                    .to_string(),
                            ));
                        }
                        if price != item.default_selling_price_per_unit {
                            active.default_selling_price_per_unit = Set(price);
                            changed = true;
                        }
                    }

                    if let Some(supplier) = patch.supplier.as_deref() {
                        let supplier = supplier.trim();
                        let new_supplier = if supplier.is_empty() {
                            None
                        } else {
                            Some(supplier.to_string())
                        };
                        if new_supplier != item.supplier {
                            active.supplier = Set(new_supplier);
                            changed = true;
                        }
                    }

                    if !changed {
                        return Ok(UpdateResult {
                            outcome: UpdateOutcome::NoChange,
                            item,
                        });
                    }

                    active.updated_at = Set(Utc::now());
                    let item = active.update(txn).await?;
                    Ok(UpdateResult {
                        outcome: UpdateOutcome::Updated,
                        item,
                    })
                })
            })
            .await?;

        if result.outcome == UpdateOutcome::Updated {
            info!(%item_id, "inventory item updated");
            if let Err(e) = self.event_sender.send(Event::ItemUpdated { item_id }).await {
                warn!(error = %e, %item_id, "failed to send item updated event");
            }
        }

        Ok(result)
    }

    /// Deletes an item unconditionally. Historical sales referencing it keep
    /// their denormalized snapshots and are not touched.
    #[instrument(skip(self), fields(%owner_id, %item_id))]
    pub async fn delete_item(&self, owner_id: Uuid, item_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        let item = InventoryItem::find_by_id(item_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {item_id} not found")))?;
        if item.owner_id != owner_id {
            return Err(ServiceError::Forbidden(
                "you do not own this inventory item".to_string(),
            ));
        }

        InventoryItem::delete_by_id(item.id).exec(db).await?;
        info!(%item_id, "inventory item deleted");
        if let Err(e) = self.event_sender.send(Event::ItemDeleted { item_id }).await {
            warn!(error = %e, %item_id, "failed to send item deleted event");
        }
        Ok(())
    }

    /// Fetches a single item, owner-scoped.
    pub async fn get_item(
        &self,
        owner_id: Uuid,
        item_id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        let item = InventoryItem::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inventory item {item_id} not found")))?;
        if item.owner_id != owner_id {
            return Err(ServiceError::Forbidden(
                "you do not own this inventory item".to_string(),
            ));
        }
        Ok(item)
    }

    /// Lists the owner's items, most recently updated first.
    pub async fn list_items(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<inventory_item::Model>, ServiceError> {
        let items = InventoryItem::find()
            .filter(inventory_item::Column::OwnerId.eq(owner_id))
            .order_by_desc(inventory_item::Column::UpdatedAt)
            .all(&*self.db)
            .await?;
        Ok(items)
    }
}
