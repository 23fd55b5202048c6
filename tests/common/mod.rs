#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use uuid::Uuid;

use tradestock_core::{
    db::{self, DbConfig, DbPool},
    events::{process_events, EventSender},
    services::{
        analytics::AnalyticsService,
        inventory::{AddStockRequest, InventoryService},
        sales::SaleService,
    },
};

/// Helper harness wiring the services to a fresh in-memory SQLite database.
pub struct TestApp {
    pub db: Arc<DbPool>,
    pub inventory: InventoryService,
    pub sales: SaleService,
    pub analytics: AnalyticsService,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        // A single connection keeps every query on the same in-memory
        // database.
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };
        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let db = Arc::new(pool);

        let (tx, rx) = mpsc::channel(64);
        let event_sender = EventSender::new(tx);
        let event_task = tokio::spawn(process_events(rx));

        Self {
            inventory: InventoryService::new(db.clone(), event_sender.clone()),
            sales: SaleService::new(db.clone(), event_sender),
            analytics: AnalyticsService::new(db.clone()),
            db,
            _event_task: event_task,
        }
    }
}

pub fn owner() -> Uuid {
    Uuid::new_v4()
}

/// Stock entry for an item sold in the same unit it is stocked in.
pub fn stock_request(item_name: &str, quantity: Decimal, price: Decimal) -> AddStockRequest {
    AddStockRequest {
        item_name: item_name.to_string(),
        quantity,
        price,
        stock_unit: "bundle".to_string(),
        selling_unit: None,
        conversion_factor: None,
        default_selling_price_per_unit: None,
        supplier: None,
    }
}

/// Stock entry for an item stocked in bundles and sold in pieces.
pub fn converted_stock_request(
    item_name: &str,
    quantity: Decimal,
    price: Decimal,
    conversion_factor: Decimal,
) -> AddStockRequest {
    AddStockRequest {
        item_name: item_name.to_string(),
        quantity,
        price,
        stock_unit: "bundle".to_string(),
        selling_unit: Some("piece".to_string()),
        conversion_factor: Some(conversion_factor),
        default_selling_price_per_unit: None,
        supplier: None,
    }
}
