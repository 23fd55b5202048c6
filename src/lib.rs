//! Trade and inventory tracking core.
//!
//! Multi-tenant stock management built around three rules: stock batches for
//! the same (item name, stock unit) merge under a weighted-average cost,
//! quantities and prices convert between a stock unit and a selling unit
//! through a per-item factor, and a sale debits stock and writes its profit
//! snapshot in one transaction.
//!
//! This crate is the core only. Authentication, HTTP routing and rendering
//! live in the embedding application: every operation takes an
//! already-authenticated `owner_id` and returns typed outcomes/errors that
//! the outer layer maps to its transport (see
//! [`errors::ServiceError::status_code`]).
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod migrator;
pub mod observability;
pub mod services;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;

use crate::services::{
    analytics::AnalyticsService, inventory::InventoryService, sales::SaleService,
};

/// Capacity of the domain-event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fully wired application state: connection pool, event channel and the
/// service set an embedding layer calls into.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub inventory_service: InventoryService,
    pub sale_service: SaleService,
    pub analytics_service: AnalyticsService,
}

impl AppState {
    /// Connects to the database, optionally runs migrations, and wires up
    /// the services. The returned receiver feeds [`events::process_events`];
    /// the caller decides where to spawn it.
    pub async fn from_config(
        config: config::AppConfig,
    ) -> Result<(Self, mpsc::Receiver<events::Event>), errors::ServiceError> {
        let db = Arc::new(db::establish_connection_from_app_config(&config).await?);
        if config.auto_migrate {
            db::run_migrations(db.as_ref()).await?;
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let event_sender = events::EventSender::new(tx);

        let state = Self {
            inventory_service: InventoryService::new(db.clone(), event_sender.clone()),
            sale_service: SaleService::new(db.clone(), event_sender.clone()),
            analytics_service: AnalyticsService::new(db.clone()),
            db,
            config,
            event_sender,
        };
        Ok((state, rx))
    }
}
