pub mod analytics;
pub mod inventory;
pub mod sales;
pub mod units;
pub mod valuation;
