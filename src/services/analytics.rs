use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::sale_record::{self, Entity as SaleRecord},
    errors::ServiceError,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitSummary {
    pub total_revenue: Decimal,
    pub total_cost_of_goods_sold: Decimal,
    pub total_profit: Decimal,
    pub sale_count: u64,
    pub average_profit_per_sale: Decimal,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemProfit {
    pub item_name: String,
    pub total_profit: Decimal,
    pub sale_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProfit {
    pub day: NaiveDate,
    pub total_profit: Decimal,
}

/// Read-only profit analytics over an owner's sale records.
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DbPool>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    async fn owner_sales(&self, owner_id: Uuid) -> Result<Vec<sale_record::Model>, ServiceError> {
        let sales = SaleRecord::find()
            .filter(sale_record::Column::OwnerId.eq(owner_id))
            .all(&*self.db)
            .await?;
        Ok(sales)
    }

    /// Revenue, cost of goods sold and profit totals across all of the
    /// owner's sales.
    #[instrument(skip(self), fields(%owner_id))]
    pub async fn profit_summary(&self, owner_id: Uuid) -> Result<ProfitSummary, ServiceError> {
        let sales = self.owner_sales(owner_id).await?;

        let mut total_revenue = Decimal::ZERO;
        let mut total_cost_of_goods_sold = Decimal::ZERO;
        let mut total_profit = Decimal::ZERO;
        for sale in &sales {
            total_revenue += sale.selling_price * sale.quantity_sold;
            total_cost_of_goods_sold += sale.cost_price_at_time_of_sale * sale.quantity_sold;
            total_profit += sale.profit;
        }

        let sale_count = sales.len() as u64;
        let average_profit_per_sale = if sale_count > 0 {
            total_profit / Decimal::from(sale_count)
        } else {
            Decimal::ZERO
        };

        Ok(ProfitSummary {
            total_revenue,
            total_cost_of_goods_sold,
            total_profit,
            sale_count,
            average_profit_per_sale,
            generated_at: Utc::now(),
        })
    }

    /// Profit per item name, highest earners first. `limit` caps the result
    /// when given.
    #[instrument(skip(self), fields(%owner_id))]
    pub async fn profit_by_item(
        &self,
        owner_id: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<ItemProfit>, ServiceError> {
        let sales = self.owner_sales(owner_id).await?;

        let mut by_item: HashMap<String, (Decimal, u64)> = HashMap::new();
        for sale in &sales {
            let entry = by_item
                .entry(sale.item_name.clone())
                .or_insert((Decimal::ZERO, 0));
            entry.0 += sale.profit;
            entry.1 += 1;
        }

        let mut items: Vec<ItemProfit> = by_item
            .into_iter()
            .map(|(item_name, (total_profit, sale_count))| ItemProfit {
                item_name,
                total_profit,
                sale_count,
            })
            .collect();
        items.sort_by(|a, b| b.total_profit.cmp(&a.total_profit));
        if let Some(limit) = limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    /// Daily profit over the trailing `days` window, oldest day first. Days
    /// without sales are omitted.
    #[instrument(skip(self), fields(%owner_id, days))]
    pub async fn profit_by_day(
        &self,
        owner_id: Uuid,
        days: u32,
    ) -> Result<Vec<DailyProfit>, ServiceError> {
        let since = Utc::now() - Duration::days(i64::from(days));
        let sales = SaleRecord::find()
            .filter(sale_record::Column::OwnerId.eq(owner_id))
            .filter(sale_record::Column::SaleDate.gte(since))
            .all(&*self.db)
            .await?;

        let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
        for sale in &sales {
            *by_day
                .entry(sale.sale_date.date_naive())
                .or_insert(Decimal::ZERO) += sale.profit;
        }

        Ok(by_day
            .into_iter()
            .map(|(day, total_profit)| DailyProfit { day, total_profit })
            .collect())
    }
}
