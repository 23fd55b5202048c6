mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use common::{owner, stock_request, TestApp};
use tradestock_core::services::sales::RecordSaleRequest;

fn sell(item_id: Uuid, quantity_sold: Decimal, selling_price: Decimal) -> RecordSaleRequest {
    RecordSaleRequest {
        item_id,
        quantity_sold,
        selling_price,
        declared_cost_price: None,
        declared_profit: None,
    }
}

#[tokio::test]
async fn summary_totals_cover_revenue_cogs_and_profit() {
    let app = TestApp::new().await;
    let owner_id = owner();

    let fabric = app
        .inventory
        .add_or_merge_stock(owner_id, stock_request("Fabric", dec!(10), dec!(100)))
        .await
        .unwrap()
        .item;
    let thread = app
        .inventory
        .add_or_merge_stock(owner_id, stock_request("Thread", dec!(50), dec!(2)))
        .await
        .unwrap()
        .item;

    // Fabric: 2 @ 120 -> revenue 240, cogs 200, profit 40.
    app.sales
        .record_sale(owner_id, sell(fabric.id, dec!(2), dec!(120)))
        .await
        .unwrap();
    // Thread: 10 @ 3 -> revenue 30, cogs 20, profit 10.
    app.sales
        .record_sale(owner_id, sell(thread.id, dec!(10), dec!(3)))
        .await
        .unwrap();

    let summary = app.analytics.profit_summary(owner_id).await.unwrap();
    assert_eq!(summary.sale_count, 2);
    assert_eq!(summary.total_revenue, dec!(270));
    assert_eq!(summary.total_cost_of_goods_sold, dec!(220));
    assert_eq!(summary.total_profit, dec!(50));
    assert_eq!(summary.average_profit_per_sale, dec!(25));
}

#[tokio::test]
async fn empty_history_yields_zeroed_summary() {
    let app = TestApp::new().await;
    let owner_id = owner();

    let summary = app.analytics.profit_summary(owner_id).await.unwrap();
    assert_eq!(summary.sale_count, 0);
    assert_eq!(summary.total_profit, Decimal::ZERO);
    assert_eq!(summary.average_profit_per_sale, Decimal::ZERO);
}

#[tokio::test]
async fn profit_by_item_ranks_highest_earners_first() {
    let app = TestApp::new().await;
    let owner_id = owner();

    let fabric = app
        .inventory
        .add_or_merge_stock(owner_id, stock_request("Fabric", dec!(10), dec!(100)))
        .await
        .unwrap()
        .item;
    let thread = app
        .inventory
        .add_or_merge_stock(owner_id, stock_request("Thread", dec!(50), dec!(2)))
        .await
        .unwrap()
        .item;

    app.sales
        .record_sale(owner_id, sell(fabric.id, dec!(1), dec!(110)))
        .await
        .unwrap();
    app.sales
        .record_sale(owner_id, sell(thread.id, dec!(10), dec!(5)))
        .await
        .unwrap();
    app.sales
        .record_sale(owner_id, sell(thread.id, dec!(5), dec!(6)))
        .await
        .unwrap();

    let ranked = app.analytics.profit_by_item(owner_id, None).await.unwrap();
    assert_eq!(ranked.len(), 2);
    // Thread: 10*3 + 5*4 = 50 beats Fabric's 10.
    assert_eq!(ranked[0].item_name, "Thread");
    assert_eq!(ranked[0].total_profit, dec!(50));
    assert_eq!(ranked[0].sale_count, 2);
    assert_eq!(ranked[1].item_name, "Fabric");
    assert_eq!(ranked[1].total_profit, dec!(10));

    let top_one = app
        .analytics
        .profit_by_item(owner_id, Some(1))
        .await
        .unwrap();
    assert_eq!(top_one.len(), 1);
    assert_eq!(top_one[0].item_name, "Thread");
}

#[tokio::test]
async fn profit_by_day_groups_todays_sales() {
    let app = TestApp::new().await;
    let owner_id = owner();

    let fabric = app
        .inventory
        .add_or_merge_stock(owner_id, stock_request("Fabric", dec!(10), dec!(100)))
        .await
        .unwrap()
        .item;
    app.sales
        .record_sale(owner_id, sell(fabric.id, dec!(1), dec!(110)))
        .await
        .unwrap();
    app.sales
        .record_sale(owner_id, sell(fabric.id, dec!(2), dec!(105)))
        .await
        .unwrap();

    let days = app.analytics.profit_by_day(owner_id, 30).await.unwrap();
    assert_eq!(days.len(), 1);
    // 10 + 10 profit, both recorded today.
    assert_eq!(days[0].total_profit, dec!(20));
}

#[tokio::test]
async fn analytics_are_scoped_to_the_owner() {
    let app = TestApp::new().await;
    let owner_a = owner();
    let owner_b = owner();

    let fabric = app
        .inventory
        .add_or_merge_stock(owner_a, stock_request("Fabric", dec!(10), dec!(100)))
        .await
        .unwrap()
        .item;
    app.sales
        .record_sale(owner_a, sell(fabric.id, dec!(1), dec!(110)))
        .await
        .unwrap();

    let summary = app.analytics.profit_summary(owner_b).await.unwrap();
    assert_eq!(summary.sale_count, 0);
    assert!(app
        .analytics
        .profit_by_item(owner_b, None)
        .await
        .unwrap()
        .is_empty());
}
