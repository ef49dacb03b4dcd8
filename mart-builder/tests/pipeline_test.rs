// Integration tests for the full mart pipeline
//
// Exercises the complete flow against an in-memory catalog:
// 1. Raw relations arrive with source-specific column names
// 2. Staging normalizes, casts, and excludes malformed rows
// 3. Fact and dimension builders materialize the four marts
// 4. The publisher swaps the snapshot in atomically
//
// plus the cross-cutting guarantees: idempotence, referential
// completeness, and rank-ordered tiers.

use std::str::FromStr;

use polars::prelude::*;
use pretty_assertions::assert_eq;

use mart_builder::{MemoryCatalog, ParquetPublisher, Pipeline};
use marts_common::{
    PipelineConfig, SellerTier, CUSTOMERS_SOURCE, ORDERS_SOURCE, ORDER_ITEMS_SOURCE,
    PRODUCTS_SOURCE, REVIEWS_SOURCE, SELLERS_SOURCE,
};

/// A small but fully-wired source snapshot:
/// - c1 places two orders (R$100 + R$50 item price, then R$30)
/// - c2 places one order with an unparseable-price line that must drop
/// - c3 never orders
/// - s1 fulfills everything; s2 is idle
/// - p3 is in the master but never sold
fn fixture_catalog() -> MemoryCatalog {
    let mut catalog = MemoryCatalog::new();

    catalog.insert(
        ORDERS_SOURCE,
        DataFrame::new(vec![
            Series::new("order_id", ["o1", "o2", "o3"]),
            Series::new("customer_id", ["c1", "c1", "c2"]),
            Series::new("order_status", ["delivered", "delivered", "delivered"]),
            Series::new(
                "order_purchase_timestamp",
                [
                    "2017-10-02 10:56:33",
                    "2017-11-18 19:28:06",
                    "2018-02-13 21:18:39",
                ],
            ),
        ])
        .unwrap(),
    );

    catalog.insert(
        ORDER_ITEMS_SOURCE,
        DataFrame::new(vec![
            Series::new("order_id", ["o1", "o1", "o2", "o3", "o3"]),
            Series::new("order_item_id", [1i64, 2, 1, 1, 2]),
            Series::new("product_id", ["p1", "p2", "p1", "p2", "p2"]),
            Series::new("seller_id", ["s1", "s1", "s1", "s1", "s1"]),
            Series::new("price", ["100.00", "50.00", "30.00", "49.90", "oops"]),
            Series::new("freight_value", ["10.00", "5.00", "3.00", "15.10", "1.00"]),
        ])
        .unwrap(),
    );

    catalog.insert(
        PRODUCTS_SOURCE,
        DataFrame::new(vec![
            Series::new("product_id", ["p1", "p2", "p3"]),
            Series::new(
                "product_category_name",
                [Some("brinquedos"), Some("cama_mesa_banho"), None::<&str>],
            ),
        ])
        .unwrap(),
    );

    catalog.insert(
        CUSTOMERS_SOURCE,
        DataFrame::new(vec![
            Series::new("customer_id", ["c1", "c2", "c3"]),
            Series::new("customer_unique_id", ["u1", "u2", "u3"]),
            Series::new("customer_city", ["sao paulo", "campinas", "recife"]),
            Series::new("customer_state", ["SP", "SP", "PE"]),
        ])
        .unwrap(),
    );

    catalog.insert(
        SELLERS_SOURCE,
        DataFrame::new(vec![
            Series::new("seller_id", ["s1", "s2"]),
            Series::new("seller_city", ["ibitinga", "curitiba"]),
            Series::new("seller_state", ["SP", "PR"]),
        ])
        .unwrap(),
    );

    catalog.insert(
        REVIEWS_SOURCE,
        DataFrame::new(vec![
            Series::new("review_id", ["r1", "r2", "r3"]),
            Series::new("order_id", ["o1", "o2", "o3"]),
            Series::new("review_score", [5.0f64, 4.0, 3.0]),
        ])
        .unwrap(),
    );

    catalog
}

fn str_value(frame: &DataFrame, column: &str, key_column: &str, key: &str) -> String {
    let keys = frame.column(key_column).unwrap().str().unwrap();
    let idx = (0..frame.height())
        .find(|&i| keys.get(i) == Some(key))
        .unwrap_or_else(|| panic!("no row with {} = {}", key_column, key));
    frame
        .column(column)
        .unwrap()
        .str()
        .unwrap()
        .get(idx)
        .unwrap()
        .to_string()
}

fn i64_value(frame: &DataFrame, column: &str, key_column: &str, key: &str) -> i64 {
    let keys = frame.column(key_column).unwrap().str().unwrap();
    let idx = (0..frame.height())
        .find(|&i| keys.get(i) == Some(key))
        .unwrap_or_else(|| panic!("no row with {} = {}", key_column, key));
    frame.column(column).unwrap().i64().unwrap().get(idx).unwrap()
}

fn f64_value(frame: &DataFrame, column: &str, key_column: &str, key: &str) -> f64 {
    let keys = frame.column(key_column).unwrap().str().unwrap();
    let idx = (0..frame.height())
        .find(|&i| keys.get(i) == Some(key))
        .unwrap_or_else(|| panic!("no row with {} = {}", key_column, key));
    frame.column(column).unwrap().f64().unwrap().get(idx).unwrap()
}

#[test]
fn full_run_materializes_the_expected_star_schema() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let (snapshot, report) = pipeline.run(&fixture_catalog()).unwrap();

    // The malformed item line is excluded, four fact rows remain.
    assert_eq!(snapshot.fct_orders.height(), 4);
    assert_eq!(report.total_rows_dropped(), 1);

    // Every fact row honors total_order_value = price + freight_value.
    let check = snapshot
        .fct_orders
        .clone()
        .lazy()
        .filter(
            col("total_order_value")
                .neq(col("price") + col("freight_value")),
        )
        .collect()
        .unwrap();
    assert_eq!(check.height(), 0);

    // The 49.90 + 15.10 line lands on exactly 65.00.
    let fact = &snapshot.fct_orders;
    let totals = fact.column("total_order_value").unwrap().f64().unwrap();
    let order_ids = fact.column("order_id").unwrap().str().unwrap();
    let o3_total = (0..fact.height())
        .find(|&i| order_ids.get(i) == Some("o3"))
        .map(|i| totals.get(i).unwrap())
        .unwrap();
    assert_eq!(o3_total, 65.00);

    // Customer dimension: two orders for c1, one for c2, none for c3.
    let customers = &snapshot.dim_customers;
    assert_eq!(customers.height(), 3);
    assert_eq!(i64_value(customers, "total_orders", "customer_id", "c1"), 2);
    assert_eq!(f64_value(customers, "lifetime_value", "customer_id", "c1"), 180.00);
    assert_eq!(
        str_value(customers, "customer_type", "customer_id", "c1"),
        "Returning"
    );
    assert_eq!(
        str_value(customers, "customer_type", "customer_id", "c2"),
        "One-time"
    );
    assert_eq!(i64_value(customers, "total_orders", "customer_id", "c3"), 0);
    assert_eq!(f64_value(customers, "lifetime_value", "customer_id", "c3"), 0.00);
    assert_eq!(
        str_value(customers, "customer_type", "customer_id", "c3"),
        "No Orders"
    );

    // Seller dimension: the idle seller still gets a (Bronze) row.
    let sellers = &snapshot.dim_sellers;
    assert_eq!(sellers.height(), 2);
    assert_eq!(i64_value(sellers, "total_orders", "seller_id", "s1"), 3);
    assert_eq!(str_value(sellers, "seller_tier", "seller_id", "s2"), "Bronze");

    // Product dimension: full master coverage, sold or not.
    let products = &snapshot.dim_products;
    assert_eq!(products.height(), 3);
    assert_eq!(i64_value(products, "times_sold", "product_id", "p3"), 0);
    assert_eq!(f64_value(products, "total_revenue", "product_id", "p3"), 0.0);
}

#[test]
fn every_fact_product_in_the_master_appears_once_in_dim_products() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let (snapshot, _) = pipeline.run(&fixture_catalog()).unwrap();

    let dim_ids: Vec<String> = snapshot
        .dim_products
        .column("product_id")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    let fact_ids = snapshot
        .fct_orders
        .column("product_id")
        .unwrap()
        .str()
        .unwrap();
    for product_id in fact_ids.into_iter().flatten() {
        let occurrences = dim_ids.iter().filter(|id| id.as_str() == product_id).count();
        assert_eq!(occurrences, 1, "product {} must appear exactly once", product_id);
    }
}

#[test]
fn seller_tiers_sort_by_rank_not_alphabetically() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let (snapshot, _) = pipeline.run(&fixture_catalog()).unwrap();

    let mut tiers: Vec<SellerTier> = snapshot
        .dim_sellers
        .column("seller_tier")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .flatten()
        .map(|label| SellerTier::from_str(label).unwrap())
        .collect();
    tiers.sort_by(|a, b| b.rank().cmp(&a.rank()));

    for pair in tiers.windows(2) {
        assert!(
            pair[0].rank() >= pair[1].rank(),
            "tier ordering must follow rank, got {:?}",
            tiers
        );
    }
}

#[test]
fn rerunning_an_unchanged_snapshot_is_byte_identical() {
    let pipeline = Pipeline::new(PipelineConfig::default());
    let (first, _) = pipeline.run(&fixture_catalog()).unwrap();
    let (second, _) = pipeline.run(&fixture_catalog()).unwrap();

    assert!(first.fct_orders.equals_missing(&second.fct_orders));
    assert!(first.dim_customers.equals_missing(&second.dim_customers));
    assert!(first.dim_products.equals_missing(&second.dim_products));
    assert!(first.dim_sellers.equals_missing(&second.dim_sellers));

    // Byte-for-byte equality of the published artifacts.
    let dir = tempfile::tempdir().unwrap();
    let out_a = dir.path().join("run_a");
    let out_b = dir.path().join("run_b");
    ParquetPublisher::new(&out_a).publish(&first).unwrap();
    ParquetPublisher::new(&out_b).publish(&second).unwrap();

    for table in ["fct_orders", "dim_customers", "dim_products", "dim_sellers"] {
        let file = format!("{}.parquet", table);
        let bytes_a = std::fs::read(out_a.join(&file)).unwrap();
        let bytes_b = std::fs::read(out_b.join(&file)).unwrap();
        assert_eq!(bytes_a, bytes_b, "{} differs between identical runs", table);
    }
}
