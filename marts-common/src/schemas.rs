//! Polars schemas for staging and mart tables
//!
//! The staging layer normalizes every raw source into one of these
//! canonical relations; the mart builders only ever see canonical
//! column names and types. Column order matters: it is the published
//! column order of the four mart tables.

use polars::prelude::{DataFrame, DataType, Field, Schema, Series, TimeUnit};

use crate::Result;

// Mart table names (the four published relations)
pub const FCT_ORDERS_TABLE: &str = "fct_orders";
pub const DIM_CUSTOMERS_TABLE: &str = "dim_customers";
pub const DIM_PRODUCTS_TABLE: &str = "dim_products";
pub const DIM_SELLERS_TABLE: &str = "dim_sellers";

// Raw source relation names, addressable through the source catalog
pub const ORDERS_SOURCE: &str = "orders";
pub const ORDER_ITEMS_SOURCE: &str = "order_items";
pub const PRODUCTS_SOURCE: &str = "products";
pub const CUSTOMERS_SOURCE: &str = "customers";
pub const SELLERS_SOURCE: &str = "sellers";
pub const REVIEWS_SOURCE: &str = "reviews";
pub const GEOLOCATION_SOURCE: &str = "geolocation";
pub const PAYMENTS_SOURCE: &str = "payments";
pub const CATEGORY_TRANSLATION_SOURCE: &str = "category_translation";

/// All raw source relation names the catalog can be asked for
pub fn get_all_source_names() -> Vec<&'static str> {
    vec![
        ORDERS_SOURCE,
        ORDER_ITEMS_SOURCE,
        PRODUCTS_SOURCE,
        CUSTOMERS_SOURCE,
        SELLERS_SOURCE,
        REVIEWS_SOURCE,
        GEOLOCATION_SOURCE,
        PAYMENTS_SOURCE,
        CATEGORY_TRANSLATION_SOURCE,
    ]
}

/// The four published mart table names
pub fn get_mart_table_names() -> Vec<&'static str> {
    vec![
        FCT_ORDERS_TABLE,
        DIM_CUSTOMERS_TABLE,
        DIM_PRODUCTS_TABLE,
        DIM_SELLERS_TABLE,
    ]
}

/// Map a source relation name to its CSV file name in the data directory
pub fn source_file_name(name: &str) -> Option<&'static str> {
    match name {
        ORDERS_SOURCE => Some("olist_orders_dataset.csv"),
        ORDER_ITEMS_SOURCE => Some("olist_order_items_dataset.csv"),
        PRODUCTS_SOURCE => Some("olist_products_dataset.csv"),
        CUSTOMERS_SOURCE => Some("olist_customers_dataset.csv"),
        SELLERS_SOURCE => Some("olist_sellers_dataset.csv"),
        REVIEWS_SOURCE => Some("olist_order_reviews_dataset.csv"),
        GEOLOCATION_SOURCE => Some("olist_geolocation_dataset.csv"),
        PAYMENTS_SOURCE => Some("olist_order_payments_dataset.csv"),
        CATEGORY_TRANSLATION_SOURCE => Some("product_category_name_translation.csv"),
        _ => None,
    }
}

fn timestamp_type() -> DataType {
    DataType::Datetime(TimeUnit::Microseconds, None)
}

/// Schema for the staged orders relation
pub fn stg_orders_schema() -> Schema {
    Schema::from_iter([
        Field::new("order_id", DataType::String),
        Field::new("customer_id", DataType::String),
        Field::new("order_status", DataType::String),
        Field::new("purchase_timestamp", timestamp_type()),
    ])
}

/// Schema for the staged order items relation (the fact grain source)
pub fn stg_order_items_schema() -> Schema {
    Schema::from_iter([
        Field::new("order_id", DataType::String),
        Field::new("order_item_id", DataType::Int64),
        Field::new("product_id", DataType::String),
        Field::new("seller_id", DataType::String),
        Field::new("price", DataType::Float64),
        Field::new("freight_value", DataType::Float64),
    ])
}

/// Schema for the staged products relation
pub fn stg_products_schema() -> Schema {
    Schema::from_iter([
        Field::new("product_id", DataType::String),
        Field::new("category_name", DataType::String),
    ])
}

/// Schema for the staged customers relation
pub fn stg_customers_schema() -> Schema {
    Schema::from_iter([
        Field::new("customer_id", DataType::String),
        Field::new("customer_unique_id", DataType::String),
        Field::new("city", DataType::String),
        Field::new("state", DataType::String),
    ])
}

/// Schema for the staged sellers relation
pub fn stg_sellers_schema() -> Schema {
    Schema::from_iter([
        Field::new("seller_id", DataType::String),
        Field::new("city", DataType::String),
        Field::new("state", DataType::String),
    ])
}

/// Schema for the staged order reviews relation
pub fn stg_reviews_schema() -> Schema {
    Schema::from_iter([
        Field::new("review_id", DataType::String),
        Field::new("order_id", DataType::String),
        Field::new("review_score", DataType::Float64),
    ])
}

/// Schema for the order-line fact table
///
/// Grain: one row per order line item. `total_order_value` is always
/// `price + freight_value`, computed row-wise by the fact builder and
/// never stored independently.
pub fn fct_orders_schema() -> Schema {
    Schema::from_iter([
        Field::new("order_id", DataType::String),
        Field::new("customer_id", DataType::String),
        Field::new("product_id", DataType::String),
        Field::new("purchase_timestamp", timestamp_type()),
        Field::new("category_name", DataType::String),
        Field::new("price", DataType::Float64),
        Field::new("freight_value", DataType::Float64),
        Field::new("total_order_value", DataType::Float64),
    ])
}

/// Schema for the customer dimension
///
/// One row per customer_id, zero-filled metrics for customers with no
/// order history. `lifetime_value` sums item prices only; freight is
/// excluded from LTV.
pub fn dim_customers_schema() -> Schema {
    Schema::from_iter([
        Field::new("customer_id", DataType::String),
        Field::new("customer_unique_id", DataType::String),
        Field::new("city", DataType::String),
        Field::new("state", DataType::String),
        Field::new("total_orders", DataType::Int64),
        Field::new("lifetime_value", DataType::Float64),
        Field::new("customer_type", DataType::String),
    ])
}

/// Schema for the seller dimension
///
/// `avg_review_score` stays null for sellers without reviewed orders;
/// the other metrics coalesce to zero.
pub fn dim_sellers_schema() -> Schema {
    Schema::from_iter([
        Field::new("seller_id", DataType::String),
        Field::new("city", DataType::String),
        Field::new("state", DataType::String),
        Field::new("total_orders", DataType::Int64),
        Field::new("total_revenue", DataType::Float64),
        Field::new("avg_review_score", DataType::Float64),
        Field::new("seller_tier", DataType::String),
    ])
}

/// Schema for the product dimension
pub fn dim_products_schema() -> Schema {
    Schema::from_iter([
        Field::new("product_id", DataType::String),
        Field::new("category_name", DataType::String),
        Field::new("times_sold", DataType::Int64),
        Field::new("total_revenue", DataType::Float64),
        Field::new("sales_tier", DataType::String),
    ])
}

/// Look up the schema for a mart table by name
pub fn get_schema_for_mart(table: &str) -> Option<Schema> {
    match table {
        FCT_ORDERS_TABLE => Some(fct_orders_schema()),
        DIM_CUSTOMERS_TABLE => Some(dim_customers_schema()),
        DIM_PRODUCTS_TABLE => Some(dim_products_schema()),
        DIM_SELLERS_TABLE => Some(dim_sellers_schema()),
        _ => None,
    }
}

/// Build a zero-row DataFrame with the given schema
///
/// A fully-missing source is staged as an empty canonical frame so the
/// builders' left joins degrade to zero-filled metrics instead of errors.
pub fn empty_frame(schema: &Schema) -> Result<DataFrame> {
    let columns: Vec<Series> = schema
        .iter_fields()
        .map(|field| Series::new_empty(field.name().as_str(), field.data_type()))
        .collect();
    Ok(DataFrame::new(columns)?)
}
