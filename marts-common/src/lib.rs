//! Mart Pipeline Common Library
//!
//! Shared types, schemas, configuration, and error handling for the
//! dimensional mart pipeline. The staging layer and every mart builder
//! consume the same canonical schemas and tier policies defined here.

pub mod config;
pub mod error;
pub mod schemas;
pub mod types;

// Re-export commonly used types
pub use config::{PipelineConfig, SalesTierPolicy, SellerTierPolicy};
pub use error::MartError;
pub use schemas::{
    dim_customers_schema,
    dim_products_schema,
    dim_sellers_schema,
    empty_frame,
    // Mart table schemas
    fct_orders_schema,
    get_all_source_names,
    get_mart_table_names,
    get_schema_for_mart,
    source_file_name,
    stg_customers_schema,
    stg_order_items_schema,
    // Staging table schemas
    stg_orders_schema,
    stg_products_schema,
    stg_reviews_schema,
    stg_sellers_schema,
    CATEGORY_TRANSLATION_SOURCE,
    CUSTOMERS_SOURCE,
    DIM_CUSTOMERS_TABLE,
    DIM_PRODUCTS_TABLE,
    DIM_SELLERS_TABLE,
    // Mart table names
    FCT_ORDERS_TABLE,
    GEOLOCATION_SOURCE,
    ORDERS_SOURCE,
    ORDER_ITEMS_SOURCE,
    PAYMENTS_SOURCE,
    PRODUCTS_SOURCE,
    REVIEWS_SOURCE,
    SELLERS_SOURCE,
};
pub use types::{CustomerType, MartReport, RunReport, SalesTier, SellerTier, SourceReport};

/// Result type alias for mart pipeline operations
pub type Result<T> = std::result::Result<T, MartError>;
