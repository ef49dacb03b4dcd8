//! Staging layer: per-entity cleaning of the raw source relations
//!
//! Staging does three things and nothing else: canonicalize column
//! names, cast to canonical types, and drop rows that cannot carry
//! their business meaning (null required keys, unparseable or negative
//! money values, duplicate natural keys). No joins, no aggregation —
//! business meaning is untouched until the mart builders run.
//!
//! A fully-missing source becomes an empty canonical relation, so the
//! builders' left joins degrade to zero-filled metrics downstream.

use polars::prelude::*;
use tracing::{debug, warn};

use marts_common::{
    empty_frame, schemas, stg_customers_schema, stg_order_items_schema, stg_orders_schema,
    stg_products_schema, stg_reviews_schema, stg_sellers_schema, MartError, Result, SourceReport,
};

/// One normalized relation plus its data-quality outcome
pub struct StagedTable {
    pub frame: DataFrame,
    /// Rows removed during staging (malformed or duplicate)
    pub rows_dropped: usize,
}

/// The six normalized relations the mart builders consume
pub struct StagedSources {
    pub orders: DataFrame,
    pub order_items: DataFrame,
    pub products: DataFrame,
    pub customers: DataFrame,
    pub sellers: DataFrame,
    pub reviews: DataFrame,
}

/// Staging result for a whole run
pub struct StagingOutcome {
    pub tables: StagedSources,
    pub sources: Vec<SourceReport>,
}

impl StagingOutcome {
    /// Number of sources the catalog could actually produce
    pub fn present_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.present).count()
    }
}

/// Stage every source the mart builders depend on
pub fn stage_all(catalog: &dyn crate::source::SourceCatalog) -> Result<StagingOutcome> {
    let mut sources = Vec::with_capacity(6);

    let orders = stage_source(
        catalog,
        schemas::ORDERS_SOURCE,
        &stg_orders_schema(),
        stage_orders,
        &mut sources,
    )?;
    let order_items = stage_source(
        catalog,
        schemas::ORDER_ITEMS_SOURCE,
        &stg_order_items_schema(),
        stage_order_items,
        &mut sources,
    )?;
    let products = stage_source(
        catalog,
        schemas::PRODUCTS_SOURCE,
        &stg_products_schema(),
        stage_products,
        &mut sources,
    )?;
    let customers = stage_source(
        catalog,
        schemas::CUSTOMERS_SOURCE,
        &stg_customers_schema(),
        stage_customers,
        &mut sources,
    )?;
    let sellers = stage_source(
        catalog,
        schemas::SELLERS_SOURCE,
        &stg_sellers_schema(),
        stage_sellers,
        &mut sources,
    )?;
    let reviews = stage_source(
        catalog,
        schemas::REVIEWS_SOURCE,
        &stg_reviews_schema(),
        stage_reviews,
        &mut sources,
    )?;

    Ok(StagingOutcome {
        tables: StagedSources {
            orders,
            order_items,
            products,
            customers,
            sellers,
            reviews,
        },
        sources,
    })
}

fn stage_source(
    catalog: &dyn crate::source::SourceCatalog,
    name: &str,
    schema: &Schema,
    normalize: fn(DataFrame) -> Result<StagedTable>,
    sources: &mut Vec<SourceReport>,
) -> Result<DataFrame> {
    match catalog.fetch(name)? {
        Some(raw) => {
            let staged = normalize(raw)?;
            if staged.rows_dropped > 0 {
                warn!(
                    "Dropped {} rows from '{}' during staging (malformed or duplicate)",
                    staged.rows_dropped, name
                );
            }
            debug!("Staged {} rows for '{}'", staged.frame.height(), name);
            sources.push(SourceReport {
                name: name.to_string(),
                present: true,
                rows_staged: staged.frame.height(),
                rows_dropped: staged.rows_dropped,
            });
            Ok(staged.frame)
        }
        None => {
            warn!("Source '{}' is missing; continuing with zero rows", name);
            sources.push(SourceReport {
                name: name.to_string(),
                present: false,
                rows_staged: 0,
                rows_dropped: 0,
            });
            empty_frame(schema)
        }
    }
}

/// Normalize the raw orders relation into `stg_orders`
pub fn stage_orders(raw: DataFrame) -> Result<StagedTable> {
    require_columns(&raw, schemas::ORDERS_SOURCE, &["order_id", "customer_id"])?;
    let input_rows = raw.height();

    let timestamp = datetime_expr(
        &raw,
        &["order_purchase_timestamp", "purchase_timestamp"],
        "purchase_timestamp",
    );
    let status = column_expr(&raw, &["order_status"], "order_status", &DataType::String);

    let frame = raw
        .lazy()
        .select([
            col("order_id").cast(DataType::String),
            col("customer_id").cast(DataType::String),
            status,
            timestamp,
        ])
        .filter(col("order_id").is_not_null().and(col("customer_id").is_not_null()))
        .unique_stable(Some(vec!["order_id".to_string()]), UniqueKeepStrategy::First)
        .collect()?;

    Ok(StagedTable {
        rows_dropped: input_rows - frame.height(),
        frame,
    })
}

/// Normalize the raw order items relation into `stg_order_items`
///
/// Grain-defining relation of the fact table: one row per product line
/// within an order. Only exact duplicate rows collapse here; distinct
/// line items of the same product stay distinct.
pub fn stage_order_items(raw: DataFrame) -> Result<StagedTable> {
    require_columns(
        &raw,
        schemas::ORDER_ITEMS_SOURCE,
        &["order_id", "product_id", "price", "freight_value"],
    )?;
    let input_rows = raw.height();

    let item_seq = column_expr(&raw, &["order_item_id"], "order_item_id", &DataType::Int64);
    let seller = column_expr(&raw, &["seller_id"], "seller_id", &DataType::String);

    let frame = raw
        .lazy()
        .select([
            col("order_id").cast(DataType::String),
            item_seq,
            col("product_id").cast(DataType::String),
            seller,
            col("price").cast(DataType::Float64),
            col("freight_value").cast(DataType::Float64),
        ])
        .filter(
            col("order_id")
                .is_not_null()
                .and(col("product_id").is_not_null())
                .and(col("price").is_not_null())
                .and(col("price").gt_eq(lit(0.0)))
                .and(col("freight_value").is_not_null())
                .and(col("freight_value").gt_eq(lit(0.0))),
        )
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;

    Ok(StagedTable {
        rows_dropped: input_rows - frame.height(),
        frame,
    })
}

/// Normalize the raw products relation into `stg_products`
pub fn stage_products(raw: DataFrame) -> Result<StagedTable> {
    require_columns(&raw, schemas::PRODUCTS_SOURCE, &["product_id"])?;
    let input_rows = raw.height();

    let category = column_expr(
        &raw,
        &["product_category_name", "category_name"],
        "category_name",
        &DataType::String,
    );

    let frame = raw
        .lazy()
        .select([col("product_id").cast(DataType::String), category])
        .filter(col("product_id").is_not_null())
        .unique_stable(Some(vec!["product_id".to_string()]), UniqueKeepStrategy::First)
        .collect()?;

    Ok(StagedTable {
        rows_dropped: input_rows - frame.height(),
        frame,
    })
}

/// Normalize the raw customers relation into `stg_customers`
pub fn stage_customers(raw: DataFrame) -> Result<StagedTable> {
    require_columns(&raw, schemas::CUSTOMERS_SOURCE, &["customer_id"])?;
    let input_rows = raw.height();

    let unique_id = column_expr(
        &raw,
        &["customer_unique_id"],
        "customer_unique_id",
        &DataType::String,
    );
    let city = column_expr(&raw, &["customer_city", "city"], "city", &DataType::String);
    let state = column_expr(&raw, &["customer_state", "state"], "state", &DataType::String);

    let frame = raw
        .lazy()
        .select([col("customer_id").cast(DataType::String), unique_id, city, state])
        .filter(col("customer_id").is_not_null())
        .unique_stable(Some(vec!["customer_id".to_string()]), UniqueKeepStrategy::First)
        .collect()?;

    Ok(StagedTable {
        rows_dropped: input_rows - frame.height(),
        frame,
    })
}

/// Normalize the raw sellers relation into `stg_sellers`
pub fn stage_sellers(raw: DataFrame) -> Result<StagedTable> {
    require_columns(&raw, schemas::SELLERS_SOURCE, &["seller_id"])?;
    let input_rows = raw.height();

    let city = column_expr(&raw, &["seller_city", "city"], "city", &DataType::String);
    let state = column_expr(&raw, &["seller_state", "state"], "state", &DataType::String);

    let frame = raw
        .lazy()
        .select([col("seller_id").cast(DataType::String), city, state])
        .filter(col("seller_id").is_not_null())
        .unique_stable(Some(vec!["seller_id".to_string()]), UniqueKeepStrategy::First)
        .collect()?;

    Ok(StagedTable {
        rows_dropped: input_rows - frame.height(),
        frame,
    })
}

/// Normalize the raw order reviews relation into `stg_reviews`
///
/// Scores outside the 1..=5 survey range carry no meaning for seller
/// averages and are dropped with the malformed rows.
pub fn stage_reviews(raw: DataFrame) -> Result<StagedTable> {
    require_columns(&raw, schemas::REVIEWS_SOURCE, &["order_id", "review_score"])?;
    let input_rows = raw.height();

    let review_id = column_expr(&raw, &["review_id"], "review_id", &DataType::String);

    let frame = raw
        .lazy()
        .select([
            review_id,
            col("order_id").cast(DataType::String),
            col("review_score").cast(DataType::Float64),
        ])
        .filter(
            col("order_id")
                .is_not_null()
                .and(col("review_score").is_not_null())
                .and(col("review_score").gt_eq(lit(1.0)))
                .and(col("review_score").lt_eq(lit(5.0))),
        )
        .unique_stable(None, UniqueKeepStrategy::First)
        .collect()?;

    Ok(StagedTable {
        rows_dropped: input_rows - frame.height(),
        frame,
    })
}

fn require_columns(frame: &DataFrame, source: &str, required: &[&str]) -> Result<()> {
    let names = frame.get_column_names();
    for column in required {
        if !names.contains(column) {
            return Err(MartError::SchemaError(format!(
                "source '{}' is missing required column '{}'",
                source, column
            )));
        }
    }
    Ok(())
}

/// Select the first present candidate column, cast to the canonical
/// type; a column absent from the source entirely becomes all-null.
fn column_expr(frame: &DataFrame, candidates: &[&str], alias_to: &str, dtype: &DataType) -> Expr {
    let names = frame.get_column_names();
    for &candidate in candidates {
        if names.contains(&candidate) {
            return col(candidate).cast(dtype.clone()).alias(alias_to);
        }
    }
    lit(Null {}).cast(dtype.clone()).alias(alias_to)
}

/// Canonicalize a timestamp column to microsecond datetimes
///
/// CSV sources deliver timestamps as strings; in-memory catalogs may
/// already hand over datetime columns. Unparseable values become null
/// rather than failing the run.
fn datetime_expr(frame: &DataFrame, candidates: &[&str], alias_to: &str) -> Expr {
    let target = DataType::Datetime(TimeUnit::Microseconds, None);
    let schema = frame.schema();
    for &candidate in candidates {
        match schema.get(candidate) {
            Some(DataType::String) => {
                return col(candidate)
                    .str()
                    .to_datetime(
                        Some(TimeUnit::Microseconds),
                        None,
                        StrptimeOptions {
                            format: Some("%Y-%m-%d %H:%M:%S".to_string()),
                            strict: false,
                            ..Default::default()
                        },
                        lit("raise"),
                    )
                    .alias(alias_to);
            }
            Some(_) => return col(candidate).cast(target.clone()).alias(alias_to),
            None => continue,
        }
    }
    lit(Null {}).cast(target).alias(alias_to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn orders_are_renamed_cast_and_deduplicated() {
        let raw = DataFrame::new(vec![
            Series::new("order_id", ["o1", "o2", "o2"]),
            Series::new("customer_id", ["c1", "c2", "c2"]),
            Series::new("order_status", ["delivered", "shipped", "shipped"]),
            Series::new(
                "order_purchase_timestamp",
                ["2017-10-02 10:56:33", "2018-01-15 08:12:00", "2018-01-15 08:12:00"],
            ),
        ])
        .unwrap();

        let staged = stage_orders(raw).unwrap();
        assert_eq!(staged.frame.height(), 2);
        assert_eq!(staged.rows_dropped, 1);
        assert_eq!(
            staged.frame.column("purchase_timestamp").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
    }

    #[test]
    fn orders_with_null_keys_are_excluded_and_counted() {
        let raw = DataFrame::new(vec![
            Series::new("order_id", [Some("o1"), None, Some("o3")]),
            Series::new("customer_id", [Some("c1"), Some("c2"), None]),
        ])
        .unwrap();

        let staged = stage_orders(raw).unwrap();
        assert_eq!(staged.frame.height(), 1);
        assert_eq!(staged.rows_dropped, 2);
    }

    #[test]
    fn unparseable_prices_become_excluded_rows() {
        let raw = DataFrame::new(vec![
            Series::new("order_id", ["o1", "o1", "o2"]),
            Series::new("product_id", ["p1", "p2", "p3"]),
            Series::new("price", ["49.90", "not-a-price", "-5.00"]),
            Series::new("freight_value", ["15.10", "2.00", "3.00"]),
        ])
        .unwrap();

        let staged = stage_order_items(raw).unwrap();
        // The unparseable price casts to null, the negative one fails the
        // range check; both count as excluded.
        assert_eq!(staged.frame.height(), 1);
        assert_eq!(staged.rows_dropped, 2);
        assert_eq!(
            staged.frame.column("price").unwrap().dtype(),
            &DataType::Float64
        );
    }

    #[test]
    fn repeated_product_lines_survive_staging() {
        // Two line items of the same product in one order are distinct
        // facts, not duplicates.
        let raw = DataFrame::new(vec![
            Series::new("order_id", ["o1", "o1"]),
            Series::new("order_item_id", [1i64, 2]),
            Series::new("product_id", ["p1", "p1"]),
            Series::new("price", [10.0f64, 10.0]),
            Series::new("freight_value", [1.0f64, 1.0]),
        ])
        .unwrap();

        let staged = stage_order_items(raw).unwrap();
        assert_eq!(staged.frame.height(), 2);
        assert_eq!(staged.rows_dropped, 0);
    }

    #[test]
    fn products_without_category_column_stage_as_null_category() {
        let raw = DataFrame::new(vec![Series::new("product_id", ["p1", "p2"])]).unwrap();

        let staged = stage_products(raw).unwrap();
        assert_eq!(staged.frame.height(), 2);
        let category = staged.frame.column("category_name").unwrap();
        assert_eq!(category.null_count(), 2);
    }

    #[test]
    fn customers_get_canonical_city_and_state_names() {
        let raw = DataFrame::new(vec![
            Series::new("customer_id", ["c1"]),
            Series::new("customer_unique_id", ["u1"]),
            Series::new("customer_city", ["sao paulo"]),
            Series::new("customer_state", ["SP"]),
        ])
        .unwrap();

        let staged = stage_customers(raw).unwrap();
        let names = staged.frame.get_column_names();
        assert_eq!(names, vec!["customer_id", "customer_unique_id", "city", "state"]);
    }

    #[test]
    fn review_scores_outside_the_survey_range_are_dropped() {
        let raw = DataFrame::new(vec![
            Series::new("review_id", ["r1", "r2", "r3", "r4"]),
            Series::new("order_id", ["o1", "o2", "o3", "o4"]),
            Series::new("review_score", [5.0f64, 0.0, 6.0, 3.0]),
        ])
        .unwrap();

        let staged = stage_reviews(raw).unwrap();
        assert_eq!(staged.frame.height(), 2);
        assert_eq!(staged.rows_dropped, 2);
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let raw = DataFrame::new(vec![Series::new("order_id", ["o1"])]).unwrap();
        assert!(matches!(
            stage_orders(raw),
            Err(MartError::SchemaError(_))
        ));
    }
}
