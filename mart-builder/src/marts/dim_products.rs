//! Product dimension builder
//!
//! Aggregates the fact table — not staging — so `total_revenue` is the
//! sum of `total_order_value` over the product's fact lines. The
//! product master drives: a product never sold still appears with
//! zeros and the lowest sales tier.

use polars::prelude::*;

use marts_common::{Result, SalesTier, SalesTierPolicy};

/// Build the `dim_products` relation from the product master and the
/// materialized fact table
pub fn build_dim_products(
    products: &DataFrame,
    fct_orders: &DataFrame,
    policy: &SalesTierPolicy,
) -> Result<DataFrame> {
    let sales = fct_orders
        .clone()
        .lazy()
        .select([col("product_id"), col("order_id"), col("total_order_value")])
        .group_by_stable([col("product_id")])
        .agg([
            col("order_id")
                .count()
                .cast(DataType::Int64)
                .alias("times_sold"),
            col("total_order_value").sum().alias("total_revenue"),
        ]);

    let dim = products
        .clone()
        .lazy()
        .join(
            sales,
            [col("product_id")],
            [col("product_id")],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            col("times_sold").fill_null(lit(0i64)),
            col("total_revenue")
                .fill_null(lit(0.0f64))
                .cast(DataType::Float64),
        ])
        .with_columns([sales_tier_expr(policy)])
        .select([
            col("product_id"),
            col("category_name"),
            col("times_sold"),
            col("total_revenue"),
            col("sales_tier"),
        ])
        .sort_by_exprs(
            [col("product_id")],
            SortMultipleOptions::default()
                .with_order_descendings([false])
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(dim)
}

fn sales_tier_expr(policy: &SalesTierPolicy) -> Expr {
    when(col("times_sold").gt_eq(lit(policy.bestseller_times_sold)))
        .then(lit(SalesTier::Bestseller.as_str()))
        .when(col("times_sold").gt_eq(lit(policy.popular_times_sold)))
        .then(lit(SalesTier::Popular.as_str()))
        .when(col("times_sold").gt_eq(lit(policy.moderate_times_sold)))
        .then(lit(SalesTier::Moderate.as_str()))
        .otherwise(lit(SalesTier::Slow.as_str()))
        .alias("sales_tier")
}
