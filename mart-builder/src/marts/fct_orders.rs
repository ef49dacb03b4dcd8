//! Order-line fact builder
//!
//! Grain: one row per order line item. `stg_order_items` drives the
//! join — its cardinality IS the fact cardinality. Orders and products
//! attach with left joins so a line whose order or product is missing
//! upstream still appears, with null foreign attributes, instead of
//! silently dropping revenue.

use polars::prelude::*;

use marts_common::Result;

use crate::staging::StagedSources;

/// Build the `fct_orders` relation from the staged sources
pub fn build_fct_orders(staged: &StagedSources) -> Result<DataFrame> {
    let items = staged.order_items.clone().lazy().select([
        col("order_id"),
        col("product_id"),
        col("price"),
        col("freight_value"),
    ]);
    let orders = staged.orders.clone().lazy().select([
        col("order_id"),
        col("customer_id"),
        col("purchase_timestamp"),
    ]);
    let products = staged
        .products
        .clone()
        .lazy()
        .select([col("product_id"), col("category_name")]);

    let fact = items
        .join(
            orders,
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            products,
            [col("product_id")],
            [col("product_id")],
            JoinArgs::new(JoinType::Left),
        )
        // Row-wise, after the join; the total is never pre-aggregated or
        // stored independently of its inputs.
        .with_columns([(col("price") + col("freight_value")).alias("total_order_value")])
        .select([
            col("order_id"),
            col("customer_id"),
            col("product_id"),
            col("purchase_timestamp"),
            col("category_name"),
            col("price"),
            col("freight_value"),
            col("total_order_value"),
        ])
        .sort_by_exprs(
            [col("order_id"), col("product_id")],
            SortMultipleOptions::default()
                .with_order_descendings([false, false])
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(fact)
}
