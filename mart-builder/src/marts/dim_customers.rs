//! Customer dimension builder
//!
//! The customer master drives the output: a customer with no order
//! history still gets a row, with metrics coalesced to zero before the
//! segment is derived. `total_orders` counts DISTINCT orders — a
//! three-item order is still one order. `lifetime_value` sums item
//! prices only; freight never enters LTV.

use polars::prelude::*;

use marts_common::{CustomerType, Result};

use crate::staging::StagedSources;

/// Build the `dim_customers` relation from the staged sources
pub fn build_dim_customers(staged: &StagedSources) -> Result<DataFrame> {
    let orders = staged
        .orders
        .clone()
        .lazy()
        .select([col("order_id"), col("customer_id")]);
    let items = staged
        .order_items
        .clone()
        .lazy()
        .select([col("order_id"), col("price")]);

    // Orders drive the aggregation so an order with no surviving line
    // items still counts toward total_orders.
    let per_customer = orders
        .join(
            items,
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Left),
        )
        .group_by_stable([col("customer_id")])
        .agg([
            col("order_id")
                .n_unique()
                .cast(DataType::Int64)
                .alias("total_orders"),
            col("price").sum().alias("lifetime_value"),
        ]);

    let dim = staged
        .customers
        .clone()
        .lazy()
        .join(
            per_customer,
            [col("customer_id")],
            [col("customer_id")],
            JoinArgs::new(JoinType::Left),
        )
        // Coalesce before segmentation: customers the aggregation never
        // saw must read as zero orders, not null.
        .with_columns([
            col("total_orders").fill_null(lit(0i64)),
            col("lifetime_value")
                .fill_null(lit(0.0f64))
                .cast(DataType::Float64),
        ])
        .with_columns([customer_type_expr()])
        .select([
            col("customer_id"),
            col("customer_unique_id"),
            col("city"),
            col("state"),
            col("total_orders"),
            col("lifetime_value"),
            col("customer_type"),
        ])
        .sort_by_exprs(
            [col("customer_id")],
            SortMultipleOptions::default()
                .with_order_descendings([false])
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(dim)
}

fn customer_type_expr() -> Expr {
    when(col("total_orders").gt(lit(1)))
        .then(lit(CustomerType::Returning.as_str()))
        .when(col("total_orders").eq(lit(1)))
        .then(lit(CustomerType::OneTime.as_str()))
        .otherwise(lit(CustomerType::NoOrders.as_str()))
        .alias("customer_type")
}
