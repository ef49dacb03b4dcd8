//! Seller dimension builder
//!
//! The seller master drives the output. Fulfillment metrics aggregate
//! straight off the staged order items; review scores reach a seller
//! through the orders they fulfilled, with each (seller, order) pair
//! counted once so a three-item order does not triple-weight its
//! review. Tier assignment happens after the zero-coalesce, so sellers
//! with no history land in Bronze, not in a null bucket.

use polars::prelude::*;

use marts_common::{Result, SellerTier, SellerTierPolicy};

use crate::staging::StagedSources;

/// Build the `dim_sellers` relation from the staged sources
pub fn build_dim_sellers(staged: &StagedSources, policy: &SellerTierPolicy) -> Result<DataFrame> {
    let items = staged
        .order_items
        .clone()
        .lazy()
        .select([col("seller_id"), col("order_id"), col("price")])
        .filter(col("seller_id").is_not_null());

    let sales = items.clone().group_by_stable([col("seller_id")]).agg([
        col("order_id")
            .n_unique()
            .cast(DataType::Int64)
            .alias("total_orders"),
        col("price").sum().alias("total_revenue"),
    ]);

    let reviews = staged
        .reviews
        .clone()
        .lazy()
        .select([col("order_id"), col("review_score")]);
    let scores = items
        .select([col("seller_id"), col("order_id")])
        .unique_stable(
            Some(vec!["seller_id".to_string(), "order_id".to_string()]),
            UniqueKeepStrategy::First,
        )
        .join(
            reviews,
            [col("order_id")],
            [col("order_id")],
            JoinArgs::new(JoinType::Left),
        )
        .group_by_stable([col("seller_id")])
        .agg([col("review_score").mean().alias("avg_review_score")]);

    let dim = staged
        .sellers
        .clone()
        .lazy()
        .join(
            sales,
            [col("seller_id")],
            [col("seller_id")],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            scores,
            [col("seller_id")],
            [col("seller_id")],
            JoinArgs::new(JoinType::Left),
        )
        // avg_review_score intentionally stays null for sellers with no
        // reviewed orders; the count and revenue coalesce to zero.
        .with_columns([
            col("total_orders").fill_null(lit(0i64)),
            col("total_revenue")
                .fill_null(lit(0.0f64))
                .cast(DataType::Float64),
        ])
        .with_columns([seller_tier_expr(policy)])
        .select([
            col("seller_id"),
            col("city"),
            col("state"),
            col("total_orders"),
            col("total_revenue"),
            col("avg_review_score"),
            col("seller_tier"),
        ])
        .sort_by_exprs(
            [col("seller_id")],
            SortMultipleOptions::default()
                .with_order_descendings([false])
                .with_nulls_last(false)
                .with_maintain_order(true),
        )
        .collect()?;

    Ok(dim)
}

/// Tier assignment, checked best-first
///
/// Platinum and Gold require both the revenue and the review bar; a
/// missing review score reads as zero here, which can only demote.
fn seller_tier_expr(policy: &SellerTierPolicy) -> Expr {
    let score = col("avg_review_score").fill_null(lit(0.0f64));
    when(
        col("total_revenue")
            .gt_eq(lit(policy.platinum_revenue))
            .and(score.clone().gt_eq(lit(policy.platinum_review))),
    )
    .then(lit(SellerTier::Platinum.as_str()))
    .when(
        col("total_revenue")
            .gt_eq(lit(policy.gold_revenue))
            .and(score.gt_eq(lit(policy.gold_review))),
    )
    .then(lit(SellerTier::Gold.as_str()))
    .when(col("total_revenue").gt_eq(lit(policy.silver_revenue)))
    .then(lit(SellerTier::Silver.as_str()))
    .otherwise(lit(SellerTier::Bronze.as_str()))
    .alias("seller_tier")
}
