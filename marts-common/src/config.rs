//! Configuration for the mart pipeline
//!
//! The pipeline is configured from environment variables (with a `.env`
//! file honored when present). Tier thresholds are a policy decision,
//! not something the source data dictates, so they are configurable and
//! validated here; the defaults are documented in DESIGN.md.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{MartError, Result};

/// Revenue and review-score thresholds for seller tier assignment
///
/// Checked top-down: a seller must clear both the revenue and the
/// review bar for Platinum/Gold; Silver needs revenue only; everything
/// else (including sellers with no fulfilled orders) lands in Bronze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerTierPolicy {
    pub platinum_revenue: f64,
    pub platinum_review: f64,
    pub gold_revenue: f64,
    pub gold_review: f64,
    pub silver_revenue: f64,
}

impl Default for SellerTierPolicy {
    fn default() -> Self {
        Self {
            platinum_revenue: 50_000.0,
            platinum_review: 4.5,
            gold_revenue: 10_000.0,
            gold_review: 4.0,
            silver_revenue: 1_000.0,
        }
    }
}

/// Line-count thresholds for product sales tier assignment
///
/// Products never sold (times_sold = 0) always land in the lowest tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesTierPolicy {
    pub bestseller_times_sold: i64,
    pub popular_times_sold: i64,
    pub moderate_times_sold: i64,
}

impl Default for SalesTierPolicy {
    fn default() -> Self {
        Self {
            bestseller_times_sold: 100,
            popular_times_sold: 20,
            moderate_times_sold: 5,
        }
    }
}

/// Mart pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory holding the raw source CSV files
    pub data_dir: PathBuf,
    /// Directory the four mart parquet files are published into
    pub output_dir: PathBuf,
    /// Seller tier thresholds
    pub seller_tiers: SellerTierPolicy,
    /// Product sales tier thresholds
    pub sales_tiers: SalesTierPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("marts"),
            seller_tiers: SellerTierPolicy::default(),
            sales_tiers: SalesTierPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - MARTS_DATA_DIR, MARTS_OUTPUT_DIR
    /// - MARTS_PLATINUM_REVENUE, MARTS_PLATINUM_REVIEW
    /// - MARTS_GOLD_REVENUE, MARTS_GOLD_REVIEW
    /// - MARTS_SILVER_REVENUE
    /// - MARTS_BESTSELLER_TIMES_SOLD, MARTS_POPULAR_TIMES_SOLD,
    ///   MARTS_MODERATE_TIMES_SOLD
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults_sellers = SellerTierPolicy::default();
        let defaults_sales = SalesTierPolicy::default();

        let config = Self {
            data_dir: env::var("MARTS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),

            output_dir: env::var("MARTS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("marts")),

            seller_tiers: SellerTierPolicy {
                platinum_revenue: env_f64(
                    "MARTS_PLATINUM_REVENUE",
                    defaults_sellers.platinum_revenue,
                ),
                platinum_review: env_f64("MARTS_PLATINUM_REVIEW", defaults_sellers.platinum_review),
                gold_revenue: env_f64("MARTS_GOLD_REVENUE", defaults_sellers.gold_revenue),
                gold_review: env_f64("MARTS_GOLD_REVIEW", defaults_sellers.gold_review),
                silver_revenue: env_f64("MARTS_SILVER_REVENUE", defaults_sellers.silver_revenue),
            },

            sales_tiers: SalesTierPolicy {
                bestseller_times_sold: env_i64(
                    "MARTS_BESTSELLER_TIMES_SOLD",
                    defaults_sales.bestseller_times_sold,
                ),
                popular_times_sold: env_i64(
                    "MARTS_POPULAR_TIMES_SOLD",
                    defaults_sales.popular_times_sold,
                ),
                moderate_times_sold: env_i64(
                    "MARTS_MODERATE_TIMES_SOLD",
                    defaults_sales.moderate_times_sold,
                ),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate threshold ordering
    ///
    /// Tier boundaries must be strictly descending so every seller and
    /// product falls into exactly one bucket.
    pub fn validate(&self) -> Result<()> {
        let s = &self.seller_tiers;
        if !(s.platinum_revenue > s.gold_revenue && s.gold_revenue > s.silver_revenue) {
            return Err(MartError::ConfigError(format!(
                "seller revenue thresholds must be strictly descending (platinum {} > gold {} > silver {})",
                s.platinum_revenue, s.gold_revenue, s.silver_revenue
            )));
        }
        if s.silver_revenue <= 0.0 {
            return Err(MartError::ConfigError(
                "silver revenue threshold must be positive".to_string(),
            ));
        }
        for (name, score) in [
            ("platinum", s.platinum_review),
            ("gold", s.gold_review),
        ] {
            if !(1.0..=5.0).contains(&score) {
                return Err(MartError::ConfigError(format!(
                    "{} review threshold {} is outside the 1..=5 score range",
                    name, score
                )));
            }
        }

        let p = &self.sales_tiers;
        if !(p.bestseller_times_sold > p.popular_times_sold
            && p.popular_times_sold > p.moderate_times_sold)
        {
            return Err(MartError::ConfigError(format!(
                "sales tier thresholds must be strictly descending (bestseller {} > popular {} > moderate {})",
                p.bestseller_times_sold, p.popular_times_sold, p.moderate_times_sold
            )));
        }
        if p.moderate_times_sold <= 0 {
            return Err(MartError::ConfigError(
                "moderate times-sold threshold must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
