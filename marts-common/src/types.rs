//! Type definitions for the mart pipeline
//!
//! The categorical columns of the dimensions (customer segment, seller
//! tier, product sales tier) are modeled as proper enums with an
//! explicit rank, so any ordering of tiers goes through `rank()` and
//! never falls back to alphabetical order of the labels.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::MartError;

/// Customer segment derived from the distinct-order count
///
/// A pure function of `total_orders` after coalescing nulls to zero:
/// more than one order is Returning, exactly one is One-time, anything
/// else is No Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerType {
    #[serde(rename = "Returning")]
    Returning,
    #[serde(rename = "One-time")]
    OneTime,
    #[serde(rename = "No Orders")]
    NoOrders,
}

impl CustomerType {
    /// Segment label as published in the `customer_type` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            CustomerType::Returning => "Returning",
            CustomerType::OneTime => "One-time",
            CustomerType::NoOrders => "No Orders",
        }
    }

    /// Derive the segment from a coalesced distinct-order count
    pub fn from_total_orders(total_orders: i64) -> Self {
        if total_orders > 1 {
            CustomerType::Returning
        } else if total_orders == 1 {
            CustomerType::OneTime
        } else {
            CustomerType::NoOrders
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CustomerType {
    type Err = MartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Returning" => Ok(CustomerType::Returning),
            "One-time" => Ok(CustomerType::OneTime),
            "No Orders" => Ok(CustomerType::NoOrders),
            other => Err(MartError::SchemaError(format!(
                "unknown customer_type label: {}",
                other
            ))),
        }
    }
}

/// Seller performance tier, ordered most-to-least performant
///
/// Declared in ascending rank order so the derived `Ord` matches the
/// business ordering: Platinum > Gold > Silver > Bronze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SellerTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl SellerTier {
    /// Tiers in display order, best first
    pub const ALL: [SellerTier; 4] = [
        SellerTier::Platinum,
        SellerTier::Gold,
        SellerTier::Silver,
        SellerTier::Bronze,
    ];

    /// Tier label as published in the `seller_tier` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            SellerTier::Platinum => "Platinum",
            SellerTier::Gold => "Gold",
            SellerTier::Silver => "Silver",
            SellerTier::Bronze => "Bronze",
        }
    }

    /// Numeric rank, higher is better (Bronze = 0 .. Platinum = 3)
    pub const fn rank(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for SellerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SellerTier {
    type Err = MartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Platinum" => Ok(SellerTier::Platinum),
            "Gold" => Ok(SellerTier::Gold),
            "Silver" => Ok(SellerTier::Silver),
            "Bronze" => Ok(SellerTier::Bronze),
            other => Err(MartError::SchemaError(format!(
                "unknown seller_tier label: {}",
                other
            ))),
        }
    }
}

/// Product sales tier, ordered most-to-least sold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SalesTier {
    Slow,
    Moderate,
    Popular,
    Bestseller,
}

impl SalesTier {
    /// Tiers in display order, best first
    pub const ALL: [SalesTier; 4] = [
        SalesTier::Bestseller,
        SalesTier::Popular,
        SalesTier::Moderate,
        SalesTier::Slow,
    ];

    /// Tier label as published in the `sales_tier` column
    pub const fn as_str(&self) -> &'static str {
        match self {
            SalesTier::Bestseller => "Bestseller",
            SalesTier::Popular => "Popular",
            SalesTier::Moderate => "Moderate",
            SalesTier::Slow => "Slow",
        }
    }

    /// Numeric rank, higher is better (Slow = 0 .. Bestseller = 3)
    pub const fn rank(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for SalesTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesTier {
    type Err = MartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Bestseller" => Ok(SalesTier::Bestseller),
            "Popular" => Ok(SalesTier::Popular),
            "Moderate" => Ok(SalesTier::Moderate),
            "Slow" => Ok(SalesTier::Slow),
            other => Err(MartError::SchemaError(format!(
                "unknown sales_tier label: {}",
                other
            ))),
        }
    }
}

/// Per-source staging outcome for data-quality auditing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    /// Source relation name
    pub name: String,
    /// Whether the catalog could produce the relation at all
    pub present: bool,
    /// Rows that survived staging
    pub rows_staged: usize,
    /// Rows dropped during staging (malformed or duplicate)
    pub rows_dropped: usize,
}

/// Row count of one published mart table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MartReport {
    /// Mart table name
    pub name: String,
    /// Rows materialized this run
    pub rows: usize,
}

/// Summary of one full-refresh pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources: Vec<SourceReport>,
    pub marts: Vec<MartReport>,
}

impl RunReport {
    /// Total rows dropped across all sources during staging
    pub fn total_rows_dropped(&self) -> usize {
        self.sources.iter().map(|s| s.rows_dropped).sum()
    }

    /// Number of sources the catalog could actually produce
    pub fn present_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.present).count()
    }
}
