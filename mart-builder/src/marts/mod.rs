//! Mart builders
//!
//! One builder per published relation. Each is a pure function of the
//! staged sources (plus the tier policies), so builders can run in any
//! order that respects data dependencies: the fact table feeds the
//! product dimension, everything else reads staging directly.

mod dim_customers;
mod dim_products;
mod dim_sellers;
mod fct_orders;

pub use dim_customers::build_dim_customers;
pub use dim_products::build_dim_products;
pub use dim_sellers::build_dim_sellers;
pub use fct_orders::build_fct_orders;
