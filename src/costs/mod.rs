pub mod aggregator;
pub mod integration;

pub use aggregator::{BaseCost, SystemCostAggregator};
pub use integration::{integration_costs, PenetrationTier};
