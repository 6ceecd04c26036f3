//! Derived output records. Recomputed every run and never read back.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Scenario, Technology, Year};

// ============================================================================
// Cost grid
// ============================================================================

/// System-integration surcharges in $/MWh. Negative values are credits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegrationCosts {
    /// Backup capacity for variable output
    pub firming: f64,
    pub storage: f64,
    /// Transmission and distribution
    pub grid: f64,
    /// Capacity adequacy
    pub capacity: f64,
}

impl IntegrationCosts {
    pub const fn new(firming: f64, storage: f64, grid: f64, capacity: f64) -> Self {
        Self {
            firming,
            storage,
            grid,
            capacity,
        }
    }

    pub fn total(&self) -> f64 {
        self.firming + self.storage + self.grid + self.capacity
    }
}

/// Which branch produced a base LCOE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseCostSource {
    LearningCurve,
    Table,
}

/// Cost of one unit of an energy service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCost {
    pub value: f64,
    pub label: String,
    pub description: String,
    /// MWh per unit after the rebound multiplier
    pub energy_per_unit: f64,
}

/// Full cost of one (technology, year, scenario, region) cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// $/MWh before integration and carbon costs
    pub base_lcoe: f64,
    pub base_cost_source: BaseCostSource,
    pub integration: IntegrationCosts,
    pub integration_total: f64,
    pub carbon_cost: f64,
    /// (base + integration + carbon) × region multiplier
    pub total: f64,
    pub capacity_factor: Option<f64>,
    /// tCO2/MWh
    pub carbon_intensity: f64,
    pub vre_penetration: f64,
    pub rebound_multiplier: f64,
    pub service_units: BTreeMap<String, ServiceCost>,
}

// ============================================================================
// Deployment projections
// ============================================================================

/// Useful work delivered, weighted by exergy factor (EJ)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceTotals {
    /// Services delivered by each projected clean technology
    pub by_technology: BTreeMap<Technology, f64>,
    pub clean: f64,
    pub fossil: f64,
    pub total: f64,
    pub clean_share: f64,
}

/// Portfolio state for one (year, scenario)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub year: Year,
    pub scenario: Scenario,
    /// Useful energy per projected clean technology (EJ), after rescaling
    pub deployment: BTreeMap<Technology, f64>,
    pub total_demand: f64,
    pub clean_total: f64,
    pub fossil_total: f64,
    pub clean_share: f64,
    pub fossil_share: f64,
    /// 1.0 unless the clean portfolio had to be scaled down to the cap
    pub rescale_factor: f64,
    pub services: ServiceTotals,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integration_total_sums_components() {
        let costs = IntegrationCosts::new(30.0, 25.0, 25.0, 15.0);
        assert_eq!(costs.total(), 95.0);
    }

    #[test]
    fn test_integration_credits_reduce_total() {
        let costs = IntegrationCosts::new(0.0, 0.0, -15.0, -25.0);
        assert_eq!(costs.total(), -40.0);
    }

    #[test]
    fn test_base_cost_source_serialization() {
        let json = serde_json::to_string(&BaseCostSource::LearningCurve).unwrap();
        assert_eq!(json, "\"learning_curve\"");
    }
}
