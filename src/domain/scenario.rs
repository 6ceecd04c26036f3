use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use super::{Scenario, Technology, Trajectory, Year};

/// What a breakthrough changes once it is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakthroughKind {
    /// Multiplies cost by `(1 - magnitude)`
    Cost,
    /// Multiplies conversion efficiency by `(1 + magnitude)`
    Efficiency,
}

/// One-time step change for a technology, from `effective_year` onward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Breakthrough {
    pub name: String,
    pub technology: Technology,
    pub kind: BreakthroughKind,
    #[validate(range(min = 0.0, exclusive_max = 1.0))]
    pub magnitude: f64,
    pub effective_year: Year,
}

impl Breakthrough {
    pub fn is_active(&self, technology: Technology, year: Year) -> bool {
        self.technology == technology && year >= self.effective_year
    }
}

/// Everything that distinguishes one scenario from another
#[derive(Debug, Clone)]
pub struct ScenarioDefinition {
    pub scenario: Scenario,
    pub description: String,
    pub philosophy: String,
    /// Scales every configured learning rate
    pub learning_rate_multiplier: f64,
    /// Scales every configured floor cost
    pub floor_cost_buffer: f64,
    /// Breakthroughs this scenario includes
    pub breakthroughs: Vec<Breakthrough>,
    /// Manufacturing multiplier used when a trajectory has none for this scenario
    pub manufacturing_multiplier: f64,
    pub steepness_multiplier: f64,
    /// Compound annual growth of total useful-energy demand
    pub demand_growth_rate: f64,
    /// Share of electricity supplied by variable renewables
    pub vre_penetration: Trajectory,
    /// Induced-demand multiplier applied to service-unit energy content
    pub rebound: Trajectory,
    /// S-curve carrying capacity (EJ) per projected technology
    pub saturation: BTreeMap<Technology, f64>,
    /// Absolute annual efficiency gain per technology
    pub efficiency_improvement: BTreeMap<Technology, f64>,
}

impl ScenarioDefinition {
    pub fn saturation_for(&self, technology: Technology) -> Option<f64> {
        self.saturation.get(&technology).copied()
    }

    pub fn efficiency_gain(&self, technology: Technology) -> f64 {
        self.efficiency_improvement
            .get(&technology)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn breakthroughs_for(&self, technology: Technology) -> impl Iterator<Item = &Breakthrough> {
        self.breakthroughs
            .iter()
            .filter(move |b| b.technology == technology)
    }
}

/// A region and the multiplier applied to its total system cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionDefinition {
    pub name: String,
    pub cost_multiplier: f64,
}

/// An energy service and how much electricity one unit of it takes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServiceUnit {
    /// MWh per unit of service
    #[serde(alias = "mwh_per_unit")]
    #[validate(range(min = 0.0))]
    pub energy_per_unit: f64,
    pub label: String,
    #[serde(default)]
    pub description: String,
}

/// Social-cost-of-carbon scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CarbonPrice {
    #[serde(alias = "value")]
    #[validate(range(min = 0.0))]
    pub value_usd_per_tonne: f64,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perovskite() -> Breakthrough {
        Breakthrough {
            name: "perovskite_tandem".to_string(),
            technology: Technology::Solar,
            kind: BreakthroughKind::Cost,
            magnitude: 0.15,
            effective_year: 2030,
        }
    }

    #[test]
    fn test_breakthrough_activation() {
        let b = perovskite();
        assert!(!b.is_active(Technology::Solar, 2029));
        assert!(b.is_active(Technology::Solar, 2030));
        assert!(b.is_active(Technology::Solar, 2050));
        assert!(!b.is_active(Technology::Wind, 2040));
    }

    #[test]
    fn test_breakthrough_magnitude_validation() {
        let mut b = perovskite();
        assert!(b.validate().is_ok());
        b.magnitude = 1.0;
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_service_unit_accepts_legacy_key() {
        let unit: ServiceUnit = serde_json::from_str(
            r#"{"mwh_per_unit": 12.0, "label": "$/home-year", "description": "Home heated for a year"}"#,
        )
        .unwrap();
        assert_eq!(unit.energy_per_unit, 12.0);
    }

    #[test]
    fn test_carbon_price_accepts_legacy_key() {
        let price: CarbonPrice =
            serde_json::from_str(r#"{"value": 200, "label": "$200/tCO2"}"#).unwrap();
        assert_eq!(price.value_usd_per_tonne, 200.0);
    }
}
