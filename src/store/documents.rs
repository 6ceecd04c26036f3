//! Serde models of the JSON configuration documents.
//!
//! Identifiers stay as strings here; they are resolved onto [`Technology`] and
//! [`Scenario`] when the store is built so unknown keys can be reported
//! rather than rejected.
//!
//! [`Technology`]: crate::domain::Technology
//! [`Scenario`]: crate::domain::Scenario

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

use crate::domain::{AnchorRecord, BreakthroughKind, CarbonPrice, ServiceUnit, Year};
use crate::error::{ProjectionError, ProjectionResult};
use crate::models::LearningCurveParams;

pub const LEARNING_CURVES: &str = "learning_curves.json";
pub const MANUFACTURING_CAPACITY: &str = "manufacturing_capacity.json";
pub const POLICY_SCENARIOS: &str = "policy_scenarios.json";
pub const REGIONS: &str = "regions.json";
pub const SERVICE_UNITS: &str = "service_units.json";
pub const CARBON_PRICES: &str = "carbon_prices.json";
pub const SCENARIOS: &str = "scenarios.json";
pub const TECHNOLOGIES: &str = "technologies.json";
pub const BASE_COSTS: &str = "base_costs.json";
pub const BASELINE_ANCHORS: &str = "baseline_anchors.json";

// ============================================================================
// learning_curves.json
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningCurvesDocument {
    pub learning_rates: BTreeMap<String, LearningRateEntry>,
    #[serde(default)]
    pub scenario_adjustments: BTreeMap<String, ScenarioAdjustmentEntry>,
}

/// One technology's curve. Cost and cumulative fields carry their unit in the
/// key (`base_cost_usd_per_mwh`, `base_cumulative_gw`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningRateEntry {
    pub learning_rate: f64,
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LearningRateEntry {
    fn suffixed(&self, prefix: &str) -> Option<(String, f64)> {
        self.fields.iter().find_map(|(key, value)| {
            let unit = key.strip_prefix(prefix)?;
            Some((unit.to_string(), value.as_f64()?))
        })
    }

    pub fn to_params(&self, key: &str) -> ProjectionResult<LearningCurveParams> {
        let missing = |field: &str| {
            ProjectionError::invalid_document(
                LEARNING_CURVES,
                format!("'{key}' has no numeric {field}<unit> field"),
            )
        };

        let (cost_unit, base_cost) = self
            .suffixed("base_cost_usd_per_")
            .ok_or_else(|| missing("base_cost_usd_per_"))?;
        let (cumulative_unit, base_cumulative) = self
            .suffixed("base_cumulative_")
            .ok_or_else(|| missing("base_cumulative_"))?;
        let floor_cost = self
            .suffixed("floor_cost_usd_per_")
            .map(|(_, value)| value)
            .unwrap_or(0.0);

        Ok(LearningCurveParams {
            base_cost,
            learning_rate: self.learning_rate,
            base_cumulative,
            floor_cost,
            cost_unit,
            cumulative_unit,
        })
    }
}

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioAdjustmentEntry {
    #[serde(default = "one")]
    pub learning_rate_multiplier: f64,
    #[serde(default = "one")]
    pub floor_cost_buffer: f64,
    #[serde(default)]
    pub breakthrough_adjustments: Vec<BreakthroughEntry>,
}

impl Default for ScenarioAdjustmentEntry {
    fn default() -> Self {
        Self {
            learning_rate_multiplier: 1.0,
            floor_cost_buffer: 1.0,
            breakthrough_adjustments: Vec::new(),
        }
    }
}

fn cost_kind() -> BreakthroughKind {
    BreakthroughKind::Cost
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BreakthroughEntry {
    pub name: String,
    pub technology: String,
    #[serde(default = "cost_kind")]
    pub kind: BreakthroughKind,
    #[validate(range(min = 0.0, exclusive_max = 1.0))]
    pub magnitude: f64,
    pub effective_year: Year,
}

// ============================================================================
// manufacturing_capacity.json
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingDocument {
    pub trajectories: BTreeMap<String, ManufacturingEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManufacturingEntry {
    #[serde(default)]
    pub historical: BTreeMap<Year, f64>,
    #[serde(default)]
    pub projections: BTreeMap<Year, f64>,
    #[serde(default)]
    pub scenario_multipliers: BTreeMap<String, f64>,
    #[serde(default)]
    pub base_cumulative: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

// ============================================================================
// policy_scenarios.json
// ============================================================================

/// `technology -> scenario -> "start-end" -> multiplier`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub by_technology: BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>,
}

// ============================================================================
// scenarios.json / technologies.json
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScenarioEntry {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub philosophy: String,
    #[serde(default = "one")]
    #[validate(range(min = 0.0))]
    pub manufacturing_multiplier: f64,
    #[serde(default = "one")]
    #[validate(range(exclusive_min = 0.0))]
    pub steepness_multiplier: f64,
    pub demand_growth_rate: f64,
    pub vre_penetration: BTreeMap<Year, f64>,
    pub rebound: BTreeMap<Year, f64>,
    pub saturation: BTreeMap<String, f64>,
    #[serde(default)]
    pub efficiency_improvement: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TechnologyEntry {
    #[validate(range(min = 0.0))]
    pub carbon_intensity: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub base_efficiency: f64,
    #[validate(range(exclusive_min = 0.0, max = 1.0))]
    pub max_efficiency: f64,
    /// EJ of useful energy per unit of manufacturing output (e.g. per GW)
    #[serde(default)]
    pub energy_per_capacity: Option<f64>,
    #[serde(default)]
    pub steepness: Option<f64>,
    #[serde(default = "one")]
    #[validate(range(min = 0.0, max = 1.0))]
    pub exergy_factor: f64,
}

// ============================================================================
// baseline_anchors.json
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AnchorsDocument {
    pub year: Year,
    /// Total useful energy demand (EJ)
    #[validate(range(exclusive_min = 0.0))]
    pub total_demand: f64,
    #[validate(range(min = 0.0, max = 1.0))]
    pub fossil_exergy_factor: f64,
    pub deployment: BTreeMap<String, f64>,
}

/// Everything read from the documents directory. `None` marks a missing file.
#[derive(Debug, Clone, Default)]
pub struct Documents {
    pub learning_curves: Option<LearningCurvesDocument>,
    pub manufacturing: Option<ManufacturingDocument>,
    pub policies: Option<PolicyDocument>,
    pub regions: Option<BTreeMap<String, f64>>,
    pub service_units: Option<BTreeMap<String, ServiceUnit>>,
    pub carbon_prices: Option<BTreeMap<String, CarbonPrice>>,
    pub scenarios: Option<BTreeMap<String, ScenarioEntry>>,
    pub technologies: Option<BTreeMap<String, TechnologyEntry>>,
    /// `year -> technology -> {min, mid, max, capacity_factor, ...}`
    pub base_costs: Option<BTreeMap<Year, BTreeMap<String, AnchorRecord>>>,
    pub anchors: Option<AnchorsDocument>,
}
