//! Output document models and the builders that fill them from a run.
//!
//! Every number is rounded here and nowhere else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::rounding::Precision;
use crate::domain::{BaseCostSource, CostBreakdown, ProjectionRecord, Year};
use crate::runner::{CarbonPriceSelection, RunOutput, SkippedCell};
use crate::store::{Calibration, ConfigStore, Diagnostic};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const COST_METHODOLOGY: &str =
    "System LCOES: Wright's Law learning curves with manufacturing-capacity accounting, \
     VRE integration tiers, social cost of carbon and regional multipliers";
const PROJECTION_METHODOLOGY: &str =
    "Saturation-limited logistic adoption calibrated to base-year anchors, \
     constrained by manufacturing capacity and normalized for conversion efficiency";

const SOURCES: [&str; 8] = [
    "Oxford Martin School - Way et al. 2022 (learning curves)",
    "BNEF New Energy Outlook 2024 (battery costs)",
    "IRENA Renewable Power Generation Costs 2024",
    "Lazard LCOE Analysis v17.0 2024",
    "IEA World Energy Outlook 2024",
    "IEA Grid Integration Study 2024",
    "NREL Storage Futures Study 2024",
    "RMI Economics of Clean Energy 2024",
];

// ============================================================================
// Shared metadata
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub description: String,
    pub philosophy: String,
    pub learning_rate_multiplier: f64,
    pub floor_cost_buffer: f64,
    pub manufacturing_multiplier: f64,
    pub breakthroughs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningCurveSummary {
    pub learning_rate: f64,
    pub base_cost: f64,
    pub floor_cost: f64,
    pub base_cumulative: f64,
    pub cost_unit: String,
    pub cumulative_unit: String,
}

fn scenario_framework(store: &ConfigStore) -> BTreeMap<String, ScenarioSummary> {
    store
        .scenarios()
        .iter()
        .map(|(scenario, def)| {
            (
                scenario.to_string(),
                ScenarioSummary {
                    description: def.description.clone(),
                    philosophy: def.philosophy.clone(),
                    learning_rate_multiplier: def.learning_rate_multiplier,
                    floor_cost_buffer: def.floor_cost_buffer,
                    manufacturing_multiplier: def.manufacturing_multiplier,
                    breakthroughs: def
                        .breakthroughs
                        .iter()
                        .map(|b| format!("{} ({}, from {})", b.name, b.technology, b.effective_year))
                        .collect(),
                },
            )
        })
        .collect()
}

fn learning_curves(store: &ConfigStore) -> BTreeMap<String, LearningCurveSummary> {
    store
        .learning_curve_technologies()
        .filter_map(|technology| {
            let params = store.learning_curve(technology)?;
            Some((
                technology.to_string(),
                LearningCurveSummary {
                    learning_rate: params.learning_rate,
                    base_cost: params.base_cost,
                    floor_cost: params.floor_cost,
                    base_cumulative: params.base_cumulative,
                    cost_unit: params.cost_label(),
                    cumulative_unit: params.cumulative_unit.clone(),
                },
            ))
        })
        .collect()
}

// ============================================================================
// full_system_costs.json
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostMetadata {
    pub version: String,
    pub date_generated: DateTime<Utc>,
    pub methodology: String,
    pub sources: Vec<String>,
    pub calibration: Calibration,
    pub diagnostics: Vec<Diagnostic>,
    pub skipped_technologies: Vec<String>,
    pub skipped_cells: Vec<SkippedCell>,
    pub carbon_price: CarbonPriceSelection,
    pub scc_scenarios_available: Vec<String>,
    pub learning_curves: BTreeMap<String, LearningCurveSummary>,
    pub scenario_framework: BTreeMap<String, ScenarioSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemCostComponents {
    pub firming: f64,
    pub storage: f64,
    pub grid: f64,
    pub capacity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceUnitEntry {
    pub value: f64,
    pub label: String,
    pub description: String,
    pub mwh_per_unit: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    pub base_lcoe_mwh: f64,
    pub base_cost_source: BaseCostSource,
    pub system_costs: SystemCostComponents,
    pub total_system_cost_mwh: f64,
    pub scc_cost_mwh: f64,
    pub total_lcoes_mwh: f64,
    pub capacity_factor: Option<f64>,
    pub carbon_intensity_tco2_mwh: f64,
    pub rebound_multiplier: f64,
    pub service_units: BTreeMap<String, ServiceUnitEntry>,
}

impl CostEntry {
    pub fn from_breakdown(cell: &CostBreakdown, precision: &Precision) -> Self {
        Self {
            base_lcoe_mwh: precision.currency(cell.base_lcoe),
            base_cost_source: cell.base_cost_source,
            system_costs: SystemCostComponents {
                firming: precision.currency(cell.integration.firming),
                storage: precision.currency(cell.integration.storage),
                grid: precision.currency(cell.integration.grid),
                capacity: precision.currency(cell.integration.capacity),
            },
            total_system_cost_mwh: precision.currency(cell.integration_total),
            scc_cost_mwh: precision.currency(cell.carbon_cost),
            total_lcoes_mwh: precision.currency(cell.total),
            capacity_factor: cell.capacity_factor.map(|cf| precision.share(cf)),
            carbon_intensity_tco2_mwh: precision.share(cell.carbon_intensity),
            rebound_multiplier: precision.ratio(cell.rebound_multiplier),
            service_units: cell
                .service_units
                .iter()
                .map(|(name, cost)| {
                    (
                        name.clone(),
                        ServiceUnitEntry {
                            value: precision.currency(cost.value),
                            label: cost.label.clone(),
                            description: cost.description.clone(),
                            mwh_per_unit: precision.share(cost.energy_per_unit),
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearEntry {
    pub year: Year,
    pub vre_penetration: f64,
    pub sources: BTreeMap<String, CostEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    pub regional_multiplier: f64,
    pub timeseries: Vec<YearEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCosts {
    pub name: String,
    pub description: String,
    pub philosophy: String,
    pub regions: BTreeMap<String, RegionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostDocument {
    pub metadata: CostMetadata,
    pub scenarios: BTreeMap<String, ScenarioCosts>,
}

impl CostDocument {
    pub fn build(
        store: &ConfigStore,
        output: &RunOutput,
        precision: &Precision,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let metadata = CostMetadata {
            version: VERSION.to_string(),
            date_generated: generated_at,
            methodology: COST_METHODOLOGY.to_string(),
            sources: SOURCES.iter().map(|s| s.to_string()).collect(),
            calibration: output.diagnostics.calibration(),
            diagnostics: output.diagnostics.iter().cloned().collect(),
            skipped_technologies: output
                .skipped_technologies
                .iter()
                .map(|t| t.to_string())
                .collect(),
            skipped_cells: output.skipped_cells.clone(),
            carbon_price: output.carbon_price.clone(),
            scc_scenarios_available: store.carbon_prices().keys().cloned().collect(),
            learning_curves: learning_curves(store),
            scenario_framework: scenario_framework(store),
        };

        let scenarios = output
            .scenarios
            .iter()
            .map(|run| {
                let def = store.scenario(run.scenario);
                let regions = run
                    .regions
                    .iter()
                    .map(|region| {
                        let timeseries = region
                            .years
                            .iter()
                            .map(|year| YearEntry {
                                year: year.year,
                                vre_penetration: precision.ratio(year.vre_penetration),
                                sources: year
                                    .technologies
                                    .iter()
                                    .map(|(technology, cell)| {
                                        (
                                            technology.to_string(),
                                            CostEntry::from_breakdown(cell, precision),
                                        )
                                    })
                                    .collect(),
                            })
                            .collect();
                        (
                            region.region.name.clone(),
                            RegionEntry {
                                regional_multiplier: region.region.cost_multiplier,
                                timeseries,
                            },
                        )
                    })
                    .collect();

                (
                    run.scenario.to_string(),
                    ScenarioCosts {
                        name: run.scenario.to_string(),
                        description: def.description.clone(),
                        philosophy: def.philosophy.clone(),
                        regions,
                    },
                )
            })
            .collect();

        Self {
            metadata,
            scenarios,
        }
    }
}

// ============================================================================
// energy_projections.json
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionMetadata {
    pub version: String,
    pub date_generated: DateTime<Utc>,
    pub methodology: String,
    pub base_year: Year,
    pub end_year: Year,
    pub clean_buffer: f64,
    pub calibration: Calibration,
    pub diagnostics: Vec<Diagnostic>,
    pub scenario_framework: BTreeMap<String, ScenarioSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicesEntry {
    pub services_by_technology_ej: BTreeMap<String, f64>,
    pub clean_services_ej: f64,
    pub fossil_services_ej: f64,
    pub total_services_ej: f64,
    pub clean_services_share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionEntry {
    pub year: Year,
    pub total_demand_ej: f64,
    pub deployment_ej: BTreeMap<String, f64>,
    pub clean_total_ej: f64,
    pub fossil_total_ej: f64,
    pub clean_share: f64,
    pub fossil_share: f64,
    pub rescale_factor: f64,
    pub services: ServicesEntry,
}

impl ProjectionEntry {
    pub fn from_record(record: &ProjectionRecord, precision: &Precision) -> Self {
        Self {
            year: record.year,
            total_demand_ej: precision.energy(record.total_demand),
            deployment_ej: record
                .deployment
                .iter()
                .map(|(technology, value)| (technology.to_string(), precision.energy(*value)))
                .collect(),
            clean_total_ej: precision.energy(record.clean_total),
            fossil_total_ej: precision.energy(record.fossil_total),
            clean_share: precision.share(record.clean_share),
            fossil_share: precision.share(record.fossil_share),
            rescale_factor: precision.share(record.rescale_factor),
            services: ServicesEntry {
                services_by_technology_ej: record
                    .services
                    .by_technology
                    .iter()
                    .map(|(technology, value)| (technology.to_string(), precision.energy(*value)))
                    .collect(),
                clean_services_ej: precision.energy(record.services.clean),
                fossil_services_ej: precision.energy(record.services.fossil),
                total_services_ej: precision.energy(record.services.total),
                clean_services_share: precision.share(record.services.clean_share),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnologyCostSeries {
    pub unit: String,
    pub costs: BTreeMap<Year, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub description: String,
    pub timeseries: Vec<ProjectionEntry>,
    pub technology_costs: BTreeMap<String, TechnologyCostSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionDocument {
    pub metadata: ProjectionMetadata,
    pub scenarios: BTreeMap<String, ScenarioProjection>,
}

impl ProjectionDocument {
    pub fn build(
        store: &ConfigStore,
        output: &RunOutput,
        clean_buffer: f64,
        precision: &Precision,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let horizon = store.horizon();
        let metadata = ProjectionMetadata {
            version: VERSION.to_string(),
            date_generated: generated_at,
            methodology: PROJECTION_METHODOLOGY.to_string(),
            base_year: horizon.base_year,
            end_year: horizon.end_year,
            clean_buffer,
            calibration: output.diagnostics.calibration(),
            diagnostics: output.diagnostics.iter().cloned().collect(),
            scenario_framework: scenario_framework(store),
        };

        let scenarios = output
            .scenarios
            .iter()
            .map(|run| {
                let technology_costs = run
                    .technology_costs
                    .iter()
                    .map(|(technology, series)| {
                        let unit = store
                            .learning_curve(*technology)
                            .map(|p| p.cost_label())
                            .unwrap_or_default();
                        (
                            technology.to_string(),
                            TechnologyCostSeries {
                                unit,
                                costs: series
                                    .iter()
                                    .map(|(year, cost)| (*year, precision.currency(*cost)))
                                    .collect(),
                            },
                        )
                    })
                    .collect();

                (
                    run.scenario.to_string(),
                    ScenarioProjection {
                        description: store.scenario(run.scenario).description.clone(),
                        timeseries: run
                            .projections
                            .iter()
                            .map(|record| ProjectionEntry::from_record(record, precision))
                            .collect(),
                        technology_costs,
                    },
                )
            })
            .collect();

        Self {
            metadata,
            scenarios,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{run, RunSettings};
    use crate::store::test_support::{default_store, embedded_with};
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_cost_document_rounds_and_nests() {
        let store = default_store();
        let output = run(&store, &RunSettings::default()).unwrap();
        let doc = CostDocument::build(&store, &output, &Precision::default(), fixed_time());

        let solar = &doc.scenarios["Baseline"].regions["Global"].timeseries[6].sources["solar"];
        assert_eq!(doc.scenarios["Baseline"].regions["Global"].timeseries[6].year, 2030);
        assert_eq!(solar.total_system_cost_mwh, 95.0);
        assert!((solar.total_lcoes_mwh - (solar.base_lcoe_mwh + 95.0)).abs() < 0.011);
        assert_eq!(doc.metadata.scc_scenarios_available.len(), 4);
        assert_eq!(doc.metadata.calibration, Calibration::Full);
    }

    #[test]
    fn test_cost_document_serializes_metadata() {
        let store = default_store();
        let output = run(&store, &RunSettings::default()).unwrap();
        let doc = CostDocument::build(&store, &output, &Precision::default(), fixed_time());
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["metadata"]["date_generated"], "2025-01-15T12:00:00Z");
        assert_eq!(json["metadata"]["calibration"], "full");
        assert_eq!(
            json["scenarios"]["Optimistic"]["regions"]["Japan"]["regional_multiplier"],
            1.4
        );
    }

    #[test]
    fn test_degraded_run_is_flagged() {
        let store = embedded_with(|docs| docs.service_units = None).unwrap();
        let output = run(&store, &RunSettings::default()).unwrap();
        let doc = ProjectionDocument::build(
            &store,
            &output,
            0.05,
            &Precision::default(),
            fixed_time(),
        );
        assert_eq!(doc.metadata.calibration, Calibration::Degraded);
        assert!(!doc.metadata.diagnostics.is_empty());
    }

    #[test]
    fn test_projection_document_includes_battery_costs() {
        let store = default_store();
        let output = run(&store, &RunSettings::default()).unwrap();
        let doc = ProjectionDocument::build(
            &store,
            &output,
            0.05,
            &Precision::default(),
            fixed_time(),
        );
        let batteries = &doc.scenarios["Baseline"].technology_costs["batteries"];
        assert_eq!(batteries.unit, "$/kWh");
        assert_eq!(batteries.costs[&2024], 139.0);
        assert_eq!(doc.scenarios["Baseline"].timeseries.len(), 27);
        let services = &doc.scenarios["Baseline"].timeseries[0].services;
        assert!(services.services_by_technology_ej.contains_key("solar"));
    }
}
