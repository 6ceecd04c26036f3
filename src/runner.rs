//! Batch evaluation of every scenario, region, year and technology.
//!
//! Scenarios and regions fan out over the rayon pool; the year loop inside a
//! technology series stays sequential.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use crate::costs::SystemCostAggregator;
use crate::domain::{
    CostBreakdown, ProjectionRecord, RegionDefinition, Scenario, Technology, Year,
};
use crate::error::ProjectionResult;
use crate::projection::{ScenarioProjectionEngine, DEFAULT_CLEAN_BUFFER};
use crate::store::{ConfigStore, DiagnosticKind, Diagnostics};

/// Name of the carbon-price scenario that means "no carbon cost"
pub const NO_CARBON_PRICE: &str = "none";

#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Headroom of the clean portfolio over demand
    pub clean_buffer: f64,
    pub carbon_price_scenario: String,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            clean_buffer: DEFAULT_CLEAN_BUFFER,
            carbon_price_scenario: NO_CARBON_PRICE.to_string(),
        }
    }
}

/// Carbon price actually applied to the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonPriceSelection {
    pub scenario: String,
    pub value_usd_per_tonne: f64,
    pub label: String,
}

/// A grid cell that produced no breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCell {
    pub scenario: Scenario,
    pub region: String,
    pub year: Year,
    pub technology: Technology,
}

#[derive(Debug, Clone)]
pub struct YearCosts {
    pub year: Year,
    pub vre_penetration: f64,
    pub technologies: BTreeMap<Technology, CostBreakdown>,
}

#[derive(Debug, Clone)]
pub struct RegionRun {
    pub region: RegionDefinition,
    pub years: Vec<YearCosts>,
}

#[derive(Debug, Clone)]
pub struct ScenarioRun {
    pub scenario: Scenario,
    pub projections: Vec<ProjectionRecord>,
    /// Learning-curve unit cost per technology and year
    pub technology_costs: BTreeMap<Technology, BTreeMap<Year, f64>>,
    pub regions: Vec<RegionRun>,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub scenarios: Vec<ScenarioRun>,
    pub carbon_price: CarbonPriceSelection,
    /// Store diagnostics plus anything raised during the run
    pub diagnostics: Diagnostics,
    pub skipped_technologies: Vec<Technology>,
    pub skipped_cells: Vec<SkippedCell>,
}

impl RunOutput {
    pub fn scenario(&self, scenario: Scenario) -> Option<&ScenarioRun> {
        self.scenarios.iter().find(|run| run.scenario == scenario)
    }
}

impl ScenarioRun {
    pub fn region(&self, name: &str) -> Option<&RegionRun> {
        self.regions.iter().find(|run| run.region.name == name)
    }
}

impl RegionRun {
    pub fn year(&self, year: Year) -> Option<&YearCosts> {
        self.years.iter().find(|costs| costs.year == year)
    }
}

fn select_carbon_price(
    store: &ConfigStore,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> CarbonPriceSelection {
    let price = if name == NO_CARBON_PRICE {
        None
    } else {
        store.carbon_price(name)
    };
    match price {
        Some(price) => CarbonPriceSelection {
            scenario: name.to_string(),
            value_usd_per_tonne: price.value_usd_per_tonne,
            label: price.label.clone(),
        },
        None => {
            if name != NO_CARBON_PRICE {
                diagnostics.push(
                    DiagnosticKind::UnknownIdentifier,
                    format!("unknown carbon price scenario '{name}', no carbon cost applied"),
                );
            }
            CarbonPriceSelection {
                scenario: name.to_string(),
                value_usd_per_tonne: 0.0,
                label: "No carbon price".to_string(),
            }
        }
    }
}

fn evaluate_region(
    store: &ConfigStore,
    scenario: Scenario,
    aggregator: &SystemCostAggregator<'_>,
    region: &RegionDefinition,
) -> (RegionRun, Vec<SkippedCell>) {
    let mut skipped = Vec::new();
    let years = store
        .horizon()
        .years()
        .map(|year| {
            let mut technologies = BTreeMap::new();
            for technology in store.cost_grid() {
                match aggregator.breakdown(technology, year, region) {
                    Some(cell) => {
                        technologies.insert(technology, cell);
                    }
                    None => skipped.push(SkippedCell {
                        scenario,
                        region: region.name.clone(),
                        year,
                        technology,
                    }),
                }
            }
            YearCosts {
                year,
                vre_penetration: aggregator.vre_penetration(year),
                technologies,
            }
        })
        .collect();

    (
        RegionRun {
            region: region.clone(),
            years,
        },
        skipped,
    )
}

fn evaluate_scenario(
    store: &ConfigStore,
    scenario: Scenario,
    settings: &RunSettings,
    carbon_price: f64,
) -> ProjectionResult<(ScenarioRun, Vec<SkippedCell>)> {
    let engine = ScenarioProjectionEngine::new(store, scenario, settings.clean_buffer);
    let projections = engine.project()?;
    let technology_costs = engine.learning_curve_costs();

    let aggregator = SystemCostAggregator::new(store, &engine, carbon_price);
    let (regions, skipped): (Vec<_>, Vec<_>) = store
        .regions()
        .par_iter()
        .map(|region| evaluate_region(store, scenario, &aggregator, region))
        .unzip();

    info!(
        scenario = %scenario,
        regions = regions.len(),
        years = projections.len(),
        "scenario evaluated"
    );

    Ok((
        ScenarioRun {
            scenario,
            projections,
            technology_costs,
            regions,
        },
        skipped.into_iter().flatten().collect(),
    ))
}

/// Evaluate the full grid for every scenario
pub fn run(store: &ConfigStore, settings: &RunSettings) -> ProjectionResult<RunOutput> {
    let mut diagnostics = store.diagnostics().clone();
    let carbon_price = select_carbon_price(store, &settings.carbon_price_scenario, &mut diagnostics);

    let results = Scenario::all()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|scenario| {
            evaluate_scenario(store, scenario, settings, carbon_price.value_usd_per_tonne)
        })
        .collect::<ProjectionResult<Vec<_>>>()?;

    let mut scenarios = Vec::with_capacity(results.len());
    let mut skipped_cells = Vec::new();
    for (run, skipped) in results {
        scenarios.push(run);
        skipped_cells.extend(skipped);
    }

    Ok(RunOutput {
        scenarios,
        carbon_price,
        diagnostics,
        skipped_technologies: store.skipped_technologies().to_vec(),
        skipped_cells,
    })
}
