//! Full system cost of one (technology, year, scenario, region) cell.

use std::collections::BTreeMap;

use super::integration::integration_costs;
use crate::domain::{BaseCostSource, CostBreakdown, RegionDefinition, ServiceCost, Technology, Year};
use crate::projection::breakthrough::cost_multiplier;
use crate::projection::ScenarioProjectionEngine;
use crate::store::ConfigStore;

/// Base LCOE and where it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseCost {
    pub value: f64,
    pub source: BaseCostSource,
}

pub struct SystemCostAggregator<'a> {
    store: &'a ConfigStore,
    engine: &'a ScenarioProjectionEngine<'a>,
    /// $/tCO2 of the selected carbon-price scenario
    carbon_price: f64,
}

impl<'a> SystemCostAggregator<'a> {
    pub fn new(
        store: &'a ConfigStore,
        engine: &'a ScenarioProjectionEngine<'a>,
        carbon_price: f64,
    ) -> Self {
        Self {
            store,
            engine,
            carbon_price,
        }
    }

    /// Learning-curve cost when the technology has both a curve and a
    /// manufacturing trajectory, otherwise the `mid` column of the cost table
    pub fn base_cost(&self, technology: Technology, year: Year) -> Option<BaseCost> {
        let has_learning_path = self.store.learning_curve(technology).is_some()
            && self.store.manufacturing(technology).is_some();

        if has_learning_path {
            let value = self.engine.learning_curve_cost(technology, year)?;
            return Some(BaseCost {
                value,
                source: BaseCostSource::LearningCurve,
            });
        }

        let mid = self.store.base_cost(technology)?.interpolate(year).number("mid")?;
        let breakthrough = cost_multiplier(&self.engine.definition().breakthroughs, technology, year);
        Some(BaseCost {
            value: mid * breakthrough,
            source: BaseCostSource::Table,
        })
    }

    pub fn vre_penetration(&self, year: Year) -> f64 {
        self.engine.definition().vre_penetration.interpolate(year)
    }

    pub fn rebound(&self, year: Year) -> f64 {
        self.engine.definition().rebound.interpolate(year)
    }

    /// Cost breakdown, or `None` for a technology that cannot be priced
    pub fn breakdown(
        &self,
        technology: Technology,
        year: Year,
        region: &RegionDefinition,
    ) -> Option<CostBreakdown> {
        let profile = self.store.technology(technology)?;
        let base = self.base_cost(technology, year)?;

        let vre_penetration = self.vre_penetration(year);
        let integration = integration_costs(technology.role(), vre_penetration);
        let integration_total = integration.total();
        let carbon_cost = self.carbon_price * profile.carbon_intensity;
        let total = (base.value + integration_total + carbon_cost) * region.cost_multiplier;

        let capacity_factor = self
            .store
            .base_cost(technology)
            .and_then(|table| table.interpolate(year).number("capacity_factor"));

        let rebound_multiplier = self.rebound(year);
        let service_units = self
            .store
            .service_units()
            .iter()
            .map(|(name, unit)| {
                let energy_per_unit = unit.energy_per_unit * rebound_multiplier;
                (
                    name.clone(),
                    ServiceCost {
                        value: total * energy_per_unit,
                        label: unit.label.clone(),
                        description: unit.description.clone(),
                        energy_per_unit,
                    },
                )
            })
            .collect::<BTreeMap<_, _>>();

        Some(CostBreakdown {
            base_lcoe: base.value,
            base_cost_source: base.source,
            integration,
            integration_total,
            carbon_cost,
            total,
            capacity_factor,
            carbon_intensity: profile.carbon_intensity,
            vre_penetration,
            rebound_multiplier,
            service_units,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Scenario;
    use crate::projection::DEFAULT_CLEAN_BUFFER;
    use crate::store::test_support::default_store;

    fn global() -> RegionDefinition {
        RegionDefinition {
            name: "Global".into(),
            cost_multiplier: 1.0,
        }
    }

    #[test]
    fn test_baseline_solar_2030_global() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let aggregator = SystemCostAggregator::new(&store, &engine, 0.0);

        let cell = aggregator.breakdown(Technology::Solar, 2030, &global()).unwrap();
        assert_eq!(cell.base_cost_source, BaseCostSource::LearningCurve);
        assert!(cell.base_lcoe > 20.0 && cell.base_lcoe < 26.0);
        assert_eq!(cell.vre_penetration, 0.42);
        assert_eq!(cell.integration_total, 95.0);
        assert!((cell.total - (cell.base_lcoe + 95.0)).abs() < 1e-9);
        assert_eq!(cell.capacity_factor, Some(0.26));
    }

    #[test]
    fn test_table_path_for_nuclear() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let aggregator = SystemCostAggregator::new(&store, &engine, 0.0);

        let base = aggregator.base_cost(Technology::Nuclear, 2040).unwrap();
        assert_eq!(base.source, BaseCostSource::Table);
        // halfway between 145 (2030) and 120 (2050)
        assert!((base.value - 132.5).abs() < 1e-9);
    }

    #[test]
    fn test_carbon_and_region_multiplier() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Conservative, DEFAULT_CLEAN_BUFFER);
        let aggregator = SystemCostAggregator::new(&store, &engine, 200.0);
        let japan = RegionDefinition {
            name: "Japan".into(),
            cost_multiplier: 1.4,
        };

        let cell = aggregator.breakdown(Technology::Coal, 2024, &japan).unwrap();
        assert!((cell.carbon_cost - 180.0).abs() < 1e-9);
        // 95 base + (20 grid + 15 capacity) + 180 carbon, × 1.4
        assert!((cell.total - (95.0 + 35.0 + 180.0) * 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_service_units_apply_rebound() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Optimistic, DEFAULT_CLEAN_BUFFER);
        let aggregator = SystemCostAggregator::new(&store, &engine, 0.0);

        let cell = aggregator.breakdown(Technology::Wind, 2050, &global()).unwrap();
        assert_eq!(cell.rebound_multiplier, 1.06);
        let heating = &cell.service_units["home_heating_year"];
        assert!((heating.energy_per_unit - 12.0 * 1.06).abs() < 1e-12);
        assert!((heating.value - cell.total * 12.0 * 1.06).abs() < 1e-9);
        assert_eq!(heating.label, "$/home-year");
    }

    #[test]
    fn test_batteries_are_not_priced_without_profile() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let aggregator = SystemCostAggregator::new(&store, &engine, 0.0);
        assert!(aggregator.breakdown(Technology::Batteries, 2030, &global()).is_none());
    }
}
