//! Per-scenario orchestration of the adoption, capacity and learning models.

use std::collections::BTreeMap;
use tracing::debug;

use super::breakthrough::{cost_multiplier, efficiency_multiplier};
use super::portfolio::{apply_clean_cap, fossil_remainder, safe_ratio, shares};
use crate::domain::{
    ProjectionRecord, Scenario, ScenarioDefinition, ServiceTotals, Technology, Year,
};
use crate::error::{ProjectionError, ProjectionResult};
use crate::models::{AdoptionSCurveModel, CapacityConstraintResolver, DeploymentCap};
use crate::store::ConfigStore;

pub struct ScenarioProjectionEngine<'a> {
    store: &'a ConfigStore,
    scenario: Scenario,
    definition: &'a ScenarioDefinition,
    capacity: CapacityConstraintResolver<'a>,
    clean_buffer: f64,
}

impl<'a> ScenarioProjectionEngine<'a> {
    pub fn new(store: &'a ConfigStore, scenario: Scenario, clean_buffer: f64) -> Self {
        Self {
            store,
            scenario,
            definition: store.scenario(scenario),
            capacity: CapacityConstraintResolver::new(store),
            clean_buffer,
        }
    }

    pub fn scenario(&self) -> Scenario {
        self.scenario
    }

    pub fn definition(&self) -> &ScenarioDefinition {
        self.definition
    }

    pub fn capacity(&self) -> &CapacityConstraintResolver<'a> {
        &self.capacity
    }

    pub fn policy_multiplier(&self, technology: Technology, year: Year) -> f64 {
        self.store
            .policy_multiplier(technology, self.scenario, year)
    }

    /// Scenario-adjusted logistic steepness
    pub fn steepness(&self, technology: Technology) -> Option<f64> {
        let base = self.store.technology(technology)?.steepness?;
        Some(base * self.definition.steepness_multiplier)
    }

    /// Efficiency at `year` relative to the base year
    pub fn efficiency_normalization(&self, technology: Technology, year: Year) -> f64 {
        let Some(profile) = self.store.technology(technology) else {
            return 1.0;
        };
        let gain = self.definition.efficiency_gain(technology);
        profile.efficiency.normalization(
            self.store.horizon().base_year,
            year,
            gain,
            |y| efficiency_multiplier(&self.definition.breakthroughs, technology, y),
        )
    }

    /// Useful energy (EJ) delivered by one technology, base year through end year
    pub fn project_technology(&self, technology: Technology) -> ProjectionResult<BTreeMap<Year, f64>> {
        let missing = |what: &str| {
            ProjectionError::MissingAnchor(format!("{technology} under {}: {what}", self.scenario))
        };
        let anchors = self.store.anchors();
        let anchor = *anchors
            .deployment
            .get(&technology)
            .ok_or_else(|| missing("no base-year deployment"))?;
        let saturation = self
            .definition
            .saturation_for(technology)
            .ok_or_else(|| missing("no saturation limit"))?;
        let steepness = self
            .steepness(technology)
            .ok_or_else(|| missing("no S-curve steepness"))?;

        let horizon = self.store.horizon();
        let energy_per_capacity = self
            .store
            .technology(technology)
            .and_then(|profile| profile.energy_per_capacity);

        let model = AdoptionSCurveModel::new(saturation, steepness, horizon.base_year, anchor);
        let realized = model.realize(
            horizon.end_year,
            |year| self.policy_multiplier(technology, year),
            |year| match energy_per_capacity {
                Some(factor) => self
                    .capacity
                    .max_annual_deployment(technology, year, self.scenario)
                    .scaled(factor),
                // No way to express factory output in energy terms
                None => DeploymentCap::Unconstrained,
            },
        );

        Ok(realized
            .into_iter()
            .map(|(year, value)| (year, value * self.efficiency_normalization(technology, year)))
            .collect())
    }

    /// Total useful-energy demand, compounding from the base-year anchor
    pub fn total_demand(&self, year: Year) -> f64 {
        let anchors = self.store.anchors();
        let elapsed = year - anchors.year;
        anchors.total_demand * (1.0 + self.definition.demand_growth_rate).powi(elapsed)
    }

    /// Portfolio records for every year of the horizon
    pub fn project(&self) -> ProjectionResult<Vec<ProjectionRecord>> {
        let series = self
            .store
            .projected_technologies()
            .map(|technology| self.project_technology(technology).map(|s| (technology, s)))
            .collect::<ProjectionResult<BTreeMap<_, _>>>()?;

        let fossil_exergy = self.store.anchors().fossil_exergy_factor;
        let records = self
            .store
            .horizon()
            .years()
            .map(|year| {
                let total_demand = self.total_demand(year);
                let mut deployment: BTreeMap<Technology, f64> = series
                    .iter()
                    .map(|(technology, s)| (*technology, s.get(&year).copied().unwrap_or(0.0)))
                    .collect();

                let rescale_factor = apply_clean_cap(&mut deployment, total_demand, self.clean_buffer);
                let clean_total: f64 = deployment.values().sum();
                let fossil_total = fossil_remainder(total_demand, clean_total);
                let (clean_share, fossil_share) = shares(clean_total, total_demand);

                let by_technology: BTreeMap<Technology, f64> = deployment
                    .iter()
                    .map(|(technology, value)| {
                        let exergy = self
                            .store
                            .technology(*technology)
                            .map(|p| p.exergy_factor)
                            .unwrap_or(1.0);
                        (*technology, value * exergy)
                    })
                    .collect();
                let clean_services: f64 = by_technology.values().sum();
                let fossil_services = fossil_total * fossil_exergy;
                let services_total = clean_services + fossil_services;

                ProjectionRecord {
                    year,
                    scenario: self.scenario,
                    deployment,
                    total_demand,
                    clean_total,
                    fossil_total,
                    clean_share,
                    fossil_share,
                    rescale_factor,
                    services: ServiceTotals {
                        by_technology,
                        clean: clean_services,
                        fossil: fossil_services,
                        total: services_total,
                        clean_share: safe_ratio(clean_services, services_total),
                    },
                }
            })
            .collect::<Vec<_>>();

        if let Some(last) = records.last() {
            debug!(
                scenario = %self.scenario,
                year = last.year,
                clean_share = last.clean_share,
                "scenario projected"
            );
        }
        Ok(records)
    }

    /// Scenario-adjusted learning-curve unit cost, `None` without a curve or
    /// manufacturing trajectory
    pub fn learning_curve_cost(&self, technology: Technology, year: Year) -> Option<f64> {
        let params = self.store.learning_curve(technology)?.adjusted(
            self.definition.learning_rate_multiplier,
            self.definition.floor_cost_buffer,
        );
        let cumulative = self
            .capacity
            .cumulative_capacity(technology, year, self.scenario)?;
        Some(params.cost_at(cumulative) * cost_multiplier(&self.definition.breakthroughs, technology, year))
    }

    /// Unit-cost trajectory of every learning-curve technology over the horizon
    pub fn learning_curve_costs(&self) -> BTreeMap<Technology, BTreeMap<Year, f64>> {
        let end_year = self.store.horizon().end_year;
        self.store
            .learning_curve_technologies()
            .filter_map(|technology| {
                let params = self.store.learning_curve(technology)?.adjusted(
                    self.definition.learning_rate_multiplier,
                    self.definition.floor_cost_buffer,
                );
                let cumulative =
                    self.capacity
                        .cumulative_series(technology, self.scenario, end_year)?;
                let costs = cumulative
                    .into_iter()
                    .map(|(year, installed)| {
                        let breakthrough =
                            cost_multiplier(&self.definition.breakthroughs, technology, year);
                        (year, params.cost_at(installed) * breakthrough)
                    })
                    .collect();
                Some((technology, costs))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::portfolio::DEFAULT_CLEAN_BUFFER;
    use crate::store::test_support::default_store;

    #[test]
    fn test_baseline_solar_cost_2030() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let cost = engine.learning_curve_cost(Technology::Solar, 2030).unwrap();
        let expected = 32.0 * (2901.0f64 / 1500.0).powf((0.73f64).log2());
        assert!((cost - expected).abs() < 1e-6);
        assert!(cost > 20.0 && cost < 26.0);
    }

    #[test]
    fn test_optimistic_perovskite_breakthrough() {
        let store = default_store();
        let engine =
            ScenarioProjectionEngine::new(&store, Scenario::Optimistic, DEFAULT_CLEAN_BUFFER);
        let before = engine.learning_curve_cost(Technology::Solar, 2029).unwrap();
        let params = store.learning_curve(Technology::Solar).unwrap().adjusted(1.1, 0.9);
        let cumulative = engine
            .capacity()
            .cumulative_capacity(Technology::Solar, 2030, Scenario::Optimistic)
            .unwrap();
        let after = engine.learning_curve_cost(Technology::Solar, 2030).unwrap();
        assert!((after - params.cost_at(cumulative) * 0.85).abs() < 1e-9);
        assert!(after < before);
    }

    #[test]
    fn test_series_costs_match_point_costs() {
        let store = default_store();
        let engine =
            ScenarioProjectionEngine::new(&store, Scenario::Conservative, DEFAULT_CLEAN_BUFFER);
        let costs = engine.learning_curve_costs();
        assert_eq!(costs.len(), 3);
        for (technology, series) in &costs {
            for (year, cost) in series {
                let point = engine.learning_curve_cost(*technology, *year).unwrap();
                assert!((cost - point).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_battery_costs_are_per_kwh() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let costs = engine.learning_curve_costs();
        let batteries = &costs[&Technology::Batteries];
        assert_eq!(batteries[&2024], 139.0);
        // sodium-ion breakthrough from 2028
        assert!(batteries[&2028] < batteries[&2027] * 0.91);
        assert!(batteries.values().all(|c| *c >= 40.0 * 0.9 - 1e-9));
    }

    #[test]
    fn test_demand_growth() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        assert_eq!(engine.total_demand(2024), 198.5);
        assert!((engine.total_demand(2034) - 198.5 * 1.012f64.powi(10)).abs() < 1e-9);
    }

    #[test]
    fn test_projection_starts_at_anchor() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let records = engine.project().unwrap();
        assert_eq!(records.len(), 27);
        let first = &records[0];
        assert_eq!(first.year, 2024);
        assert!((first.deployment[&Technology::Solar] - 5.2).abs() < 1e-12);
        assert!((first.clean_total - 30.7).abs() < 1e-9);
        assert_eq!(first.rescale_factor, 1.0);
    }

    #[test]
    fn test_solar_growth_is_capacity_bound() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        let solar = engine.project_technology(Technology::Solar).unwrap();
        // 2025 cap: 215 GW × 0.005 EJ/GW, then efficiency normalization
        let normalization = engine.efficiency_normalization(Technology::Solar, 2025);
        assert!((solar[&2025] - (5.2 + 1.075) * normalization).abs() < 1e-9);
    }

    #[test]
    fn test_records_respect_cap_and_shares() {
        let store = default_store();
        for scenario in Scenario::all() {
            let engine = ScenarioProjectionEngine::new(&store, scenario, DEFAULT_CLEAN_BUFFER);
            for record in engine.project().unwrap() {
                assert!(record.clean_total <= record.total_demand * 1.05 + 1e-9);
                assert!(record.fossil_total >= 0.0);
                assert!((record.clean_share + record.fossil_share - 1.0).abs() < 1e-6);
                assert!(record.services.total > 0.0);
            }
        }
    }

    #[test]
    fn test_services_by_technology() {
        let store = default_store();
        let engine = ScenarioProjectionEngine::new(&store, Scenario::Baseline, DEFAULT_CLEAN_BUFFER);
        for record in engine.project().unwrap() {
            let services = &record.services;
            assert_eq!(
                services.by_technology.keys().collect::<Vec<_>>(),
                record.deployment.keys().collect::<Vec<_>>()
            );
            let sum: f64 = services.by_technology.values().sum();
            assert!((sum - services.clean).abs() < 1e-9);
            for (technology, value) in &services.by_technology {
                let exergy = store.technology(*technology).unwrap().exergy_factor;
                assert!((value - record.deployment[technology] * exergy).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_terminal_deployment_ordering() {
        let store = default_store();
        let terminal = |scenario| {
            let engine = ScenarioProjectionEngine::new(&store, scenario, DEFAULT_CLEAN_BUFFER);
            engine.project().unwrap().last().unwrap().deployment.clone()
        };
        let conservative = terminal(Scenario::Conservative);
        let baseline = terminal(Scenario::Baseline);
        let optimistic = terminal(Scenario::Optimistic);
        for technology in conservative.keys() {
            assert!(conservative[technology] <= baseline[technology]);
            assert!(baseline[technology] <= optimistic[technology]);
        }
    }
}
