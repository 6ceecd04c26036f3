//! Manufacturing-capacity accounting.
//!
//! Cumulative installed capacity is the base-year stock plus every year of
//! factory output since, and a year's deployment can never exceed that
//! year's factory output.

use std::collections::BTreeMap;

use crate::domain::{Scenario, Technology, Trajectory, Year};
use crate::store::ConfigStore;

/// Annual factory output for one technology
#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturingCapacity {
    /// Output per year (e.g. GW/yr), historical and projected anchors merged
    pub output: Trajectory,
    pub scenario_multipliers: BTreeMap<Scenario, f64>,
    /// Installed stock at the base year, when the document provides one
    pub base_cumulative: Option<f64>,
    pub unit: String,
}

impl ManufacturingCapacity {
    pub fn multiplier(&self, scenario: Scenario, default: f64) -> f64 {
        self.scenario_multipliers
            .get(&scenario)
            .copied()
            .unwrap_or(default)
    }
}

/// Upper bound on one year's deployment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeploymentCap {
    Unconstrained,
    Limited(f64),
}

impl DeploymentCap {
    pub fn clamp(self, value: f64) -> f64 {
        match self {
            DeploymentCap::Unconstrained => value,
            DeploymentCap::Limited(limit) => value.min(limit),
        }
    }

    /// Convert the bound into other units (e.g. GW -> EJ)
    pub fn scaled(self, factor: f64) -> Self {
        match self {
            DeploymentCap::Unconstrained => DeploymentCap::Unconstrained,
            DeploymentCap::Limited(limit) => DeploymentCap::Limited(limit * factor),
        }
    }

    pub fn limit(self) -> Option<f64> {
        match self {
            DeploymentCap::Unconstrained => None,
            DeploymentCap::Limited(limit) => Some(limit),
        }
    }
}

pub struct CapacityConstraintResolver<'a> {
    store: &'a ConfigStore,
}

impl<'a> CapacityConstraintResolver<'a> {
    pub fn new(store: &'a ConfigStore) -> Self {
        Self { store }
    }

    fn multiplier(&self, capacity: &ManufacturingCapacity, scenario: Scenario) -> f64 {
        let default = self.store.scenario(scenario).manufacturing_multiplier;
        capacity.multiplier(scenario, default)
    }

    fn base_cumulative(&self, technology: Technology, capacity: &ManufacturingCapacity) -> f64 {
        capacity
            .base_cumulative
            .or_else(|| {
                self.store
                    .learning_curve(technology)
                    .map(|params| params.base_cumulative)
            })
            .unwrap_or(0.0)
    }

    /// Installed stock at `year`, or `None` without a manufacturing trajectory.
    ///
    /// Years at or before the base year return the base-year stock.
    pub fn cumulative_capacity(
        &self,
        technology: Technology,
        year: Year,
        scenario: Scenario,
    ) -> Option<f64> {
        let capacity = self.store.manufacturing(technology)?;
        let multiplier = self.multiplier(capacity, scenario);
        let base_year = self.store.horizon().base_year;

        let additions: f64 = ((base_year + 1)..=year)
            .map(|y| capacity.output.interpolate(y) * multiplier)
            .sum();
        Some(self.base_cumulative(technology, capacity) + additions)
    }

    /// Installed stock for every year from the base year through `end_year`.
    ///
    /// Running sum; agrees with [`Self::cumulative_capacity`] year by year.
    pub fn cumulative_series(
        &self,
        technology: Technology,
        scenario: Scenario,
        end_year: Year,
    ) -> Option<BTreeMap<Year, f64>> {
        let capacity = self.store.manufacturing(technology)?;
        let multiplier = self.multiplier(capacity, scenario);
        let base_year = self.store.horizon().base_year;

        let mut running = self.base_cumulative(technology, capacity);
        let mut series = BTreeMap::from([(base_year, running)]);
        for year in (base_year + 1)..=end_year {
            running += capacity.output.interpolate(year) * multiplier;
            series.insert(year, running);
        }
        Some(series)
    }

    pub fn max_annual_deployment(
        &self,
        technology: Technology,
        year: Year,
        scenario: Scenario,
    ) -> DeploymentCap {
        match self.store.manufacturing(technology) {
            Some(capacity) => DeploymentCap::Limited(
                capacity.output.interpolate(year) * self.multiplier(capacity, scenario),
            ),
            None => DeploymentCap::Unconstrained,
        }
    }
}
