//! Immutable configuration store.
//!
//! Built once from the configuration documents, validated up front and then
//! shared by reference with every model. Recoverable problems (missing
//! documents, unknown identifiers) become [`Diagnostics`]; everything else is
//! a fatal [`ProjectionError`].

pub mod defaults;
pub mod documents;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::{info, warn};
use validator::Validate;

use crate::domain::{
    AnchorRecord, Breakthrough, CarbonPrice, RegionDefinition, Scenario, ScenarioDefinition,
    ScenarioTable, ServiceUnit, Technology, Trajectory, Year,
};
use crate::error::{ProjectionError, ProjectionResult};
use crate::models::capacity::ManufacturingCapacity;
use crate::models::{EfficiencyProfile, LearningCurveParams};
use crate::projection::policy::PolicySchedule;
use documents::{AnchorsDocument, Documents, ScenarioAdjustmentEntry, ScenarioEntry};

pub use loader::load_documents;

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A document was absent and the embedded reference copy was used
    ConfigurationMissing,
    /// A key in a document did not resolve to a known technology or scenario
    UnknownIdentifier,
    /// A technology has nothing to price it with and is left out of the cost grid
    SkippedTechnology,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

/// Whether the run used the caller's documents in full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Calibration {
    Full,
    Degraded,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        warn!(kind = ?kind, "{message}");
        self.0.push(Diagnostic { kind, message });
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn calibration(&self) -> Calibration {
        if self
            .0
            .iter()
            .any(|d| d.kind == DiagnosticKind::ConfigurationMissing)
        {
            Calibration::Degraded
        } else {
            Calibration::Full
        }
    }
}

// ============================================================================
// Store contents
// ============================================================================

/// First and last projected year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub base_year: Year,
    pub end_year: Year,
}

impl Default for Horizon {
    fn default() -> Self {
        Self {
            base_year: 2024,
            end_year: 2050,
        }
    }
}

impl Horizon {
    pub fn years(&self) -> impl Iterator<Item = Year> {
        self.base_year..=self.end_year
    }
}

/// Physical description of a technology
#[derive(Debug, Clone, PartialEq)]
pub struct TechnologyProfile {
    /// tCO2/MWh
    pub carbon_intensity: f64,
    pub efficiency: EfficiencyProfile,
    /// EJ of useful energy per unit of manufacturing output
    pub energy_per_capacity: Option<f64>,
    /// Base logistic steepness before the scenario multiplier
    pub steepness: Option<f64>,
    pub exergy_factor: f64,
}

/// Observed state of the energy system at the base year
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineAnchors {
    pub year: Year,
    /// Total useful energy demand (EJ)
    pub total_demand: f64,
    pub fossil_exergy_factor: f64,
    /// Useful energy (EJ) per projected clean technology
    pub deployment: BTreeMap<Technology, f64>,
}

#[derive(Debug, Clone)]
pub struct ConfigStore {
    horizon: Horizon,
    learning_curves: BTreeMap<Technology, LearningCurveParams>,
    manufacturing: BTreeMap<Technology, ManufacturingCapacity>,
    policies: BTreeMap<(Technology, Scenario), PolicySchedule>,
    scenarios: ScenarioTable<ScenarioDefinition>,
    technologies: BTreeMap<Technology, TechnologyProfile>,
    base_costs: BTreeMap<Technology, Trajectory<AnchorRecord>>,
    anchors: BaselineAnchors,
    regions: Vec<RegionDefinition>,
    service_units: BTreeMap<String, ServiceUnit>,
    carbon_prices: BTreeMap<String, CarbonPrice>,
    skipped: Vec<Technology>,
    diagnostics: Diagnostics,
}

fn invalid(document: &str, errors: validator::ValidationErrors, key: &str) -> ProjectionError {
    ProjectionError::invalid_document(document, format!("{key}: {errors}"))
}

/// Resolve technology keys, dropping unknown ones with a diagnostic
fn resolve_technologies<V>(
    document: &str,
    entries: impl IntoIterator<Item = (String, V)>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<Technology, V> {
    let mut resolved = BTreeMap::new();
    for (key, value) in entries {
        match Technology::resolve(&key) {
            Some(technology) if resolved.contains_key(&technology) => diagnostics.push(
                DiagnosticKind::UnknownIdentifier,
                format!("{document}: '{key}' duplicates {technology}, ignored"),
            ),
            Some(technology) => {
                resolved.insert(technology, value);
            }
            None => diagnostics.push(
                DiagnosticKind::UnknownIdentifier,
                format!("{document}: unknown technology '{key}', ignored"),
            ),
        }
    }
    resolved
}

/// Resolve scenario keys case-insensitively, dropping unknown ones with a diagnostic
fn resolve_scenarios<V>(
    document: &str,
    entries: impl IntoIterator<Item = (String, V)>,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<Scenario, V> {
    let mut resolved = BTreeMap::new();
    for (key, value) in entries {
        match Scenario::from_str(key.trim()) {
            Ok(scenario) => {
                resolved.insert(scenario, value);
            }
            Err(_) => diagnostics.push(
                DiagnosticKind::UnknownIdentifier,
                format!("{document}: unknown scenario '{key}', ignored"),
            ),
        }
    }
    resolved
}

/// Use the provided document or fall back to the embedded copy
fn or_embedded<T: serde::de::DeserializeOwned>(
    provided: Option<T>,
    name: &str,
    diagnostics: &mut Diagnostics,
) -> ProjectionResult<T> {
    match provided {
        Some(doc) => Ok(doc),
        None => {
            diagnostics.push(
                DiagnosticKind::ConfigurationMissing,
                format!("{name} not found, using embedded reference data"),
            );
            defaults::embedded(name)
        }
    }
}

impl ConfigStore {
    /// Build a store from the embedded reference documents
    pub fn embedded(horizon: Horizon) -> ProjectionResult<Self> {
        Self::from_documents(defaults::embedded_documents()?, horizon)
    }

    /// Validate `docs` and build the store. Missing documents are replaced by
    /// their embedded copies.
    pub fn from_documents(docs: Documents, horizon: Horizon) -> ProjectionResult<Self> {
        if horizon.end_year < horizon.base_year {
            return Err(ProjectionError::invalid_parameter(
                "horizon",
                format!(
                    "end year {} precedes base year {}",
                    horizon.end_year, horizon.base_year
                ),
            ));
        }

        let mut diagnostics = Diagnostics::default();

        let learning_doc =
            or_embedded(docs.learning_curves, documents::LEARNING_CURVES, &mut diagnostics)?;
        let manufacturing_doc = or_embedded(
            docs.manufacturing,
            documents::MANUFACTURING_CAPACITY,
            &mut diagnostics,
        )?;
        let policy_doc = or_embedded(docs.policies, documents::POLICY_SCENARIOS, &mut diagnostics)?;
        let regions_doc = or_embedded(docs.regions, documents::REGIONS, &mut diagnostics)?;
        let service_doc =
            or_embedded(docs.service_units, documents::SERVICE_UNITS, &mut diagnostics)?;
        let carbon_doc =
            or_embedded(docs.carbon_prices, documents::CARBON_PRICES, &mut diagnostics)?;
        let scenarios_doc = or_embedded(docs.scenarios, documents::SCENARIOS, &mut diagnostics)?;
        let technologies_doc =
            or_embedded(docs.technologies, documents::TECHNOLOGIES, &mut diagnostics)?;
        let base_costs_doc = or_embedded(docs.base_costs, documents::BASE_COSTS, &mut diagnostics)?;
        // Base-year observations have no stand-in
        let anchors_doc = docs.anchors.ok_or_else(|| {
            ProjectionError::MissingAnchor(format!("{} not found", documents::BASELINE_ANCHORS))
        })?;

        // Technologies
        let mut technologies = BTreeMap::new();
        for (technology, entry) in
            resolve_technologies(documents::TECHNOLOGIES, technologies_doc, &mut diagnostics)
        {
            entry
                .validate()
                .map_err(|e| invalid(documents::TECHNOLOGIES, e, &technology.to_string()))?;
            if entry.max_efficiency < entry.base_efficiency {
                return Err(ProjectionError::invalid_parameter(
                    format!("technologies/{technology}/max_efficiency"),
                    "below base_efficiency",
                ));
            }
            if let Some(steepness) = entry.steepness.filter(|k| *k <= 0.0) {
                return Err(ProjectionError::invalid_parameter(
                    format!("technologies/{technology}/steepness"),
                    format!("{steepness} must be positive"),
                ));
            }
            technologies.insert(
                technology,
                TechnologyProfile {
                    carbon_intensity: entry.carbon_intensity,
                    efficiency: EfficiencyProfile {
                        base: entry.base_efficiency,
                        ceiling: entry.max_efficiency,
                    },
                    energy_per_capacity: entry.energy_per_capacity,
                    steepness: entry.steepness,
                    exergy_factor: entry.exergy_factor,
                },
            );
        }

        // Learning curves
        let mut learning_curves = BTreeMap::new();
        for (technology, (key, entry)) in resolve_technologies(
            documents::LEARNING_CURVES,
            learning_doc
                .learning_rates
                .into_iter()
                .map(|(key, entry)| (key.clone(), (key, entry))),
            &mut diagnostics,
        ) {
            let params = entry.to_params(&key)?;
            params.validate(&technology.to_string())?;
            learning_curves.insert(technology, params);
        }

        // Manufacturing capacity
        let mut manufacturing = BTreeMap::new();
        for (technology, (key, entry)) in resolve_technologies(
            documents::MANUFACTURING_CAPACITY,
            manufacturing_doc
                .trajectories
                .into_iter()
                .map(|(key, entry)| (key.clone(), (key, entry))),
            &mut diagnostics,
        ) {
            let output = Trajectory::from_parts(
                &format!("manufacturing/{key}"),
                entry.historical,
                entry.projections,
            )?;
            if let Some((year, value)) = output.anchors().find(|(_, v)| **v < 0.0) {
                return Err(ProjectionError::invalid_parameter(
                    format!("manufacturing/{key}/{year}"),
                    format!("output {value} is negative"),
                ));
            }
            let scenario_multipliers = resolve_scenarios(
                documents::MANUFACTURING_CAPACITY,
                entry.scenario_multipliers,
                &mut diagnostics,
            );
            if let Some((scenario, m)) = scenario_multipliers.iter().find(|(_, m)| **m < 0.0) {
                return Err(ProjectionError::invalid_parameter(
                    format!("manufacturing/{key}/{scenario}"),
                    format!("multiplier {m} is negative"),
                ));
            }
            manufacturing.insert(
                technology,
                ManufacturingCapacity {
                    output,
                    scenario_multipliers,
                    base_cumulative: entry.base_cumulative,
                    unit: entry.unit.unwrap_or_default(),
                },
            );
        }

        // Policy schedules
        let mut policies = BTreeMap::new();
        for (technology, by_scenario) in resolve_technologies(
            documents::POLICY_SCENARIOS,
            policy_doc.by_technology,
            &mut diagnostics,
        ) {
            for (scenario, periods) in
                resolve_scenarios(documents::POLICY_SCENARIOS, by_scenario, &mut diagnostics)
            {
                let schedule = PolicySchedule::from_periods(technology, scenario, &periods)?;
                policies.insert((technology, scenario), schedule);
            }
        }

        // Scenarios
        let mut adjustments = resolve_scenarios(
            documents::LEARNING_CURVES,
            learning_doc.scenario_adjustments,
            &mut diagnostics,
        );
        let mut entries = resolve_scenarios(documents::SCENARIOS, scenarios_doc, &mut diagnostics);
        let scenarios = ScenarioTable::try_from_fn(|scenario| {
            let entry = entries.remove(&scenario).ok_or_else(|| {
                ProjectionError::invalid_document(
                    documents::SCENARIOS,
                    format!("scenario {scenario} is not defined"),
                )
            })?;
            let adjustment = adjustments.remove(&scenario).unwrap_or_else(|| {
                diagnostics.push(
                    DiagnosticKind::UnknownIdentifier,
                    format!(
                        "{}: no adjustments for {scenario}, using neutral values",
                        documents::LEARNING_CURVES
                    ),
                );
                ScenarioAdjustmentEntry::default()
            });
            build_scenario(scenario, entry, adjustment, &learning_curves, &mut diagnostics)
        })?;

        // Regions, service units, carbon prices
        if regions_doc.is_empty() {
            return Err(ProjectionError::invalid_document(
                documents::REGIONS,
                "no regions defined",
            ));
        }
        let mut regions = Vec::with_capacity(regions_doc.len());
        for (name, cost_multiplier) in regions_doc {
            if cost_multiplier < 0.0 {
                return Err(ProjectionError::invalid_parameter(
                    format!("regions/{name}"),
                    format!("multiplier {cost_multiplier} is negative"),
                ));
            }
            regions.push(RegionDefinition {
                name,
                cost_multiplier,
            });
        }
        // Global first, then alphabetical
        regions.sort_by(|a, b| (a.name != "Global", &a.name).cmp(&(b.name != "Global", &b.name)));

        for (name, unit) in &service_doc {
            unit.validate()
                .map_err(|e| invalid(documents::SERVICE_UNITS, e, name))?;
        }
        for (name, price) in &carbon_doc {
            price
                .validate()
                .map_err(|e| invalid(documents::CARBON_PRICES, e, name))?;
        }

        // Base-cost table, regrouped per technology
        let mut per_technology: BTreeMap<Technology, BTreeMap<Year, AnchorRecord>> =
            BTreeMap::new();
        for (year, row) in base_costs_doc {
            for (technology, record) in resolve_technologies(documents::BASE_COSTS, row, &mut diagnostics)
            {
                if record.number("mid").is_none() {
                    return Err(ProjectionError::invalid_document(
                        documents::BASE_COSTS,
                        format!("{year}/{technology} has no numeric 'mid' cost"),
                    ));
                }
                per_technology
                    .entry(technology)
                    .or_default()
                    .insert(year, record);
            }
        }
        let base_costs = per_technology
            .into_iter()
            .map(|(technology, anchors)| {
                Trajectory::new(&format!("base_costs/{technology}"), anchors)
                    .map(|t| (technology, t))
            })
            .collect::<ProjectionResult<BTreeMap<_, _>>>()?;

        let anchors = build_anchors(
            anchors_doc,
            horizon,
            &scenarios,
            &technologies,
            &mut diagnostics,
        )?;

        // Cost-grid coverage
        let mut skipped = Vec::new();
        for technology in Technology::COST_GRID {
            let learning_path = learning_curves.contains_key(&technology)
                && manufacturing.contains_key(&technology);
            let priced = learning_path || base_costs.contains_key(&technology);
            if !priced {
                diagnostics.push(
                    DiagnosticKind::SkippedTechnology,
                    format!("{technology} has neither a learning curve nor a base cost, skipped"),
                );
                skipped.push(technology);
            } else if !technologies.contains_key(&technology) {
                diagnostics.push(
                    DiagnosticKind::SkippedTechnology,
                    format!("{technology} has no technology profile, skipped"),
                );
                skipped.push(technology);
            }
        }

        info!(
            learning_curves = learning_curves.len(),
            manufacturing = manufacturing.len(),
            regions = regions.len(),
            diagnostics = diagnostics.len(),
            "configuration store built"
        );

        Ok(Self {
            horizon,
            learning_curves,
            manufacturing,
            policies,
            scenarios,
            technologies,
            base_costs,
            anchors,
            regions,
            service_units: service_doc,
            carbon_prices: carbon_doc,
            skipped,
            diagnostics,
        })
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn learning_curve(&self, technology: Technology) -> Option<&LearningCurveParams> {
        self.learning_curves.get(&technology)
    }

    pub fn learning_curve_technologies(&self) -> impl Iterator<Item = Technology> + '_ {
        self.learning_curves.keys().copied()
    }

    pub fn manufacturing(&self, technology: Technology) -> Option<&ManufacturingCapacity> {
        self.manufacturing.get(&technology)
    }

    /// Deployment multiplier in force; 1.0 when nothing is configured
    pub fn policy_multiplier(&self, technology: Technology, scenario: Scenario, year: Year) -> f64 {
        self.policies
            .get(&(technology, scenario))
            .map(|schedule| schedule.multiplier(year))
            .unwrap_or(1.0)
    }

    pub fn scenario(&self, scenario: Scenario) -> &ScenarioDefinition {
        self.scenarios.get(scenario)
    }

    pub fn scenarios(&self) -> &ScenarioTable<ScenarioDefinition> {
        &self.scenarios
    }

    pub fn technology(&self, technology: Technology) -> Option<&TechnologyProfile> {
        self.technologies.get(&technology)
    }

    pub fn base_cost(&self, technology: Technology) -> Option<&Trajectory<AnchorRecord>> {
        self.base_costs.get(&technology)
    }

    pub fn anchors(&self) -> &BaselineAnchors {
        &self.anchors
    }

    /// Clean technologies whose adoption is projected
    pub fn projected_technologies(&self) -> impl Iterator<Item = Technology> + '_ {
        self.anchors.deployment.keys().copied()
    }

    pub fn regions(&self) -> &[RegionDefinition] {
        &self.regions
    }

    pub fn service_units(&self) -> &BTreeMap<String, ServiceUnit> {
        &self.service_units
    }

    pub fn carbon_prices(&self) -> &BTreeMap<String, CarbonPrice> {
        &self.carbon_prices
    }

    pub fn carbon_price(&self, name: &str) -> Option<&CarbonPrice> {
        self.carbon_prices.get(name)
    }

    /// Cost-grid technologies that can be priced, in grid order
    pub fn cost_grid(&self) -> impl Iterator<Item = Technology> + '_ {
        Technology::COST_GRID
            .into_iter()
            .filter(move |t| !self.skipped.contains(t))
    }

    pub fn skipped_technologies(&self) -> &[Technology] {
        &self.skipped
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }
}

fn build_scenario(
    scenario: Scenario,
    entry: ScenarioEntry,
    adjustment: ScenarioAdjustmentEntry,
    learning_curves: &BTreeMap<Technology, LearningCurveParams>,
    diagnostics: &mut Diagnostics,
) -> ProjectionResult<ScenarioDefinition> {
    let name = format!("scenarios/{scenario}");
    entry
        .validate()
        .map_err(|e| invalid(documents::SCENARIOS, e, &scenario.to_string()))?;

    if adjustment.learning_rate_multiplier <= 0.0 {
        return Err(ProjectionError::invalid_parameter(
            format!("{name}/learning_rate_multiplier"),
            "must be positive",
        ));
    }
    if adjustment.floor_cost_buffer < 0.0 {
        return Err(ProjectionError::invalid_parameter(
            format!("{name}/floor_cost_buffer"),
            "must not be negative",
        ));
    }
    if entry.demand_growth_rate <= -1.0 {
        return Err(ProjectionError::invalid_parameter(
            format!("{name}/demand_growth_rate"),
            format!("{} must be greater than -1", entry.demand_growth_rate),
        ));
    }
    for (technology, params) in learning_curves {
        params
            .adjusted(adjustment.learning_rate_multiplier, adjustment.floor_cost_buffer)
            .validate(&format!("{technology} under {scenario}"))?;
    }

    let mut breakthroughs = Vec::new();
    for raw in adjustment.breakthrough_adjustments {
        raw.validate()
            .map_err(|e| invalid(documents::LEARNING_CURVES, e, &raw.name))?;
        match Technology::resolve(&raw.technology) {
            Some(technology) => breakthroughs.push(Breakthrough {
                name: raw.name,
                technology,
                kind: raw.kind,
                magnitude: raw.magnitude,
                effective_year: raw.effective_year,
            }),
            None => diagnostics.push(
                DiagnosticKind::UnknownIdentifier,
                format!(
                    "{}: breakthrough '{}' targets unknown technology '{}', ignored",
                    documents::LEARNING_CURVES,
                    raw.name,
                    raw.technology
                ),
            ),
        }
    }

    let vre_penetration = Trajectory::new(&format!("{name}/vre_penetration"), entry.vre_penetration)?;
    if let Some((year, v)) = vre_penetration.anchors().find(|(_, v)| !(0.0..=1.0).contains(*v)) {
        return Err(ProjectionError::invalid_parameter(
            format!("{name}/vre_penetration/{year}"),
            format!("{v} is outside [0, 1]"),
        ));
    }
    let rebound = Trajectory::new(&format!("{name}/rebound"), entry.rebound)?;
    if let Some((year, r)) = rebound.anchors().find(|(_, r)| **r <= 0.0) {
        return Err(ProjectionError::invalid_parameter(
            format!("{name}/rebound/{year}"),
            format!("{r} must be positive"),
        ));
    }

    let saturation = resolve_technologies(documents::SCENARIOS, entry.saturation, diagnostics);
    if let Some((technology, l)) = saturation.iter().find(|(_, l)| **l <= 0.0) {
        return Err(ProjectionError::invalid_parameter(
            format!("{name}/saturation/{technology}"),
            format!("{l} must be positive"),
        ));
    }
    let efficiency_improvement =
        resolve_technologies(documents::SCENARIOS, entry.efficiency_improvement, diagnostics);

    Ok(ScenarioDefinition {
        scenario,
        description: entry.description,
        philosophy: entry.philosophy,
        learning_rate_multiplier: adjustment.learning_rate_multiplier,
        floor_cost_buffer: adjustment.floor_cost_buffer,
        breakthroughs,
        manufacturing_multiplier: entry.manufacturing_multiplier,
        steepness_multiplier: entry.steepness_multiplier,
        demand_growth_rate: entry.demand_growth_rate,
        vre_penetration,
        rebound,
        saturation,
        efficiency_improvement,
    })
}

fn build_anchors(
    doc: AnchorsDocument,
    horizon: Horizon,
    scenarios: &ScenarioTable<ScenarioDefinition>,
    technologies: &BTreeMap<Technology, TechnologyProfile>,
    diagnostics: &mut Diagnostics,
) -> ProjectionResult<BaselineAnchors> {
    if doc.year != horizon.base_year {
        return Err(ProjectionError::MissingAnchor(format!(
            "anchors are for {}, base year is {}",
            doc.year, horizon.base_year
        )));
    }
    doc.validate().map_err(|e| {
        ProjectionError::MissingAnchor(format!("{}: {e}", documents::BASELINE_ANCHORS))
    })?;

    let deployment =
        resolve_technologies(documents::BASELINE_ANCHORS, doc.deployment, diagnostics);
    for (technology, value) in &deployment {
        if *value < 0.0 {
            return Err(ProjectionError::MissingAnchor(format!(
                "{technology} deployment {value} is negative"
            )));
        }
        let profile = technologies.get(technology).ok_or_else(|| {
            ProjectionError::MissingAnchor(format!("{technology} has no technology profile"))
        })?;
        if profile.steepness.is_none() {
            return Err(ProjectionError::MissingAnchor(format!(
                "{technology} has no S-curve steepness"
            )));
        }
        if let Some((scenario, _)) = scenarios
            .iter()
            .find(|(_, def)| def.saturation_for(*technology).is_none())
        {
            return Err(ProjectionError::MissingAnchor(format!(
                "{technology} has no saturation limit under {scenario}"
            )));
        }
    }

    Ok(BaselineAnchors {
        year: doc.year,
        total_demand: doc.total_demand,
        fossil_exergy_factor: doc.fossil_exergy_factor,
        deployment,
    })
}


#[cfg(test)]
mod tests {
    use super::test_support::{default_store, embedded_with};
    use super::*;

    #[test]
    fn test_embedded_store_is_fully_calibrated() {
        let store = default_store();
        assert_eq!(store.diagnostics().calibration(), Calibration::Full);
        assert!(store.skipped_technologies().is_empty());
        assert_eq!(store.cost_grid().count(), 9);
        assert_eq!(store.regions()[0].name, "Global");
    }

    #[test]
    fn test_external_keys_resolve() {
        let store = default_store();
        assert!(store.learning_curve(Technology::Solar).is_some());
        assert!(store.learning_curve(Technology::Batteries).is_some());
        assert_eq!(
            store.manufacturing(Technology::Batteries).map(|m| m.unit.as_str()),
            Some("GWh/year")
        );
        assert!(store.technology(Technology::Biofuels).is_some());
    }

    #[test]
    fn test_missing_document_degrades_calibration() {
        let store = embedded_with(|docs| docs.regions = None).unwrap();
        assert_eq!(store.diagnostics().calibration(), Calibration::Degraded);
        assert_eq!(store.regions().len(), 10);
        assert!(store
            .diagnostics()
            .iter()
            .any(|d| d.kind == DiagnosticKind::ConfigurationMissing && d.message.contains("regions")));
    }

    #[test]
    fn test_unknown_technology_is_ignored_with_diagnostic() {
        let store = embedded_with(|docs| {
            if let Some(technologies) = docs.technologies.as_mut() {
                let geothermal = technologies["other_renewables"].clone();
                technologies.insert("fusion_tokamak".to_string(), geothermal);
            }
        })
        .unwrap();
        assert_eq!(store.diagnostics().calibration(), Calibration::Full);
        assert!(store
            .diagnostics()
            .iter()
            .any(|d| d.kind == DiagnosticKind::UnknownIdentifier && d.message.contains("fusion_tokamak")));
    }

    #[test]
    fn test_empty_manufacturing_trajectory_is_fatal() {
        let result = embedded_with(|docs| {
            if let Some(doc) = docs.manufacturing.as_mut() {
                for entry in doc.trajectories.values_mut() {
                    entry.historical.clear();
                    entry.projections.clear();
                }
            }
        });
        assert!(matches!(result, Err(ProjectionError::EmptyTrajectory { .. })));
    }

    #[test]
    fn test_demand_collapse_is_rejected() {
        for rate in [-1.0, -1.5] {
            let result = embedded_with(|docs| {
                if let Some(baseline) = docs.scenarios.as_mut().and_then(|s| s.get_mut("Baseline")) {
                    baseline.demand_growth_rate = rate;
                }
            });
            assert!(matches!(
                result,
                Err(ProjectionError::InvalidParameter { ref name, .. }) if name.ends_with("demand_growth_rate")
            ));
        }

        let shrinking = embedded_with(|docs| {
            if let Some(baseline) = docs.scenarios.as_mut().and_then(|s| s.get_mut("Baseline")) {
                baseline.demand_growth_rate = -0.02;
            }
        });
        assert!(shrinking.is_ok());
    }

    #[test]
    fn test_non_positive_rebound_is_rejected() {
        let result = embedded_with(|docs| {
            if let Some(optimistic) = docs.scenarios.as_mut().and_then(|s| s.get_mut("Optimistic")) {
                optimistic.rebound.insert(2040, 0.0);
            }
        });
        assert!(matches!(
            result,
            Err(ProjectionError::InvalidParameter { ref name, .. }) if name.contains("rebound")
        ));
    }

    #[test]
    fn test_missing_anchors_document_is_fatal() {
        let result = embedded_with(|docs| docs.anchors = None);
        assert!(matches!(
            result,
            Err(ProjectionError::MissingAnchor(ref m)) if m.contains(documents::BASELINE_ANCHORS)
        ));
    }

    #[test]
    fn test_anchor_year_must_match_base_year() {
        let result = embedded_with(|docs| {
            if let Some(anchors) = docs.anchors.as_mut() {
                anchors.year = 2023;
            }
        });
        assert!(matches!(result, Err(ProjectionError::MissingAnchor(_))));
    }

    #[test]
    fn test_projected_technology_needs_saturation() {
        let result = embedded_with(|docs| {
            if let Some(scenarios) = docs.scenarios.as_mut() {
                if let Some(optimistic) = scenarios.get_mut("Optimistic") {
                    optimistic.saturation.remove("hydro");
                }
            }
        });
        assert!(matches!(result, Err(ProjectionError::MissingAnchor(ref m)) if m.contains("hydro")));
    }

    #[test]
    fn test_overlapping_policy_is_fatal() {
        let result = embedded_with(|docs| {
            if let Some(policies) = docs.policies.as_mut() {
                policies.by_technology.insert(
                    "hydro".to_string(),
                    BTreeMap::from([(
                        "Baseline".to_string(),
                        BTreeMap::from([
                            ("2025-2035".to_string(), 1.1),
                            ("2030-2040".to_string(), 1.2),
                        ]),
                    )]),
                );
            }
        });
        assert!(matches!(
            result,
            Err(ProjectionError::OverlappingPolicyPeriods { .. })
        ));
    }

    #[test]
    fn test_technology_without_any_cost_is_skipped() {
        let store = embedded_with(|docs| {
            if let Some(table) = docs.base_costs.as_mut() {
                for row in table.values_mut() {
                    row.remove("oil");
                }
            }
        })
        .unwrap();
        assert_eq!(store.skipped_technologies(), &[Technology::Oil]);
        assert_eq!(store.cost_grid().count(), 8);
    }

    #[test]
    fn test_policy_multiplier_defaults_to_one() {
        let store = default_store();
        assert_eq!(
            store.policy_multiplier(Technology::Hydro, Scenario::Optimistic, 2030),
            1.0
        );
        assert_eq!(
            store.policy_multiplier(Technology::Solar, Scenario::Optimistic, 2030),
            1.25
        );
    }

    #[test]
    fn test_invalid_horizon() {
        let docs = defaults::embedded_documents().unwrap();
        let result = ConfigStore::from_documents(
            docs,
            Horizon {
                base_year: 2024,
                end_year: 2020,
            },
        );
        assert!(matches!(result, Err(ProjectionError::InvalidParameter { .. })));
    }
}
