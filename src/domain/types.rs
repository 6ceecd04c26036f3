use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

// ============================================================================
// Calendar
// ============================================================================

/// Calendar year used as the time axis of every trajectory
pub type Year = i32;

// ============================================================================
// Technologies
// ============================================================================

/// Energy technology tracked by the engine.
///
/// This is a closed set. Documents written against older naming schemes
/// (`solar_pv`, `wind_onshore`, `lithium_ion_batteries`, …) resolve onto it
/// through [`Technology::resolve`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Technology {
    #[strum(to_string = "solar", serialize = "solar_pv")]
    Solar,
    #[strum(to_string = "wind", serialize = "wind_onshore", serialize = "wind_total")]
    Wind,
    Nuclear,
    Hydro,
    Coal,
    Gas,
    Oil,
    #[strum(to_string = "biofuels", serialize = "biomass")]
    Biofuels,
    OtherRenewables,
    #[strum(
        to_string = "batteries",
        serialize = "battery",
        serialize = "lithium_ion_batteries",
        serialize = "batteries_storage"
    )]
    Batteries,
}

/// How a technology's output profile interacts with the wider system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TechnologyRole {
    /// Weather-dependent output (solar, wind)
    VariableRenewable,
    /// Inflexible, always-on output that stabilises a high-VRE grid
    Baseload,
    /// Renewable with controllable output (hydro, biofuels)
    FirmRenewable,
    /// Fossil plant that provides backup capacity
    DispatchableFossil,
    /// Everything else
    Other,
}

impl Technology {
    /// Electricity sources priced in the full-system cost grid
    pub const COST_GRID: [Technology; 9] = [
        Technology::Coal,
        Technology::Oil,
        Technology::Gas,
        Technology::Nuclear,
        Technology::Hydro,
        Technology::Wind,
        Technology::Solar,
        Technology::Biofuels,
        Technology::OtherRenewables,
    ];

    pub fn role(self) -> TechnologyRole {
        match self {
            Technology::Solar | Technology::Wind | Technology::OtherRenewables => {
                TechnologyRole::VariableRenewable
            }
            Technology::Nuclear => TechnologyRole::Baseload,
            Technology::Hydro | Technology::Biofuels => TechnologyRole::FirmRenewable,
            Technology::Gas => TechnologyRole::DispatchableFossil,
            Technology::Coal | Technology::Oil | Technology::Batteries => TechnologyRole::Other,
        }
    }

    pub fn is_fossil(self) -> bool {
        matches!(self, Technology::Coal | Technology::Gas | Technology::Oil)
    }

    /// Resolve an external document key onto a technology.
    ///
    /// Tries the full key first, then drops trailing `_segment`s one at a time,
    /// so `solar_pv_gw_year` resolves through `solar_pv`.
    pub fn resolve(key: &str) -> Option<Technology> {
        let mut candidate = key.trim();
        loop {
            if let Ok(technology) = Technology::from_str(candidate) {
                return Some(technology);
            }
            match candidate.rfind('_') {
                Some(idx) if idx > 0 => candidate = &candidate[..idx],
                _ => return None,
            }
        }
    }

    pub fn all() -> impl Iterator<Item = Technology> {
        Technology::iter()
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// Policy/technology scenario
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    Display,
    EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum Scenario {
    /// Proven technologies only, no speculative breakthroughs
    Conservative,
    /// Expected progress with high-probability breakthroughs
    Baseline,
    /// Key breakthroughs realised on schedule with enhanced policy support
    Optimistic,
}

impl Scenario {
    pub fn all() -> impl Iterator<Item = Scenario> {
        Scenario::iter()
    }
}

/// One value per scenario, with exhaustive lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable<T> {
    pub conservative: T,
    pub baseline: T,
    pub optimistic: T,
}

impl<T> ScenarioTable<T> {
    pub fn from_fn(mut f: impl FnMut(Scenario) -> T) -> Self {
        Self {
            conservative: f(Scenario::Conservative),
            baseline: f(Scenario::Baseline),
            optimistic: f(Scenario::Optimistic),
        }
    }

    pub fn try_from_fn<E>(mut f: impl FnMut(Scenario) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            conservative: f(Scenario::Conservative)?,
            baseline: f(Scenario::Baseline)?,
            optimistic: f(Scenario::Optimistic)?,
        })
    }

    pub fn get(&self, scenario: Scenario) -> &T {
        match scenario {
            Scenario::Conservative => &self.conservative,
            Scenario::Baseline => &self.baseline,
            Scenario::Optimistic => &self.optimistic,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Scenario, &T)> {
        Scenario::all().map(move |s| (s, self.get(s)))
    }
}
