//! Wright's Law experience curves.
//!
//! Unit cost falls by a fixed fraction (the learning rate) every time
//! cumulative production doubles:
//!
//! ```text
//! cost(x) = base_cost * (x / base_cumulative) ^ log2(1 - learning_rate)
//! ```
//!
//! bounded below by a floor cost that reflects materials and balance of system.

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, ProjectionResult};

/// Progress exponent `b = log2(1 - learning_rate)`; negative for any rate in (0, 1)
pub fn wright_exponent(learning_rate: f64) -> f64 {
    (1.0 - learning_rate).log2()
}

/// Unit cost at `current_cumulative`.
///
/// Returns `base_cost` unchanged until cumulative production moves past
/// `base_cumulative`; after that the curve is clamped at `floor_cost`.
pub fn wright_cost(
    base_cost: f64,
    learning_rate: f64,
    base_cumulative: f64,
    current_cumulative: f64,
    floor_cost: f64,
) -> f64 {
    if current_cumulative <= base_cumulative {
        return base_cost;
    }
    let b = wright_exponent(learning_rate);
    let cost = base_cost * (current_cumulative / base_cumulative).powf(b);
    cost.max(floor_cost)
}

/// Experience-curve parameters for one technology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningCurveParams {
    /// Unit cost at `base_cumulative`
    pub base_cost: f64,
    /// Fractional cost reduction per doubling, in (0, 1)
    pub learning_rate: f64,
    /// Cumulative production at the reference point
    pub base_cumulative: f64,
    pub floor_cost: f64,
    /// Denominator of the cost unit (`mwh`, `kwh`, ...)
    pub cost_unit: String,
    /// Unit cumulative production is counted in (`gw`, `gwh`, ...)
    pub cumulative_unit: String,
}

impl LearningCurveParams {
    pub fn validate(&self, technology: &str) -> ProjectionResult<()> {
        let name = format!("learning_curves/{technology}");
        if !(self.learning_rate > 0.0 && self.learning_rate < 1.0) {
            return Err(ProjectionError::invalid_parameter(
                format!("{name}/learning_rate"),
                format!("{} is outside (0, 1)", self.learning_rate),
            ));
        }
        if self.base_cumulative <= 0.0 {
            return Err(ProjectionError::invalid_parameter(
                format!("{name}/base_cumulative"),
                format!("{} must be positive", self.base_cumulative),
            ));
        }
        if self.floor_cost < 0.0 || self.floor_cost > self.base_cost {
            return Err(ProjectionError::invalid_parameter(
                format!("{name}/floor_cost"),
                format!(
                    "{} must be within [0, base_cost = {}]",
                    self.floor_cost, self.base_cost
                ),
            ));
        }
        Ok(())
    }

    pub fn cost_at(&self, cumulative: f64) -> f64 {
        wright_cost(
            self.base_cost,
            self.learning_rate,
            self.base_cumulative,
            cumulative,
            self.floor_cost,
        )
    }

    /// Scenario-adjusted copy: learning rate and floor cost are scaled
    pub fn adjusted(&self, learning_rate_multiplier: f64, floor_cost_buffer: f64) -> Self {
        Self {
            learning_rate: self.learning_rate * learning_rate_multiplier,
            floor_cost: self.floor_cost * floor_cost_buffer,
            ..self.clone()
        }
    }

    /// Label such as `$/MWh`
    pub fn cost_label(&self) -> String {
        let unit = match self.cost_unit.as_str() {
            "mwh" => "MWh".to_string(),
            "kwh" => "kWh".to_string(),
            other => other.to_string(),
        };
        format!("$/{unit}")
    }
}
