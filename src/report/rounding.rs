use serde::{Deserialize, Serialize};

/// Decimal places used when a value is written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// $/MWh and per-service-unit costs
    pub currency: u32,
    /// Shares, fractions and per-unit energy
    pub share: u32,
    /// VRE penetration and rebound multipliers
    pub ratio: u32,
    /// Energy quantities (EJ)
    pub energy: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            currency: 2,
            share: 4,
            ratio: 3,
            energy: 3,
        }
    }
}

pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}

impl Precision {
    pub fn currency(&self, value: f64) -> f64 {
        round_to(value, self.currency)
    }

    pub fn share(&self, value: f64) -> f64 {
        round_to(value, self.share)
    }

    pub fn ratio(&self, value: f64) -> f64 {
        round_to(value, self.ratio)
    }

    pub fn energy(&self, value: f64) -> f64 {
        round_to(value, self.energy)
    }
}
