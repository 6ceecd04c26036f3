use serde::{Deserialize, Serialize};

use crate::domain::Year;

/// Primary-to-useful conversion efficiency of a technology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyProfile {
    /// Efficiency at the base year
    pub base: f64,
    /// Physical ceiling the linear improvement cannot pass
    pub ceiling: f64,
}

impl EfficiencyProfile {
    /// Efficiency at `year`, improving by `annual_gain` per year and scaled by
    /// any active breakthrough `factor`.
    pub fn at(&self, base_year: Year, year: Year, annual_gain: f64, factor: f64) -> f64 {
        let elapsed = f64::from((year - base_year).max(0));
        (self.base + annual_gain * elapsed).min(self.ceiling) * factor
    }

    /// Ratio of efficiency at `year` to efficiency at the base year.
    ///
    /// `factor_at` gives the breakthrough factor active in a given year.
    pub fn normalization(
        &self,
        base_year: Year,
        year: Year,
        annual_gain: f64,
        factor_at: impl Fn(Year) -> f64,
    ) -> f64 {
        let reference = self.at(base_year, base_year, annual_gain, factor_at(base_year));
        if reference <= 0.0 {
            return 1.0;
        }
        self.at(base_year, year, annual_gain, factor_at(year)) / reference
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLAR: EfficiencyProfile = EfficiencyProfile {
        base: 0.70,
        ceiling: 0.95,
    };

    #[test]
    fn test_linear_improvement() {
        assert!((SOLAR.at(2024, 2034, 0.006, 1.0) - 0.76).abs() < 1e-12);
    }

    #[test]
    fn test_ceiling() {
        assert_eq!(SOLAR.at(2024, 2200, 0.006, 1.0), 0.95);
    }

    #[test]
    fn test_normalization_is_one_at_base_year() {
        assert_eq!(SOLAR.normalization(2024, 2024, 0.006, |_| 1.0), 1.0);
    }

    #[test]
    fn test_breakthrough_raises_normalization() {
        let factor = |year: Year| if year >= 2035 { 1.05 } else { 1.0 };
        let before = SOLAR.normalization(2024, 2034, 0.006, factor);
        let after = SOLAR.normalization(2024, 2035, 0.006, factor);
        assert!((after - 0.766 * 1.05 / 0.70).abs() < 1e-12);
        assert!(after > before * 1.04);
    }

    #[test]
    fn test_zero_base_efficiency_is_neutral() {
        let degenerate = EfficiencyProfile {
            base: 0.0,
            ceiling: 0.5,
        };
        assert_eq!(degenerate.normalization(2024, 2030, 0.0, |_| 1.0), 1.0);
    }
}
