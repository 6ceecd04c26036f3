//! Saturation-limited logistic adoption.
//!
//! The theoretical curve is calibrated so it passes through the observed
//! base-year value. The realized path then grows by the curve's yearly
//! increments, each scaled by policy support and clipped to what factories
//! can supply. A clipped year is never made up later.

use std::collections::BTreeMap;

use super::capacity::DeploymentCap;
use crate::domain::Year;

/// Midpoint offset used when the anchor sits at either end of the curve
const SATURATED_MIDPOINT_OFFSET: f64 = 20.0;
const SATURATION_THRESHOLD: f64 = 0.99;

/// `saturation / (1 + e^(-steepness * (t - midpoint)))`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticCurve {
    pub saturation: f64,
    pub steepness: f64,
    pub midpoint: f64,
}

impl LogisticCurve {
    /// Curve that passes through `value` at `year`
    pub fn calibrated(saturation: f64, steepness: f64, year: Year, value: f64) -> Self {
        Self {
            saturation,
            steepness,
            midpoint: calibrate_midpoint(saturation, steepness, year, value),
        }
    }

    pub fn deployment(&self, year: Year) -> f64 {
        let t = f64::from(year);
        self.saturation / (1.0 + (-self.steepness * (t - self.midpoint)).exp())
    }

    /// Growth from `year - 1` to `year`
    pub fn increment(&self, year: Year) -> f64 {
        self.deployment(year) - self.deployment(year - 1)
    }
}

/// Solve the logistic for its midpoint given one observed point.
///
/// Anchors at or above 99% of saturation put the midpoint 20 years in the
/// past; non-positive anchors put it 20 years in the future.
pub fn calibrate_midpoint(saturation: f64, steepness: f64, year: Year, value: f64) -> f64 {
    let y = f64::from(year);
    if value >= SATURATION_THRESHOLD * saturation {
        return y - SATURATED_MIDPOINT_OFFSET;
    }
    if value <= 0.0 {
        return y + SATURATED_MIDPOINT_OFFSET;
    }
    y + ((saturation - value) / value).ln() / steepness
}

/// Realized adoption path for one technology in one scenario
#[derive(Debug, Clone, Copy)]
pub struct AdoptionSCurveModel {
    pub curve: LogisticCurve,
    pub base_year: Year,
    /// Observed deployment at `base_year`
    pub anchor: f64,
}

impl AdoptionSCurveModel {
    pub fn new(saturation: f64, steepness: f64, base_year: Year, anchor: f64) -> Self {
        Self {
            curve: LogisticCurve::calibrated(saturation, steepness, base_year, anchor),
            base_year,
            anchor,
        }
    }

    /// Walk the years `base_year..=end_year`.
    ///
    /// `policy` scales the curve increment; `cap` bounds each year's addition
    /// and must already be expressed in the same units as the anchor.
    pub fn realize(
        &self,
        end_year: Year,
        policy: impl Fn(Year) -> f64,
        cap: impl Fn(Year) -> DeploymentCap,
    ) -> BTreeMap<Year, f64> {
        let mut realized = self.anchor;
        let mut path = BTreeMap::from([(self.base_year, realized)]);

        for year in (self.base_year + 1)..=end_year {
            let desired = self.curve.increment(year) * policy(year);
            realized += cap(year).clamp(desired);
            path.insert(year, realized);
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(200.0, 0.35, 5.2)]
    #[case(150.0, 0.25, 6.8)]
    #[case(25.0, 0.15, 7.2)]
    #[case(25.0, 0.10, 11.5)]
    fn test_calibrated_curve_passes_through_anchor(
        #[case] saturation: f64,
        #[case] steepness: f64,
        #[case] anchor: f64,
    ) {
        let curve = LogisticCurve::calibrated(saturation, steepness, 2024, anchor);
        assert!((curve.deployment(2024) - anchor).abs() < 1e-9);
    }

    #[test]
    fn test_midpoint_for_saturated_anchor() {
        assert_eq!(calibrate_midpoint(20.0, 0.1, 2024, 19.9), 2004.0);
        assert_eq!(calibrate_midpoint(20.0, 0.1, 2024, 25.0), 2004.0);
    }

    #[test]
    fn test_midpoint_for_zero_anchor() {
        assert_eq!(calibrate_midpoint(20.0, 0.1, 2024, 0.0), 2044.0);
        assert_eq!(calibrate_midpoint(20.0, 0.1, 2024, -1.0), 2044.0);
    }

    #[test]
    fn test_curve_strictly_increasing() {
        let curve = LogisticCurve::calibrated(200.0, 0.35, 2024, 5.2);
        for year in 2000..2100 {
            assert!(curve.deployment(year + 1) > curve.deployment(year));
        }
    }

    #[test]
    fn test_unconstrained_path_follows_curve() {
        let model = AdoptionSCurveModel::new(25.0, 0.15, 2024, 7.2);
        let path = model.realize(2050, |_| 1.0, |_| DeploymentCap::Unconstrained);
        assert_eq!(path.len(), 27);
        assert_eq!(path[&2024], 7.2);
        assert!((path[&2050] - model.curve.deployment(2050)).abs() < 1e-9);
    }

    #[test]
    fn test_cap_limits_each_year() {
        let model = AdoptionSCurveModel::new(200.0, 0.35, 2024, 5.2);
        let path = model.realize(2030, |_| 1.0, |_| DeploymentCap::Limited(1.0));
        assert!((path[&2030] - 11.2).abs() < 1e-9);
    }

    #[test]
    fn test_shortfall_is_not_recovered() {
        let model = AdoptionSCurveModel::new(200.0, 0.35, 2024, 5.2);
        let capped_early = model.realize(
            2040,
            |_| 1.0,
            |year| {
                if year <= 2027 {
                    DeploymentCap::Limited(0.0)
                } else {
                    DeploymentCap::Unconstrained
                }
            },
        );
        let free = model.realize(2040, |_| 1.0, |_| DeploymentCap::Unconstrained);
        let lost: f64 = (2025..=2027).map(|y| model.curve.increment(y)).sum();
        assert!((free[&2040] - capped_early[&2040] - lost).abs() < 1e-9);
    }

    #[test]
    fn test_policy_scales_increment() {
        let model = AdoptionSCurveModel::new(25.0, 0.15, 2024, 7.2);
        let boosted = model.realize(2025, |_| 1.5, |_| DeploymentCap::Unconstrained);
        let expected = 7.2 + model.curve.increment(2025) * 1.5;
        assert!((boosted[&2025] - expected).abs() < 1e-12);
    }
}
