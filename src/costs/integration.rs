//! System-integration cost tiers by technology role and VRE penetration.

use serde::{Deserialize, Serialize};

use crate::domain::{IntegrationCosts, TechnologyRole};

/// Share of electricity supplied by variable renewables, bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenetrationTier {
    /// Below 30%
    Low,
    /// 30% to below 60%
    Moderate,
    /// 60% to below 80%
    High,
    /// 80% and above
    VeryHigh,
}

impl PenetrationTier {
    pub fn from_penetration(vre_penetration: f64) -> Self {
        if vre_penetration < 0.30 {
            PenetrationTier::Low
        } else if vre_penetration < 0.60 {
            PenetrationTier::Moderate
        } else if vre_penetration < 0.80 {
            PenetrationTier::High
        } else {
            PenetrationTier::VeryHigh
        }
    }
}

/// Integration surcharges ($/MWh) for a technology role at a penetration level.
///
/// Baseload earns grid and capacity credits once penetration is high, and
/// dispatchable fossil plant is paid increasingly for backup capacity.
pub fn integration_costs(role: TechnologyRole, vre_penetration: f64) -> IntegrationCosts {
    use PenetrationTier::*;

    let tier = PenetrationTier::from_penetration(vre_penetration);
    match role {
        TechnologyRole::VariableRenewable => match tier {
            Low => IntegrationCosts::new(10.0, 15.0, 20.0, 15.0),
            Moderate => IntegrationCosts::new(30.0, 25.0, 25.0, 15.0),
            High => IntegrationCosts::new(50.0, 35.0, 25.0, 10.0),
            VeryHigh => IntegrationCosts::new(65.0, 45.0, 25.0, 10.0),
        },
        TechnologyRole::Baseload => match tier {
            Low => IntegrationCosts::new(0.0, 0.0, 15.0, 5.0),
            Moderate => IntegrationCosts::new(0.0, 0.0, 10.0, 0.0),
            High => IntegrationCosts::new(0.0, 0.0, -10.0, -20.0),
            VeryHigh => IntegrationCosts::new(0.0, 0.0, -15.0, -25.0),
        },
        TechnologyRole::FirmRenewable => IntegrationCosts::new(0.0, 0.0, 25.0, 10.0),
        TechnologyRole::DispatchableFossil => match tier {
            Low => IntegrationCosts::new(0.0, 0.0, 20.0, 15.0),
            Moderate => IntegrationCosts::new(0.0, 0.0, 35.0, 45.0),
            High => IntegrationCosts::new(0.0, 0.0, 50.0, 100.0),
            VeryHigh => IntegrationCosts::new(0.0, 0.0, 60.0, 160.0),
        },
        TechnologyRole::Other => IntegrationCosts::new(0.0, 0.0, 20.0, 15.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, PenetrationTier::Low)]
    #[case(0.2999, PenetrationTier::Low)]
    #[case(0.30, PenetrationTier::Moderate)]
    #[case(0.42, PenetrationTier::Moderate)]
    #[case(0.60, PenetrationTier::High)]
    #[case(0.7999, PenetrationTier::High)]
    #[case(0.80, PenetrationTier::VeryHigh)]
    #[case(1.0, PenetrationTier::VeryHigh)]
    fn test_tier_boundaries(#[case] penetration: f64, #[case] expected: PenetrationTier) {
        assert_eq!(PenetrationTier::from_penetration(penetration), expected);
    }

    #[rstest]
    #[case(TechnologyRole::VariableRenewable, 0.15, 60.0)]
    #[case(TechnologyRole::VariableRenewable, 0.42, 95.0)]
    #[case(TechnologyRole::VariableRenewable, 0.65, 120.0)]
    #[case(TechnologyRole::VariableRenewable, 0.92, 145.0)]
    #[case(TechnologyRole::Baseload, 0.15, 20.0)]
    #[case(TechnologyRole::Baseload, 0.42, 10.0)]
    #[case(TechnologyRole::Baseload, 0.65, -30.0)]
    #[case(TechnologyRole::Baseload, 0.80, -40.0)]
    #[case(TechnologyRole::FirmRenewable, 0.92, 35.0)]
    #[case(TechnologyRole::DispatchableFossil, 0.15, 35.0)]
    #[case(TechnologyRole::DispatchableFossil, 0.55, 80.0)]
    #[case(TechnologyRole::DispatchableFossil, 0.65, 150.0)]
    #[case(TechnologyRole::DispatchableFossil, 0.85, 220.0)]
    #[case(TechnologyRole::Other, 0.85, 35.0)]
    fn test_integration_totals(
        #[case] role: TechnologyRole,
        #[case] penetration: f64,
        #[case] total: f64,
    ) {
        assert_eq!(integration_costs(role, penetration).total(), total);
    }

    #[test]
    fn test_baseload_credits_are_negative_components() {
        let costs = integration_costs(TechnologyRole::Baseload, 0.9);
        assert_eq!(costs.grid, -15.0);
        assert_eq!(costs.capacity, -25.0);
        assert_eq!(costs.firming, 0.0);
    }
}
