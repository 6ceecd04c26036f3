//! Step changes layered on top of the smooth learning and efficiency curves.

pub use crate::domain::{Breakthrough, BreakthroughKind};
use crate::domain::{Technology, Year};

fn active<'a>(
    breakthroughs: &'a [Breakthrough],
    technology: Technology,
    year: Year,
    kind: BreakthroughKind,
) -> impl Iterator<Item = &'a Breakthrough> {
    breakthroughs
        .iter()
        .filter(move |b| b.kind == kind && b.is_active(technology, year))
}

/// Product of `(1 - magnitude)` over active cost breakthroughs
pub fn cost_multiplier(breakthroughs: &[Breakthrough], technology: Technology, year: Year) -> f64 {
    active(breakthroughs, technology, year, BreakthroughKind::Cost)
        .map(|b| 1.0 - b.magnitude)
        .product()
}

/// Product of `(1 + magnitude)` over active efficiency breakthroughs
pub fn efficiency_multiplier(
    breakthroughs: &[Breakthrough],
    technology: Technology,
    year: Year,
) -> f64 {
    active(breakthroughs, technology, year, BreakthroughKind::Efficiency)
        .map(|b| 1.0 + b.magnitude)
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakthroughs() -> Vec<Breakthrough> {
        vec![
            Breakthrough {
                name: "perovskite_tandem".into(),
                technology: Technology::Solar,
                kind: BreakthroughKind::Cost,
                magnitude: 0.15,
                effective_year: 2030,
            },
            Breakthrough {
                name: "tandem_cell_yield".into(),
                technology: Technology::Solar,
                kind: BreakthroughKind::Efficiency,
                magnitude: 0.05,
                effective_year: 2035,
            },
            Breakthrough {
                name: "solid_state".into(),
                technology: Technology::Batteries,
                kind: BreakthroughKind::Cost,
                magnitude: 0.20,
                effective_year: 2032,
            },
        ]
    }

    #[test]
    fn test_cost_multiplier_from_effective_year() {
        let list = breakthroughs();
        assert_eq!(cost_multiplier(&list, Technology::Solar, 2029), 1.0);
        assert!((cost_multiplier(&list, Technology::Solar, 2030) - 0.85).abs() < 1e-12);
        assert!((cost_multiplier(&list, Technology::Batteries, 2040) - 0.80).abs() < 1e-12);
    }

    #[test]
    fn test_efficiency_multiplier_ignores_cost_kind() {
        let list = breakthroughs();
        assert_eq!(efficiency_multiplier(&list, Technology::Solar, 2034), 1.0);
        assert!((efficiency_multiplier(&list, Technology::Solar, 2035) - 1.05).abs() < 1e-12);
        assert_eq!(efficiency_multiplier(&list, Technology::Batteries, 2040), 1.0);
    }

    #[test]
    fn test_no_breakthroughs_is_neutral() {
        assert_eq!(cost_multiplier(&[], Technology::Wind, 2050), 1.0);
        assert_eq!(efficiency_multiplier(&[], Technology::Wind, 2050), 1.0);
    }
}
