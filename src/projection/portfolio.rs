//! Clean-portfolio cap and share accounting.

use std::collections::BTreeMap;

use crate::domain::Technology;

/// Default headroom of the clean portfolio over total demand
pub const DEFAULT_CLEAN_BUFFER: f64 = 0.05;

/// `numerator / denominator`, or 0.0 when the denominator is not positive
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Scale clean deployment down so it sums to at most `demand * (1 + buffer)`.
///
/// Every technology is scaled by the same factor, which is returned
/// (1.0 when the cap does not bind).
pub fn apply_clean_cap(
    deployment: &mut BTreeMap<Technology, f64>,
    total_demand: f64,
    buffer: f64,
) -> f64 {
    let cap = total_demand * (1.0 + buffer);
    let clean: f64 = deployment.values().sum();
    if clean <= cap || clean <= 0.0 {
        return 1.0;
    }

    let factor = cap / clean;
    for value in deployment.values_mut() {
        *value *= factor;
    }
    factor
}

/// `(clean_share, fossil_share)`; both zero when there is no demand
pub fn shares(clean_total: f64, total_demand: f64) -> (f64, f64) {
    if total_demand <= 0.0 {
        return (0.0, 0.0);
    }
    let clean_share = safe_ratio(clean_total, total_demand).min(1.0);
    (clean_share, 1.0 - clean_share)
}

/// Fossil remainder of demand not met by clean supply
pub fn fossil_remainder(total_demand: f64, clean_total: f64) -> f64 {
    (total_demand - clean_total).max(0.0)
}
