//! Reference documents compiled into the binary.
//!
//! Used in place of any document missing from the documents directory; the
//! run is then reported as degraded.

use serde::de::DeserializeOwned;

use super::documents::{self, Documents};
use crate::error::{ProjectionError, ProjectionResult};

const LEARNING_CURVES: &str = include_str!("../../config/documents/learning_curves.json");
const MANUFACTURING_CAPACITY: &str =
    include_str!("../../config/documents/manufacturing_capacity.json");
const POLICY_SCENARIOS: &str = include_str!("../../config/documents/policy_scenarios.json");
const REGIONS: &str = include_str!("../../config/documents/regions.json");
const SERVICE_UNITS: &str = include_str!("../../config/documents/service_units.json");
const CARBON_PRICES: &str = include_str!("../../config/documents/carbon_prices.json");
const SCENARIOS: &str = include_str!("../../config/documents/scenarios.json");
const TECHNOLOGIES: &str = include_str!("../../config/documents/technologies.json");
const BASE_COSTS: &str = include_str!("../../config/documents/base_costs.json");
const BASELINE_ANCHORS: &str = include_str!("../../config/documents/baseline_anchors.json");

fn parse<T: DeserializeOwned>(name: &str, raw: &str) -> ProjectionResult<T> {
    serde_json::from_str(raw).map_err(|e| {
        ProjectionError::invalid_document(format!("embedded {name}"), e.to_string())
    })
}

/// Embedded copy of the document named `name` (one of the `documents::*` file names)
pub fn embedded_source(name: &str) -> Option<&'static str> {
    let raw = match name {
        documents::LEARNING_CURVES => LEARNING_CURVES,
        documents::MANUFACTURING_CAPACITY => MANUFACTURING_CAPACITY,
        documents::POLICY_SCENARIOS => POLICY_SCENARIOS,
        documents::REGIONS => REGIONS,
        documents::SERVICE_UNITS => SERVICE_UNITS,
        documents::CARBON_PRICES => CARBON_PRICES,
        documents::SCENARIOS => SCENARIOS,
        documents::TECHNOLOGIES => TECHNOLOGIES,
        documents::BASE_COSTS => BASE_COSTS,
        documents::BASELINE_ANCHORS => BASELINE_ANCHORS,
        _ => return None,
    };
    Some(raw)
}

/// Parse one embedded document
pub fn embedded<T: DeserializeOwned>(name: &str) -> ProjectionResult<T> {
    let raw = embedded_source(name)
        .ok_or_else(|| ProjectionError::ConfigurationMissing(name.to_string()))?;
    parse(name, raw)
}

/// Every document from the embedded reference set
pub fn embedded_documents() -> ProjectionResult<Documents> {
    Ok(Documents {
        learning_curves: Some(embedded(documents::LEARNING_CURVES)?),
        manufacturing: Some(embedded(documents::MANUFACTURING_CAPACITY)?),
        policies: Some(embedded(documents::POLICY_SCENARIOS)?),
        regions: Some(embedded(documents::REGIONS)?),
        service_units: Some(embedded(documents::SERVICE_UNITS)?),
        carbon_prices: Some(embedded(documents::CARBON_PRICES)?),
        scenarios: Some(embedded(documents::SCENARIOS)?),
        technologies: Some(embedded(documents::TECHNOLOGIES)?),
        base_costs: Some(embedded(documents::BASE_COSTS)?),
        anchors: Some(embedded(documents::BASELINE_ANCHORS)?),
    })
}
