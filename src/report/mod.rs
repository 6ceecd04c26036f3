pub mod document;
pub mod rounding;

use serde::Serialize;
use std::path::Path;
use tracing::info;

pub use document::{CostDocument, ProjectionDocument};
pub use rounding::{round_to, Precision};

use crate::error::ProjectionResult;

pub const COSTS_FILE: &str = "full_system_costs.json";
pub const PROJECTIONS_FILE: &str = "energy_projections.json";

/// Pretty-print `document` to `dir/name`, creating `dir` when needed
pub async fn write_document<T: Serialize>(dir: &Path, name: &str, document: &T) -> ProjectionResult<()> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(name);
    let bytes = serde_json::to_vec_pretty(document)?;
    tokio::fs::write(&path, &bytes).await?;
    info!(path = %path.display(), bytes = bytes.len(), "document written");
    Ok(())
}
