//! Async reading of the documents directory.

use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

use super::documents::{self, Documents};
use crate::error::{ProjectionError, ProjectionResult};

/// Read and parse one document; `Ok(None)` when the file does not exist
pub async fn read_document<T: DeserializeOwned>(
    dir: &Path,
    name: &str,
) -> ProjectionResult<Option<T>> {
    let path = dir.join(name);
    let raw = match tokio::fs::read_to_string(&path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(document = name, path = %path.display(), "document not found");
            return Ok(None);
        }
        Err(e) => return Err(ProjectionError::Io(e)),
    };

    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| ProjectionError::invalid_document(name, e.to_string()))
}

/// Load every configuration document from `dir` concurrently
pub async fn load_documents(dir: &Path) -> ProjectionResult<Documents> {
    let (
        learning_curves,
        manufacturing,
        policies,
        regions,
        service_units,
        carbon_prices,
        scenarios,
        technologies,
        base_costs,
        anchors,
    ) = futures::try_join!(
        read_document(dir, documents::LEARNING_CURVES),
        read_document(dir, documents::MANUFACTURING_CAPACITY),
        read_document(dir, documents::POLICY_SCENARIOS),
        read_document(dir, documents::REGIONS),
        read_document(dir, documents::SERVICE_UNITS),
        read_document(dir, documents::CARBON_PRICES),
        read_document(dir, documents::SCENARIOS),
        read_document(dir, documents::TECHNOLOGIES),
        read_document(dir, documents::BASE_COSTS),
        read_document(dir, documents::BASELINE_ANCHORS),
    )?;

    let docs = Documents {
        learning_curves,
        manufacturing,
        policies,
        regions,
        service_units,
        carbon_prices,
        scenarios,
        technologies,
        base_costs,
        anchors,
    };
    info!(dir = %dir.display(), "configuration documents loaded");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "projection-loader-{name}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_missing_directory_yields_empty_documents() {
        let dir = scratch_dir("empty");
        let docs = load_documents(&dir).await.unwrap();
        assert!(docs.learning_curves.is_none());
        assert!(docs.anchors.is_none());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_shipped_documents_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/documents");
        let docs = load_documents(&dir).await.unwrap();
        assert!(docs.learning_curves.is_some());
        assert!(docs.manufacturing.is_some());
        assert_eq!(docs.regions.map(|r| r["Japan"]), Some(1.40));
    }

    #[tokio::test]
    async fn test_malformed_document_is_fatal() {
        let dir = scratch_dir("malformed");
        std::fs::write(dir.join(documents::REGIONS), "{ \"Global\": ").unwrap();
        let result = load_documents(&dir).await;
        assert!(matches!(
            result,
            Err(ProjectionError::InvalidDocument { ref document, .. }) if document == "regions.json"
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
