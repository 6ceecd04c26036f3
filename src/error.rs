use thiserror::Error;

/// Errors raised while building the configuration store or running a projection.
///
/// Anything that reaches the caller as an `Err` is fatal for the run. Recoverable
/// conditions (missing documents, unknown identifiers) are recorded as
/// diagnostics on the store instead, see [`crate::store::Diagnostics`].
#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("Configuration document missing: {0}")]
    ConfigurationMissing(String),

    #[error("Trajectory '{name}' has no anchor points")]
    EmptyTrajectory { name: String },

    #[error("Invalid configuration document '{document}': {message}")]
    InvalidDocument { document: String, message: String },

    #[error("Invalid parameter {name}: {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Baseline anchor unavailable: {0}")]
    MissingAnchor(String),

    #[error("Policy periods overlap for {technology}/{scenario}: {first} and {second}")]
    OverlappingPolicyPeriods {
        technology: String,
        scenario: String,
        first: String,
        second: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectionError {
    pub fn invalid_parameter(name: impl Into<String>, message: impl Into<String>) -> Self {
        ProjectionError::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_document(document: impl Into<String>, message: impl Into<String>) -> Self {
        ProjectionError::InvalidDocument {
            document: document.into(),
            message: message.into(),
        }
    }
}

impl From<validator::ValidationErrors> for ProjectionError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ProjectionError::InvalidParameter {
            name: "document".to_string(),
            message: errors.to_string(),
        }
    }
}

pub type ProjectionResult<T> = Result<T, ProjectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ProjectionError::EmptyTrajectory {
            name: "manufacturing/solar".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Trajectory 'manufacturing/solar' has no anchor points"
        );
    }

    #[test]
    fn test_invalid_parameter_helper() {
        let error = ProjectionError::invalid_parameter("learning_rate", "must be in (0, 1)");
        assert_eq!(
            error.to_string(),
            "Invalid parameter learning_rate: must be in (0, 1)"
        );
    }
}
