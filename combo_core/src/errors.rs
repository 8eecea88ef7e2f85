//! # Error Types
//!
//! Structured error types for combo_core. Every configuration problem is
//! fatal and carries the name of the offending action or factor set, so a
//! checking run can report exactly what to fix before any combination is
//! generated.
//!
//! ## Example
//!
//! ```rust
//! use combo_core::errors::{ComboError, ComboResult};
//!
//! fn require_positive(gamma: f64) -> ComboResult<()> {
//!     if gamma < 0.0 {
//!         return Err(ComboError::configuration(
//!             "partial safety factors must be non-negative",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combination::SituationType;
use crate::factors::FactorKind;

/// Result type alias for combo_core operations
pub type ComboResult<T> = Result<T, ComboError>;

/// Structured error type for the combination engine.
///
/// All variants are raised at registration time or at generation start;
/// constraint violations during generation (incompatible pairs, unmet
/// dependencies) silently prune terms instead and never surface here.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum ComboError {
    /// A factor set name is already registered for the same kind
    #[error("Duplicate {kind} factor set: '{name}' is already registered")]
    DuplicateFactorSet { kind: FactorKind, name: String },

    /// A referenced factor set is unknown to the catalog
    #[error("Missing {kind} factor set: '{name}' is not registered")]
    MissingFactorSet { kind: FactorKind, name: String },

    /// An action name is already registered
    #[error("Duplicate action: '{name}' is already registered")]
    DuplicateAction { name: String },

    /// Registration attempted after the registry was sealed
    #[error("Registry is sealed: cannot register action '{name}'")]
    RegistrySealed { name: String },

    /// Invalid registry configuration (dangling dependency, bad pattern, ...)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Generation requested against a registry with no permanent action
    #[error("No permanent action registered: cannot generate {situation} combinations")]
    EmptyRegistry { situation: SituationType },

    /// Every combination of a requested category failed to solve
    #[error("No governing case for {situation}: all {total} combinations failed to solve")]
    CategoryFailed { situation: SituationType, total: usize },
}

impl ComboError {
    /// Create a DuplicateFactorSet error
    pub fn duplicate_factor_set(kind: FactorKind, name: impl Into<String>) -> Self {
        ComboError::DuplicateFactorSet {
            kind,
            name: name.into(),
        }
    }

    /// Create a MissingFactorSet error
    pub fn missing_factor_set(kind: FactorKind, name: impl Into<String>) -> Self {
        ComboError::MissingFactorSet {
            kind,
            name: name.into(),
        }
    }

    /// Create a DuplicateAction error
    pub fn duplicate_action(name: impl Into<String>) -> Self {
        ComboError::DuplicateAction { name: name.into() }
    }

    /// Create a RegistrySealed error
    pub fn registry_sealed(name: impl Into<String>) -> Self {
        ComboError::RegistrySealed { name: name.into() }
    }

    /// Create a Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        ComboError::Configuration {
            message: message.into(),
        }
    }

    /// Whether this is a configuration error (bad setup data)
    ///
    /// `CategoryFailed` is the one variant raised after a clean setup, when
    /// every solve of a category came back failed.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, ComboError::CategoryFailed { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ComboError::DuplicateFactorSet { .. } => "DUPLICATE_FACTOR_SET",
            ComboError::MissingFactorSet { .. } => "MISSING_FACTOR_SET",
            ComboError::DuplicateAction { .. } => "DUPLICATE_ACTION",
            ComboError::RegistrySealed { .. } => "REGISTRY_SEALED",
            ComboError::Configuration { .. } => "CONFIGURATION",
            ComboError::EmptyRegistry { .. } => "EMPTY_REGISTRY",
            ComboError::CategoryFailed { .. } => "CATEGORY_FAILED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = ComboError::missing_factor_set(FactorKind::Combination, "psi_live");
        let json = serde_json::to_string(&error).unwrap();
        let roundtrip: ComboError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            ComboError::duplicate_action("live").error_code(),
            "DUPLICATE_ACTION"
        );
        assert_eq!(
            ComboError::registry_sealed("wind").error_code(),
            "REGISTRY_SEALED"
        );
    }

    #[test]
    fn test_error_messages_name_the_offender() {
        let error = ComboError::duplicate_factor_set(FactorKind::PartialSafety, "uls_g");
        assert!(error.to_string().contains("uls_g"));

        let error = ComboError::registry_sealed("snow");
        assert!(error.to_string().contains("snow"));
    }
}
