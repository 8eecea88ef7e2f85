//! Factor sets and the factor catalog
//!
//! Design codes publish their numeric factors as named tables: partial
//! safety factors (γ) keyed by execution-control level, and combination
//! factors (ψ0/ψ1/ψ2) keyed by variable-action category. This module holds
//! those records and the [`FactorCatalog`] the rest of the engine looks
//! them up from by name.
//!
//! The catalog is an explicit instance built once per design-code profile
//! and passed by reference into the generator; there is no global factor
//! state anywhere in the crate.
//!
//! # Example
//!
//! ```
//! use combo_core::factors::{CombinationFactors, FactorCatalog, PartialSafetyFactors};
//!
//! let mut catalog = FactorCatalog::new();
//! catalog.register_partial_safety(
//!     PartialSafetyFactors::new("permanent").with_uls(1.0, 1.35),
//! ).unwrap();
//! catalog.register_combination(
//!     CombinationFactors::new("live", 0.7, 0.5, 0.3),
//! ).unwrap();
//!
//! assert_eq!(catalog.partial_safety("permanent").unwrap().uls_unfavorable, 1.35);
//! assert_eq!(catalog.combination("live").unwrap().psi_0, 0.7);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ComboError, ComboResult};

/// The two kinds of factor records a catalog holds
///
/// Used in error messages and in [`FactorCatalog::contains`]; the typed
/// `register_*`/lookup methods make the kind explicit at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactorKind {
    /// Partial safety factors (γ), per situation and sense
    PartialSafety,
    /// Combination factors (ψ0, ψ1, ψ2)
    Combination,
}

impl std::fmt::Display for FactorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactorKind::PartialSafety => write!(f, "partial safety"),
            FactorKind::Combination => write!(f, "combination"),
        }
    }
}

/// Named partial safety factor set (γ)
///
/// Holds the favorable/unfavorable coefficients for the ULS
/// persistent-transient situation, the ULS accidental situation, and for
/// SLS verifications. Immutable once registered in a catalog.
///
/// # Example
/// ```
/// use combo_core::factors::PartialSafetyFactors;
///
/// let gamma = PartialSafetyFactors::new("permanent")
///     .with_uls(1.0, 1.35)
///     .with_accidental(1.0, 1.0)
///     .with_sls(1.0, 1.0);
///
/// assert_eq!(gamma.uls_unfavorable, 1.35);
/// assert_eq!(gamma.accidental_unfavorable, 1.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartialSafetyFactors {
    /// Set identifier, referenced by actions at registration
    pub name: String,

    /// ULS persistent-transient, favorable sense
    pub uls_favorable: f64,
    /// ULS persistent-transient, unfavorable sense
    pub uls_unfavorable: f64,

    /// ULS accidental/seismic situation, favorable sense
    pub accidental_favorable: f64,
    /// ULS accidental/seismic situation, unfavorable sense
    pub accidental_unfavorable: f64,

    /// SLS, favorable sense
    pub sls_favorable: f64,
    /// SLS, unfavorable sense
    pub sls_unfavorable: f64,
}

impl PartialSafetyFactors {
    /// Create a new set with all coefficients at 1.0
    pub fn new(name: impl Into<String>) -> Self {
        PartialSafetyFactors {
            name: name.into(),
            uls_favorable: 1.0,
            uls_unfavorable: 1.0,
            accidental_favorable: 1.0,
            accidental_unfavorable: 1.0,
            sls_favorable: 1.0,
            sls_unfavorable: 1.0,
        }
    }

    /// Set the ULS persistent-transient coefficients (builder pattern)
    pub fn with_uls(mut self, favorable: f64, unfavorable: f64) -> Self {
        self.uls_favorable = favorable;
        self.uls_unfavorable = unfavorable;
        self
    }

    /// Set the ULS accidental-situation coefficients (builder pattern)
    pub fn with_accidental(mut self, favorable: f64, unfavorable: f64) -> Self {
        self.accidental_favorable = favorable;
        self.accidental_unfavorable = unfavorable;
        self
    }

    /// Set the SLS coefficients (builder pattern)
    pub fn with_sls(mut self, favorable: f64, unfavorable: f64) -> Self {
        self.sls_favorable = favorable;
        self.sls_unfavorable = unfavorable;
        self
    }
}

/// Named combination factor set (ψ0, ψ1, ψ2)
///
/// The reduction factors applied to a non-leading variable action:
/// combination value (ψ0), frequent value (ψ1), quasi-permanent value (ψ2).
/// Immutable once registered in a catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinationFactors {
    /// Set identifier, referenced by variable/accidental/seismic actions
    pub name: String,
    /// Combination value factor
    pub psi_0: f64,
    /// Frequent value factor
    pub psi_1: f64,
    /// Quasi-permanent value factor
    pub psi_2: f64,
}

impl CombinationFactors {
    /// Create a new ψ set
    pub fn new(name: impl Into<String>, psi_0: f64, psi_1: f64, psi_2: f64) -> Self {
        CombinationFactors {
            name: name.into(),
            psi_0,
            psi_1,
            psi_2,
        }
    }
}

/// Named lookup of factor sets for one design-code profile
///
/// Populated once at setup by a code-specific profile, then read-only for
/// the life of the checking run. Lookups are pure; a missing name is a
/// fatal configuration error, never a silent default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorCatalog {
    partial_safety: HashMap<String, PartialSafetyFactors>,
    combination: HashMap<String, CombinationFactors>,
}

impl FactorCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        FactorCatalog::default()
    }

    /// Register a partial safety factor set
    ///
    /// Fails with `DuplicateFactorSet` if the name is already taken for
    /// this kind.
    pub fn register_partial_safety(&mut self, record: PartialSafetyFactors) -> ComboResult<()> {
        if self.partial_safety.contains_key(&record.name) {
            return Err(ComboError::duplicate_factor_set(
                FactorKind::PartialSafety,
                &record.name,
            ));
        }
        self.partial_safety.insert(record.name.clone(), record);
        Ok(())
    }

    /// Register a combination factor set
    ///
    /// Fails with `DuplicateFactorSet` if the name is already taken for
    /// this kind.
    pub fn register_combination(&mut self, record: CombinationFactors) -> ComboResult<()> {
        if self.combination.contains_key(&record.name) {
            return Err(ComboError::duplicate_factor_set(
                FactorKind::Combination,
                &record.name,
            ));
        }
        self.combination.insert(record.name.clone(), record);
        Ok(())
    }

    /// Look up a partial safety factor set by name
    pub fn partial_safety(&self, name: &str) -> ComboResult<&PartialSafetyFactors> {
        self.partial_safety
            .get(name)
            .ok_or_else(|| ComboError::missing_factor_set(FactorKind::PartialSafety, name))
    }

    /// Look up a combination factor set by name
    pub fn combination(&self, name: &str) -> ComboResult<&CombinationFactors> {
        self.combination
            .get(name)
            .ok_or_else(|| ComboError::missing_factor_set(FactorKind::Combination, name))
    }

    /// Check whether a name is registered for a kind
    pub fn contains(&self, kind: FactorKind, name: &str) -> bool {
        match kind {
            FactorKind::PartialSafety => self.partial_safety.contains_key(name),
            FactorKind::Combination => self.combination.contains_key(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_safety_builder_defaults() {
        let gamma = PartialSafetyFactors::new("neutral");
        assert_eq!(gamma.uls_favorable, 1.0);
        assert_eq!(gamma.uls_unfavorable, 1.0);
        assert_eq!(gamma.sls_unfavorable, 1.0);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut catalog = FactorCatalog::new();
        catalog
            .register_partial_safety(PartialSafetyFactors::new("variable").with_uls(0.0, 1.5))
            .unwrap();
        catalog
            .register_combination(CombinationFactors::new("wind", 0.6, 0.2, 0.0))
            .unwrap();

        assert_eq!(catalog.partial_safety("variable").unwrap().uls_unfavorable, 1.5);
        assert_eq!(catalog.combination("wind").unwrap().psi_1, 0.2);
        assert!(catalog.contains(FactorKind::PartialSafety, "variable"));
        assert!(!catalog.contains(FactorKind::Combination, "variable"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut catalog = FactorCatalog::new();
        catalog
            .register_combination(CombinationFactors::new("live", 0.7, 0.5, 0.3))
            .unwrap();
        let err = catalog
            .register_combination(CombinationFactors::new("live", 0.6, 0.5, 0.3))
            .unwrap_err();
        assert_eq!(err.error_code(), "DUPLICATE_FACTOR_SET");
    }

    #[test]
    fn test_same_name_allowed_across_kinds() {
        let mut catalog = FactorCatalog::new();
        catalog
            .register_partial_safety(PartialSafetyFactors::new("snow"))
            .unwrap();
        catalog
            .register_combination(CombinationFactors::new("snow", 0.5, 0.2, 0.0))
            .unwrap();
        assert!(catalog.partial_safety("snow").is_ok());
        assert!(catalog.combination("snow").is_ok());
    }

    #[test]
    fn test_missing_lookup_names_the_set() {
        let catalog = FactorCatalog::new();
        let err = catalog.partial_safety("uls_g").unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FACTOR_SET");
        assert!(err.to_string().contains("uls_g"));
    }

    #[test]
    fn test_catalog_serialization() {
        let mut catalog = FactorCatalog::new();
        catalog
            .register_combination(CombinationFactors::new("live", 0.7, 0.5, 0.3))
            .unwrap();

        let json = serde_json::to_string(&catalog).unwrap();
        let parsed: FactorCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.combination("live").unwrap().psi_2, 0.3);
    }
}
