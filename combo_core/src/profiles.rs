//! Design-code profiles
//!
//! A profile packages the declarative factor tables of one design code
//! and pre-binds the partial-safety-set name each action family uses, so
//! that registration code reads as "a permanent action" or "a variable
//! action of category live" without repeating factor-set names.
//!
//! Profiles are configuration, not algorithm: the generator only ever
//! sees the [`FactorCatalog`](crate::factors::FactorCatalog) and
//! [`ActionRegistry`](crate::actions::ActionRegistry) they produce.
//! [`en1990_profile`] ships the EN 1990 Annex A1 building values; other
//! codes follow the same shape.
//!
//! # Example
//!
//! ```
//! use combo_core::combination::SituationType;
//! use combo_core::generator::CombinationGenerator;
//! use combo_core::profiles::en1990_profile;
//!
//! let profile = en1990_profile().unwrap();
//! let mut registry = profile.registry();
//! registry.new_action(profile.permanent("G", "Self weight")).unwrap();
//! registry.new_action(profile.variable("live", "Imposed load", "live")).unwrap();
//! registry.seal();
//!
//! let combos = CombinationGenerator::new(&registry)
//!     .generate(SituationType::UlsPersistent)
//!     .unwrap();
//! assert_eq!(combos[0].render(), "1.35*G+1.5*live");
//! ```

use crate::actions::{ActionDef, ActionFamily, ActionRegistry};
use crate::errors::ComboResult;
use crate::factors::{CombinationFactors, FactorCatalog, PartialSafetyFactors};

/// Partial-safety-set names pre-bound per action family
#[derive(Debug, Clone)]
pub struct FamilyBindings {
    /// γ set for permanent actions
    pub permanent: String,
    /// γ set for variable actions
    pub variable: String,
    /// γ set for accidental actions
    pub accidental: String,
    /// γ set for seismic actions
    pub seismic: String,
}

/// A design code's factor tables plus family bindings
///
/// Built once per code; [`registry`](Self::registry) hands the populated
/// catalog to a fresh registry. The `permanent`/`variable`/... helpers
/// return [`ActionDef`]s with the γ reference already bound.
#[derive(Debug, Clone)]
pub struct CodeProfile {
    /// Code identifier (e.g. "EN1990")
    pub name: String,
    catalog: FactorCatalog,
    bindings: FamilyBindings,
}

impl CodeProfile {
    /// Assemble a profile from a populated catalog and bindings
    pub fn new(
        name: impl Into<String>,
        catalog: FactorCatalog,
        bindings: FamilyBindings,
    ) -> Self {
        CodeProfile {
            name: name.into(),
            catalog,
            bindings,
        }
    }

    /// The factor catalog this profile populated
    pub fn catalog(&self) -> &FactorCatalog {
        &self.catalog
    }

    /// Start a permanent action definition with the bound γ set
    pub fn permanent(&self, name: impl Into<String>, description: impl Into<String>) -> ActionDef {
        ActionDef::new(ActionFamily::Permanent, name, description)
            .with_safety_factors(&self.bindings.permanent)
    }

    /// Start a variable action definition with the bound γ set and the
    /// given ψ category
    pub fn variable(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        psi_category: impl Into<String>,
    ) -> ActionDef {
        ActionDef::new(ActionFamily::Variable, name, description)
            .with_safety_factors(&self.bindings.variable)
            .with_combination_factors(psi_category)
    }

    /// Start an accidental action definition with the bound γ set
    pub fn accidental(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        psi_category: impl Into<String>,
    ) -> ActionDef {
        ActionDef::new(ActionFamily::Accidental, name, description)
            .with_safety_factors(&self.bindings.accidental)
            .with_combination_factors(psi_category)
    }

    /// Start a seismic action definition with the bound γ set
    pub fn seismic(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        psi_category: impl Into<String>,
    ) -> ActionDef {
        ActionDef::new(ActionFamily::Seismic, name, description)
            .with_safety_factors(&self.bindings.seismic)
            .with_combination_factors(psi_category)
    }

    /// Create a registry over this profile's catalog
    pub fn registry(&self) -> ActionRegistry {
        ActionRegistry::new(self.catalog.clone())
    }
}

/// EN 1990 Annex A1 profile for buildings
///
/// γ sets: permanent 1.35/1.0 (set B), variable 1.5/0, accidental and
/// seismic at 1.0. ψ categories: imposed category A ("live"), wind,
/// snow (below 1000 m), thermal.
pub fn en1990_profile() -> ComboResult<CodeProfile> {
    let mut catalog = FactorCatalog::new();

    catalog.register_partial_safety(
        PartialSafetyFactors::new("en1990_permanent")
            .with_uls(1.0, 1.35)
            .with_accidental(1.0, 1.0)
            .with_sls(1.0, 1.0),
    )?;
    catalog.register_partial_safety(
        PartialSafetyFactors::new("en1990_variable")
            .with_uls(0.0, 1.5)
            .with_accidental(0.0, 1.0)
            .with_sls(0.0, 1.0),
    )?;
    catalog.register_partial_safety(
        PartialSafetyFactors::new("en1990_accidental")
            .with_uls(0.0, 1.0)
            .with_accidental(0.0, 1.0)
            .with_sls(0.0, 0.0),
    )?;

    catalog.register_combination(CombinationFactors::new("live", 0.7, 0.5, 0.3))?;
    catalog.register_combination(CombinationFactors::new("wind", 0.6, 0.2, 0.0))?;
    catalog.register_combination(CombinationFactors::new("snow", 0.5, 0.2, 0.0))?;
    catalog.register_combination(CombinationFactors::new("thermal", 0.6, 0.5, 0.0))?;

    Ok(CodeProfile::new(
        "EN1990",
        catalog,
        FamilyBindings {
            permanent: "en1990_permanent".to_string(),
            variable: "en1990_variable".to_string(),
            accidental: "en1990_accidental".to_string(),
            seismic: "en1990_accidental".to_string(),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::SituationType;
    use crate::generator::CombinationGenerator;

    #[test]
    fn test_profile_tables_registered() {
        let profile = en1990_profile().unwrap();
        let catalog = profile.catalog();
        assert_eq!(
            catalog.partial_safety("en1990_permanent").unwrap().uls_unfavorable,
            1.35
        );
        assert_eq!(catalog.combination("wind").unwrap().psi_0, 0.6);
    }

    #[test]
    fn test_profile_bound_definitions() {
        let profile = en1990_profile().unwrap();
        let mut registry = profile.registry();
        registry
            .new_action(profile.permanent("self_weight", "Structure self weight"))
            .unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_profile_end_to_end() {
        let profile = en1990_profile().unwrap();
        let mut registry = profile.registry();
        registry
            .new_action(profile.permanent("G", "Self weight"))
            .unwrap();
        registry
            .new_action(profile.variable("live", "Imposed load", "live"))
            .unwrap();
        registry
            .new_action(profile.variable("wind", "Wind load", "wind"))
            .unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();
        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].render(), "1.35*G+1.5*live+0.9*wind");
        assert_eq!(combos[1].render(), "1.35*G+1.05*live+1.5*wind");
    }

    #[test]
    fn test_profile_accidental_and_seismic_bindings() {
        let profile = en1990_profile().unwrap();
        let mut registry = profile.registry();
        registry
            .new_action(profile.permanent("G", "Self weight"))
            .unwrap();
        registry
            .new_action(profile.variable("live", "Imposed load", "live"))
            .unwrap();
        registry
            .new_action(profile.accidental("impact", "Vehicle impact", "live"))
            .unwrap();
        registry
            .new_action(profile.seismic("quake", "Design earthquake", "live"))
            .unwrap();
        registry.seal();

        let generator = CombinationGenerator::new(&registry);
        let accidental = generator.generate(SituationType::UlsAccidental).unwrap();
        assert_eq!(accidental.len(), 1);
        assert_eq!(accidental[0].render(), "1*G+0.5*live+1*impact");

        let seismic = generator.generate(SituationType::UlsSeismic).unwrap();
        assert_eq!(seismic.len(), 1);
        assert_eq!(seismic[0].render(), "1*G+0.3*live+1*quake");
    }
}
