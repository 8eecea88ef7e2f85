//! Action definitions and the action registry
//!
//! An action is a registered load case: self weight, an occupancy load, an
//! impact, a design earthquake. Each carries its family, references into
//! the [`FactorCatalog`](crate::factors::FactorCatalog) by name, and the
//! relations the generator enforces (dependency, incompatibility,
//! determinant eligibility).
//!
//! The registry is append-only and is sealed before generation starts, so
//! several generation calls (one per limit-state category) can read it
//! concurrently without synchronization.
//!
//! # Example
//!
//! ```
//! use combo_core::actions::{ActionDef, ActionFamily, ActionRegistry};
//! use combo_core::factors::{CombinationFactors, FactorCatalog, PartialSafetyFactors};
//!
//! let mut catalog = FactorCatalog::new();
//! catalog.register_partial_safety(
//!     PartialSafetyFactors::new("permanent").with_uls(1.0, 1.35),
//! ).unwrap();
//! catalog.register_partial_safety(
//!     PartialSafetyFactors::new("variable").with_uls(0.0, 1.5),
//! ).unwrap();
//! catalog.register_combination(CombinationFactors::new("live", 0.7, 0.5, 0.3)).unwrap();
//!
//! let mut registry = ActionRegistry::new(catalog);
//! registry.new_action(
//!     ActionDef::new(ActionFamily::Permanent, "self_weight", "Structure self weight")
//!         .with_safety_factors("permanent"),
//! ).unwrap();
//! registry.new_action(
//!     ActionDef::new(ActionFamily::Variable, "live", "Floor live load")
//!         .with_safety_factors("variable")
//!         .with_combination_factors("live"),
//! ).unwrap();
//! registry.seal();
//!
//! assert_eq!(registry.actions_of(ActionFamily::Variable).count(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{ComboError, ComboResult};
use crate::factors::{FactorCatalog, FactorKind};

/// Action families per the usual design-code classification
///
/// A closed set: every registered action belongs to exactly one family and
/// the generator dispatches on it per situation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionFamily {
    /// G - Permanent actions (self weight, dead loads, prestress)
    Permanent,
    /// Q - Variable actions (live, wind, snow, thermal)
    Variable,
    /// A - Accidental actions (impact, fire, explosion)
    Accidental,
    /// E - Seismic actions
    Seismic,
}

impl ActionFamily {
    /// All families in conventional order
    pub const ALL: [ActionFamily; 4] = [
        ActionFamily::Permanent,
        ActionFamily::Variable,
        ActionFamily::Accidental,
        ActionFamily::Seismic,
    ];

    /// Standard single-letter code (G, Q, A, E)
    pub fn code(&self) -> &'static str {
        match self {
            ActionFamily::Permanent => "G",
            ActionFamily::Variable => "Q",
            ActionFamily::Accidental => "A",
            ActionFamily::Seismic => "E",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            ActionFamily::Permanent => "Permanent action",
            ActionFamily::Variable => "Variable action",
            ActionFamily::Accidental => "Accidental action",
            ActionFamily::Seismic => "Seismic action",
        }
    }

    /// Whether actions of this family carry combination factors (ψ)
    pub fn uses_combination_factors(&self) -> bool {
        !matches!(self, ActionFamily::Permanent)
    }
}

impl std::fmt::Display for ActionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A registered action
///
/// Created through [`ActionRegistry::new_action`] and never mutated once
/// the registry is sealed. The `name` must match the load-case name in the
/// external solver's model character for character; the engine never
/// renames actions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    /// Unique action name, identical to the solver's load-case name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Family the action belongs to
    pub family: ActionFamily,

    /// Name of the γ set in the factor catalog
    pub partial_safety_factors: String,

    /// Name of the ψ set in the factor catalog (non-permanent families only)
    pub combination_factors: Option<String>,

    /// Action that must accompany this one in every combination
    pub depends_on: Option<String>,

    /// Patterns matched against other action names to declare incompatibility
    pub incompatible_patterns: Vec<String>,

    /// Whether this action may act as the leading variable action
    pub determinant: bool,

    /// Whether this permanent action acts favorably (selects the favorable
    /// γ column instead of the unfavorable one)
    pub favorable: bool,
}

/// Builder for registering an action
///
/// Collects the optional attributes before handing the definition to
/// [`ActionRegistry::new_action`], which validates it against the catalog.
///
/// # Example
/// ```
/// use combo_core::actions::{ActionDef, ActionFamily};
///
/// let def = ActionDef::new(ActionFamily::Variable, "wind", "Transverse wind")
///     .with_safety_factors("variable")
///     .with_combination_factors("wind")
///     .with_incompatible("braking.*")
///     .not_determinant();
/// ```
#[derive(Debug, Clone)]
pub struct ActionDef {
    family: ActionFamily,
    name: String,
    description: String,
    partial_safety_factors: String,
    combination_factors: Option<String>,
    depends_on: Option<String>,
    incompatible_patterns: Vec<String>,
    not_determinant: bool,
    favorable: bool,
}

impl ActionDef {
    /// Start a definition for the given family and name
    pub fn new(
        family: ActionFamily,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        ActionDef {
            family,
            name: name.into(),
            description: description.into(),
            partial_safety_factors: String::new(),
            combination_factors: None,
            depends_on: None,
            incompatible_patterns: Vec::new(),
            not_determinant: false,
            favorable: false,
        }
    }

    /// Reference a γ set by name (builder pattern)
    pub fn with_safety_factors(mut self, name: impl Into<String>) -> Self {
        self.partial_safety_factors = name.into();
        self
    }

    /// Reference a ψ set by name (builder pattern)
    pub fn with_combination_factors(mut self, name: impl Into<String>) -> Self {
        self.combination_factors = Some(name.into());
        self
    }

    /// Require another action to be present whenever this one is
    pub fn with_dependency(mut self, action_name: impl Into<String>) -> Self {
        self.depends_on = Some(action_name.into());
        self
    }

    /// Declare a pattern of action names this action cannot combine with
    pub fn with_incompatible(mut self, pattern: impl Into<String>) -> Self {
        self.incompatible_patterns.push(pattern.into());
        self
    }

    /// Exclude this action from acting as the leading variable action
    pub fn not_determinant(mut self) -> Self {
        self.not_determinant = true;
        self
    }

    /// Use the favorable γ column for this action (permanents)
    pub fn favorable(mut self) -> Self {
        self.favorable = true;
        self
    }
}

/// Append-only catalog of registered actions
///
/// Owns the [`FactorCatalog`] so that factor-set references can be
/// validated eagerly at registration. Iteration order is registration
/// order everywhere; the generator relies on that for determinism.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRegistry {
    catalog: FactorCatalog,
    actions: Vec<Action>,
    sealed: bool,
}

impl ActionRegistry {
    /// Create a registry over a populated factor catalog
    pub fn new(catalog: FactorCatalog) -> Self {
        ActionRegistry {
            catalog,
            actions: Vec::new(),
            sealed: false,
        }
    }

    /// Register a new action
    ///
    /// Fails with `RegistrySealed` after [`seal`](Self::seal), with
    /// `DuplicateAction` on a name collision, and with `MissingFactorSet`
    /// if a referenced factor set is unknown to the catalog. Non-permanent
    /// families must reference a ψ set.
    pub fn new_action(&mut self, def: ActionDef) -> ComboResult<&Action> {
        if self.sealed {
            return Err(ComboError::registry_sealed(def.name));
        }
        if self.get(&def.name).is_some() {
            return Err(ComboError::duplicate_action(def.name));
        }
        // Validate factor-set references now, not at generation time.
        self.catalog.partial_safety(&def.partial_safety_factors)?;
        match &def.combination_factors {
            Some(psi) => {
                self.catalog.combination(psi)?;
            }
            None if def.family.uses_combination_factors() => {
                return Err(ComboError::configuration(format!(
                    "{} action '{}' must reference a {} factor set",
                    def.family.description().to_lowercase(),
                    def.name,
                    FactorKind::Combination,
                )));
            }
            None => {}
        }

        let action = Action {
            name: def.name,
            description: def.description,
            family: def.family,
            partial_safety_factors: def.partial_safety_factors,
            combination_factors: def.combination_factors,
            depends_on: def.depends_on,
            incompatible_patterns: def.incompatible_patterns,
            determinant: !def.not_determinant && def.family == ActionFamily::Variable,
            favorable: def.favorable,
        };
        self.actions.push(action);
        Ok(self.actions.last().expect("just pushed"))
    }

    /// Mark the registry read-only; idempotent
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Whether the registry has been sealed
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Look up an action by name
    ///
    /// Registries hold tens of actions, so a linear scan is fine here.
    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Position of an action in registration order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.actions.iter().position(|a| a.name == name)
    }

    /// All actions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Actions of one family, in registration order
    pub fn actions_of(&self, family: ActionFamily) -> impl Iterator<Item = &Action> {
        self.actions.iter().filter(move |a| a.family == family)
    }

    /// Number of registered actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no action has been registered
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// The factor catalog the registry validates against
    pub fn catalog(&self) -> &FactorCatalog {
        &self.catalog
    }
}
