//! # combo_core - Load Combination Generation Engine
//!
//! `combo_core` enumerates the factored load combinations a design code
//! requires for each limit-state category, filters out physically or
//! logically impossible ones, and renders each as a canonical symbolic
//! expression for an external structural solver. Solved results stream
//! back into an envelope that keeps the governing case per tracked
//! quantity.
//!
//! ## Design Philosophy
//!
//! - **Explicit state**: factor tables live in a [`FactorCatalog`]
//!   instance built per design-code profile, never in globals
//! - **Deterministic**: enumeration follows registration order, names are
//!   reproducible, duplicates keep the first-generated instance
//! - **JSON-First**: all data types implement Serialize/Deserialize
//! - **Rich Errors**: structured configuration errors naming the
//!   offending action or factor set
//!
//! ## Quick Start
//!
//! ```rust
//! use combo_core::{CombinationGenerator, SituationType};
//! use combo_core::profiles::en1990_profile;
//!
//! let profile = en1990_profile().unwrap();
//! let mut registry = profile.registry();
//! registry.new_action(profile.permanent("G", "Self weight")).unwrap();
//! registry.new_action(profile.variable("live", "Imposed load", "live")).unwrap();
//! registry.new_action(profile.variable("wind", "Wind load", "wind")).unwrap();
//! registry.seal();
//!
//! let generator = CombinationGenerator::new(&registry);
//! for combo in generator.generate(SituationType::UlsPersistent).unwrap() {
//!     println!("{}: {}", combo.name, combo.render());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`factors`] - Named γ and ψ factor sets and their catalog
//! - [`actions`] - Action registration, families, relations
//! - [`matcher`] - Injected incompatibility matching strategies
//! - [`combination`] - Combinations and canonical expressions
//! - [`generator`] - The per-situation enumeration algorithms
//! - [`envelope`] - Governing max/min accumulation of solve results
//! - [`profiles`] - Per-design-code factor tables and bindings
//! - [`errors`] - Structured error types

pub mod actions;
pub mod combination;
pub mod envelope;
pub mod errors;
pub mod factors;
pub mod generator;
pub mod matcher;
pub mod profiles;

// Re-export commonly used types at crate root for convenience
pub use actions::{Action, ActionDef, ActionFamily, ActionRegistry};
pub use combination::{Combination, CombinationTerm, SituationType};
pub use envelope::{EnvelopeAccumulator, EnvelopeEntry, FailedCombination};
pub use errors::{ComboError, ComboResult};
pub use factors::{CombinationFactors, FactorCatalog, FactorKind, PartialSafetyFactors};
pub use generator::CombinationGenerator;
pub use matcher::{ExactMatcher, GlobMatcher, NameMatcher, RegexMatcher};
