//! Combination generation
//!
//! [`CombinationGenerator`] turns a sealed [`ActionRegistry`] into the
//! deduplicated, ordered sequence of factored combinations a design code
//! requires for one situation type.
//!
//! The enumeration is deterministic: actions are always visited in
//! registration order, duplicate term sets keep the first-generated
//! instance, and two calls against an unchanged registry yield identical
//! sequences. Constraint violations (incompatible pairs, unmet
//! dependencies) prune terms or candidates silently; the only runtime
//! errors are configuration errors caught before enumeration starts.
//!
//! # Example
//!
//! ```
//! use combo_core::actions::{ActionDef, ActionFamily, ActionRegistry};
//! use combo_core::combination::SituationType;
//! use combo_core::factors::{CombinationFactors, FactorCatalog, PartialSafetyFactors};
//! use combo_core::generator::CombinationGenerator;
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
//!     ActionDef::new(ActionFamily::Permanent, "G", "Self weight")
//!         .with_safety_factors("permanent"),
//! ).unwrap();
//! registry.new_action(
//!     ActionDef::new(ActionFamily::Variable, "live", "Floor live load")
//!         .with_safety_factors("variable")
//!         .with_combination_factors("live"),
//! ).unwrap();
//! registry.seal();
//!
//! let generator = CombinationGenerator::new(&registry);
//! let combos = generator.generate(SituationType::UlsPersistent).unwrap();
//! assert_eq!(combos.len(), 1);
//! assert_eq!(combos[0].render(), "1.35*G+1.5*live");
//! ```

use std::collections::HashSet;

use crate::actions::{Action, ActionFamily, ActionRegistry};
use crate::combination::{Combination, SituationType};
use crate::errors::{ComboError, ComboResult};
use crate::matcher::{NameMatcher, RegexMatcher};

/// What to do when a forced term violates a constraint
///
/// Per-leading candidates are skipped outright; the single-combination
/// rules (no-determinant fallback, accidental, seismic, quasi-permanent)
/// always emit and only prune droppable terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ForcedViolation {
    SkipCandidate,
    EmitAnyway,
}

/// One term of a candidate under construction
struct Term<'a> {
    action: &'a Action,
    factor: f64,
    /// Forced terms (permanents, the leading action, the accidental or
    /// seismic action) cannot be pruned away
    forced: bool,
}

/// Candidate combination before constraint filtering
///
/// Terms are kept in offer order; forced terms always precede droppable
/// ones.
struct Candidate<'a> {
    terms: Vec<Term<'a>>,
}

impl<'a> Candidate<'a> {
    fn new() -> Self {
        Candidate { terms: Vec::new() }
    }

    fn force(&mut self, action: &'a Action, factor: f64) {
        self.terms.push(Term {
            action,
            factor,
            forced: true,
        });
    }

    fn offer(&mut self, action: &'a Action, factor: f64) {
        self.terms.push(Term {
            action,
            factor,
            forced: false,
        });
    }
}

/// Generator of factored load combinations for one sealed registry
///
/// Cheap to construct; one instance per registry is typical, invoked once
/// per requested situation type. Generation is pure in-memory computation
/// and holds no mutable state, so one generator may serve several
/// limit-state categories in turn (or concurrently, behind a shared
/// reference).
pub struct CombinationGenerator<'a> {
    registry: &'a ActionRegistry,
    matcher: Box<dyn NameMatcher>,
    require_permanent: bool,
}

impl<'a> CombinationGenerator<'a> {
    /// Create a generator with the default regex matching strategy
    pub fn new(registry: &'a ActionRegistry) -> Self {
        CombinationGenerator {
            registry,
            matcher: Box::new(RegexMatcher::new()),
            require_permanent: true,
        }
    }

    /// Replace the incompatibility matching strategy (builder pattern)
    pub fn with_matcher(mut self, matcher: Box<dyn NameMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Relax the policy that every combination must include a permanent
    /// action (builder pattern)
    ///
    /// The default is strict: generating against a registry with no
    /// permanent action fails with `EmptyRegistry`.
    pub fn allow_empty_permanent(mut self) -> Self {
        self.require_permanent = false;
        self
    }

    /// Generate the combinations for one situation type
    ///
    /// Returns a deduplicated sequence in generation order. Fails fast on
    /// configuration problems (unsealed registry, no permanent action,
    /// dangling `depends_on`, malformed incompatibility pattern); never
    /// fails on constraint violations, which prune silently.
    pub fn generate(&self, situation: SituationType) -> ComboResult<Vec<Combination>> {
        self.preflight(situation)?;

        let combos = match situation {
            SituationType::UlsPersistent
            | SituationType::SlsRare
            | SituationType::SlsFrequent => self.leading_enumeration(situation)?,
            SituationType::UlsAccidental => {
                self.single_per_action(situation, ActionFamily::Accidental)?
            }
            SituationType::UlsSeismic => {
                self.single_per_action(situation, ActionFamily::Seismic)?
            }
            SituationType::SlsQuasiPermanent => self.quasi_permanent(situation)?,
        };

        // Duplicate term sets can arise when distinct leading choices
        // collapse onto the same surviving terms; keep the first.
        let mut seen: HashSet<Combination> = HashSet::new();
        let mut out = Vec::with_capacity(combos.len());
        for combo in combos {
            if seen.insert(combo.clone()) {
                out.push(combo);
            } else {
                tracing::debug!(name = %combo.name, "duplicate combination suppressed");
            }
        }
        Ok(out)
    }

    /// Validate the registry before any enumeration
    fn preflight(&self, situation: SituationType) -> ComboResult<()> {
        if !self.registry.is_sealed() {
            return Err(ComboError::configuration(
                "registry must be sealed before generation",
            ));
        }
        if self.require_permanent
            && self
                .registry
                .actions_of(ActionFamily::Permanent)
                .next()
                .is_none()
        {
            return Err(ComboError::EmptyRegistry { situation });
        }
        for action in self.registry.iter() {
            if let Some(dep) = &action.depends_on {
                if self.registry.get(dep).is_none() {
                    return Err(ComboError::configuration(format!(
                        "action '{}' depends on unregistered action '{}'",
                        action.name, dep
                    )));
                }
            }
            for pattern in &action.incompatible_patterns {
                self.matcher.validate(pattern)?;
            }
        }
        Ok(())
    }

    /// Whether neither action's patterns match the other's name
    fn pair_compatible(&self, a: &Action, b: &Action) -> bool {
        !a.incompatible_patterns
            .iter()
            .any(|p| self.matcher.matches(p, &b.name))
            && !b
                .incompatible_patterns
                .iter()
                .any(|p| self.matcher.matches(p, &a.name))
    }

    /// γ for a permanent, accidental, or seismic term, per situation and
    /// per the action's favorable switch
    fn situation_gamma(&self, action: &Action, situation: SituationType) -> ComboResult<f64> {
        let gamma = self
            .registry
            .catalog()
            .partial_safety(&action.partial_safety_factors)?;
        Ok(match situation {
            SituationType::UlsPersistent => {
                if action.favorable {
                    gamma.uls_favorable
                } else {
                    gamma.uls_unfavorable
                }
            }
            SituationType::UlsAccidental | SituationType::UlsSeismic => {
                if action.favorable {
                    gamma.accidental_favorable
                } else {
                    gamma.accidental_unfavorable
                }
            }
            SituationType::SlsRare | SituationType::SlsFrequent
            | SituationType::SlsQuasiPermanent => {
                if action.favorable {
                    gamma.sls_favorable
                } else {
                    gamma.sls_unfavorable
                }
            }
        })
    }

    fn psi(&self, action: &Action) -> ComboResult<(f64, f64, f64)> {
        let name = action.combination_factors.as_ref().ok_or_else(|| {
            ComboError::configuration(format!(
                "action '{}' has no combination factor set",
                action.name
            ))
        })?;
        let psi = self.registry.catalog().combination(name)?;
        Ok((psi.psi_0, psi.psi_1, psi.psi_2))
    }

    /// Factor for a variable action taken as leading
    fn leading_factor(&self, action: &Action, situation: SituationType) -> ComboResult<f64> {
        Ok(match situation {
            SituationType::UlsPersistent | SituationType::SlsRare => {
                self.situation_gamma(action, situation)?
            }
            SituationType::SlsFrequent => self.psi(action)?.1,
            _ => self.situation_gamma(action, situation)?,
        })
    }

    /// Factor for a non-leading variable action
    fn accompanying_factor(&self, action: &Action, situation: SituationType) -> ComboResult<f64> {
        let (psi_0, _, psi_2) = self.psi(action)?;
        Ok(match situation {
            SituationType::UlsPersistent | SituationType::SlsRare => {
                psi_0 * self.situation_gamma(action, situation)?
            }
            SituationType::SlsFrequent
            | SituationType::SlsQuasiPermanent
            | SituationType::UlsAccidental
            | SituationType::UlsSeismic => psi_2,
        })
    }

    /// ULS persistent-transient, SLS rare, SLS frequent: one combination
    /// per determinant-eligible variable action taken as leading, or a
    /// single no-leading combination when none is eligible
    fn leading_enumeration(&self, situation: SituationType) -> ComboResult<Vec<Combination>> {
        let permanents: Vec<&Action> =
            self.registry.actions_of(ActionFamily::Permanent).collect();
        let variables: Vec<&Action> = self.registry.actions_of(ActionFamily::Variable).collect();
        let determinants: Vec<&Action> =
            variables.iter().copied().filter(|v| v.determinant).collect();

        let mut combos = Vec::new();
        let mut index = 0usize;

        if determinants.is_empty() {
            let mut candidate = Candidate::new();
            for g in permanents.iter().copied() {
                candidate.force(g, self.situation_gamma(g, situation)?);
            }
            for v in variables.iter().copied() {
                candidate.offer(v, self.accompanying_factor(v, situation)?);
            }
            if let Some(combo) =
                self.resolve(candidate, situation, &mut index, None, ForcedViolation::EmitAnyway)?
            {
                combos.push(combo);
            }
            return Ok(combos);
        }

        for lead in determinants.iter().copied() {
            let mut candidate = Candidate::new();
            for g in permanents.iter().copied() {
                candidate.force(g, self.situation_gamma(g, situation)?);
            }
            candidate.force(lead, self.leading_factor(lead, situation)?);
            for v in variables.iter().copied() {
                if v.name != lead.name {
                    candidate.offer(v, self.accompanying_factor(v, situation)?);
                }
            }
            if let Some(combo) = self.resolve(
                candidate,
                situation,
                &mut index,
                Some(&lead.name),
                ForcedViolation::SkipCandidate,
            )? {
                combos.push(combo);
            }
        }
        Ok(combos)
    }

    /// ULS accidental and seismic: exactly one combination per action of
    /// the keyed family
    fn single_per_action(
        &self,
        situation: SituationType,
        family: ActionFamily,
    ) -> ComboResult<Vec<Combination>> {
        let permanents: Vec<&Action> =
            self.registry.actions_of(ActionFamily::Permanent).collect();
        let variables: Vec<&Action> = self.registry.actions_of(ActionFamily::Variable).collect();

        let mut combos = Vec::new();
        let mut index = 0usize;

        for keyed in self.registry.actions_of(family) {
            let mut candidate = Candidate::new();
            for g in permanents.iter().copied() {
                candidate.force(g, self.situation_gamma(g, situation)?);
            }
            candidate.force(keyed, self.situation_gamma(keyed, situation)?);

            // The accidental situation keeps one variable at its frequent
            // value; the seismic situation reduces all of them to ψ2.
            let mut lead: Option<&Action> = None;
            if situation == SituationType::UlsAccidental {
                lead = variables.iter().copied().find(|v| {
                    v.determinant
                        && permanents.iter().all(|g| self.pair_compatible(v, g))
                        && self.pair_compatible(v, keyed)
                });
                if let Some(v) = lead {
                    candidate.offer(v, self.psi(v)?.1);
                }
            }
            for v in variables.iter().copied() {
                if lead.map(|l| l.name == v.name).unwrap_or(false) {
                    continue;
                }
                candidate.offer(v, self.accompanying_factor(v, situation)?);
            }

            if let Some(combo) = self.resolve(
                candidate,
                situation,
                &mut index,
                lead.map(|l| l.name.as_str()),
                ForcedViolation::EmitAnyway,
            )? {
                combos.push(combo);
            }
        }
        Ok(combos)
    }

    /// SLS quasi-permanent: exactly one combination, no leading action
    fn quasi_permanent(&self, situation: SituationType) -> ComboResult<Vec<Combination>> {
        let mut candidate = Candidate::new();
        for g in self.registry.actions_of(ActionFamily::Permanent) {
            candidate.force(g, self.situation_gamma(g, situation)?);
        }
        for v in self.registry.actions_of(ActionFamily::Variable) {
            candidate.offer(v, self.accompanying_factor(v, situation)?);
        }

        let mut index = 0usize;
        let mut combos = Vec::new();
        if let Some(combo) =
            self.resolve(candidate, situation, &mut index, None, ForcedViolation::EmitAnyway)?
        {
            combos.push(combo);
        }
        Ok(combos)
    }

    /// Apply the compatibility and dependency predicates to a candidate
    /// and assemble the surviving terms into a named combination
    ///
    /// Droppable terms are accepted in offer order, each checked against
    /// everything accepted before it; dependency pruning then runs to a
    /// fixpoint, since removing a term can orphan another's dependency.
    fn resolve(
        &self,
        candidate: Candidate<'_>,
        situation: SituationType,
        index: &mut usize,
        leading: Option<&str>,
        on_forced_violation: ForcedViolation,
    ) -> ComboResult<Option<Combination>> {
        let (forced, droppable): (Vec<Term>, Vec<Term>) =
            candidate.terms.into_iter().partition(|t| t.forced);

        // A conflict between two forced terms cannot be pruned away.
        for (i, a) in forced.iter().enumerate() {
            for b in &forced[i + 1..] {
                if !self.pair_compatible(a.action, b.action) {
                    tracing::debug!(
                        first = %a.action.name,
                        second = %b.action.name,
                        situation = %situation,
                        "forced terms incompatible"
                    );
                    if on_forced_violation == ForcedViolation::SkipCandidate {
                        return Ok(None);
                    }
                }
            }
        }

        let mut accepted = forced;
        for term in droppable {
            if accepted
                .iter()
                .all(|kept| self.pair_compatible(term.action, kept.action))
            {
                accepted.push(term);
            } else {
                tracing::debug!(
                    action = %term.action.name,
                    situation = %situation,
                    "incompatible non-leading term dropped"
                );
            }
        }

        loop {
            let present: HashSet<&str> =
                accepted.iter().map(|t| t.action.name.as_str()).collect();
            let unmet = accepted.iter().position(|t| {
                t.action
                    .depends_on
                    .as_ref()
                    .map(|d| !present.contains(d.as_str()))
                    .unwrap_or(false)
            });
            match unmet {
                None => break,
                Some(i) if accepted[i].forced => {
                    tracing::debug!(
                        action = %accepted[i].action.name,
                        situation = %situation,
                        "forced term has unmet dependency"
                    );
                    if on_forced_violation == ForcedViolation::SkipCandidate {
                        return Ok(None);
                    }
                    break;
                }
                Some(i) => {
                    tracing::debug!(
                        action = %accepted[i].action.name,
                        situation = %situation,
                        "term with unmet dependency dropped"
                    );
                    accepted.remove(i);
                }
            }
        }

        // Expression terms follow registration order.
        accepted.sort_by_key(|t| self.registry.position(&t.action.name));

        let name = format!("{}{:03}", situation.code(), *index);
        *index += 1;

        let mut combo = Combination::new(name, situation);
        for term in accepted {
            combo = combo.with_term(&term.action.name, term.factor);
        }
        if let Some(lead) = leading {
            if combo.contains(lead) {
                combo = combo.with_leading(lead);
            }
        }
        Ok(Some(combo))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionDef;
    use crate::factors::{CombinationFactors, FactorCatalog, PartialSafetyFactors};
    use crate::matcher::ExactMatcher;

    fn catalog() -> FactorCatalog {
        let mut c = FactorCatalog::new();
        c.register_partial_safety(
            PartialSafetyFactors::new("permanent")
                .with_uls(1.0, 1.35)
                .with_accidental(1.0, 1.0)
                .with_sls(1.0, 1.0),
        )
        .unwrap();
        c.register_partial_safety(
            PartialSafetyFactors::new("variable")
                .with_uls(0.0, 1.5)
                .with_accidental(0.0, 1.0)
                .with_sls(0.0, 1.0),
        )
        .unwrap();
        c.register_partial_safety(
            PartialSafetyFactors::new("accidental").with_accidental(0.0, 1.0),
        )
        .unwrap();
        c.register_combination(CombinationFactors::new("live", 0.7, 0.5, 0.3))
            .unwrap();
        c.register_combination(CombinationFactors::new("wind", 0.6, 0.2, 0.0))
            .unwrap();
        c
    }

    fn permanent(name: &str) -> ActionDef {
        ActionDef::new(ActionFamily::Permanent, name, "test").with_safety_factors("permanent")
    }

    fn variable(name: &str, psi: &str) -> ActionDef {
        ActionDef::new(ActionFamily::Variable, name, "test")
            .with_safety_factors("variable")
            .with_combination_factors(psi)
    }

    fn accidental(name: &str) -> ActionDef {
        ActionDef::new(ActionFamily::Accidental, name, "test")
            .with_safety_factors("accidental")
            .with_combination_factors("live")
    }

    fn seismic(name: &str) -> ActionDef {
        ActionDef::new(ActionFamily::Seismic, name, "test")
            .with_safety_factors("accidental")
            .with_combination_factors("live")
    }

    /// P + live + wind, everything compatible
    fn basic_registry() -> ActionRegistry {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry.new_action(variable("live", "live")).unwrap();
        registry.new_action(variable("wind", "wind")).unwrap();
        registry.seal();
        registry
    }

    #[test]
    fn test_two_determinants_give_two_combinations() {
        let registry = basic_registry();
        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].render(), "1.35*P+1.5*live+0.9*wind");
        assert_eq!(combos[1].render(), "1.35*P+1.05*live+1.5*wind");
        assert_eq!(combos[0].leading_action.as_deref(), Some("live"));
        assert_eq!(combos[1].leading_action.as_deref(), Some("wind"));
        assert_eq!(combos[0].name, "ULS000");
        assert_eq!(combos[1].name, "ULS001");
    }

    #[test]
    fn test_generation_is_deterministic() {
        let registry = basic_registry();
        let generator = CombinationGenerator::new(&registry);
        let first = generator.generate(SituationType::UlsPersistent).unwrap();
        let second = generator.generate(SituationType::UlsPersistent).unwrap();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.render(), b.render());
        }
    }

    #[test]
    fn test_end_to_end_factors() {
        let registry = basic_registry();
        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        let leading_live = &combos[0];
        assert!((leading_live.factor_of("P").unwrap() - 1.35).abs() < 1e-9);
        assert!((leading_live.factor_of("live").unwrap() - 1.5).abs() < 1e-9);
        assert!((leading_live.factor_of("wind").unwrap() - 0.9).abs() < 1e-9);

        let leading_wind = &combos[1];
        assert!((leading_wind.factor_of("wind").unwrap() - 1.5).abs() < 1e-9);
        assert!((leading_wind.factor_of("live").unwrap() - 1.05).abs() < 1e-9);
    }

    #[test]
    fn test_incompatible_peer_is_dropped_not_the_combination() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("live", "live").with_incompatible("wind"))
            .unwrap();
        registry.new_action(variable("wind", "wind")).unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 2);
        for combo in &combos {
            assert!(!(combo.contains("live") && combo.contains("wind")));
        }
        assert_eq!(combos[0].render(), "1.35*P+1.5*live");
        assert_eq!(combos[1].render(), "1.35*P+1.5*wind");
    }

    #[test]
    fn test_dependency_enforced() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry.new_action(variable("V1", "live")).unwrap();
        registry
            .new_action(variable("V2", "wind").with_dependency("V1"))
            .unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        for combo in &combos {
            if combo.contains("V2") {
                assert!(combo.contains("V1"), "{} lacks V1", combo.render());
            }
        }
    }

    #[test]
    fn test_dependency_chain_pruned_to_fixpoint() {
        // lead is incompatible with V1; dropping V1 orphans V2's dependency
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("lead", "live").with_incompatible("V1"))
            .unwrap();
        registry
            .new_action(variable("V1", "wind").not_determinant())
            .unwrap();
        registry
            .new_action(variable("V2", "wind").not_determinant().with_dependency("V1"))
            .unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].render(), "1.35*P+1.5*lead");
    }

    #[test]
    fn test_leading_with_unmet_dependency_skips_candidate() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("V1", "live").with_incompatible("helper"))
            .unwrap();
        registry
            .new_action(variable("helper", "wind").not_determinant())
            .unwrap();
        registry
            .new_action(variable("V2", "wind").with_dependency("helper").with_incompatible("helper"))
            .unwrap();
        registry.seal();

        // Leading V2 forces V2, whose dependency "helper" conflicts with
        // V2 itself and gets dropped, so the whole candidate is skipped.
        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].leading_action.as_deref(), Some("V1"));
    }

    #[test]
    fn test_dangling_dependency_fails_fast() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("V1", "live").with_dependency("ghost"))
            .unwrap();
        registry.seal();

        let err = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION");
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn test_no_determinant_gives_single_combination() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("live", "live").not_determinant())
            .unwrap();
        registry
            .new_action(variable("wind", "wind").not_determinant())
            .unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].render(), "1.35*P+1.05*live+0.9*wind");
        assert!(combos[0].leading_action.is_none());
    }

    #[test]
    fn test_single_determinant_yields_one_combination() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry.new_action(variable("V1", "live")).unwrap();
        registry
            .new_action(variable("V2", "wind").not_determinant())
            .unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].leading_action.as_deref(), Some("V1"));
    }

    #[test]
    fn test_duplicate_term_sets_are_suppressed() {
        // ψ0 = 1 makes "leading V1" and "leading V2" the same term set.
        let mut c = catalog();
        c.register_combination(CombinationFactors::new("full", 1.0, 1.0, 1.0))
            .unwrap();
        let mut registry = ActionRegistry::new(c);
        registry.new_action(permanent("P")).unwrap();
        registry.new_action(variable("V1", "full")).unwrap();
        registry.new_action(variable("V2", "full")).unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].name, "ULS000");
    }

    #[test]
    fn test_favorable_permanent_uses_favorable_column() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P").favorable()).unwrap();
        registry.new_action(variable("live", "live")).unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();
        assert_eq!(combos[0].render(), "1*P+1.5*live");
    }

    #[test]
    fn test_accidental_one_combination_per_accidental_action() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry.new_action(variable("live", "live")).unwrap();
        registry.new_action(variable("wind", "wind")).unwrap();
        registry.new_action(accidental("impact")).unwrap();
        registry.new_action(accidental("fire")).unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsAccidental)
            .unwrap();

        assert_eq!(combos.len(), 2);
        // live is the first determinant variable: frequent value ψ1 = 0.5;
        // wind keeps its quasi-permanent value ψ2 = 0.
        assert_eq!(combos[0].render(), "1*P+0.5*live+0*wind+1*impact");
        assert_eq!(combos[1].render(), "1*P+0.5*live+0*wind+1*fire");
        assert_eq!(combos[0].name, "ULSA000");
        assert_eq!(combos[0].leading_action.as_deref(), Some("live"));
    }

    #[test]
    fn test_seismic_uses_quasi_permanent_values() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry.new_action(variable("live", "live")).unwrap();
        registry.new_action(seismic("quake")).unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsSeismic)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].render(), "1*P+0.3*live+1*quake");
        assert!(combos[0].leading_action.is_none());
    }

    #[test]
    fn test_sls_rare_uses_service_factors() {
        let registry = basic_registry();
        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::SlsRare)
            .unwrap();

        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].render(), "1*P+1*live+0.6*wind");
        assert_eq!(combos[1].render(), "1*P+0.7*live+1*wind");
        assert_eq!(combos[0].name, "SLSR000");
    }

    #[test]
    fn test_sls_frequent_leading_at_psi1() {
        let registry = basic_registry();
        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::SlsFrequent)
            .unwrap();

        assert_eq!(combos.len(), 2);
        assert_eq!(combos[0].render(), "1*P+0.5*live+0*wind");
        assert_eq!(combos[1].render(), "1*P+0.3*live+0.2*wind");
    }

    #[test]
    fn test_sls_quasi_permanent_single_combination() {
        let registry = basic_registry();
        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::SlsQuasiPermanent)
            .unwrap();

        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].render(), "1*P+0.3*live+0*wind");
        assert_eq!(combos[0].name, "SLSQP000");
    }

    #[test]
    fn test_empty_registry_policy() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(variable("live", "live")).unwrap();
        registry.seal();

        let err = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_REGISTRY");

        let combos = CombinationGenerator::new(&registry)
            .allow_empty_permanent()
            .generate(SituationType::UlsPersistent)
            .unwrap();
        assert_eq!(combos.len(), 1);
        assert_eq!(combos[0].render(), "1.5*live");
    }

    #[test]
    fn test_unsealed_registry_rejected() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();

        let err = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION");
    }

    #[test]
    fn test_exact_matcher_injection() {
        // With the exact matcher "wind.*" matches nothing, so live and
        // wind combine freely.
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("live", "live").with_incompatible("wind.*"))
            .unwrap();
        registry.new_action(variable("wind", "wind")).unwrap();
        registry.seal();

        let combos = CombinationGenerator::new(&registry)
            .with_matcher(Box::new(ExactMatcher))
            .generate(SituationType::UlsPersistent)
            .unwrap();
        assert!(combos[0].contains("wind"));

        let combos = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap();
        assert!(!combos[0].contains("wind"));
    }

    #[test]
    fn test_bad_pattern_fails_fast() {
        let mut registry = ActionRegistry::new(catalog());
        registry.new_action(permanent("P")).unwrap();
        registry
            .new_action(variable("live", "live").with_incompatible("wind["))
            .unwrap();
        registry.seal();

        let err = CombinationGenerator::new(&registry)
            .generate(SituationType::UlsPersistent)
            .unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION");
    }
}
