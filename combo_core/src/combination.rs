//! Combinations and their canonical expressions
//!
//! A [`Combination`] is an immutable list of `(action, factor)` terms for
//! one design situation. Its [`render`](Combination::render) form,
//! `"f1*name1+f2*name2+..."`, is what gets handed to the external
//! structural solver; action names are passed through character for
//! character, so they must match the solver's load-case names.
//!
//! # Example
//!
//! ```
//! use combo_core::combination::{parse_expression, Combination, SituationType};
//!
//! let combo = Combination::new("ULS000", SituationType::UlsPersistent)
//!     .with_term("self_weight", 1.35)
//!     .with_term("live", 1.5)
//!     .with_term("wind", 0.9);
//!
//! assert_eq!(combo.render(), "1.35*self_weight+1.5*live+0.9*wind");
//!
//! let terms = parse_expression(&combo.render()).unwrap();
//! assert_eq!(terms.len(), 3);
//! ```

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::errors::{ComboError, ComboResult};

/// Design situation a combination belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SituationType {
    /// ULS, persistent or transient situation
    UlsPersistent,
    /// ULS, accidental situation
    UlsAccidental,
    /// ULS, seismic situation
    UlsSeismic,
    /// SLS, rare (characteristic) combination
    SlsRare,
    /// SLS, frequent combination
    SlsFrequent,
    /// SLS, quasi-permanent combination
    SlsQuasiPermanent,
}

impl SituationType {
    /// All situation types in conventional order
    pub const ALL: [SituationType; 6] = [
        SituationType::UlsPersistent,
        SituationType::UlsAccidental,
        SituationType::UlsSeismic,
        SituationType::SlsRare,
        SituationType::SlsFrequent,
        SituationType::SlsQuasiPermanent,
    ];

    /// Short code, used as the prefix of generated combination names
    pub fn code(&self) -> &'static str {
        match self {
            SituationType::UlsPersistent => "ULS",
            SituationType::UlsAccidental => "ULSA",
            SituationType::UlsSeismic => "ULSS",
            SituationType::SlsRare => "SLSR",
            SituationType::SlsFrequent => "SLSF",
            SituationType::SlsQuasiPermanent => "SLSQP",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            SituationType::UlsPersistent => "ULS persistent-transient",
            SituationType::UlsAccidental => "ULS accidental",
            SituationType::UlsSeismic => "ULS seismic",
            SituationType::SlsRare => "SLS rare",
            SituationType::SlsFrequent => "SLS frequent",
            SituationType::SlsQuasiPermanent => "SLS quasi-permanent",
        }
    }

    /// Whether this is an ultimate limit state situation
    pub fn is_uls(&self) -> bool {
        matches!(
            self,
            SituationType::UlsPersistent
                | SituationType::UlsAccidental
                | SituationType::UlsSeismic
        )
    }
}

impl std::fmt::Display for SituationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// One factored term of a combination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinationTerm {
    /// Action name, identical to the solver's load-case name
    pub action: String,
    /// Factor the action's characteristic value is multiplied by
    pub factor: f64,
}

/// A factored load combination
///
/// Terms are kept in registration order of their actions. Equality and
/// hashing ignore `name` and `leading_action` and compare
/// `(situation, sorted terms)`: two combinations with the same multiset of
/// terms are the same combination even when the nominal leading action
/// differs (which happens when no non-leading term survives pruning).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combination {
    /// Deterministic generated name (situation code + index)
    pub name: String,
    /// Design situation this combination was generated for
    pub situation: SituationType,
    /// Factored terms, in registration order
    pub terms: Vec<CombinationTerm>,
    /// Leading variable action, if the situation distinguishes one
    pub leading_action: Option<String>,
}

impl Combination {
    /// Create an empty combination
    pub fn new(name: impl Into<String>, situation: SituationType) -> Self {
        Combination {
            name: name.into(),
            situation,
            terms: Vec::new(),
            leading_action: None,
        }
    }

    /// Append a term (builder pattern)
    pub fn with_term(mut self, action: impl Into<String>, factor: f64) -> Self {
        self.terms.push(CombinationTerm {
            action: action.into(),
            factor,
        });
        self
    }

    /// Mark the leading action (builder pattern)
    pub fn with_leading(mut self, action: impl Into<String>) -> Self {
        self.leading_action = Some(action.into());
        self
    }

    /// Whether an action appears among the terms
    pub fn contains(&self, action: &str) -> bool {
        self.terms.iter().any(|t| t.action == action)
    }

    /// Factor applied to an action, if present
    pub fn factor_of(&self, action: &str) -> Option<f64> {
        self.terms
            .iter()
            .find(|t| t.action == action)
            .map(|t| t.factor)
    }

    /// Render the canonical expression handed to the external solver
    ///
    /// Terms appear in registration order; factors are rendered so that
    /// common code values round-trip through [`parse_expression`] within
    /// 1e-9.
    pub fn render(&self) -> String {
        self.terms
            .iter()
            .map(|t| format!("{}*{}", format_factor(t.factor), t.action))
            .collect::<Vec<_>>()
            .join("+")
    }

    /// Canonical term list used for equality and hashing
    fn canonical_terms(&self) -> Vec<(&str, u64)> {
        let mut terms: Vec<(&str, u64)> = self
            .terms
            .iter()
            .map(|t| (t.action.as_str(), t.factor.to_bits()))
            .collect();
        terms.sort();
        terms
    }
}

impl PartialEq for Combination {
    fn eq(&self, other: &Self) -> bool {
        self.situation == other.situation && self.canonical_terms() == other.canonical_terms()
    }
}

impl Eq for Combination {}

impl Hash for Combination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.situation.hash(state);
        self.canonical_terms().hash(state);
    }
}

impl std::fmt::Display for Combination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.render())
    }
}

/// Render a factor for the canonical expression
///
/// Up to nine decimal places with trailing zeros trimmed, so `1.35`
/// renders as `"1.35"` and `1.0/3.0` as `"0.333333333"` (within 1e-9 of
/// the exact value).
pub fn format_factor(factor: f64) -> String {
    let mut s = format!("{factor:.9}");
    while s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Parse an expression in the canonical `"f1*name1+f2*name2"` form
///
/// This mirrors the parse the external solver applies to
/// [`Combination::render`] output; it exists so the numeric round trip can
/// be verified without a solver.
pub fn parse_expression(expression: &str) -> ComboResult<Vec<(String, f64)>> {
    let mut terms = Vec::new();
    for raw in expression.split('+') {
        let (factor, action) = raw.split_once('*').ok_or_else(|| {
            ComboError::configuration(format!("malformed combination term '{raw}'"))
        })?;
        let factor: f64 = factor.trim().parse().map_err(|_| {
            ComboError::configuration(format!("malformed factor '{factor}' in term '{raw}'"))
        })?;
        terms.push((action.trim().to_string(), factor));
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_situation_codes_unique() {
        for a in SituationType::ALL {
            for b in SituationType::ALL {
                if a != b {
                    assert_ne!(a.code(), b.code());
                }
            }
        }
    }

    #[test]
    fn test_render_order_and_format() {
        let combo = Combination::new("ULS000", SituationType::UlsPersistent)
            .with_term("self_weight", 1.35)
            .with_term("live", 1.5)
            .with_term("wind", 0.9)
            .with_leading("live");

        assert_eq!(combo.render(), "1.35*self_weight+1.5*live+0.9*wind");
    }

    #[test]
    fn test_format_factor_trims() {
        assert_eq!(format_factor(1.0), "1");
        assert_eq!(format_factor(0.6), "0.6");
        assert_eq!(format_factor(1.35), "1.35");
        assert_eq!(format_factor(1.05), "1.05");
    }

    #[test]
    fn test_factor_round_trip_within_tolerance() {
        for value in [0.6, 0.7, 1.35, 1.5, 1.0 / 3.0, 0.525, 2.0 / 7.0] {
            let parsed: f64 = format_factor(value).parse().unwrap();
            assert!(
                (parsed - value).abs() < 1e-9,
                "{value} round-tripped to {parsed}"
            );
        }
    }

    #[test]
    fn test_parse_expression_round_trip() {
        let combo = Combination::new("ULS001", SituationType::UlsPersistent)
            .with_term("G", 1.35)
            .with_term("wind", 0.6);

        let terms = parse_expression(&combo.render()).unwrap();
        assert_eq!(terms[0].0, "G");
        assert!((terms[0].1 - 1.35).abs() < 1e-9);
        assert_eq!(terms[1].0, "wind");
        assert!((terms[1].1 - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_parse_expression_rejects_garbage() {
        assert!(parse_expression("1.35*G+live").is_err());
        assert!(parse_expression("x*G").is_err());
    }

    #[test]
    fn test_equality_ignores_name_and_leading() {
        let a = Combination::new("ULS000", SituationType::UlsPersistent)
            .with_term("G", 1.35)
            .with_term("live", 1.5)
            .with_leading("live");
        let b = Combination::new("ULS007", SituationType::UlsPersistent)
            .with_term("live", 1.5)
            .with_term("G", 1.35);

        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        let hash = |c: &Combination| {
            let mut h = DefaultHasher::new();
            c.hash(&mut h);
            h.finish()
        };
        assert_eq!(hash(&a), hash(&b));
    }

    #[test]
    fn test_equality_respects_situation_and_factors() {
        let a = Combination::new("ULS000", SituationType::UlsPersistent).with_term("G", 1.35);
        let b = Combination::new("SLSR000", SituationType::SlsRare).with_term("G", 1.35);
        let c = Combination::new("ULS001", SituationType::UlsPersistent).with_term("G", 1.0);

        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_combination_serialization() {
        let combo = Combination::new("ULS000", SituationType::UlsPersistent)
            .with_term("G", 1.35)
            .with_leading("G");

        let json = serde_json::to_string(&combo).unwrap();
        let parsed: Combination = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, combo);
        assert_eq!(parsed.name, "ULS000");
    }
}
