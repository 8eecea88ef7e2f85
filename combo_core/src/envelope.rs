//! Envelope accumulation of per-combination solve results
//!
//! The external solver returns one value per combination and tracked
//! quantity; the [`EnvelopeAccumulator`] reduces that stream into the
//! governing max/min record per quantity, keeping the identity of the
//! governing combination. One accumulator is scoped per tracked quantity
//! set (per cross-section, per limit state); instances never share state.
//!
//! `accumulate` takes `&self` and is safe to call from parallel solve
//! workers. Alternatively each worker can fill its own accumulator and
//! [`merge`](EnvelopeAccumulator::merge) the partials at the end.
//!
//! # Example
//!
//! ```
//! use combo_core::envelope::EnvelopeAccumulator;
//!
//! let envelope = EnvelopeAccumulator::new();
//! envelope.accumulate("Mz", "ULS000", 10.0);
//! envelope.accumulate("Mz", "ULS001", -5.0);
//! envelope.accumulate("Mz", "ULS002", 7.0);
//!
//! let entry = envelope.entry("Mz").unwrap();
//! assert_eq!(entry.max_value, 10.0);
//! assert_eq!(entry.max_combination, "ULS000");
//! assert_eq!(entry.min_value, -5.0);
//! assert_eq!(entry.min_combination, "ULS001");
//! ```

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::combination::SituationType;
use crate::errors::{ComboError, ComboResult};

/// Governing max/min record for one tracked quantity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvelopeEntry {
    /// Tracked quantity key (e.g. "Mz@section12")
    pub quantity: String,
    /// Largest value seen so far
    pub max_value: f64,
    /// Combination that produced the maximum
    pub max_combination: String,
    /// Smallest value seen so far
    pub min_value: f64,
    /// Combination that produced the minimum
    pub min_combination: String,
}

/// A combination the external solver failed on
///
/// Failed combinations are excluded from envelope accumulation; the rest
/// of the category keeps processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FailedCombination {
    /// Name of the combination that failed to solve
    pub combination: String,
    /// Solver-reported reason (non-convergence, timeout, ...)
    pub reason: String,
}

#[derive(Debug, Default)]
struct EnvelopeState {
    /// Quantity keys in first-seen order, for deterministic listing
    order: Vec<String>,
    entries: HashMap<String, EnvelopeEntry>,
    failed: Vec<FailedCombination>,
}

/// Reduces per-combination solved results into governing records
///
/// Interior mutability behind a mutex keeps `accumulate` safe under
/// concurrent invocation; strict comparisons make ties keep the
/// first-seen combination, which is the generation-order tie-break when
/// results are fed in order.
#[derive(Debug, Default)]
pub struct EnvelopeAccumulator {
    state: Mutex<EnvelopeState>,
}

impl EnvelopeAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        EnvelopeAccumulator::default()
    }

    /// Fold one solved value into the envelope
    ///
    /// Creates the entry for `quantity` on first use; afterwards updates
    /// the max record only on a strictly greater value and the min record
    /// only on a strictly smaller one.
    pub fn accumulate(&self, quantity: &str, combination: &str, value: f64) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = state.entries.get_mut(quantity) {
            if value > entry.max_value {
                entry.max_value = value;
                entry.max_combination = combination.to_string();
            }
            if value < entry.min_value {
                entry.min_value = value;
                entry.min_combination = combination.to_string();
            }
        } else {
            state.order.push(quantity.to_string());
            state.entries.insert(
                quantity.to_string(),
                EnvelopeEntry {
                    quantity: quantity.to_string(),
                    max_value: value,
                    max_combination: combination.to_string(),
                    min_value: value,
                    min_combination: combination.to_string(),
                },
            );
        }
    }

    /// Record a per-combination solve failure
    ///
    /// The combination is excluded from accumulation by simply never
    /// being fed to it; this keeps the record for reporting.
    pub fn record_failure(&self, combination: &str, reason: &str) {
        tracing::warn!(combination, reason, "combination excluded from envelope");
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.failed.push(FailedCombination {
            combination: combination.to_string(),
            reason: reason.to_string(),
        });
    }

    /// Governing record for one quantity, if any value was accumulated
    pub fn entry(&self, quantity: &str) -> Option<EnvelopeEntry> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.entries.get(quantity).cloned()
    }

    /// All governing records, in first-seen quantity order
    pub fn entries(&self) -> Vec<EnvelopeEntry> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .order
            .iter()
            .filter_map(|q| state.entries.get(q).cloned())
            .collect()
    }

    /// Combinations that failed to solve, in report order
    pub fn failed_combinations(&self) -> Vec<FailedCombination> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.failed.clone()
    }

    /// Fold another accumulator's records into this one
    ///
    /// For the per-worker strategy: each solve worker fills a private
    /// accumulator and the partials are merged at the end. On equal
    /// extremes this accumulator's record wins, preserving the earlier
    /// feed order.
    pub fn merge(&self, other: EnvelopeAccumulator) {
        let other = other
            .state
            .into_inner()
            .unwrap_or_else(|e| e.into_inner());
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.failed.extend(other.failed);
        }
        for quantity in other.order {
            if let Some(entry) = other.entries.get(&quantity) {
                self.accumulate(&quantity, &entry.max_combination, entry.max_value);
                self.accumulate(&quantity, &entry.min_combination, entry.min_value);
            }
        }
    }

    /// Check that a category produced a governing case at all
    ///
    /// `total` is the number of combinations generated for the category;
    /// if every one of them failed to solve there is no governing case,
    /// which is fatal and reported distinctly from individual failures.
    pub fn ensure_governing_case(
        &self,
        situation: SituationType,
        total: usize,
    ) -> ComboResult<()> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if total > 0 && state.failed.len() >= total {
            return Err(ComboError::CategoryFailed { situation, total });
        }
        Ok(())
    }
}
