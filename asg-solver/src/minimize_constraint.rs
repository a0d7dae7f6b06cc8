//! Multi-level lexicographic minimization.
//!
//! Each `#minimize` statement contributes weighted literals at a priority level; lower-numbered
//! levels are minimized first, and a model is only improved at a given level once every
//! higher-priority level is already minimal for it. This isn't wired into the constraint
//! propagation machinery used by [`crate::constraint::ConstraintRef`] at all: it never owns a
//! watch or acts as an antecedent, it only observes a found model and hands back the data
//! [`crate::solver`] needs to build the next round's bounding constraints, the same way a calling
//! application would add one by hand between solves.

use rustc_hash::FxHashMap;

use asg_formula::lit::Lit;

use crate::prop::Value;

/// One weighted literal contributing to a priority level's cost.
#[derive(Copy, Clone)]
struct Term {
    lit: Lit,
    weight: u64,
}

#[derive(Default)]
struct Level {
    terms: Vec<Term>,
}

/// All registered minimize statements, grouped and ordered by priority.
#[derive(Default)]
pub struct MinimizeConstraints {
    levels: FxHashMap<u32, Level>,
}

impl MinimizeConstraints {
    pub fn add(&mut self, priority: u32, literals: &[Lit], weights: &[u64]) {
        let level = self.levels.entry(priority).or_default();
        for (&lit, &weight) in literals.iter().zip(weights.iter()) {
            level.terms.push(Term { lit, weight });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Priority levels from most to least significant (highest priority number first).
    fn ordered_levels(&self) -> Vec<u32> {
        let mut keys: Vec<u32> = self.levels.keys().copied().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));
        keys
    }

    /// The cost vector of the current (complete) assignment, one entry per priority level, most
    /// significant first.
    pub fn evaluate(&self, value_of: impl Fn(Lit) -> Value) -> Vec<u64> {
        self.ordered_levels()
            .iter()
            .map(|p| {
                self.levels[p]
                    .terms
                    .iter()
                    .filter(|t| value_of(t.lit).is_true())
                    .map(|t| t.weight)
                    .sum()
            })
            .collect()
    }

    /// The weighted literals of every level, most significant first, matching the order of
    /// [`Self::evaluate`]'s cost vector.
    pub fn terms_by_level(&self) -> Vec<(Vec<Lit>, Vec<u64>)> {
        self.ordered_levels()
            .iter()
            .map(|p| {
                let level = &self.levels[p];
                let lits = level.terms.iter().map(|t| t.lit).collect();
                let weights = level.terms.iter().map(|t| t.weight).collect();
                (lits, weights)
            })
            .collect()
    }
}
