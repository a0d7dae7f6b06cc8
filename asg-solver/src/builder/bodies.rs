//! Interning of conjunctive rule bodies.
//!
//! Ground programs routinely produce many rules that share an identical body (e.g. every
//! instantiation of a choice rule over the same generator). Interning collapses those to a single
//! body atom so the completion and the solver only ever see it once.

use rustc_hash::FxHashMap;

use asg_formula::lit::{Lit, Var};

use crate::variables::{VarKind, Variables};

use super::atoms::VarAllocator;

/// A distinct conjunctive body, after interning.
pub struct Body {
    pub lit: Lit,
    pub pos_atoms: Vec<Var>,
    pub neg_atoms: Vec<Var>,
}

#[derive(Default)]
pub struct Bodies {
    interned: FxHashMap<Vec<Lit>, Var>,
    bodies: Vec<Body>,
}

impl Bodies {
    /// Interns a conjunctive body (a plain rule body, not a weight/cardinality one), returning
    /// the literal that is true exactly when every literal in `literals` holds.
    ///
    /// An empty body always holds; its literal is [`Variables::true_lit`].
    pub fn intern(
        &mut self,
        alloc: &mut VarAllocator,
        variables: &mut Variables,
        mut literals: Vec<Lit>,
    ) -> Lit {
        if literals.is_empty() {
            return variables.true_lit();
        }

        literals.sort_unstable();
        literals.dedup();

        if literals.len() == 1 {
            return literals[0];
        }

        if let Some(&var) = self.interned.get(&literals) {
            return var.positive();
        }

        let var = alloc.fresh(variables, VarKind::Body);

        let pos_atoms = literals
            .iter()
            .filter(|l| l.is_positive())
            .map(|l| l.var())
            .collect();
        let neg_atoms = literals
            .iter()
            .filter(|l| l.is_negative())
            .map(|l| l.var())
            .collect();

        self.bodies.push(Body {
            lit: var.positive(),
            pos_atoms,
            neg_atoms,
        });
        self.interned.insert(literals, var);

        var.positive()
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Records that `literals` (already resolved to a body var by some other means, e.g. a
    /// Tseitin expansion) is known to be equivalent to `lit`, so later lookups via [`Bodies::lit_for`]
    /// find it too.
    pub fn register(&mut self, literals: &[Lit], lit: Lit) {
        let mut sorted = literals.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() > 1 {
            self.interned.insert(sorted, lit.var());
        }
    }

    /// Looks up the literal a conjunction was interned to, applying the same normalization
    /// [`Bodies::intern`] does. Returns `None` for an empty conjunction, since that case needs a
    /// `Variables` to produce [`Variables::true_lit`].
    pub fn lit_for(&self, literals: &[Lit]) -> Option<Lit> {
        let mut sorted = literals.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        match sorted.len() {
            0 => None,
            1 => Some(sorted[0]),
            _ => self.interned.get(&sorted).map(|v| v.positive()),
        }
    }
}
