//! Ground rule representation as handed to the builder, before interning.

use asg_formula::lit::{Lit, Var};

/// The five ground rule shapes the builder accepts.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum RuleKind {
    /// `head :- body.` A single atom, derived whenever the body holds.
    Basic,
    /// `{ heads } :- body.` Any non-empty subset of `heads` may be derived.
    Choice,
    /// `head :- bound <= #count{ body }.` An unweighted cardinality rule.
    Cardinality,
    /// `head :- bound <= #sum{ body (with weights) }.` The general weight rule.
    Weight,
    /// `#minimize{ body (with weights) }.` Not a derivation rule: a cost term contributing to the
    /// optimization objective at a given priority.
    Minimize,
}

/// One ground rule, referencing atoms by their external, possibly sparse, user-chosen ids.
pub struct GroundRule {
    pub kind: RuleKind,
    pub heads: Vec<Var>,
    /// Positive and negative body literals (weight 1 each unless `weights` is set).
    pub body: Vec<Lit>,
    /// Parallel to `body`; empty for [`RuleKind::Basic`] and [`RuleKind::Choice`], where every
    /// literal implicitly has weight 1.
    pub weights: Vec<u64>,
    /// The cardinality/weight bound, or (for minimize rules) the priority level.
    pub bound: u64,
}

impl GroundRule {
    pub fn basic(head: Var, body: Vec<Lit>) -> GroundRule {
        GroundRule {
            kind: RuleKind::Basic,
            heads: vec![head],
            body,
            weights: Vec::new(),
            bound: 0,
        }
    }

    pub fn choice(heads: Vec<Var>, body: Vec<Lit>) -> GroundRule {
        GroundRule {
            kind: RuleKind::Choice,
            heads,
            body,
            weights: Vec::new(),
            bound: 0,
        }
    }

    pub fn cardinality(head: Var, body: Vec<Lit>, bound: u64) -> GroundRule {
        GroundRule {
            kind: RuleKind::Cardinality,
            heads: vec![head],
            body,
            weights: Vec::new(),
            bound,
        }
    }

    pub fn weight(head: Var, body: Vec<Lit>, weights: Vec<u64>, bound: u64) -> GroundRule {
        GroundRule {
            kind: RuleKind::Weight,
            heads: vec![head],
            body,
            weights,
            bound,
        }
    }

    pub fn minimize(body: Vec<Lit>, weights: Vec<u64>, priority: u32) -> GroundRule {
        GroundRule {
            kind: RuleKind::Minimize,
            heads: Vec::new(),
            body,
            weights,
            bound: priority as u64,
        }
    }
}
