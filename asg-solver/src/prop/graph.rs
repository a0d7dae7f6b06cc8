//! The implication graph.

use partial_ref::{partial, PartialRef};

use asg_formula::lit::{Lit, LitIdx, Var};

use crate::clause::ClauseRef;
use crate::constraint::{self, ConstraintRef};
use crate::context::{parts::*, Context};

/// Assignments that caused a propagation.
///
/// Four tags cover every antecedent kind the solver produces: a fact has no antecedent at all, a
/// short implication is stored inline (binary and ternary clauses never touch the clause
/// allocator), and everything else — long clauses, weight constraints, loop nogoods — is reached
/// through [`ConstraintRef`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Antecedent {
    Null,
    Binary([Lit; 1]),
    Ternary([Lit; 2]),
    Generic(ConstraintRef),
}

impl Antecedent {
    /// The literals that caused the propagation of `propagated`.
    pub fn lits<'out, 'a, 'b>(
        &'a self,
        propagated: Var,
        ctx: &'b partial!(
            'b Context,
            AssignmentP,
            ClauseAllocP,
            ImplGraphP,
            WeightConstraintsP,
            UnfoundedP,
            mut TmpDataP,
        ),
    ) -> &'out [Lit]
    where
        'a: 'out,
        'b: 'out,
    {
        match self {
            Antecedent::Null => &[],
            Antecedent::Binary(lit) => lit,
            Antecedent::Ternary(lits) => lits,
            Antecedent::Generic(cref) => constraint::reason_lits(ctx, *cref, propagated),
        }
    }
}

/// Propagation that resulted in a conflict.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Conflict {
    Binary([Lit; 2]),
    Ternary([Lit; 3]),
    Generic(ConstraintRef),
}

impl Conflict {
    /// The literals that caused the conflict.
    pub fn lits<'out, 'a, 'b>(
        &'a self,
        ctx: &'b partial!(
            'b Context,
            AssignmentP,
            ClauseAllocP,
            WeightConstraintsP,
            UnfoundedP,
            mut TmpDataP,
        ),
    ) -> &'out [Lit]
    where
        'a: 'out,
        'b: 'out,
    {
        match self {
            Conflict::Binary(lits) => lits,
            Conflict::Ternary(lits) => lits,
            Conflict::Generic(ConstraintRef::Clause(cref)) => {
                ctx.part(ClauseAllocP).clause(*cref).lits()
            }
            Conflict::Generic(cref) => constraint::conflict_lits(ctx, *cref),
        }
    }
}

/// Node and incoming edges of the implication graph.
#[derive(Copy, Clone)]
pub struct ImplNode {
    pub antecedent: Antecedent,
    pub level: LitIdx,
    /// Position in the trail at assignment time, used to order the DFS in conflict analysis.
    pub depth: LitIdx,
}

/// The implication graph.
///
/// This is a DAG having all assigned variables as nodes. It has unit clauses and decisions as
/// sources. For each propagated assignment it has incoming edges from the literals whose
/// assignment caused the propagation to happen.
#[derive(Default)]
pub struct ImplGraph {
    /// Contains only valid data for indices of assigned variables.
    nodes: Vec<ImplNode>,
}

impl ImplGraph {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.nodes.resize(
            count,
            ImplNode {
                antecedent: Antecedent::Null,
                level: 0,
                depth: 0,
            },
        );
    }

    /// Get the antecedent for an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn antecedent(&self, var: Var) -> &Antecedent {
        &self.nodes[var.index()].antecedent
    }

    /// Get the decision level of an assigned variable.
    ///
    /// Returns stale data if the variable isn't assigned.
    pub fn level(&self, var: Var) -> usize {
        self.nodes[var.index()].level as usize
    }

    /// Get the trail position of an assigned variable.
    pub fn depth(&self, var: Var) -> usize {
        self.nodes[var.index()].depth as usize
    }

    /// Updates the antecedent for an assigned variable.
    ///
    /// Make sure the antecedent's vars are in front of the assigned variable in the trail.
    pub fn update_antecedent(&mut self, var: Var, antecedent: Antecedent) {
        self.nodes[var.index()].antecedent = antecedent;
    }

    pub(crate) fn set_node(&mut self, var: Var, antecedent: Antecedent, level: usize, depth: usize) {
        let node = &mut self.nodes[var.index()];
        node.antecedent = antecedent;
        node.level = level as LitIdx;
        node.depth = depth as LitIdx;
    }
}
