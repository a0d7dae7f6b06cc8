//! Partial assignment and backtracking.
use partial_ref::{partial, PartialRef};

use asg_formula::lit::{Lit, LitIdx, Var};

use crate::context::{parts::*, Context};
use crate::decision::make_available;

use super::Antecedent;

/// The value of a variable.
///
/// [`WeakTrue`](Value::WeakTrue) is set when a decision picks an atom inside a non-trivial
/// dependency component true: a guess with no supporting body proven yet. It behaves exactly like
/// [`True`](Value::True) for propagation and conflict analysis; only the unfounded set checker
/// distinguishes the two, either promoting a sourced atom to `True` or leaving it to be flipped
/// back to `False` by a loop nogood if no source is ever found.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Value {
    Free,
    True,
    False,
    WeakTrue,
}

impl Value {
    #[inline]
    pub fn from_bool(value: bool) -> Value {
        if value {
            Value::True
        } else {
            Value::False
        }
    }

    #[inline]
    pub fn is_true(self) -> bool {
        matches!(self, Value::True | Value::WeakTrue)
    }

    #[inline]
    pub fn is_false(self) -> bool {
        self == Value::False
    }

    #[inline]
    pub fn is_unk(self) -> bool {
        self == Value::Free
    }

    #[inline]
    pub(crate) fn negate(self) -> Value {
        match self {
            Value::True | Value::WeakTrue => Value::False,
            Value::False => Value::True,
            Value::Free => Value::Free,
        }
    }
}

/// Current partial assignment.
#[derive(Default)]
pub struct Assignment {
    assignment: Vec<Value>,
    last_value: Vec<bool>,
}

impl Assignment {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.assignment.resize(count, Value::Free);
        self.last_value.resize(count, false);
    }

    /// Current partial assignment as slice.
    pub fn assignment(&self) -> &[Value] {
        &self.assignment
    }

    /// Value assigned to a variable.
    pub fn var_value(&self, var: Var) -> Value {
        self.assignment[var.index()]
    }

    /// Value last assigned to a variable.
    ///
    /// If the variable is currently assigned this returns the previously assigned value. If the
    /// variable was never assigned this returns false.
    pub fn last_var_value(&self, var: Var) -> bool {
        self.last_value[var.index()]
    }

    /// Value assigned to a literal.
    pub fn lit_value(&self, lit: Lit) -> Value {
        let value = self.assignment[lit.index()];
        if lit.is_negative() {
            value.negate()
        } else {
            value
        }
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.lit_value(lit).is_true()
    }

    pub fn lit_is_false(&self, lit: Lit) -> bool {
        self.lit_value(lit).is_false()
    }

    pub fn lit_is_unk(&self, lit: Lit) -> bool {
        self.lit_value(lit).is_unk()
    }

    pub fn assign_lit(&mut self, lit: Lit) {
        self.assignment[lit.index()] = Value::from_bool(lit.is_positive());
    }

    /// Records support for `lit` without yet promoting it to a firm assignment.
    pub fn assign_lit_weak(&mut self, lit: Lit) {
        debug_assert!(lit.is_positive());
        self.assignment[lit.index()] = Value::WeakTrue;
    }

    /// Turns a [`Value::WeakTrue`] assignment into a plain [`Value::True`].
    pub fn promote_weak(&mut self, var: Var) {
        if self.assignment[var.index()] == Value::WeakTrue {
            self.assignment[var.index()] = Value::True;
        }
    }
}

/// Decision and propagation history.
#[derive(Default)]
pub struct Trail {
    /// Stack of all propagated and all enqueued assignments
    trail: Vec<Lit>,
    /// Next assignment in trail to propagate
    queue_head_pos: usize,
    /// Decision levels as trail indices.
    decisions: Vec<LitIdx>,
}

impl Trail {
    /// Return the next assigned literal to propagate.
    pub fn queue_head(&self) -> Option<Lit> {
        self.trail.get(self.queue_head_pos).cloned()
    }

    ///  Return the next assigned literal to propagate and remove it from the queue.
    pub fn pop_queue(&mut self) -> Option<Lit> {
        let head = self.queue_head();
        if head.is_some() {
            self.queue_head_pos += 1;
        }
        head
    }

    /// Re-enqueue all assigned literals.
    pub fn reset_queue(&mut self) {
        self.queue_head_pos = 0;
    }

    /// Assigned literals in assignment order.
    pub fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Clear the trail.
    ///
    /// This simply removes all entries without performing any backtracking. Can only be called
    /// with no active decisions.
    pub fn clear(&mut self) {
        assert!(self.decisions.is_empty());
        self.trail.clear();
        self.queue_head_pos = 0;
    }

    /// Start a new decision level.
    ///
    /// Does not enqueue the decision itself.
    pub fn new_decision_level(&mut self) {
        self.decisions.push(self.trail.len() as LitIdx)
    }

    /// Current decision level.
    pub fn current_level(&self) -> usize {
        self.decisions.len()
    }

    /// The number of assignments at level 0.
    pub fn top_level_assignment_count(&self) -> usize {
        self.decisions
            .get(0)
            .map(|&len| len as usize)
            .unwrap_or_else(|| self.trail.len())
    }

    /// Whether all assignments are processed.
    pub fn fully_propagated(&self) -> bool {
        self.queue_head_pos == self.trail.len()
    }

    pub fn decision_lit(&self, level: usize) -> Lit {
        self.trail[self.decisions[level - 1] as usize]
    }
}

/// Enqueues the assignment of true to a literal.
///
/// This updates the assignment and trail, but does not perform any propagation. The literal has
/// to be unassigned when calling this.
pub fn enqueue_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    antecedent: Antecedent,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == Value::Free);

    assignment.assign_lit(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    trail.trail.push(lit);

    let level = trail.decisions.len();
    let depth = trail.trail.len();
    ctx.part_mut(ImplGraphP)
        .set_node(lit.var(), antecedent, level, depth);
}

/// Like [`enqueue_assignment`] but only records weak support, for a decision that guesses an
/// atom true without yet having a founding body for it.
pub fn enqueue_weak_assignment(
    mut ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP),
    lit: Lit,
    antecedent: Antecedent,
) {
    let assignment = ctx.part_mut(AssignmentP);
    debug_assert!(assignment.lit_value(lit) == Value::Free);

    assignment.assign_lit_weak(lit);

    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    trail.trail.push(lit);

    let level = trail.decisions.len();
    let depth = trail.trail.len();
    ctx.part_mut(ImplGraphP)
        .set_node(lit.var(), antecedent, level, depth);
}

/// Undo all assignments in decision levels deeper than the given level.
pub fn backtrack(
    mut ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP),
    level: usize,
) {
    let (assignment, mut ctx) = ctx.split_part_mut(AssignmentP);
    let (trail, mut ctx) = ctx.split_part_mut(TrailP);

    if level == trail.decisions.len() {
        return;
    }

    let new_trail_len = trail.decisions[level] as usize;

    trail.queue_head_pos = new_trail_len;
    trail.decisions.truncate(level);

    let trail_end = &trail.trail[new_trail_len..];
    for &lit in trail_end {
        make_available(ctx.borrow(), lit.var());
        let var_assignment = &mut assignment.assignment[lit.var().index()];
        assignment.last_value[lit.var().index()] = var_assignment.is_true();
        *var_assignment = Value::Free;
    }
    trail.trail.truncate(new_trail_len);
}

/// Undo all decisions.
pub fn full_restart(ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP)) {
    backtrack(ctx, 0);
}

/// Alias kept for call sites that restart mid-search rather than between solve calls.
pub fn restart(ctx: partial!(Context, mut AssignmentP, mut TrailP, mut VsidsP)) {
    backtrack(ctx, 0);
}
