//! Model capture.
//!
//! Once the trail reaches a full assignment at decision level 0 or above with nothing left to
//! propagate, the current assignment is a model. This snapshots it so later search (e.g. finding
//! the next, lexicographically better, model for a minimize statement) can keep going without
//! losing the one already found.

use partial_ref::{partial, PartialRef};

use asg_formula::lit::{Lit, Var};

use crate::context::{parts::*, Context};
use crate::prop::Value;
use crate::state::SatState;

/// A captured satisfying assignment.
#[derive(Default)]
pub struct Model {
    assignment: Vec<Option<bool>>,
}

impl Model {
    pub fn assignment(&self) -> &[Option<bool>] {
        &self.assignment
    }

    pub fn var_value(&self, var: Var) -> Option<bool> {
        self.assignment.get(var.index()).copied().flatten()
    }

    pub fn lit_is_true(&self, lit: Lit) -> bool {
        self.var_value(lit.var()) == Some(lit.is_positive())
    }

    /// Every true atom that is part of the projected view, or every true atom if nothing was ever
    /// marked projected.
    pub fn answer_set(&self, variables: &crate::variables::Variables) -> Vec<Var> {
        let any_projected = (0..variables.var_count())
            .any(|i| variables.is_projected(Var::from_index(i)));
        (0..variables.var_count())
            .map(Var::from_index)
            .filter(|&v| self.var_value(v) == Some(true))
            .filter(|&v| {
                matches!(variables.kind(v), crate::variables::VarKind::Atom)
                    && (!any_projected || variables.is_projected(v))
            })
            .collect()
    }
}

/// Captures the current full assignment as a model and marks the solver state [`SatState::Sat`].
pub fn capture(
    mut ctx: partial!(Context, mut ModelP, mut SolverStateP, AssignmentP, VariablesP),
) {
    let (variables, mut ctx) = ctx.split_part(VariablesP);
    let var_count = variables.var_count();

    let assignment: Vec<Option<bool>> = (0..var_count)
        .map(Var::from_index)
        .map(|v| match ctx.part(AssignmentP).var_value(v) {
            Value::True | Value::WeakTrue => Some(true),
            Value::False => Some(false),
            Value::Free => None,
        })
        .collect();

    ctx.part_mut(ModelP).assignment = assignment;
    ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
}
