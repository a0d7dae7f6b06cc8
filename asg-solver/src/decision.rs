//! Decision heuristics.

pub mod vsids;

use partial_ref::{partial, PartialRef};

use asg_formula::lit::Var;

use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, enqueue_weak_assignment, Antecedent};

/// Re-offers `var` as a candidate for future decisions, e.g. after backtracking unassigns it.
pub fn make_available(mut ctx: partial!(Context, mut VsidsP), var: Var) {
    ctx.part_mut(VsidsP).make_available(var);
}

/// Picks the next branching literal and enqueues it as a new decision.
///
/// Returns `false` if every variable is already assigned (the current assignment is a model).
pub fn make_decision(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        mut VsidsP,
        DepGraphP,
        VariablesP,
    ),
) -> bool {
    loop {
        let var = match ctx.part_mut(VsidsP).next() {
            Some(var) => var,
            None => return false,
        };

        if ctx.part(AssignmentP).var_value(var).is_unk() {
            let sign = if ctx.part(AssignmentP).last_var_value(var) {
                true
            } else {
                ctx.part(VariablesP).preferred_sign(var)
            };
            let decision = var.lit(sign);

            ctx.part_mut(TrailP).new_decision_level();

            // Deciding an atom true inside a non-trivial component is a guess with no proof of
            // support yet; record it weakly so the unfounded set checker can promote it once it
            // finds a source, or leave it for a loop nogood to flip back to false if it never
            // does.
            if sign && ctx.part(DepGraphP).scc_id(var).is_some() {
                enqueue_weak_assignment(ctx.borrow(), decision, Antecedent::Null);
            } else {
                enqueue_assignment(ctx.borrow(), decision, Antecedent::Null);
            }

            return true;
        }
        // Already assigned by propagation since it was last offered; drop it and try the next.
    }
}
