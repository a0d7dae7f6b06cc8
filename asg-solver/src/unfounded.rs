//! Source-pointer unfounded set checking for non-tight programs.
//!
//! Completion clauses alone are enough to pin down the unique model of a *tight* program (one
//! whose positive atom/body dependency graph has no non-trivial strongly connected component).
//! Outside a non-trivial SCC a true atom always has an acyclic justification, so ordinary unit
//! propagation suffices. Inside one, completion permits "circular support" models that aren't
//! answer sets; this checker rules those out by recomputing, for every true atom in a non-trivial
//! component, whether it has a source: a supporting body whose own positive-SCC atoms are already
//! known-founded.
//!
//! Each call to [`check`] starts every component it has to look at from scratch rather than
//! carrying source pointers across calls and only touching what a newly propagated literal could
//! have invalidated. A fully incremental version would track, per atom, which body currently
//! sources it and react to that body's literal going false; the full-recompute version here is
//! simpler and still sound, just more work per call on large non-trivial components.
//!
//! This runs as the post-propagation fixpoint step after ordinary unit propagation settles (see
//! [`crate::post_propagator`]). Finding a non-empty unfounded set is reported exactly like any
//! other conflicting constraint: [`crate::cdcl`] resolves it the same way it resolves a violated
//! clause, which both keeps the implementation small and means loop nogoods benefit from the same
//! clause learning and activity bookkeeping as everything else.

use partial_ref::{partial, PartialRef};

use asg_formula::lit::{Lit, Var};

use crate::builder::depgraph::DepGraph;
use crate::constraint::ConstraintRef;
use crate::context::{parts::*, Context};
use crate::prop::Conflict;

/// Identifies a reported loop violation.
///
/// At most one loop conflict is ever "in flight" at a time (it is resolved by conflict analysis
/// before the checker runs again), so this carries no payload of its own; the actual clause lives
/// in [`UnfoundedChecker::last_loop`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct LoopId(pub u32);

/// Checker state kept across calls.
#[derive(Default)]
pub struct UnfoundedChecker {
    /// The most recently derived loop nogood, read back by [`reason`]/[`conflict_lits`].
    last_loop: Vec<Lit>,
    sourced: Vec<bool>,
}

impl UnfoundedChecker {
    pub fn set_var_count(&mut self, count: usize) {
        self.sourced.resize(count, false);
    }
}

/// Runs one full fixpoint pass over every non-trivial SCC, deriving a loop nogood for the first
/// component that still has an unfounded atom.
pub fn check(
    mut ctx: partial!(
        Context,
        mut UnfoundedP,
        mut AssignmentP,
        DepGraphP,
        VariablesP,
    ),
) -> Result<(), Conflict> {
    let (depgraph, mut ctx) = ctx.split_part(DepGraphP);
    let var_count = ctx.part(VariablesP).var_count();

    ctx.part_mut(UnfoundedP).set_var_count(var_count);

    for scc in depgraph.non_trivial_sccs() {
        let mut todo: Vec<Var> = scc
            .iter()
            .copied()
            .filter(|&atom| ctx.part(AssignmentP).lit_is_true(atom.positive()))
            .collect();

        if todo.is_empty() {
            continue;
        }

        for &atom in &todo {
            ctx.part_mut(UnfoundedP).sourced[atom.index()] = false;
        }

        let mut changed = true;
        while changed {
            changed = false;
            todo.retain(|&atom| {
                let has_source = depgraph.bodies_supporting(atom).iter().any(|body| {
                    ctx.part(AssignmentP).lit_is_true(body.lit)
                        && body
                            .internal_pos_atoms
                            .iter()
                            .all(|&a| ctx.part(UnfoundedP).sourced[a.index()])
                });

                if has_source {
                    ctx.part_mut(UnfoundedP).sourced[atom.index()] = true;
                    // Confirms a decision-time guess (see `decision::make_decision`) as properly
                    // founded; a no-op for atoms that were already firmly `True`.
                    ctx.part_mut(AssignmentP).promote_weak(atom);
                    changed = true;
                    false
                } else {
                    true
                }
            });
        }

        if !todo.is_empty() {
            let mut clause: Vec<Lit> = todo.iter().map(|&a| !a.positive()).collect();

            let mut ext_bodies = Vec::new();
            for &atom in &todo {
                for body in depgraph.bodies_supporting(atom) {
                    if ctx.part(AssignmentP).lit_is_false(body.lit) {
                        continue;
                    }
                    let fully_internal = !body.internal_pos_atoms.is_empty()
                        && body.internal_pos_atoms.iter().all(|a| todo.contains(a));
                    if !fully_internal && !ext_bodies.contains(&body.lit) {
                        ext_bodies.push(body.lit);
                    }
                }
            }
            clause.extend(ext_bodies);

            ctx.part_mut(UnfoundedP).last_loop = clause;
            return Err(Conflict::Generic(ConstraintRef::Loop(LoopId(0))));
        }
    }

    Ok(())
}

/// Loop nogoods never register their own literal watch in this simplified design; they are found
/// by [`check`] pulling the current assignment instead of being pushed to by it.
pub fn propagate_loop(
    _ctx: partial!(Context, mut AssignmentP, mut ImplGraphP, mut TrailP, mut UnfoundedP),
    _id: LoopId,
    _lit: Lit,
) -> Result<(), Conflict> {
    Ok(())
}

pub fn reason<'out, 'a, 'b>(
    ctx: &'b partial!('b Context, UnfoundedP),
    _id: LoopId,
    _propagated: Var,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    ctx.part(UnfoundedP).last_loop.as_slice()
}

pub fn conflict_lits<'out, 'a, 'b>(
    ctx: &'b partial!('b Context, UnfoundedP),
    _id: LoopId,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    ctx.part(UnfoundedP).last_loop.as_slice()
}
