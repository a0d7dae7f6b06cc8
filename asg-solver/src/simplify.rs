//! Simplification using unit clauses.

use partial_ref::{partial, PartialRef};

use crate::clause::db::filter_clauses;
use crate::context::{parts::*, Context};

/// Drops the trail once search has backtracked to level 0.
///
/// Facts derived at level 0 stay assigned forever, so there's no need to keep them on the trail;
/// doing so would just make it grow without bound over a long search. Returns whether any new
/// level-0 fact was found, which callers use to decide whether to run [`simplify`].
pub fn compact_trail(mut ctx: partial!(Context, mut TrailP)) -> bool {
    let trail = ctx.part_mut(TrailP);

    if trail.current_level() != 0 || trail.trail().is_empty() {
        return false;
    }

    trail.clear();
    true
}

/// Remove satisfied clauses and false literals from the long clause database, using the
/// assignment made at decision level 0.
///
/// Only called once the trail has been fully propagated and search has backtracked to level 0, so
/// any literal still assigned there is a fact for the rest of the search. Binary and ternary
/// implications aren't simplified here: they're cheap enough that collecting their garbage isn't
/// worth the bookkeeping.
pub fn simplify(mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP, AssignmentP)) {
    let (assignment, ctx) = ctx.split_part(AssignmentP);

    let mut new_lits = vec![];

    filter_clauses(ctx, |alloc, cref| {
        let clause = alloc.clause_mut(cref);
        new_lits.clear();
        for &lit in clause.lits() {
            let value = assignment.lit_value(lit);
            if value.is_true() {
                return false;
            } else if value.is_unk() {
                new_lits.push(lit);
            }
        }

        if new_lits.len() < clause.lits().len() {
            match new_lits[..] {
                // Cannot have empty, unit, binary or ternary clauses after full propagation at
                // level 0: those would already have been detected by propagation, and long
                // clauses only ever shrink here, never drop below their minimal length.
                [] | [_] | [_, _] | [_, _, _] => unreachable!(),
                ref lits => {
                    clause.lits_mut()[..lits.len()].copy_from_slice(lits);
                    clause.header_mut().set_len(lits.len());
                    true
                }
            }
        } else {
            true
        }
    })
}
