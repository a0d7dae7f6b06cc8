//! Dispatch for everything beyond a plain clause that can own a watch and act as the antecedent
//! of a propagated literal.
//!
//! Clause propagation is the hot path and never leaves this tagged union: matching on
//! [`ConstraintRef`] compiles to a jump table, not a vtable call. Weight constraints and loop
//! nogoods are comparatively rare, so paying one extra match arm for them costs nothing
//! measurable.

use partial_ref::{partial, PartialRef};

use asg_formula::lit::{Lit, Var};

use crate::clause::ClauseRef;
use crate::context::{parts::*, Context};
use crate::prop::Conflict;
use crate::unfounded::LoopId;
use crate::weight_constraint::WeightConstraintId;

/// A reference to anything that can own a watch and act as the antecedent of a propagated
/// literal, besides a plain unit/binary/ternary clause.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ConstraintRef {
    Clause(ClauseRef),
    Weight(WeightConstraintId),
    Loop(LoopId),
}

/// Notifies every generic constraint watching `lit` that it was just assigned true.
pub fn propagate_generic(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        mut WeightConstraintsP,
        mut UnfoundedP,
        WatchlistsP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    let watchers = ctx.part(WatchlistsP).generic_watched_by(lit).to_vec();
    for constraint in watchers {
        match constraint {
            ConstraintRef::Clause(_) => {
                unreachable!("clauses are propagated through the dedicated clause watchlist")
            }
            ConstraintRef::Weight(id) => {
                crate::weight_constraint::propagate(ctx.borrow(), id, lit)?;
            }
            ConstraintRef::Loop(id) => {
                crate::unfounded::propagate_loop(ctx.borrow(), id, lit)?;
            }
        }
    }
    Ok(())
}

/// Builds the reason literals for a propagation whose antecedent is a generic constraint.
pub fn reason_lits<'out, 'a, 'b>(
    ctx: &'b partial!(
        'b Context,
        AssignmentP,
        ClauseAllocP,
        ImplGraphP,
        WeightConstraintsP,
        UnfoundedP,
        mut TmpDataP,
    ),
    cref: ConstraintRef,
    propagated: Var,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    match cref {
        ConstraintRef::Clause(cref) => &ctx.part(ClauseAllocP).clause(cref).lits()[1..],
        ConstraintRef::Weight(id) => crate::weight_constraint::reason(ctx, id, propagated),
        ConstraintRef::Loop(id) => crate::unfounded::reason(ctx, id, propagated),
    }
}

/// Builds the literals of a constraint that is itself the source of a conflict.
pub fn conflict_lits<'out, 'a, 'b>(
    ctx: &'b partial!(
        'b Context,
        AssignmentP,
        ClauseAllocP,
        WeightConstraintsP,
        UnfoundedP,
        mut TmpDataP,
    ),
    cref: ConstraintRef,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    match cref {
        ConstraintRef::Clause(cref) => ctx.part(ClauseAllocP).clause(cref).lits(),
        ConstraintRef::Weight(id) => crate::weight_constraint::conflict_lits(ctx, id),
        ConstraintRef::Loop(id) => crate::unfounded::conflict_lits(ctx, id),
    }
}
