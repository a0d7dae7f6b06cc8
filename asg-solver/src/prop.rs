//! Unit propagation.
pub mod assignment;
pub mod graph;
pub mod long;
pub mod short;
pub mod watch;

use partial_ref::{partial, PartialRef};

use crate::constraint;
use crate::context::{parts::*, Context};

pub use assignment::{
    backtrack, enqueue_assignment, enqueue_weak_assignment, full_restart, restart, Assignment,
    Trail, Value,
};
pub use graph::{Antecedent, Conflict, ImplGraph, ImplNode};
pub use short::ShortImplications;
pub use watch::{Watch, Watchlists};

/// Drains the propagation queue, running short clause, long clause and generic constraint
/// propagation for every newly assigned literal.
///
/// Returns as soon as any of the three finds a conflict; the caller is responsible for calling
/// this again (via [`crate::post_propagator::propagate_to_fixpoint`]) after post-propagators enqueue
/// further literals.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        mut ShortImplP,
        mut TrailP,
        mut WatchlistsP,
        mut WeightConstraintsP,
        mut UnfoundedP,
        mut TmpDataP,
    ),
) -> Result<(), Conflict> {
    loop {
        let lit = match ctx.part_mut(TrailP).pop_queue() {
            Some(lit) => lit,
            None => return Ok(()),
        };

        short::propagate_short(ctx.borrow(), lit)?;
        long::propagate_long(ctx.borrow(), lit)?;
        constraint::propagate_generic(ctx.borrow(), lit)?;
    }
}
