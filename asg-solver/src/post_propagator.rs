//! Post-propagation: drives every registered stage to a fixpoint that ordinary unit propagation
//! and the stages themselves all agree on.
//!
//! A fully pluggable `dyn Trait` chain (as in e.g. clasp, where aggregates, heuristics and
//! external propagators all register as independent stages) doesn't fit `partial_ref`'s
//! borrow-splitting model: every stage would need its own statically named part set known up
//! front, which rules out a list resolved at runtime through a vtable. Stages are instead a
//! closed tagged union (`PostPropagatorKind`), the same shape `constraint.rs` uses for
//! `ConstraintRef`, dispatched through a hand-written match.
//!
//! `PostPropagators` keeps stages in a priority-sorted iteration order that is separate from
//! their storage slots, so a slot's index — and the [`PostPropagatorId`] handed back for it —
//! never moves as stages are attached or detached. Detaching tombstones the slot (bumping its
//! generation so a stale id can't be reused) and drops it from the iteration order, rather than
//! shifting every later index the way removing from a plain sorted `Vec` would.

use partial_ref::{partial, PartialRef};

use crate::context::{parts::*, Context};
use crate::prop::Conflict;
use crate::{prop, unfounded};

/// A stage's place in the chain. Lower runs first; ties keep attachment order.
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Debug)]
pub struct Priority(pub u32);

/// Handle to an attached stage, stable across attaching or detaching any other stage.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PostPropagatorId {
    slot: u32,
    generation: u32,
}

/// What a chain slot runs.
///
/// One variant today: the unfounded-set checker is the only constraint in this solver that needs
/// a post-propagation fixpoint pass rather than a plain watched-literal `propagate` callback
/// (`constraint::ConstraintRef`). Anything else that needs the same ("is the current assignment
/// globally consistent with this constraint, possibly across many variables at once") protocol
/// slots in here as a further variant.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum PostPropagatorKind {
    UnfoundedCheck,
}

struct Slot {
    kind: Option<PostPropagatorKind>,
    priority: Priority,
    generation: u32,
}

/// The registered post-propagator chain.
#[derive(Default)]
pub struct PostPropagators {
    /// Append-only storage; a slot's index is its identity and never changes.
    slots: Vec<Slot>,
    /// Slot indices in priority order. The only structure that reshuffles on attach/detach.
    order: Vec<u32>,
}

impl PostPropagators {
    fn attach(&mut self, kind: PostPropagatorKind, priority: Priority) -> PostPropagatorId {
        let slot = self.slots.len() as u32;
        self.slots.push(Slot {
            kind: Some(kind),
            priority,
            generation: 0,
        });
        let pos = self
            .order
            .partition_point(|&i| self.slots[i as usize].priority <= priority);
        self.order.insert(pos, slot);
        PostPropagatorId { slot, generation: 0 }
    }

    /// Removes a stage from the chain. A stale or already-detached id is silently ignored.
    #[allow(dead_code)]
    fn detach(&mut self, id: PostPropagatorId) {
        if let Some(slot) = self.slots.get_mut(id.slot as usize) {
            if slot.generation == id.generation && slot.kind.is_some() {
                slot.kind = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.order.retain(|&i| i != id.slot);
            }
        }
    }

    fn ordered_kinds(&self) -> impl Iterator<Item = PostPropagatorKind> + '_ {
        self.order
            .iter()
            .filter_map(move |&i| self.slots[i as usize].kind)
    }

    /// Registers the unfounded-set checker if it isn't already attached.
    ///
    /// Idempotent because `end_program` can run more than once for the same [`Context`]
    /// (incremental compilation steps): the chain is built once and survives every later step,
    /// so later calls must be no-ops rather than attaching a second copy.
    pub fn ensure_unfounded_check_attached(&mut self) {
        let already_attached = self
            .slots
            .iter()
            .any(|slot| slot.kind == Some(PostPropagatorKind::UnfoundedCheck));
        if !already_attached {
            self.attach(PostPropagatorKind::UnfoundedCheck, Priority(0));
        }
    }
}

/// Drains the propagation queue, then runs every registered stage's `propagate` step in priority
/// order, repeating from plain propagation whenever a stage enqueues further literals, until
/// nothing more is forced.
pub fn propagate_to_fixpoint(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ImplGraphP,
        PostPropagatorsP,
        mut ShortImplP,
        mut TrailP,
        mut WatchlistsP,
        mut WeightConstraintsP,
        mut UnfoundedP,
        mut TmpDataP,
        DepGraphP,
        VariablesP,
    ),
) -> Result<(), Conflict> {
    loop {
        prop::propagate(ctx.borrow())?;

        if ctx.part(TrailP).fully_propagated() {
            let kinds: Vec<PostPropagatorKind> =
                ctx.part(PostPropagatorsP).ordered_kinds().collect();
            for kind in kinds {
                run_stage_propagate(ctx.borrow(), kind)?;
                if !ctx.part(TrailP).fully_propagated() {
                    break;
                }
            }
        }

        if ctx.part(TrailP).fully_propagated() {
            return Ok(());
        }
    }
}

fn run_stage_propagate(
    ctx: partial!(Context, mut AssignmentP, DepGraphP, mut UnfoundedP, VariablesP),
    kind: PostPropagatorKind,
) -> Result<(), Conflict> {
    match kind {
        PostPropagatorKind::UnfoundedCheck => unfounded::check(ctx),
    }
}

/// Runs every stage's `is_model` check: the final pass before a fully propagated, fully assigned
/// trail is reported as a model.
///
/// For the one stage implemented today this ends up doing the same work as `propagate` — the
/// unfounded-set checker never forces a literal outside of raising a loop conflict, so there is
/// no separate "only matters once a model is otherwise complete" case for it — but it is its own
/// entry point so a stage that only needs to check at model time (rather than after every single
/// propagation) has somewhere to hook in without touching the inner fixpoint loop above.
pub fn is_model(
    mut ctx: partial!(Context, mut AssignmentP, PostPropagatorsP, DepGraphP, mut UnfoundedP, VariablesP),
) -> Result<(), Conflict> {
    let kinds: Vec<PostPropagatorKind> = ctx.part(PostPropagatorsP).ordered_kinds().collect();
    for kind in kinds {
        match kind {
            PostPropagatorKind::UnfoundedCheck => unfounded::check(ctx.borrow())?,
        }
    }
    Ok(())
}

/// Calls every stage's `undo_level` hook, for the decision level [`prop::backtrack`] just unwound.
pub fn undo_level(ctx: partial!(Context, PostPropagatorsP, mut UnfoundedP)) {
    for kind in ctx.part(PostPropagatorsP).ordered_kinds() {
        match kind {
            PostPropagatorKind::UnfoundedCheck => {
                // `check` recomputes `sourced` from scratch for every component it visits, so
                // there's no per-level state here to roll back.
            }
        }
    }
}

/// Calls every stage's `reset` hook, once conflict analysis starts resolving a newly found
/// conflict.
pub fn reset(ctx: partial!(Context, PostPropagatorsP, mut UnfoundedP)) {
    for kind in ctx.part(PostPropagatorsP).ordered_kinds() {
        match kind {
            PostPropagatorKind::UnfoundedCheck => {
                // Same as `undo_level`: `last_loop` is overwritten the next time `check` reports
                // a conflict and read nowhere in between, so there's nothing transient to drop.
            }
        }
    }
}
