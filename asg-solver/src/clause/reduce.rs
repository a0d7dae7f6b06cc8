//! Clause database reduction.
use std::collections::BinaryHeap;
use std::mem::replace;

use partial_ref::{partial, PartialRef};

use crate::config::ReduceAlgorithm;
use crate::context::{parts::*, Context};
use crate::vec_mut_scan::VecMutScan;

use super::db::{set_clause_tier, try_delete_clause, Tier};

/// Glue threshold above which [`ReduceAlgorithm::Linear`] gives up on a local clause.
const LINEAR_GLUE_CUTOFF: usize = 5;

/// Remove deleted and duplicate entries from the by_tier clause lists.
///
/// This has the side effect of setting the mark bit on all clauses of the tier.
pub fn dedup_and_mark_by_tier(
    mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP),
    tier: Tier,
) {
    let (alloc, mut ctx) = ctx.split_part_mut(ClauseAllocP);
    let by_tier = &mut ctx.part_mut(ClauseDbP).by_tier[tier as usize];

    by_tier.retain(|&cref| {
        let header = alloc.header_mut(cref);
        let retain = !header.deleted() && !header.mark() && header.tier() == tier;
        if retain {
            header.set_mark(true);
        }
        retain
    })
}

/// Reduce the number of local tier clauses, deleting the worst-scoring half (or, for
/// [`ReduceAlgorithm::Linear`], every clause above a fixed glue cutoff).
pub fn reduce_locals(
    mut ctx: partial!(
        Context,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut WatchlistsP,
        AssignmentP,
        ImplGraphP,
        SolverConfigP
    ),
) {
    dedup_and_mark_by_tier(ctx.borrow(), Tier::Local);

    let mut locals = replace(
        &mut ctx.part_mut(ClauseDbP).by_tier[Tier::Local as usize],
        vec![],
    );

    // TODO this should be activity not glue, but we don't track activities yet.
    let algorithm = ctx.part(SolverConfigP).reduce_algorithm;
    let mut to_delete = match algorithm {
        ReduceAlgorithm::FullSort => {
            locals
                .sort_unstable_by_key(|&cref| -(ctx.part(ClauseAllocP).header(cref).glue() as isize));
            locals.len() / 2
        }
        ReduceAlgorithm::Heap => {
            let target = locals.len() / 2;
            let mut heap: BinaryHeap<(usize, usize)> = locals
                .iter()
                .enumerate()
                .map(|(index, &cref)| (ctx.part(ClauseAllocP).header(cref).glue(), index))
                .collect();

            let mut order: Vec<super::ClauseRef> = Vec::with_capacity(locals.len());
            let mut picked = vec![false; locals.len()];
            for _ in 0..target {
                if let Some((_, index)) = heap.pop() {
                    picked[index] = true;
                    order.push(locals[index]);
                }
            }
            for (index, &cref) in locals.iter().enumerate() {
                if !picked[index] {
                    order.push(cref);
                }
            }
            locals = order;
            target
        }
        ReduceAlgorithm::Linear => {
            let cutoff = LINEAR_GLUE_CUTOFF;
            locals.sort_by_key(|&cref| {
                ctx.part(ClauseAllocP).header(cref).glue() <= cutoff
            });
            locals
                .iter()
                .take_while(|&&cref| ctx.part(ClauseAllocP).header(cref).glue() > cutoff)
                .count()
        }
    };

    let mut scan = VecMutScan::new(&mut locals);

    if to_delete > 0 {
        while let Some(cref) = scan.next() {
            ctx.part_mut(ClauseAllocP).header_mut(*cref).set_mark(false);

            if try_delete_clause(ctx.borrow(), *cref) {
                cref.remove();
                to_delete -= 1;
                if to_delete == 0 {
                    break;
                }
            }
        }
    }

    // Make sure to clear all marks
    while let Some(cref) = scan.next() {
        ctx.part_mut(ClauseAllocP).header_mut(*cref).set_mark(false);
    }

    drop(scan);

    ctx.part_mut(ClauseDbP).count_by_tier[Tier::Local as usize] = locals.len();
    ctx.part_mut(ClauseDbP).by_tier[Tier::Local as usize] = locals;
}

/// Reduce the number of mid tier clauses by moving inactive ones to the local tier.
pub fn reduce_mids(mut ctx: partial!(Context, mut ClauseAllocP, mut ClauseDbP)) {
    dedup_and_mark_by_tier(ctx.borrow(), Tier::Mid);

    let mut mids = replace(
        &mut ctx.part_mut(ClauseDbP).by_tier[Tier::Mid as usize],
        vec![],
    );

    mids.retain(|&cref| {
        let header = ctx.part_mut(ClauseAllocP).header_mut(cref);
        header.set_mark(false);

        if header.active() {
            header.set_active(false);
            true
        } else {
            set_clause_tier(ctx.borrow(), cref, Tier::Local);
            false
        }
    });

    ctx.part_mut(ClauseDbP).count_by_tier[Tier::Mid as usize] = mids.len();
    ctx.part_mut(ClauseDbP).by_tier[Tier::Mid as usize] = mids;
}
