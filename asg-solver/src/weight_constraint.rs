//! Weight (and cardinality) constraint propagation.
//!
//! A weight rule `head :- bound <= { l1 = w1, ..., ln = wn }` is compiled into one of these
//! instead of being expanded into clauses once it has more literals than
//! [`SolverConfig::extended_rule_clause_threshold`](crate::config::SolverConfig).
//!
//! The constraint tracks `slack`, the sum of the weights of every literal that is not currently
//! false. Whenever `slack` drops below the weight of a still unassigned literal, that literal must
//! become true to keep the bound satisfiable; when `slack` itself drops below zero the bound can
//! no longer be met at all. When registered with a head, it also forces that head true once the
//! literals already assigned true alone reach the bound.
//!
//! This only ever forces things in one direction: a body that cannot yet be proven to meet the
//! bound never falsifies its head. A fully bidirectional weight constraint needs a second
//! "excess weight" watch structure (as used internally by clasp); rules small enough to expand
//! into exact CNF (see [`crate::builder::transform`]) don't need it, and this is deliberately not
//! implemented for larger ones, see `DESIGN.md`.

use partial_ref::{partial, PartialRef};

use asg_formula::lit::{Lit, Var};

use crate::constraint::ConstraintRef;
use crate::context::{parts::*, Context};
use crate::prop::{enqueue_assignment, Antecedent, Conflict};

/// Identifies a weight constraint inside [`WeightConstraints`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct WeightConstraintId(pub u32);

#[derive(Copy, Clone)]
pub struct WeightedLit {
    pub lit: Lit,
    pub weight: u64,
}

pub struct WeightConstraint {
    literals: Vec<WeightedLit>,
    bound: u64,
    slack: i64,
    /// Forced true once the literals assigned true so far already reach `bound`.
    head: Option<Lit>,
}

/// Storage for every weight constraint registered for the lifetime of the program.
#[derive(Default)]
pub struct WeightConstraints {
    constraints: Vec<WeightConstraint>,
}

impl WeightConstraints {
    /// Registers a new weight constraint and returns watches that the caller must install: on the
    /// negation of every literal with non-zero weight, and, when `head` is given, on the literal
    /// itself too (needed to notice when the bound becomes reachable from true literals alone).
    pub fn add(&mut self, literals: Vec<WeightedLit>, bound: u64, head: Option<Lit>) -> (WeightConstraintId, Vec<Lit>) {
        let slack: i64 = literals.iter().map(|l| l.weight as i64).sum::<i64>() - bound as i64;
        let mut watch_lits: Vec<Lit> = literals.iter().filter(|l| l.weight > 0).map(|l| !l.lit).collect();
        if head.is_some() {
            watch_lits.extend(literals.iter().filter(|l| l.weight > 0).map(|l| l.lit));
        }
        let id = WeightConstraintId(self.constraints.len() as u32);
        self.constraints.push(WeightConstraint {
            literals,
            bound,
            slack,
            head,
        });
        (id, watch_lits)
    }

    fn get(&self, id: WeightConstraintId) -> &WeightConstraint {
        &self.constraints[id.0 as usize]
    }

    fn get_mut(&mut self, id: WeightConstraintId) -> &mut WeightConstraint {
        &mut self.constraints[id.0 as usize]
    }
}

/// Called whenever `lit` was just assigned true and some literal of the constraint (or its
/// negation, if a head is registered) watches it.
pub fn propagate(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut TrailP,
        mut WeightConstraintsP,
    ),
    id: WeightConstraintId,
    lit: Lit,
) -> Result<(), Conflict> {
    let is_falsified_watch = ctx
        .part(WeightConstraintsP)
        .get(id)
        .literals
        .iter()
        .any(|entry| entry.lit == !lit);

    if is_falsified_watch {
        let falsified = !lit;
        let weight = ctx
            .part(WeightConstraintsP)
            .get(id)
            .literals
            .iter()
            .find(|entry| entry.lit == falsified)
            .map(|entry| entry.weight)
            .unwrap_or(0);

        let slack = {
            let wc = ctx.part_mut(WeightConstraintsP).get_mut(id);
            wc.slack -= weight as i64;
            wc.slack
        };

        if slack < 0 {
            return Err(Conflict::Generic(ConstraintRef::Weight(id)));
        }

        let pending: Vec<Lit> = ctx
            .part(WeightConstraintsP)
            .get(id)
            .literals
            .iter()
            .filter(|entry| entry.weight as i64 > slack)
            .map(|entry| entry.lit)
            .filter(|&l| ctx.part(AssignmentP).lit_is_unk(l))
            .collect();

        for forced in pending {
            if ctx.part(AssignmentP).lit_is_unk(forced) {
                enqueue_assignment(
                    ctx.borrow(),
                    forced,
                    Antecedent::Generic(ConstraintRef::Weight(id)),
                );
            }
        }
    }

    if let Some(head) = ctx.part(WeightConstraintsP).get(id).head {
        if ctx.part(AssignmentP).lit_is_unk(head) {
            let bound = ctx.part(WeightConstraintsP).get(id).bound;
            let true_weight: u64 = ctx
                .part(WeightConstraintsP)
                .get(id)
                .literals
                .iter()
                .filter(|entry| ctx.part(AssignmentP).lit_is_true(entry.lit))
                .map(|entry| entry.weight)
                .sum();
            if true_weight >= bound {
                enqueue_assignment(ctx.borrow(), head, Antecedent::Generic(ConstraintRef::Weight(id)));
            }
        }
    }

    Ok(())
}

/// Writes `lits` into the shared reason scratch buffer and returns a slice over it.
fn store_reason<'out, 'b>(
    ctx: &'b partial!('b Context, mut TmpDataP),
    lits: Vec<Lit>,
) -> &'out [Lit]
where
    'b: 'out,
{
    let buf = &mut ctx.part_mut(TmpDataP).reason_buf;
    *buf = lits;
    // This slice borrows `TmpData::reason_buf`, which lives in the same `Context` as every other
    // part handed to us, so its lifetime matches the bound above.
    unsafe { std::slice::from_raw_parts(buf.as_ptr(), buf.len()) }
}

/// The false literals of the constraint that were already false strictly before `propagated` was
/// assigned: exactly the literals whose combined weight left `slack` too small to keep
/// `propagated` unassigned, and nothing assigned afterwards. Excludes `propagated` itself even
/// though at call time it reads back as true.
fn forced_by_false<'out, 'a, 'b>(
    ctx: &'b partial!('b Context, AssignmentP, ImplGraphP, WeightConstraintsP, mut TmpDataP),
    id: WeightConstraintId,
    propagated: Var,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    let wc = ctx.part(WeightConstraintsP).get(id);
    let before = ctx.part(ImplGraphP).depth(propagated);
    let reason_lits: Vec<Lit> = wc
        .literals
        .iter()
        .map(|entry| entry.lit)
        .filter(|&lit| ctx.part(AssignmentP).lit_is_false(lit))
        .filter(|&lit| ctx.part(ImplGraphP).depth(lit.var()) < before)
        .collect();

    store_reason(ctx, reason_lits)
}

/// The true literals of the constraint that were already true strictly before `propagated` (the
/// registered head) was assigned: the literals whose combined weight reached `bound` on their
/// own.
fn forced_by_true<'out, 'a, 'b>(
    ctx: &'b partial!('b Context, AssignmentP, ImplGraphP, WeightConstraintsP, mut TmpDataP),
    id: WeightConstraintId,
    propagated: Var,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    let wc = ctx.part(WeightConstraintsP).get(id);
    let before = ctx.part(ImplGraphP).depth(propagated);
    let reason_lits: Vec<Lit> = wc
        .literals
        .iter()
        .map(|entry| entry.lit)
        .filter(|&lit| ctx.part(AssignmentP).lit_is_true(lit))
        .filter(|&lit| ctx.part(ImplGraphP).depth(lit.var()) < before)
        .collect();

    store_reason(ctx, reason_lits)
}

/// The reason for a literal the constraint propagated: for the registered head, the true
/// literals that already reached the bound; for any other literal, the false literals that left
/// no slack. Either way only literals assigned strictly before `propagated` are included, as
/// required for conflict analysis to resolve against it correctly.
pub fn reason<'out, 'a, 'b>(
    ctx: &'b partial!('b Context, AssignmentP, ImplGraphP, WeightConstraintsP, mut TmpDataP),
    id: WeightConstraintId,
    propagated: Var,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    let is_head = ctx.part(WeightConstraintsP).get(id).head.map(Lit::var) == Some(propagated);
    if is_head {
        forced_by_true(ctx, id, propagated)
    } else {
        forced_by_false(ctx, id, propagated)
    }
}

/// The literals making the constraint itself unsatisfiable: every literal currently false. Unlike
/// [`reason`] this has no single propagated literal to order against — the constraint is violated
/// by the full current assignment, not by one forced consequence of it.
pub fn conflict_lits<'out, 'a, 'b>(
    ctx: &'b partial!('b Context, AssignmentP, WeightConstraintsP, mut TmpDataP),
    id: WeightConstraintId,
) -> &'out [Lit]
where
    'a: 'out,
    'b: 'out,
{
    let wc = ctx.part(WeightConstraintsP).get(id);
    let reason_lits: Vec<Lit> = wc
        .literals
        .iter()
        .map(|entry| entry.lit)
        .filter(|&lit| ctx.part(AssignmentP).lit_is_false(lit))
        .collect();

    store_reason(ctx, reason_lits)
}
