//! Conflict driven clause learning.

use partial_ref::{partial, PartialRef};

use crate::analyze_conflict::analyze_conflict;
use crate::clause::{assess_learned_clause, bump_clause, db, decay_clause_activities};
use crate::context::{parts::*, Context};
use crate::decision::make_decision;
use crate::post_propagator::{self, propagate_to_fixpoint};
use crate::prop::{backtrack, enqueue_assignment, Antecedent, Conflict};
use crate::simplify::{compact_trail, simplify};
use crate::state::SatState;

/// Find a conflict, learn a clause and backtrack.
pub fn conflict_step(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseActivityP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        PostPropagatorsP,
        mut ShortImplP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut UnfoundedP,
        mut VsidsP,
        mut WatchlistsP,
        mut WeightConstraintsP,
        DepGraphP,
        SolverConfigP,
        VariablesP,
    ),
) {
    let conflict = match find_conflict(ctx.borrow()) {
        Ok(()) => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Sat;
            return;
        }
        Err(conflict) => conflict,
    };

    let backtrack_to = analyze_conflict(ctx.borrow(), conflict);

    post_propagator::reset(ctx.borrow());

    let (analyze, mut ctx) = ctx.split_part(AnalyzeConflictP);

    for &cref in analyze.involved() {
        bump_clause(ctx.borrow(), cref);
    }

    decay_clause_activities(ctx.borrow());

    backtrack(ctx.borrow(), backtrack_to);

    post_propagator::undo_level(ctx.borrow());

    for &cref in analyze.subsumed() {
        if db::try_delete_clause(ctx.borrow(), cref) {
            ctx.part_mut(ClauseAllocP).header_mut(cref).set_tagged(false);
        }
    }

    let clause = analyze.clause();

    match clause.len() {
        0 => {
            ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
            return;
        }
        1 => enqueue_assignment(ctx.borrow(), clause[0], Antecedent::Null),
        2 => {
            ctx.part_mut(ShortImplP)
                .add_binary_clause([clause[0], clause[1]]);
            enqueue_assignment(ctx.borrow(), clause[0], Antecedent::Binary([clause[1]]));
        }
        3 => {
            ctx.part_mut(ShortImplP)
                .add_ternary_clause([clause[0], clause[1], clause[2]]);
            enqueue_assignment(
                ctx.borrow(),
                clause[0],
                Antecedent::Ternary([clause[1], clause[2]]),
            );
        }
        _ => {
            let header = assess_learned_clause(ctx.borrow(), clause);
            let cref = db::add_clause(ctx.borrow(), header, clause);
            enqueue_assignment(
                ctx.borrow(),
                clause[0],
                Antecedent::Generic(crate::constraint::ConstraintRef::Clause(cref)),
            );
        }
    }
}

/// Find a conflict.
///
/// Returns `Err` if a conflict was found and `Ok` if a satisfying assignment was found instead.
fn find_conflict(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        PostPropagatorsP,
        mut ShortImplP,
        mut TmpDataP,
        mut TrailP,
        mut UnfoundedP,
        mut VsidsP,
        mut WatchlistsP,
        mut WeightConstraintsP,
        DepGraphP,
        VariablesP,
    ),
) -> Result<(), Conflict> {
    loop {
        propagate_to_fixpoint(ctx.borrow())?;

        if compact_trail(ctx.borrow()) {
            simplify(ctx.borrow());
        }

        if !make_decision(ctx.borrow()) {
            post_propagator::is_model(ctx.borrow())?;
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use asg_formula::cnf_formula;
    use asg_formula::test::{sat_formula, sgen_unsat_formula};
    use proptest::prelude::*;

    use partial_ref::IntoPartialRefMut;

    use crate::context::set_var_count;
    use crate::load::load_clause;

    #[test]
    fn level_0_unsat() {
        let mut ctx = Context::default();
        let mut ctx = ctx.into_partial_ref_mut();

        let formula = cnf_formula![
            1, 2, 3;
            -1;
            1, -2;
            2, -3;
        ];

        set_var_count(ctx.borrow(), formula.var_count());

        for clause in formula.iter() {
            load_clause(ctx.borrow(), clause);
        }

        while ctx.part(SolverStateP).sat_state == SatState::Unknown {
            conflict_step(ctx.borrow());
        }

        assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
    }

    proptest! {
        #[test]
        fn sgen_unsat(formula in sgen_unsat_formula(1..7usize)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            while ctx.part(SolverStateP).sat_state == SatState::Unknown {
                conflict_step(ctx.borrow());
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Unsat);
        }

        #[test]
        fn sat(formula in sat_formula(4..20usize, 10..100usize, 0.05..0.2, 0.9..1.0)) {
            let mut ctx = Context::default();
            let mut ctx = ctx.into_partial_ref_mut();

            set_var_count(ctx.borrow(), formula.var_count());

            for clause in formula.iter() {
                load_clause(ctx.borrow(), clause);
            }

            while ctx.part(SolverStateP).sat_state == SatState::Unknown {
                conflict_step(ctx.borrow());
            }

            prop_assert_eq!(ctx.part(SolverStateP).sat_state, SatState::Sat);

            for clause in formula.iter() {
                prop_assert!(clause.iter().any(|&lit| ctx.part(AssignmentP).lit_is_true(lit)));
            }
        }
    }
}
