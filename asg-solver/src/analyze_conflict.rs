//! Learns a new clause by analyzing a conflict.
use std::mem::swap;

use partial_ref::{partial, split_borrow, PartialRef};

use asg_formula::lit::{Lit, Var};

use crate::clause::ClauseRef;
use crate::config::MinimizeMode;
use crate::constraint::ConstraintRef;
use crate::context::{parts::*, Context};
use crate::prop::{Antecedent, Conflict};
use crate::vec_mut_scan::VecMutScan;

/// Temporaries for conflict analysis
#[derive(Default)]
pub struct AnalyzeConflict {
    /// This is the learned clause after analysis finishes.
    clause: Vec<Lit>,
    /// Number of literals in the current clause at the current level.
    current_level_count: usize,
    /// Variables in the current clause.
    var_flags: Vec<bool>,
    /// Entries to clean in `var_flags`.
    to_clean: Vec<Var>,
    /// Long clauses to bump.
    involved: Vec<ClauseRef>,
    /// Stack for recursive minimization.
    stack: Vec<Lit>,
    /// Antecedent clauses found subsumed by the clause being learned, tagged for deletion once
    /// they're no longer locked.
    subsumed: Vec<ClauseRef>,
}

impl AnalyzeConflict {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.var_flags.resize(count, false);
    }

    /// The learned clause.
    pub fn clause(&self) -> &[Lit] {
        &self.clause
    }

    /// Long clauses involved in the conflict.
    pub fn involved(&self) -> &[ClauseRef] {
        &self.involved
    }

    /// Antecedent clauses found subsumed by the clause just learned, still to be swept once
    /// unlocked by backtracking.
    pub fn subsumed(&self) -> &[ClauseRef] {
        &self.subsumed
    }
}

/// Learns a new clause by analyzing a conflict.
///
/// Returns the lowest decision level that makes the learned clause asserting.
pub fn analyze_conflict(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut TmpDataP,
        mut VsidsP,
        AssignmentP,
        ClauseAllocP,
        ImplGraphP,
        SolverConfigP,
        TrailP,
        UnfoundedP,
        WeightConstraintsP,
    ),
    conflict: Conflict,
) -> usize {
    split_borrow!(
        lit_ctx = &(AssignmentP, ClauseAllocP, ImplGraphP, WeightConstraintsP, UnfoundedP, mut TmpDataP) ctx
    );

    {
        let analyze = ctx.part_mut(AnalyzeConflictP);

        analyze.clause.clear();
        analyze.involved.clear();
        analyze.subsumed.clear();
        analyze.current_level_count = 0;
    }

    // We start with all the literals of the conflicted clause
    let conflict_lits = conflict.lits(&lit_ctx);

    if ctx.part(TrailP).current_level() == 0 {
        // Conflict with no decisions, generate empty clause
        return 0;
    }

    for &lit in conflict_lits {
        add_literal(ctx.borrow(), lit);
    }

    if let Conflict::Generic(ConstraintRef::Clause(cref)) = conflict {
        ctx.part_mut(AnalyzeConflictP).involved.push(cref);
    }

    // To get rid of all but one literal of the current level, we resolve the clause with the
    // antecedent for those literals. The correct order for this is reverse chronological.

    split_borrow!(ctx_trail = &(TrailP) ctx);

    for &lit in ctx_trail.part(TrailP).trail().iter().rev() {
        let analyze = ctx.part_mut(AnalyzeConflictP);
        let lit_present = &mut analyze.var_flags[lit.index()];
        // Is the lit present in the current clause?
        if *lit_present {
            *lit_present = false;
            analyze.current_level_count -= 1;
            if analyze.current_level_count == 0 {
                // lit is the last literal of the current level present in the current clause,
                // therefore the resulting clause will assert !lit so we put in position 0
                analyze.clause.push(!lit);
                let end = analyze.clause.len() - 1;
                analyze.clause.swap(0, end);

                break;
            } else {
                // We removed the literal and now add its antecedent.
                let antecedent = *ctx.part(ImplGraphP).antecedent(lit.var());

                let lits = antecedent.lits(lit.var(), &lit_ctx);

                // On-the-fly subsumption: if every other literal of this antecedent clause is
                // already part of the clause being learned, the antecedent contributes nothing
                // new and is subsumed by it. Tag it now, while we still have its literals at
                // hand; it's locked as `lit`'s reason until backtracking undoes that, so deletion
                // itself has to wait.
                if let Antecedent::Generic(ConstraintRef::Clause(cref)) = antecedent {
                    if ctx.part(SolverConfigP).on_the_fly_subsumption
                        && lits
                            .iter()
                            .all(|reason_lit| ctx.part(AnalyzeConflictP).var_flags[reason_lit.index()])
                    {
                        ctx.part_mut(ClauseAllocP).header_mut(cref).set_tagged(true);
                        ctx.part_mut(AnalyzeConflictP).subsumed.push(cref);
                    }
                }

                for &reason_lit in lits {
                    add_literal(ctx.borrow(), reason_lit);
                }

                if let Antecedent::Generic(ConstraintRef::Clause(cref)) = antecedent {
                    ctx.part_mut(AnalyzeConflictP).involved.push(cref);
                }
            }
        }
    }

    // This needs var_flags set and keeps some var_flags set.
    minimize_clause(ctx.borrow());

    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);

    for var in analyze.to_clean.drain(..) {
        analyze.var_flags[var.index()] = false;
    }

    // We find the highest level literal besides the asserted literal and move it into position 1.
    // This is important to ensure the watchlist constraints are not violated on backtracking.
    let mut backtrack_to = 0;

    if analyze.clause.len() > 1 {
        let (prefix, rest) = analyze.clause.split_at_mut(2);
        let lit_1 = &mut prefix[1];
        backtrack_to = ctx.part(ImplGraphP).level(lit_1.var());
        for lit in rest.iter_mut() {
            let lit_level = ctx.part(ImplGraphP).level(lit.var());
            if lit_level > backtrack_to {
                backtrack_to = lit_level;
                swap(lit_1, lit);
            }
        }
    }

    ctx.part_mut(VsidsP).decay();

    backtrack_to
}

/// Add a literal to the current clause.
fn add_literal(
    mut ctx: partial!(Context, mut AnalyzeConflictP, mut VsidsP, ImplGraphP, TrailP),
    lit: Lit,
) {
    let (analyze, mut ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let lit_level = ctx.part(ImplGraphP).level(lit.var());
    // No need to add literals that are set by unit clauses or already present
    if lit_level > 0 && !analyze.var_flags[lit.index()] {
        ctx.part_mut(VsidsP).bump(lit.var());

        analyze.var_flags[lit.index()] = true;
        if lit_level == ctx.part(TrailP).current_level() {
            analyze.current_level_count += 1;
        } else {
            analyze.clause.push(lit);
            analyze.to_clean.push(lit.var());
        }
    }
}

/// A Bloom filter of levels.
#[derive(Default)]
struct LevelAbstraction {
    bits: u64,
}

impl LevelAbstraction {
    /// Add a level to the Bloom filter.
    pub fn add(&mut self, level: usize) {
        self.bits |= 1 << (level % 64)
    }

    /// Test whether a level could be in the Bloom filter.
    pub fn test(&self, level: usize) -> bool {
        self.bits & (1 << (level % 64)) != 0
    }
}

/// Performs recursive clause minimization.
///
/// **Note:** Requires AnalyzeConflict's var_flags to be set for exactly the variables of the
/// unminimized clause. This also sets some more var_flags, but lists them in to_clean.
///
/// This routine tries to remove some redundant literals of the learned clause. The idea is to
/// detect literals of the learned clause that are already implied by other literals of the clause.
///
/// This is done by performing a DFS in the implication graph (following edges in reverse) for each
/// literal (apart from the asserting one). The search doesn't expand literals already known to be
/// implied by literals of the clause. When a decision literal that is not in the clause is found,
/// it means that the literal is not redundant.
///
/// There are two optimizations used here: The first one is to stop the search as soon as a literal
/// of a decision level not present in the clause is found. If the DFS would be continued it would
/// at some point reach the decision of that level. That decision belongs to a level not in the
/// clause and thus itself can't be in the clause. Checking whether the decision level is among the
/// clause's decision levels is done approximately using a Bloom filter.
///
/// The other optimization is to avoid duplicating work during the DFS searches. When one literal is
/// found to be redundant that means the whole search stayed within the implied literals. We
/// remember this and will not expand any of these literals for the following DFS searches.
///
/// In this implementation the var_flags array here has two purposes. At the beginning it is set for
/// all the literals of the clause. It is also used to mark the literals visited during the DFS.
/// This allows us to combine the already-visited-check with the literal-present-in-clause check. It
/// also allows for a neat implementation of the second optimization. When the search finds the
/// literal to be non-redundant, we clear var_flags for the literals we visited, resetting it to the
/// state at the beginning of the DFS. When the literal was redundant we keep it as is. This means
/// the following DFS will not expand these literals.
fn minimize_clause(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut TmpDataP,
        AssignmentP,
        ClauseAllocP,
        ImplGraphP,
        SolverConfigP,
        UnfoundedP,
        WeightConstraintsP,
    ),
) {
    match ctx.part(SolverConfigP).minimize_mode {
        MinimizeMode::Recursive => minimize_clause_recursive(ctx.borrow()),
        MinimizeMode::Local => minimize_clause_local(ctx.borrow()),
    }
}

/// Drops a literal only when every one of its immediate reasons is already in the clause (or
/// implied at level 0), without following the implication graph any further.
fn minimize_clause_local(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut TmpDataP,
        AssignmentP,
        ClauseAllocP,
        ImplGraphP,
        UnfoundedP,
        WeightConstraintsP,
    ),
) {
    split_borrow!(
        lit_ctx = &(AssignmentP, ClauseAllocP, ImplGraphP, WeightConstraintsP, UnfoundedP, mut TmpDataP) ctx
    );
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let impl_graph = ctx.part(ImplGraphP);

    let mut scan = VecMutScan::new(&mut analyze.clause);

    // we always keep the asserting literal
    scan.next();

    while let Some(lit) = scan.next() {
        let antecedent = *impl_graph.antecedent(lit.var());
        if antecedent == Antecedent::Null {
            continue;
        }

        let lits = antecedent.lits(lit.var(), &lit_ctx);
        let redundant = lits.iter().all(|reason_lit| {
            impl_graph.level(reason_lit.var()) == 0 || analyze.var_flags[reason_lit.index()]
        });

        if redundant {
            lit.remove();
        }
    }
}

fn minimize_clause_recursive(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut TmpDataP,
        AssignmentP,
        ClauseAllocP,
        ImplGraphP,
        UnfoundedP,
        WeightConstraintsP,
    ),
) {
    split_borrow!(
        lit_ctx = &(AssignmentP, ClauseAllocP, ImplGraphP, WeightConstraintsP, UnfoundedP, mut TmpDataP) ctx
    );
    let (analyze, ctx) = ctx.split_part_mut(AnalyzeConflictP);
    let impl_graph = ctx.part(ImplGraphP);

    let mut involved_levels = LevelAbstraction::default();

    for &lit in analyze.clause.iter() {
        involved_levels.add(impl_graph.level(lit.var()));
    }

    let mut scan = VecMutScan::new(&mut analyze.clause);

    // we always keep the first literal
    scan.next();

    'next_lit: while let Some(lit) = scan.next() {
        if impl_graph.antecedent(lit.var()) == &Antecedent::Null {
            continue;
        }

        // Start the DFS
        analyze.stack.clear();
        analyze.stack.push(!*lit);

        // Used to remember which var_flags are set during this DFS
        let top = analyze.to_clean.len();

        while let Some(lit) = analyze.stack.pop() {
            let antecedent = *impl_graph.antecedent(lit.var());
            let lits = antecedent.lits(lit.var(), &lit_ctx);

            for &reason_lit in lits {
                let reason_level = impl_graph.level(reason_lit.var());

                if !analyze.var_flags[reason_lit.index()] && reason_level > 0 {
                    // We haven't established reason_lit to be redundant, haven't visited it yet
                    // and it's not implied at level 0.

                    if impl_graph.antecedent(reason_lit.var()) == &Antecedent::Null
                        || !involved_levels.test(reason_level)
                    {
                        // reason_lit is a decision not in the clause or in a decision level known
                        // not to be in the clause. Abort the search.

                        // Reset the var_flags set during _this_ DFS.
                        for lit in analyze.to_clean.drain(top..) {
                            analyze.var_flags[lit.index()] = false;
                        }
                        continue 'next_lit;
                    } else {
                        analyze.var_flags[reason_lit.index()] = true;
                        analyze.to_clean.push(reason_lit.var());
                        analyze.stack.push(!reason_lit);
                    }
                }
            }
        }

        lit.remove();
    }
}
