//! Top-level facade: feed a ground program in, get models and optimization results out.

use partial_ref::{partial, IntoPartialRefMut, PartialRef};

use asg_formula::lit::{Lit, Var};

use crate::builder::{Builder, GroundProgram, GroundRule};
use crate::cdcl::conflict_step;
use crate::constraint::ConstraintRef;
use crate::context::{ensure_var_count, parts::*, set_var_count, Context};
use crate::distributor::Distributor;
use crate::error::BuilderResult;
use crate::load::load_clause;
use crate::minimize_constraint::MinimizeConstraints;
use crate::model;
use crate::prop::full_restart;
use crate::state::{SatState, StopReason};
use crate::variables::VarKind;
use crate::weight_constraint::WeightedLit;

/// Outcome handed to [`Solver::solve`]'s `on_finish` callback.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SolveResult {
    Sat,
    Unsat,
    Unknown,
}

/// Whether every model was found (`exhausted`) or search stopped early.
#[derive(Copy, Clone, Debug)]
pub struct Finish {
    pub result: SolveResult,
    pub exhausted: bool,
    pub interrupted: bool,
}

/// The value of every user-facing atom for one found model, plus its cost vector if the program
/// has minimize statements.
pub struct SolverView<'a> {
    ctx: &'a Context,
}

impl<'a> SolverView<'a> {
    /// Whether `atom` is true in this model.
    pub fn value(&self, atom: Var) -> Option<bool> {
        self.ctx.model.var_value(atom)
    }

    /// Every true, projected atom (or every true atom, if nothing was ever marked projected).
    pub fn answer_set(&self) -> Vec<Var> {
        self.ctx.model.answer_set(&self.ctx.variables)
    }

    /// The atom's human readable name, if one was ever registered with
    /// [`Builder::set_atom_name`].
    pub fn name(&self, atom: Var) -> Option<&str> {
        self.ctx.variables.name(atom)
    }

    /// Cost vector of the current model against every registered minimize statement, most
    /// significant priority level first.
    pub fn costs(&self) -> Vec<u64> {
        self.ctx
            .minimize
            .evaluate(|lit| self.ctx.assignment.lit_value(lit))
    }
}

/// A ground Answer Set Programming / Boolean satisfiability solver.
///
/// Rules are accumulated through the embedded [`Builder`] and compiled by [`Solver::end_program`];
/// [`Solver::solve`] then runs search, invoking `on_model` for each model found and `on_finish`
/// once search stops.
pub struct Solver {
    builder: Builder,
    ctx: Box<Context>,
    compiled: bool,
    distributor: Option<Box<dyn Distributor>>,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver {
            builder: Builder::new(),
            ctx: Box::new(Context::default()),
            compiled: false,
            distributor: None,
        }
    }
}

impl Solver {
    /// Create a new solver with an empty program.
    pub fn new() -> Solver {
        Solver::default()
    }

    /// Installs a sibling-solver link for portfolio search. No implementation is provided; this
    /// is a seam for an external scheduler.
    pub fn set_distributor(&mut self, distributor: Box<dyn Distributor>) {
        self.distributor = Some(distributor);
    }

    /// Allocates a fresh atom, usable as a rule head or body literal from now on.
    pub fn new_atom(&mut self) -> Var {
        self.builder.new_atom()
    }

    pub fn set_atom_name(&mut self, atom: Var, name: impl Into<Box<str>>) {
        self.builder.set_atom_name(atom, name);
    }

    /// Marks `atom` as part of the projected answer set view.
    pub fn set_project(&mut self, atom: Var, project: bool) {
        self.builder.set_project(atom, project);
    }

    /// Adds `atom` with the given sign to the top-level assumption set.
    pub fn set_compute(&mut self, atom: Var, sign: bool) {
        self.builder.set_compute(atom, sign);
    }

    /// Fixes `atom`'s truth value for the remainder of the program.
    pub fn freeze(&mut self, atom: Var, value: bool) -> BuilderResult<()> {
        self.builder.freeze(atom, value)
    }

    /// Reverses a previous [`Self::freeze`].
    pub fn unfreeze(&mut self, atom: Var) -> BuilderResult<()> {
        self.builder.unfreeze(atom)
    }

    pub fn add_rule(&mut self, rule: GroundRule) -> BuilderResult<()> {
        self.builder.add_rule(rule)
    }

    /// Adds a raw clause directly to the already-compiled formula, bypassing the builder: the way
    /// an enumeration loop injects a blocking clause, or a caller adds a further ground fact
    /// after a solve has already run. Unlike [`Self::add_rule`] this never needs another call to
    /// [`Self::end_program`].
    pub fn add_clause(&mut self, lits: &[Lit]) {
        let mut ctx = self.ctx.as_mut().into_partial_ref_mut();
        load_clause(ctx.borrow(), lits);
    }

    /// Compiles every rule added so far and loads the result into the search engine. Idempotent:
    /// additional rules added after a first call are compiled and loaded as a further increment on
    /// the next call, matching the incremental `update` step of the program input protocol.
    pub fn end_program(&mut self, extended_rule_clause_threshold: usize) -> BuilderResult<()> {
        let program = self.builder.end_program(extended_rule_clause_threshold)?;
        self.load_program(program);
        self.compiled = true;
        Ok(())
    }

    fn load_program(&mut self, program: GroundProgram) {
        let GroundProgram {
            variables,
            clauses,
            dep_graph,
            weight_rules,
            minimize,
        } = program;

        let mut ctx = self.ctx.as_mut().into_partial_ref_mut();

        set_var_count(ctx.borrow(), variables.var_count());
        *ctx.part_mut(VariablesP) = variables;
        *ctx.part_mut(DepGraphP) = dep_graph;
        ctx.part_mut(PostPropagatorsP)
            .ensure_unfounded_check_attached();

        for clause in clauses.iter() {
            load_clause(ctx.borrow(), clause);
        }

        for (literals, bound, head) in weight_rules {
            match head {
                Some(_) => register_weight_rule(ctx.borrow(), literals, bound, head),
                // An integrity constraint's weight rule denies ever reaching `bound`: the
                // opposite direction from a headed rule's "force the head once reached".
                None => register_upper_bound(ctx.borrow(), literals, bound.saturating_sub(1), None),
            }
        }

        for (priority, lits, weights) in minimize {
            ctx.part_mut(MinimizeP).add(priority, &lits, &weights);
        }
    }

    /// Runs search to exhaustion (or until `on_model` asks to stop), calling `on_model` for each
    /// model found and `on_finish` once search is done.
    pub fn solve(
        &mut self,
        mut on_model: impl FnMut(&SolverView) -> bool,
        on_finish: impl FnOnce(Finish),
    ) -> BuilderResult<()> {
        if !self.compiled {
            self.end_program(crate::config::SolverConfig::default().extended_rule_clause_threshold)?;
        }

        let mut interrupted = false;
        let mut exhausted = false;

        loop {
            {
                let mut ctx = self.ctx.as_mut().into_partial_ref_mut();
                while ctx.part(SolverStateP).sat_state == SatState::Unknown {
                    conflict_step(ctx.borrow());
                    if ctx.part(SolverStateP).interrupt_requested {
                        interrupted = true;
                        break;
                    }
                }
                if ctx.part(SolverStateP).sat_state == SatState::Sat {
                    model::capture(ctx.borrow());
                }
            }

            match self.ctx.solver_state.sat_state {
                SatState::Sat => {
                    let keep_going = on_model(&SolverView { ctx: &self.ctx });
                    if !keep_going || interrupted {
                        break;
                    }
                    self.block_or_tighten_current_model();
                }
                SatState::Unsat => {
                    exhausted = true;
                    break;
                }
                SatState::Unknown => {
                    break;
                }
            }
        }

        let result = match self.ctx.solver_state.sat_state {
            SatState::Sat => SolveResult::Sat,
            SatState::Unsat => SolveResult::Unsat,
            SatState::Unknown => SolveResult::Unknown,
        };

        on_finish(Finish {
            result,
            exhausted,
            interrupted,
        });

        Ok(())
    }

    /// Requests that an in-progress [`Self::solve`] call stop at the next opportunity.
    pub fn interrupt(&mut self) {
        self.ctx.solver_state.interrupt_requested = true;
        self.ctx.solver_state.stop_reason = Some(StopReason::Interrupted);
    }

    /// After reporting a model, either forbid repeating it exactly (plain enumeration) or tighten
    /// every minimize level so the next model found is strictly better (optimization).
    fn block_or_tighten_current_model(&mut self) {
        let mut ctx = self.ctx.as_mut().into_partial_ref_mut();

        if ctx.part(MinimizeP).is_empty() {
            let blocking: Vec<Lit> = ctx
                .part(ModelP)
                .assignment()
                .iter()
                .enumerate()
                .filter_map(|(index, value)| {
                    value.map(|v| {
                        let var = Var::from_index(index);
                        if v {
                            var.negative()
                        } else {
                            var.positive()
                        }
                    })
                })
                .collect();
            full_restart(ctx.borrow());
            ctx.part_mut(SolverStateP).sat_state = SatState::Unknown;
            load_clause(ctx.borrow(), &blocking);
        } else {
            let costs = ctx
                .part(MinimizeP)
                .evaluate(|lit| ctx.part(AssignmentP).lit_value(lit));
            let levels = ctx.part(MinimizeP).terms_by_level();
            full_restart(ctx.borrow());
            ctx.part_mut(SolverStateP).sat_state = SatState::Unknown;
            tighten_lexicographically(ctx.borrow(), levels, &costs);
        }
    }
}

/// Tightens the search to models that are lexicographically better than the cost vector just
/// found: `costs[0]` is the most significant level.
///
/// A model is better if it is strictly lower at the first level where the two differ, and equal
/// at every more significant level. That disjunction is reified with one fresh selector atom per
/// level that still has room to improve (`costs[i] > 0`): selector `i` guards "equal to `costs[j]`
/// at every `j < i`, strictly below `costs[i]` at `i`", and a single clause over all the
/// allocated selectors forces at least one of them to hold. A level already at cost `0` can never
/// be the first to improve, so it gets no selector; if every level is already at `0`, no selector
/// is allocated at all and the found model is already the lexicographic optimum, so the search
/// space is exhausted directly instead of adding a clause with no disjuncts.
fn tighten_lexicographically(
    mut ctx: partial!(
        Context,
        mut AnalyzeConflictP,
        mut AssignmentP,
        mut ClauseAllocP,
        mut ClauseDbP,
        mut ImplGraphP,
        mut ShortImplP,
        mut SolverStateP,
        mut TmpDataP,
        mut TrailP,
        mut UnfoundedP,
        mut VariablesP,
        mut VsidsP,
        mut WatchlistsP,
        mut WeightConstraintsP,
    ),
    levels: Vec<(Vec<Lit>, Vec<u64>)>,
    costs: &[u64],
) {
    let weighted = |terms: &(Vec<Lit>, Vec<u64>)| -> Vec<WeightedLit> {
        terms
            .0
            .iter()
            .zip(terms.1.iter())
            .map(|(&lit, &weight)| WeightedLit { lit, weight })
            .collect()
    };

    let mut selectors = Vec::new();

    for (i, &cost) in costs.iter().enumerate() {
        if cost == 0 {
            continue;
        }

        let selector = Var::from_index(ctx.part(VariablesP).var_count());
        ensure_var_count(ctx.borrow(), selector.index() + 1);
        let guard = selector.positive();

        register_upper_bound(ctx.borrow(), weighted(&levels[i]), cost - 1, Some(guard));

        for (j, level) in levels[..i].iter().enumerate() {
            register_upper_bound(ctx.borrow(), weighted(level), costs[j], Some(guard));
            register_lower_bound(ctx.borrow(), weighted(level), costs[j], Some(guard));
        }

        selectors.push(guard);
    }

    if selectors.is_empty() {
        ctx.part_mut(SolverStateP).sat_state = SatState::Unsat;
    } else {
        load_clause(ctx.borrow(), &selectors);
    }
}

/// Compiles a weight/cardinality rule into a registered [`crate::weight_constraint`] and installs
/// its watches.
fn register_weight_rule(
    mut ctx: partial!(Context, mut WatchlistsP, mut WeightConstraintsP),
    literals: Vec<WeightedLit>,
    bound: u64,
    head: Option<Lit>,
) {
    let (id, watch_lits) = ctx.part_mut(WeightConstraintsP).add(literals, bound, head);
    for lit in watch_lits {
        ctx.part_mut(WatchlistsP)
            .add_generic_watch(lit, ConstraintRef::Weight(id));
    }
}

/// Registers `sum(weight_i for lit_i true) >= bound`, optionally gated by `guard`.
///
/// When `guard` is `Some(g)` and `g` is false, `!g` alone supplies `weight = bound`, so the bound
/// holds trivially no matter what the other literals do; the constraint only does real work once
/// `guard` is true. This is how a conditional bound is built on top of a constraint kind that only
/// ever knows how to enforce an unconditional one.
fn register_lower_bound(
    mut ctx: partial!(Context, mut WatchlistsP, mut WeightConstraintsP),
    mut literals: Vec<WeightedLit>,
    bound: u64,
    guard: Option<Lit>,
) {
    if let Some(guard) = guard {
        literals.push(WeightedLit {
            lit: !guard,
            weight: bound,
        });
    }
    register_weight_rule(ctx.borrow(), literals, bound, None);
}

/// Registers a hard upper bound `sum(weight_i for lit_i true) <= bound`, optionally gated by
/// `guard` (see [`register_lower_bound`]), by converting it to the equivalent lower bound on the
/// complement literals: the weight constraint machinery only ever forces things from slack
/// running out, which is exactly what an upper bound violation is once restated in terms of the
/// literals that must be false.
fn register_upper_bound(
    mut ctx: partial!(Context, mut WatchlistsP, mut WeightConstraintsP),
    literals: Vec<WeightedLit>,
    bound: u64,
    guard: Option<Lit>,
) {
    let total: u64 = literals.iter().map(|l| l.weight).sum();
    let complement: Vec<WeightedLit> = literals
        .iter()
        .map(|l| WeightedLit {
            lit: !l.lit,
            weight: l.weight,
        })
        .collect();
    register_lower_bound(ctx.borrow(), complement, total.saturating_sub(bound), guard);
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::builder::rules::RuleKind;

    #[test]
    fn choice_enumeration() {
        let mut solver = Solver::new();
        let a = solver.new_atom();
        let b = solver.new_atom();

        solver
            .add_rule(GroundRule {
                kind: RuleKind::Choice,
                heads: vec![a, b],
                body: vec![],
                weights: vec![],
                bound: 0,
            })
            .unwrap();

        solver.end_program(4).unwrap();

        let mut models = 0;
        solver
            .solve(
                |_view| {
                    models += 1;
                    true
                },
                |_finish| {},
            )
            .unwrap();

        assert_eq!(models, 4);
    }

    /// Three pigeons, two holes, each hole free to hold any subset of pigeons but never two at
    /// once: classic unsatisfiable core, built entirely from choice atoms and integrity
    /// constraints rather than a hand-numbered CNF.
    #[test]
    fn pigeonhole_unsat() {
        let mut solver = Solver::new();

        let pigeons = 3;
        let holes = 2;
        let seats: Vec<Vec<Var>> = (0..pigeons)
            .map(|_| (0..holes).map(|_| solver.new_atom()).collect())
            .collect();

        for row in &seats {
            solver
                .add_rule(GroundRule::choice(row.clone(), vec![]))
                .unwrap();
        }

        // Every pigeon needs a hole: deny the case where none of its seats hold.
        for row in &seats {
            let body: Vec<Lit> = row.iter().map(|&seat| !seat.positive()).collect();
            solver
                .add_rule(GroundRule {
                    kind: RuleKind::Basic,
                    heads: vec![],
                    body,
                    weights: vec![],
                    bound: 0,
                })
                .unwrap();
        }

        // No hole takes two pigeons: deny every pair sharing a hole.
        for hole in 0..holes {
            for i in 0..pigeons {
                for j in (i + 1)..pigeons {
                    solver
                        .add_rule(GroundRule {
                            kind: RuleKind::Basic,
                            heads: vec![],
                            body: vec![seats[i][hole].positive(), seats[j][hole].positive()],
                            weights: vec![],
                            bound: 0,
                        })
                        .unwrap();
                }
            }
        }

        solver.end_program(4).unwrap();

        let mut models = 0;
        let mut result = SolveResult::Unknown;
        solver
            .solve(
                |_view| {
                    models += 1;
                    true
                },
                |finish| result = finish.result,
            )
            .unwrap();

        assert_eq!(models, 0);
        assert_eq!(result, SolveResult::Unsat);
    }

    /// A non-tight program: `a :- b.` and `b :- a.` with no other support gives each atom no
    /// founded derivation, so completion alone is not enough and the unfounded-set check must
    /// rule out the `{a, b}` loop, leaving only the all-false model.
    #[test]
    fn unfounded_loop_forces_false() {
        let mut solver = Solver::new();
        let a = solver.new_atom();
        let b = solver.new_atom();

        solver.add_rule(GroundRule::basic(a, vec![b.positive()])).unwrap();
        solver.add_rule(GroundRule::basic(b, vec![a.positive()])).unwrap();

        solver.end_program(4).unwrap();

        let mut last = None;
        solver
            .solve(
                |view| {
                    last = Some((view.value(a), view.value(b)));
                    true
                },
                |_finish| {},
            )
            .unwrap();

        assert_eq!(last, Some((Some(false), Some(false))));
    }

    /// `a :- 3 { x=2, y=2, z=2 }.` with `x.` and `y.` as facts: the reachable weight sum is
    /// 6 and only 4 of it is still removable (`z`'s weight), so the bound of 3 is already met
    /// by `x` and `y` alone and `a` must come out true from unit propagation, without ever
    /// needing a decision on `z`.
    #[test]
    fn weight_rule_propagation() {
        let mut solver = Solver::new();
        let a = solver.new_atom();
        let x = solver.new_atom();
        let y = solver.new_atom();
        let z = solver.new_atom();

        solver
            .add_rule(GroundRule::weight(
                a,
                vec![x.positive(), y.positive(), z.positive()],
                vec![2, 2, 2],
                3,
            ))
            .unwrap();
        solver.add_rule(GroundRule::basic(x, vec![])).unwrap();
        solver.add_rule(GroundRule::basic(y, vec![])).unwrap();

        solver.end_program(4).unwrap();

        let mut last = None;
        solver
            .solve(
                |view| {
                    last = Some((view.value(a), view.value(x), view.value(y)));
                    true
                },
                |_finish| {},
            )
            .unwrap();

        assert_eq!(last, Some((Some(true), Some(true), Some(true))));
    }

    /// `{a;b;c}.` with `:~ a.[1@1]`, `:~ b.[2@1]` and `:~ c.[3@1]`: all three penalties share one
    /// priority level, so the single cheapest model is the empty one, cost `0`.
    #[test]
    fn minimize_finds_empty_answer_set() {
        let mut solver = Solver::new();
        let a = solver.new_atom();
        let b = solver.new_atom();
        let c = solver.new_atom();

        solver
            .add_rule(GroundRule::choice(vec![a, b, c], vec![]))
            .unwrap();
        solver
            .add_rule(GroundRule::minimize(vec![a.positive()], vec![1], 1))
            .unwrap();
        solver
            .add_rule(GroundRule::minimize(vec![b.positive()], vec![2], 1))
            .unwrap();
        solver
            .add_rule(GroundRule::minimize(vec![c.positive()], vec![3], 1))
            .unwrap();

        solver.end_program(4).unwrap();

        let mut last_values = None;
        let mut last_costs = None;
        let mut result = SolveResult::Unknown;
        let mut exhausted = false;
        solver
            .solve(
                |view| {
                    last_values = Some((view.value(a), view.value(b), view.value(c)));
                    last_costs = Some(view.costs());
                    true
                },
                |finish| {
                    result = finish.result;
                    exhausted = finish.exhausted;
                },
            )
            .unwrap();

        assert_eq!(last_values, Some((Some(false), Some(false), Some(false))));
        assert_eq!(last_costs, Some(vec![0]));
        assert_eq!(result, SolveResult::Unsat);
        assert!(exhausted);
    }

    /// Two priority levels, with `a <-> not b` forced by completion so only two models exist.
    /// Level 2 (`a`, weight 5) outranks level 1 (`b`, weight 1), so the optimum pays the cheaper
    /// level-1 cost of `b` true over the pricier level-2 cost of `a` true, even though `a` false
    /// would be free at level 1: a genuinely lexicographic trade-off the single-level test above
    /// can't exercise.
    #[test]
    fn minimize_respects_priority_order() {
        let mut solver = Solver::new();
        let a = solver.new_atom();
        let b = solver.new_atom();

        solver
            .add_rule(GroundRule::choice(vec![a, b], vec![]))
            .unwrap();
        solver
            .add_rule(GroundRule::basic(a, vec![!b.positive()]))
            .unwrap();
        solver
            .add_rule(GroundRule::minimize(vec![a.positive()], vec![5], 2))
            .unwrap();
        solver
            .add_rule(GroundRule::minimize(vec![b.positive()], vec![1], 1))
            .unwrap();

        solver.end_program(4).unwrap();

        let mut last_values = None;
        let mut last_costs = None;
        solver
            .solve(
                |view| {
                    last_values = Some((view.value(a), view.value(b)));
                    last_costs = Some(view.costs());
                    true
                },
                |_finish| {},
            )
            .unwrap();

        assert_eq!(last_values, Some((Some(false), Some(true))));
        assert_eq!(last_costs, Some(vec![0, 1]));
    }
}
