//! Ties the builder submodules together: interns bodies, decides which cardinality/weight rules
//! get expanded into exact CNF versus registered as a propagating constraint, emits completion,
//! and builds the dependency graph feeding unfounded-set checking.

use asg_formula::cnf::CnfFormula;
use asg_formula::lit::{Lit, Var};

use crate::error::{BuilderError, BuilderResult};
use crate::variables::{VarKind, Variables};
use crate::weight_constraint::WeightedLit;

use super::atoms::VarAllocator;
use super::bodies::Bodies;
use super::completion;
use super::depgraph::DepGraph;
use super::rules::{GroundRule, RuleKind};
use super::transform;

/// Output of compiling a finished set of ground rules, ready to be loaded into a solver.
pub struct GroundProgram {
    pub variables: Variables,
    pub clauses: CnfFormula,
    pub dep_graph: DepGraph,
    /// Weight/cardinality rules too large to expand into clauses directly: literals with weights,
    /// the bound, and the head they force once it's reached.
    pub weight_rules: Vec<(Vec<WeightedLit>, u64, Option<Lit>)>,
    /// Minimize terms: priority, literals, weights.
    pub minimize: Vec<(u32, Vec<Lit>, Vec<u64>)>,
}

pub fn run(
    mut variables: Variables,
    mut alloc: VarAllocator,
    rules: Vec<GroundRule>,
    frozen: Vec<(Var, bool)>,
    computes: Vec<Lit>,
    extended_rule_clause_threshold: usize,
) -> BuilderResult<GroundProgram> {
    validate(&variables, &rules)?;

    let mut bodies = Bodies::default();
    let mut formula = CnfFormula::new();
    let mut weight_rules = Vec::new();
    let mut minimize = Vec::new();

    // (rule, resolved body literal) pairs handed to completion; built up as we decide each rule.
    let mut completed: Vec<(&GroundRule, Lit)> = Vec::new();

    for rule in &rules {
        match rule.kind {
            RuleKind::Minimize => {
                minimize.push((rule.bound as u32, rule.body.clone(), weights_of(rule)));
            }
            RuleKind::Basic if rule.heads.is_empty() => {
                // An integrity constraint: the body must never hold.
                let body_lit = bodies.intern(&mut alloc, &mut variables, rule.body.clone());
                formula.add_clause(&[!body_lit]);
            }
            RuleKind::Basic | RuleKind::Choice => {
                let body_lit = bodies.intern(&mut alloc, &mut variables, rule.body.clone());
                completed.push((rule, body_lit));
            }
            RuleKind::Cardinality | RuleKind::Weight => {
                if rule.body.len() <= extended_rule_clause_threshold {
                    let body_lit = if rule.body.len() <= 1 {
                        bodies.intern(&mut alloc, &mut variables, rule.body.clone())
                    } else {
                        let var = alloc.fresh(&mut variables, VarKind::Body);
                        let lit = var.positive();
                        bodies.register(&rule.body, lit);
                        for clause in transform::define_body_lit(rule, lit) {
                            formula.add_clause(&clause);
                        }
                        lit
                    };
                    if rule.heads.is_empty() {
                        formula.add_clause(&[!body_lit]);
                    } else {
                        completed.push((rule, body_lit));
                    }
                } else if rule.heads.is_empty() {
                    let weighted: Vec<WeightedLit> = rule
                        .body
                        .iter()
                        .zip(weights_of(rule))
                        .map(|(&lit, weight)| WeightedLit { lit, weight })
                        .collect();
                    weight_rules.push((weighted, rule.bound, None));
                } else {
                    let weighted: Vec<WeightedLit> = rule
                        .body
                        .iter()
                        .zip(weights_of(rule))
                        .map(|(&lit, weight)| WeightedLit { lit, weight })
                        .collect();
                    weight_rules.push((weighted, rule.bound, Some(rule.heads[0])));
                }
            }
        }
    }

    completion::emit(&mut formula, &completed);

    let true_lit = variables.true_lit();
    formula.add_clause(&[true_lit]);

    for (atom, value) in frozen {
        formula.add_clause(&[if value { atom.positive() } else { atom.negative() }]);
    }

    for lit in computes {
        formula.add_clause(&[lit]);
    }

    let dep_graph = DepGraph::build(variables.var_count(), &rules, &bodies, true_lit);

    Ok(GroundProgram {
        variables,
        clauses: formula,
        dep_graph,
        weight_rules,
        minimize,
    })
}

fn weights_of(rule: &GroundRule) -> Vec<u64> {
    if rule.weights.is_empty() {
        vec![1; rule.body.len()]
    } else {
        rule.weights.clone()
    }
}

fn validate(variables: &Variables, rules: &[GroundRule]) -> BuilderResult<()> {
    for rule in rules {
        if !rule.weights.is_empty() && rule.weights.len() != rule.body.len() {
            return Err(BuilderError::WeightCountMismatch {
                literals: rule.body.len(),
                weights: rule.weights.len(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for &head in &rule.heads {
            if variables.is_frozen(head) {
                return Err(BuilderError::AtomAlreadyFrozen(head));
            }
            if !seen.insert(head) {
                return Err(BuilderError::DuplicateHeadAtom(head));
            }
        }
    }

    Ok(())
}
