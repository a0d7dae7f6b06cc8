//! Clark completion: turns the "if" direction every ground rule gives for its head into the
//! "only if" direction needed to pin down the unique supported model of a tight program.
//!
//! For a basic rule `head :- body`, the rule itself already gives `body -> head`, encoded as a
//! single clause. Completion adds the converse: `head` only holds if *some* rule derives it, i.e.
//! `head -> (body_1 | body_2 | ...)` over every rule with `head` in its head list.
//!
//! Choice rules get no completion on their head atoms at all: `{ heads } :- body` only constrains
//! "not derivable without the body", which is exactly the clause the rule itself contributes.
//!
//! Cardinality and weight rules reach this module already reduced to a single `body_lit` standing
//! for "bound <= sum" (see [`super::transform`]); large ones that were instead registered as a
//! [`crate::weight_constraint::WeightConstraints`] entry never appear here at all, since that path
//! only supports the forward direction and has no `body_lit` to complete against.

use rustc_hash::FxHashMap;

use asg_formula::cnf::CnfFormula;
use asg_formula::lit::{Lit, Var};

use super::rules::{GroundRule, RuleKind};

/// Emits every rule clause and completion clause for a rule whose body has been resolved to a
/// single literal into `formula`.
pub fn emit(formula: &mut CnfFormula, rules_with_body_lit: &[(&GroundRule, Lit)]) {
    let mut supports: FxHashMap<Var, Vec<Lit>> = FxHashMap::default();

    for &(rule, body) in rules_with_body_lit {
        match rule.kind {
            RuleKind::Minimize => continue,
            RuleKind::Choice => {
                for &head in &rule.heads {
                    formula.add_clause(&[!head, body]);
                }
            }
            RuleKind::Basic | RuleKind::Cardinality | RuleKind::Weight => {
                formula.add_clause(&[!body, rule.heads[0]]);
                supports.entry(rule.heads[0]).or_default().push(body);
            }
        }
    }

    for (head, bodies) in supports {
        let mut clause = vec![!head];
        clause.extend(bodies);
        formula.add_clause(&clause);
    }
}
