//! Exact CNF definition of small cardinality/weight rule bodies.
//!
//! For a handful of literals it's cheap to pin `body_lit <-> (bound <= sum of weights)` down by
//! brute-force Tseitin: enumerate every assignment of the body's literals, and for each one add a
//! clause forcing `body_lit` to agree with whether that assignment meets the bound. This produces
//! `2^n` clauses of `n + 1` literals each, which is only reasonable for small `n`; rules with more
//! literals than
//! [`SolverConfig::extended_rule_clause_threshold`](crate::config::SolverConfig::extended_rule_clause_threshold)
//! instead get a [`crate::weight_constraint::WeightConstraints`] registration, which only enforces
//! the forward direction.

use asg_formula::lit::Lit;

use super::rules::GroundRule;

/// Clauses defining `body_lit <-> (rule.bound <= sum of weights of true body literals)`.
///
/// Callers are responsible for only calling this when `rule.body.len()` is small enough to afford
/// the `2^n` enumeration.
pub fn define_body_lit(rule: &GroundRule, body_lit: Lit) -> Vec<Vec<Lit>> {
    let n = rule.body.len();
    let weights: Vec<u64> = if rule.weights.is_empty() {
        vec![1; n]
    } else {
        rule.weights.clone()
    };
    let bound = rule.bound.max(1);

    let mut clauses = Vec::with_capacity(1usize << n);
    for row in 0u32..(1u32 << n) {
        let weight: u64 = (0..n)
            .filter(|&i| row & (1 << i) != 0)
            .map(|i| weights[i])
            .sum();
        let holds = weight >= bound;

        let mut clause: Vec<Lit> = (0..n)
            .map(|i| {
                if row & (1 << i) != 0 {
                    !rule.body[i]
                } else {
                    rule.body[i]
                }
            })
            .collect();
        clause.push(if holds { body_lit } else { !body_lit });
        clauses.push(clause);
    }
    clauses
}
