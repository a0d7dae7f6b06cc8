//! Positive atom dependency graph: which bodies can source which heads, and which atoms sit
//! together in a non-trivial strongly connected component and therefore need unfounded-set
//! checking rather than plain completion.

use rustc_hash::FxHashMap;

use asg_formula::lit::{Lit, Var};

use super::bodies::Bodies;
use super::rules::{GroundRule, RuleKind};
use super::scc::tarjan_scc;

/// One body that can support a given head atom.
pub struct BodyRef {
    pub lit: Lit,
    /// The positive body atoms that sit in the same non-trivial component as the head this
    /// `BodyRef` supports. Positive atoms outside the component are assumed already founded, since
    /// they can only have been derived acyclically.
    pub internal_pos_atoms: Vec<Var>,
}

#[derive(Default)]
pub struct DepGraph {
    scc_of: Vec<u32>,
    non_trivial: Vec<Vec<Var>>,
    supports: FxHashMap<Var, Vec<BodyRef>>,
}

impl DepGraph {
    pub fn non_trivial_sccs(&self) -> impl Iterator<Item = &[Var]> {
        self.non_trivial.iter().map(|scc| scc.as_slice())
    }

    pub fn bodies_supporting(&self, atom: Var) -> &[BodyRef] {
        self.supports.get(&atom).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Rebuilds the graph from every rule with a non-[`RuleKind::Minimize`] head, after bodies
    /// have been interned. `true_lit` is the sentinel literal an empty body resolves to.
    pub fn build(var_count: usize, rules: &[GroundRule], bodies: &Bodies, true_lit: Lit) -> DepGraph {
        let mut edges: Vec<Vec<Var>> = vec![Vec::new(); var_count];
        for rule in rules {
            if rule.kind == RuleKind::Minimize {
                continue;
            }
            for &pos in rule.body.iter().filter(|l| l.is_positive()) {
                for &head in &rule.heads {
                    edges[pos.var().index()].push(head);
                }
            }
        }

        let sccs = tarjan_scc(var_count, |v| edges[v.index()].clone());

        let mut scc_of = vec![u32::MAX; var_count];
        for (id, scc) in sccs.iter().enumerate() {
            for &v in scc {
                scc_of[v.index()] = id as u32;
            }
        }

        let has_self_loop = |scc: &[Var]| -> bool {
            scc.len() == 1 && edges[scc[0].index()].contains(&scc[0])
        };
        let non_trivial: Vec<Vec<Var>> = sccs
            .into_iter()
            .filter(|scc| scc.len() > 1 || has_self_loop(scc))
            .collect();

        let mut supports: FxHashMap<Var, Vec<BodyRef>> = FxHashMap::default();
        for rule in rules {
            if rule.kind == RuleKind::Minimize {
                continue;
            }
            let body_pos_atoms: Vec<Var> = rule
                .body
                .iter()
                .filter(|l| l.is_positive())
                .map(|l| l.var())
                .collect();

            for &head in &rule.heads {
                // Large cardinality/weight rules have no interned body literal (see
                // `super::preprocess`); fall back to the head's own literal, which makes this
                // body trivially "true" exactly when the head is, reducing the unfounded-set
                // check to "derivable once its positive atoms are founded" and leaving the actual
                // bound enforcement to the registered weight constraint.
                let body_lit = if rule.body.is_empty() {
                    true_lit
                } else {
                    bodies.lit_for(&rule.body).unwrap_or_else(|| head.positive())
                };
                let head_scc = scc_of[head.index()];
                let internal_pos_atoms = if head_scc == u32::MAX {
                    Vec::new()
                } else {
                    body_pos_atoms
                        .iter()
                        .copied()
                        .filter(|a| scc_of[a.index()] == head_scc)
                        .collect()
                };
                supports.entry(head).or_default().push(BodyRef {
                    lit: body_lit,
                    internal_pos_atoms,
                });
            }
        }

        DepGraph {
            scc_of,
            non_trivial,
            supports,
        }
    }

    pub fn scc_id(&self, atom: Var) -> Option<u32> {
        match self.scc_of.get(atom.index()).copied() {
            Some(u32::MAX) | None => None,
            Some(id) => Some(id),
        }
    }
}
