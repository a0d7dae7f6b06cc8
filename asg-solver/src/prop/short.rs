//! Binary and ternary clauses, propagated without touching the clause allocator.
use partial_ref::{partial, PartialRef};

use asg_formula::lit::Lit;

use crate::context::{parts::*, Context};

use super::{enqueue_assignment, Antecedent, Conflict};

#[derive(Copy, Clone)]
struct ShortClause {
    /// The clause's other literal(s): one for a binary clause, two for a ternary clause.
    lits: [Lit; 2],
    ternary: bool,
}

/// Combined storage for binary and ternary clauses.
///
/// Both are small enough to be propagated with a direct per-literal adjacency scan instead of the
/// permute-and-rewatch protocol long clauses need, and unlike long clauses they never need an
/// entry in the clause allocator.
#[derive(Default)]
pub struct ShortImplications {
    by_lit: Vec<Vec<ShortClause>>,
    binary_count: usize,
    ternary_count: usize,
}

impl ShortImplications {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.by_lit.resize(count * 2, vec![]);
    }

    /// Add a binary clause.
    pub fn add_binary_clause(&mut self, lits: [Lit; 2]) {
        for i in 0..2 {
            let other = lits[i ^ 1];
            self.by_lit[(!lits[i]).code()].push(ShortClause {
                lits: [other, other],
                ternary: false,
            });
        }
        self.binary_count += 1;
    }

    /// Add a ternary clause.
    pub fn add_ternary_clause(&mut self, lits: [Lit; 3]) {
        for i in 0..3 {
            let others = [lits[(i + 1) % 3], lits[(i + 2) % 3]];
            self.by_lit[(!lits[i]).code()].push(ShortClause {
                lits: others,
                ternary: true,
            });
        }
        self.ternary_count += 1;
    }

    pub fn binary_count(&self) -> usize {
        self.binary_count
    }

    pub fn ternary_count(&self) -> usize {
        self.ternary_count
    }

    /// Literals implied directly by a binary clause once `lit` is assigned true.
    pub fn binary_implied(&self, lit: Lit) -> impl Iterator<Item = Lit> + '_ {
        self.by_lit[lit.code()]
            .iter()
            .filter(|c| !c.ternary)
            .map(|c| c.lits[0])
    }
}

/// Propagates all binary and ternary clauses that become unit once `lit` is assigned true.
pub fn propagate_short(
    mut ctx: partial!(
        Context,
        mut AssignmentP,
        mut ImplGraphP,
        mut ShortImplP,
        mut TrailP,
    ),
    lit: Lit,
) -> Result<(), Conflict> {
    // Cloning this short list sidesteps a borrow conflict with `enqueue_assignment` below; lists
    // here are expected to stay small (a handful of entries per literal in practice).
    let entries = ctx.part(ShortImplP).by_lit[lit.code()].clone();

    for entry in entries {
        if !entry.ternary {
            let implied = entry.lits[0];
            let value = ctx.part(AssignmentP).lit_value(implied);
            if value.is_true() {
                continue;
            }
            if value.is_false() {
                return Err(Conflict::Binary([!lit, implied]));
            }
            enqueue_assignment(ctx.borrow(), implied, Antecedent::Binary([!lit]));
        } else {
            let [b, c] = entry.lits;
            let vb = ctx.part(AssignmentP).lit_value(b);
            let vc = ctx.part(AssignmentP).lit_value(c);
            if vb.is_true() || vc.is_true() {
                continue;
            }
            if vb.is_false() && vc.is_false() {
                return Err(Conflict::Ternary([!lit, b, c]));
            } else if vb.is_false() {
                enqueue_assignment(ctx.borrow(), c, Antecedent::Ternary([!lit, b]));
            } else if vc.is_false() {
                enqueue_assignment(ctx.borrow(), b, Antecedent::Ternary([!lit, c]));
            }
        }
    }

    Ok(())
}
