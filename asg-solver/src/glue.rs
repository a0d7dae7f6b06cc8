//! Compute glue levels of clauses.
//!
//! The glue level of a propagating clause is the number of distinct decision levels of the clause's
//! variables. This is also called the literal block distance (LBD). For each clause the smallest
//! glue level observed is used as an indicator of how useful that clause is.

use partial_ref::{partial, PartialRef};

use asg_formula::lit::Lit;

use crate::context::{parts::*, Context};

/// Compute the glue level of a clause.
pub fn compute_glue(mut ctx: partial!(Context, mut TmpDataP, ImplGraphP), lits: &[Lit]) -> usize {
    let (tmp_data, ctx) = ctx.split_part_mut(TmpDataP);
    let impl_graph = ctx.part(ImplGraphP);

    tmp_data.new_level_epoch();

    let mut glue = 0;

    for &lit in lits {
        let level = impl_graph.level(lit.var());
        if !tmp_data.is_level_marked(level) {
            tmp_data.mark_level(level);
            glue += 1;
        }
    }

    glue
}
