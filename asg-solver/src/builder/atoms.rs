//! Fresh variable allocation for the ground program builder.

use asg_formula::lit::Var;

use crate::variables::{VarKind, Variables};

/// Hands out fresh, densely packed variable indices as the builder discovers atoms and bodies.
///
/// Variable 0 is reserved for [`Variables::true_var`] and is never handed out.
pub struct VarAllocator {
    next: u32,
}

impl Default for VarAllocator {
    fn default() -> VarAllocator {
        VarAllocator { next: 1 }
    }
}

impl VarAllocator {
    pub fn fresh(&mut self, variables: &mut Variables, kind: VarKind) -> Var {
        let var = Var::from_index(self.next as usize);
        self.next += 1;
        variables.ensure_var_count(self.next as usize);
        variables.set_kind(var, kind);
        var
    }

    pub fn count(&self) -> usize {
        self.next as usize
    }
}
