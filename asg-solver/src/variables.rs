//! Per-variable bookkeeping that outlives a single solve call.

use asg_formula::lit::{Lit, Var};

/// What a variable stands for in the ground program.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum VarKind {
    /// A regular ground atom that can appear in rule heads and bodies.
    Atom,
    /// The literal introduced for a non-trivial rule body (used by the completion).
    Body,
    /// Any other auxiliary variable introduced while transforming extended rules.
    Auxiliary,
}

/// Bookkeeping kept for every variable known to the solver.
pub struct VarData {
    pub kind: VarKind,
    /// Set once the atom's truth value has been fixed for the remainder of the incremental
    /// session (e.g. a fact, or the result of a previous `end_program`/solve cycle).
    pub frozen: bool,
    /// Set once preprocessing has proven the variable can never influence the outcome.
    pub eliminated: bool,
    /// Whether this atom is part of the answer set projection (only projected atoms are reported
    /// to [`crate::model::SolverView`] consumers that asked for a projected view).
    pub project: bool,
    /// Decision heuristic polarity preference, used when nothing else suggests a sign.
    pub preferred_sign: bool,
}

impl Default for VarData {
    fn default() -> VarData {
        VarData {
            kind: VarKind::Auxiliary,
            frozen: false,
            eliminated: false,
            project: false,
            preferred_sign: false,
        }
    }
}

/// Per-variable data that is not performance critical enough to warrant its own dense array in a
/// hot-path part of [`crate::context::Context`].
#[derive(Default)]
pub struct Variables {
    data: Vec<VarData>,
    names: Vec<Option<Box<str>>>,
}

impl Variables {
    /// The variable reserved as a permanent truth constant.
    ///
    /// Variable 0 is forced true at decision level 0 as soon as the solver is built; nothing else
    /// ever assigns it. Kept as a method (not a global) so each [`crate::context::Context`] can, in
    /// principle, use a different sentinel index.
    pub fn true_var(&self) -> Var {
        Var::from_index(0)
    }

    pub fn true_lit(&self) -> Lit {
        self.true_var().positive()
    }

    pub fn var_count(&self) -> usize {
        self.data.len()
    }

    pub fn set_var_count(&mut self, count: usize) {
        self.data.resize_with(count, VarData::default);
        self.names.resize(count, None);
    }

    pub fn ensure_var_count(&mut self, count: usize) {
        if count > self.var_count() {
            self.set_var_count(count);
        }
    }

    pub fn kind(&self, var: Var) -> VarKind {
        self.data[var.index()].kind
    }

    pub fn set_kind(&mut self, var: Var, kind: VarKind) {
        self.data[var.index()].kind = kind;
    }

    pub fn is_frozen(&self, var: Var) -> bool {
        self.data[var.index()].frozen
    }

    pub fn set_frozen(&mut self, var: Var, frozen: bool) {
        self.data[var.index()].frozen = frozen;
    }

    pub fn is_eliminated(&self, var: Var) -> bool {
        self.data[var.index()].eliminated
    }

    pub fn set_eliminated(&mut self, var: Var, eliminated: bool) {
        self.data[var.index()].eliminated = eliminated;
    }

    pub fn set_project(&mut self, var: Var, project: bool) {
        self.data[var.index()].project = project;
    }

    pub fn is_projected(&self, var: Var) -> bool {
        self.data[var.index()].project
    }

    pub fn preferred_sign(&self, var: Var) -> bool {
        self.data[var.index()].preferred_sign
    }

    pub fn set_preferred_sign(&mut self, var: Var, sign: bool) {
        self.data[var.index()].preferred_sign = sign;
    }

    pub fn name(&self, var: Var) -> Option<&str> {
        self.names[var.index()].as_deref()
    }

    pub fn set_name(&mut self, var: Var, name: impl Into<Box<str>>) {
        self.names[var.index()] = Some(name.into());
    }
}
