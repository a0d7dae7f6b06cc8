//! Ground program construction.
//!
//! Callers add one [`GroundRule`] at a time, naming atoms via [`Builder::new_atom`], then call
//! [`Builder::end_program`] to compile everything gathered so far into a [`GroundProgram`]: a CNF
//! formula plus whatever auxiliary constraints and dependency information the solver needs to
//! complement it.

pub mod atoms;
pub mod bodies;
pub mod completion;
pub mod depgraph;
pub mod preprocess;
pub mod rules;
pub mod scc;
pub mod transform;

use asg_formula::lit::{Lit, Var};

use crate::error::{BuilderError, BuilderResult};
use crate::variables::{VarKind, Variables};

use self::atoms::VarAllocator;

pub use self::preprocess::GroundProgram;
pub use self::rules::{GroundRule, RuleKind};

pub struct Builder {
    variables: Variables,
    alloc: VarAllocator,
    rules: Vec<GroundRule>,
    frozen: Vec<(Var, bool)>,
    computes: Vec<Lit>,
    ended: bool,
}

impl Default for Builder {
    fn default() -> Builder {
        let mut variables = Variables::default();
        let alloc = VarAllocator::default();
        variables.ensure_var_count(1); // var 0 reserved by `Variables` itself, never handed out
        Builder {
            variables,
            alloc,
            rules: Vec::new(),
            frozen: Vec::new(),
            computes: Vec::new(),
            ended: false,
        }
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    /// Allocates a fresh atom, available for use as a rule head or body literal from now on.
    pub fn new_atom(&mut self) -> Var {
        self.alloc.fresh(&mut self.variables, VarKind::Atom)
    }

    pub fn set_atom_name(&mut self, atom: Var, name: impl Into<Box<str>>) {
        self.variables.set_name(atom, name);
    }

    /// Marks `atom` as part of the projected answer set view.
    pub fn set_project(&mut self, atom: Var, project: bool) {
        self.variables.set_project(atom, project);
    }

    /// Adds `atom` with the given sign to the top-level assumption set: a unit fact asserted for
    /// this compilation. Unlike [`Self::freeze`] this does not stop other rules from deriving the
    /// same atom; it only pins its value for search.
    pub fn set_compute(&mut self, atom: Var, sign: bool) {
        self.computes.push(atom.lit(sign));
    }

    /// Fixes `atom`'s truth value for the remainder of the program: a fact if `value`, an
    /// atom no rule may ever derive otherwise.
    pub fn freeze(&mut self, atom: Var, value: bool) -> BuilderResult<()> {
        if self.ended {
            return Err(BuilderError::ProgramAlreadyFinished);
        }
        self.variables.set_frozen(atom, true);
        self.frozen.push((atom, value));
        Ok(())
    }

    /// Reverses a previous [`Self::freeze`], allowing future rules to derive `atom` again.
    pub fn unfreeze(&mut self, atom: Var) -> BuilderResult<()> {
        if self.ended {
            return Err(BuilderError::ProgramAlreadyFinished);
        }
        self.variables.set_frozen(atom, false);
        self.frozen.retain(|&(a, _)| a != atom);
        Ok(())
    }

    pub fn add_rule(&mut self, rule: GroundRule) -> BuilderResult<()> {
        if self.ended {
            return Err(BuilderError::ProgramAlreadyFinished);
        }
        for &head in &rule.heads {
            if head.index() >= self.variables.var_count() {
                return Err(BuilderError::UndefinedAtom(head));
            }
        }
        for &lit in &rule.body {
            if lit.var().index() >= self.variables.var_count() {
                return Err(BuilderError::UndefinedAtom(lit.var()));
            }
        }
        self.rules.push(rule);
        Ok(())
    }

    pub fn end_program(&mut self, extended_rule_clause_threshold: usize) -> BuilderResult<GroundProgram> {
        if self.ended {
            return Err(BuilderError::ProgramAlreadyEnded);
        }
        self.ended = true;

        let variables = std::mem::take(&mut self.variables);
        let alloc = std::mem::replace(&mut self.alloc, VarAllocator::default());
        let rules = std::mem::take(&mut self.rules);
        let frozen = std::mem::take(&mut self.frozen);
        let computes = std::mem::take(&mut self.computes);

        preprocess::run(
            variables,
            alloc,
            rules,
            frozen,
            computes,
            extended_rule_clause_threshold,
        )
    }
}
