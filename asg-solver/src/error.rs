//! Error types returned while building or configuring a ground program.

use asg_formula::lit::Var;
use thiserror::Error;

/// Errors that can occur while a ground program is being assembled.
///
/// These are all caught at build time, before search starts: once
/// [`end_program`](crate::solver::Solver::end_program) succeeds the solver only ever reports
/// [`crate::state::SatState`] results.
#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("atom {0:?} used in a rule head has already been frozen as a fact")]
    AtomAlreadyFrozen(Var),

    #[error("atom {0:?} is referenced but was never defined by a rule or set_compute")]
    UndefinedAtom(Var),

    #[error("rule head contains a duplicate atom")]
    DuplicateHeadAtom(Var),

    #[error("weight rule has mismatched literal and weight counts ({literals} vs {weights})")]
    WeightCountMismatch { literals: usize, weights: usize },

    #[error("minimize constraint priority {0} was declared more than once")]
    DuplicateMinimizePriority(u32),

    #[error("program was already finalized with end_program")]
    ProgramAlreadyEnded,

    #[error("a rule was added after end_program was called")]
    ProgramAlreadyFinished,
}

pub type BuilderResult<T> = Result<T, BuilderError>;
