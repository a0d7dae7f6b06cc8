//! Miscellaneous solver state.

/// Satisfiability state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SatState {
    Unknown,
    Sat,
    Unsat,
}

impl Default for SatState {
    fn default() -> SatState {
        SatState::Unknown
    }
}

/// Why search stopped before reaching a definite [`SatState`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum StopReason {
    /// The caller's conflict budget was used up.
    BudgetExceeded,
    /// An external interrupt flag was set between propagation steps.
    Interrupted,
}

/// Miscellaneous solver state.
///
/// Anything larger or any larger group of related state variables should be moved into a separate
/// part of [`Context`](crate::context::Context).
#[derive(Default)]
pub struct SolverState {
    pub sat_state: SatState,
    /// Set by [`crate::cdcl::conflict_step`] when search was stopped early instead of reaching a
    /// conclusive state.
    pub stop_reason: Option<StopReason>,
    /// Remaining conflict budget, decremented once per conflict. `None` means unlimited.
    pub conflict_budget: Option<i64>,
    /// Checked once per decision; when `true` the solver stops at the next safe point.
    pub interrupt_requested: bool,
}

impl SolverState {
    /// Resets the transient parts of the state for a new solve call, keeping the budget.
    pub fn restart_search(&mut self) {
        self.sat_state = SatState::Unknown;
        self.stop_reason = None;
        self.interrupt_requested = false;
    }
}
