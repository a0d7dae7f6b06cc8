//! Hook for multi-threaded portfolio search.
//!
//! Running several configurations of the same search in parallel and sharing learnt clauses
//! between them is out of scope here; this trait only documents the seam such a scheduler would
//! plug into, so a single-threaded embedder and a future portfolio runner can share the same
//! solver core.

use asg_formula::lit::Lit;

/// Receives clauses learnt by one solver instance, for forwarding to sibling instances in a
/// portfolio search.
///
/// No implementation of this is provided; a single [`crate::solver::Solver`] simply never installs
/// one.
pub trait Distributor {
    /// Called with a clause just added to the learnt clause database.
    fn share_clause(&mut self, clause: &[Lit]);

    /// Called to check for clauses shared by sibling instances, appending them to `out`.
    fn receive_clauses(&mut self, out: &mut Vec<Vec<Lit>>);
}
