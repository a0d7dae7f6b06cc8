//! Temporary data.
use asg_formula::Lit;

/// Temporary data used by various parts of the solver.
///
/// Make sure to check any documented invariants when using this. Also make sure to check all
/// existing users when adding invariants.
#[derive(Default)]
pub struct TmpData {
    pub lits: Vec<Lit>,

    /// Epoch stamps, one per literal, used to implement O(1)-clearable scratch sets.
    ///
    /// A literal is considered "marked" for epoch `e` when `epochs[lit.code()] == e`. Bumping
    /// `current_epoch` clears every mark in amortized O(1), instead of walking the whole vector.
    epochs: Vec<u32>,
    current_epoch: u32,

    /// Epoch stamps, one per decision level, used by glue-level (LBD) computation.
    ///
    /// Kept separate from `epochs` since it's indexed by decision level rather than literal code.
    level_epochs: Vec<u32>,
    current_level_epoch: u32,

    /// Scratch buffer used to materialize the reason of a generic constraint antecedent.
    pub reason_buf: Vec<Lit>,
}

impl TmpData {
    /// Update structures for a new variable count.
    pub fn set_var_count(&mut self, count: usize) {
        self.epochs.resize(count * 2, 0);
        // A decision level is bounded by the number of variables.
        self.level_epochs.resize(count + 1, 0);
    }

    /// Starts a fresh epoch, invalidating every previous mark.
    ///
    /// Wraps (and clears the backing storage) on overflow, which only matters after roughly four
    /// billion calls.
    pub fn new_epoch(&mut self) -> u32 {
        self.current_epoch = self.current_epoch.wrapping_add(1);
        if self.current_epoch == 0 {
            for e in self.epochs.iter_mut() {
                *e = 0;
            }
            self.current_epoch = 1;
        }
        self.current_epoch
    }

    #[inline]
    pub fn is_marked(&self, lit: Lit) -> bool {
        self.epochs[lit.code()] == self.current_epoch
    }

    #[inline]
    pub fn mark(&mut self, lit: Lit) {
        self.epochs[lit.code()] = self.current_epoch;
    }

    #[inline]
    pub fn unmark(&mut self, lit: Lit) {
        self.epochs[lit.code()] = 0;
    }

    /// Starts a fresh epoch for decision-level marking.
    pub fn new_level_epoch(&mut self) -> u32 {
        self.current_level_epoch = self.current_level_epoch.wrapping_add(1);
        if self.current_level_epoch == 0 {
            for e in self.level_epochs.iter_mut() {
                *e = 0;
            }
            self.current_level_epoch = 1;
        }
        self.current_level_epoch
    }

    #[inline]
    pub fn is_level_marked(&self, level: usize) -> bool {
        self.level_epochs[level] == self.current_level_epoch
    }

    #[inline]
    pub fn mark_level(&mut self, level: usize) {
        self.level_epochs[level] = self.current_level_epoch;
    }
}
