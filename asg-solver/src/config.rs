//! Solver configuration.

/// Which of the several clause reduction passes is used to shrink the local clause tier.
///
/// All three produce a valid (if the learnt database is to stay usable) survivor set; they only
/// differ in how the cut point between kept and deleted clauses is found.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ReduceAlgorithm {
    /// Single forward pass, deleting every clause above a fixed glue threshold.
    Linear,
    /// Binary-heap based selection of the clauses with the worst glue/activity score.
    Heap,
    /// Full stable sort by score, keeping a fixed fraction.
    FullSort,
}

impl Default for ReduceAlgorithm {
    fn default() -> ReduceAlgorithm {
        ReduceAlgorithm::Heap
    }
}

/// Which minimization pass is applied to a freshly learnt clause.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MinimizeMode {
    /// Only drop literals whose reason is a single other literal already being dropped.
    Local,
    /// Full recursive DFS redundancy check through the implication graph.
    Recursive,
}

impl Default for MinimizeMode {
    fn default() -> MinimizeMode {
        MinimizeMode::Recursive
    }
}

/// Configurable parameters used during solving.
pub struct SolverConfig {
    /// Multiplicative decay for the VSIDS decision heuristic.
    pub vsids_decay: f32,

    /// Multiplicative decay for clause activities.
    pub clause_activity_decay: f32,

    /// Number of conflicts between local clause reductions.
    pub reduce_locals_interval: u64,

    /// Number of conflicts between mid clause reductions.
    pub reduce_mids_interval: u64,

    /// Scaling factor for luby sequence based restarts (number of conflicts).
    pub luby_restart_interval_scale: u64,

    /// Algorithm used to select which local clauses survive a reduction pass.
    pub reduce_algorithm: ReduceAlgorithm,

    /// Which conflict clause minimization pass is used.
    pub minimize_mode: MinimizeMode,

    /// Whether on-the-fly subsumption is applied while resolving a conflict clause.
    pub on_the_fly_subsumption: bool,

    /// Cardinality/weight rules with fewer literals than this are expanded into clauses directly
    /// instead of being kept as a propagating constraint.
    pub extended_rule_clause_threshold: usize,
}

impl Default for SolverConfig {
    fn default() -> SolverConfig {
        SolverConfig {
            vsids_decay: 0.95,
            clause_activity_decay: 0.999,
            reduce_locals_interval: 15000,
            reduce_mids_interval: 10000,
            luby_restart_interval_scale: 128,
            reduce_algorithm: ReduceAlgorithm::default(),
            minimize_mode: MinimizeMode::default(),
            on_the_fly_subsumption: true,
            extended_rule_clause_threshold: 4,
        }
    }
}

/// A partial update applied to the live [`SolverConfig`].
///
/// Only fields that should change need to be set; `None` leaves the current value in place.
#[derive(Default)]
pub struct SolverConfigUpdate {
    pub vsids_decay: Option<f32>,
    pub clause_activity_decay: Option<f32>,
    pub reduce_algorithm: Option<ReduceAlgorithm>,
    pub minimize_mode: Option<MinimizeMode>,
    pub on_the_fly_subsumption: Option<bool>,
}

impl SolverConfigUpdate {
    pub fn apply(&self, config: &mut SolverConfig) {
        if let Some(v) = self.vsids_decay {
            config.vsids_decay = v;
        }
        if let Some(v) = self.clause_activity_decay {
            config.clause_activity_decay = v;
        }
        if let Some(v) = self.reduce_algorithm {
            config.reduce_algorithm = v;
        }
        if let Some(v) = self.minimize_mode {
            config.minimize_mode = v;
        }
        if let Some(v) = self.on_the_fly_subsumption {
            config.on_the_fly_subsumption = v;
        }
    }
}
