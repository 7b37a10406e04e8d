//! The seam between the scoring layer and the spatial clonal-growth engine.
//!
//! The scoring loop never looks inside the engine: it constructs a fresh
//! handle per realisation, runs it to completion and queries the clone sizes
//! at the requested time points. Any engine implementing these two traits can
//! drive the fit; [`crate::wf2d`] provides the lattice model used by the
//! binaries and the tests mock them out.
use crate::seed::SeedConfig;
use crate::CloneSize;
use rand::Rng;

/// One realisation of the clonal-growth process started from a fixed seed
/// configuration.
pub trait LabelledSim {
    /// Run one full independent stochastic realisation, blocking until the
    /// last requested time point has been reached.
    fn run(&mut self, rng: &mut impl Rng) -> anyhow::Result<()>;

    /// Sizes of the clones carrying `tag` at `time`, one of the time points
    /// requested at construction. With `exclude_extinct`, clones of size zero
    /// are dropped.
    fn clone_sizes(
        &self,
        time: f32,
        tag: u8,
        exclude_extinct: bool,
    ) -> Vec<CloneSize>;
}

/// Construct a fresh simulator handle from a seed configuration and the time
/// points at which the clone sizes will be queried.
pub trait SpawnSim {
    type Sim: LabelledSim;

    fn spawn(
        &self,
        seed: &SeedConfig,
        timepoints: &[f32],
    ) -> anyhow::Result<Self::Sim>;
}
