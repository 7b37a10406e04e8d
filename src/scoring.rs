//! Score one candidate parameter set against the target dataset: seed the
//! lattice, rerun the simulator until every time point has enough independent
//! clone observations, subsample and compute the summed KS distance.
use crate::data::TargetData;
use crate::distance::{summed_distance, ERROR_DISTANCE};
use crate::seed::{SeedConfig, TRACKED_CLONE};
use crate::simulator::{LabelledSim, SpawnSim};
use crate::CloneSize;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One parameter set proposed by the external sampler, immutable for the
/// duration of one scoring call.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Relative multiplicative division advantage of the mutant cells.
    pub fitness: f32,
    /// Fraction of the initial lattice randomly labelled as mutant.
    pub induction: f32,
}

/// The scored result handed back to the external sampler.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct Score {
    pub distance: f32,
}

/// Why a candidate could not be scored. Every variant is recovered at the
/// sampler boundary and converted into the sentinel distance.
#[derive(Debug)]
pub enum ScoreError {
    /// Induction rate too low to place any mutant on the lattice.
    NoSeed,
    /// Retry budget exhausted before every time point accumulated the
    /// required number of clone observations.
    InsufficientClones,
    /// The simulator failed while constructing or running a realisation.
    Simulator(anyhow::Error),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::NoSeed => {
                write!(f, "induction rate too low, no mutants on the lattice")
            }
            ScoreError::InsufficientClones => {
                write!(f, "retry budget exhausted with too few clones")
            }
            ScoreError::Simulator(err) => {
                write!(f, "simulator failure: {}", err)
            }
        }
    }
}

/// Fixed experiment constants of one fitting session, passed explicitly into
/// each scoring call instead of living as module globals.
#[derive(Copy, Clone, Debug)]
pub struct FitConfig {
    /// Lattice shape (rows, cols). One 500x500 grid is 0.25 million cells;
    /// with roughly 1 million cells in the oesophagus, 4 grids make a full
    /// oesophagus.
    pub grid_shape: (usize, usize),
    /// Divisions per cell per day.
    pub division_rate: f32,
    /// Clone observations required per time point before scoring.
    pub required_clones: usize,
    /// Maximal number of independent realisations per scoring call. Bounds
    /// the work when an induction/fitness combination rarely produces
    /// surviving clones: at 4 grids per oesophagus, 50 grids is 12.5 mice
    /// worth, more than the sampled number.
    pub retry_budget: usize,
}

impl Default for FitConfig {
    fn default() -> Self {
        FitConfig {
            grid_shape: (500, 500),
            division_rate: 0.27,
            required_clones: 100,
            retry_budget: 50,
        }
    }
}

/// The single-call scoring function registered with the external sampler.
/// Binds the target dataset and the experiment constants at setup time; each
/// call owns its seed configuration and accumulators and draws fresh
/// randomness, so concurrent calls never share state.
pub struct Scorer<S> {
    name: String,
    target: TargetData,
    config: FitConfig,
    spawner: S,
    verbosity: u8,
}

impl<S: SpawnSim> Scorer<S> {
    pub fn new(
        name: &str,
        target: TargetData,
        config: FitConfig,
        spawner: S,
        verbosity: u8,
    ) -> Self {
        Scorer { name: name.to_owned(), target, config, spawner, verbosity }
    }

    /// Human-readable name the sampler attaches to this scoring function for
    /// bookkeeping.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distance_for(&self, candidate: &Candidate) -> Score {
        //! The sampler-facing entry point: every failure is absorbed into the
        //! sentinel distance because the sampler's contract requires a
        //! well-formed scored result from every call.
        match self.score(candidate) {
            Ok(score) => score,
            Err(err) => {
                if self.verbosity > 0 {
                    println!("unscoreable candidate {:?}: {}", candidate, err);
                }
                Score { distance: ERROR_DISTANCE }
            }
        }
    }

    pub fn score(
        &self,
        candidate: &Candidate,
    ) -> Result<Score, ScoreError> {
        let mut rng = SmallRng::from_entropy();
        self.score_with_rng(candidate, &mut rng)
    }

    pub fn score_with_rng(
        &self,
        candidate: &Candidate,
        rng: &mut impl Rng,
    ) -> Result<Score, ScoreError> {
        let (rows, cols) = self.config.grid_shape;
        let seed = SeedConfig::place(
            candidate.fitness,
            candidate.induction,
            rows,
            cols,
            rng,
        )
        .ok_or(ScoreError::NoSeed)?;

        let times = self.target.times();
        let samples = self.accumulate(&seed, &times, rng)?;
        let distance = summed_distance(&self.target, &samples)
            .map_err(ScoreError::Simulator)?;
        Ok(Score { distance })
    }

    fn accumulate(
        &self,
        seed: &SeedConfig,
        times: &[f32],
        rng: &mut impl Rng,
    ) -> Result<Vec<Vec<CloneSize>>, ScoreError> {
        //! Rerun independent realisations from the same seed configuration,
        //! pooling the surviving clone sizes per time point, until every time
        //! point holds at least `required_clones` observations or the retry
        //! budget is exhausted. Reruns count as independent draws because the
        //! stochastic transition dynamics, not the seed, are the source of
        //! randomness per realisation.
        let mut pools: Vec<Vec<CloneSize>> = vec![Vec::new(); times.len()];
        for _ in 0..self.config.retry_budget {
            let mut sim = self
                .spawner
                .spawn(seed, times)
                .map_err(ScoreError::Simulator)?;
            sim.run(rng).map_err(ScoreError::Simulator)?;
            for (pool, &time) in pools.iter_mut().zip(times.iter()) {
                pool.extend(sim.clone_sizes(time, TRACKED_CLONE, true));
            }
            if pools
                .iter()
                .all(|pool| pool.len() >= self.config.required_clones)
            {
                break;
            }
        }

        if pools
            .iter()
            .any(|pool| pool.len() < self.config.required_clones)
        {
            return Err(ScoreError::InsufficientClones);
        }

        // exactly `required_clones` observations per time point, drawn
        // without replacement from everything accumulated
        Ok(pools
            .into_iter()
            .map(|pool| {
                pool.choose_multiple(rng, self.config.required_clones)
                    .copied()
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Yields the same clone sizes at every time point of every realisation.
    struct MockSim {
        sizes: Vec<CloneSize>,
    }

    impl LabelledSim for MockSim {
        fn run(&mut self, _rng: &mut impl Rng) -> anyhow::Result<()> {
            Ok(())
        }

        fn clone_sizes(
            &self,
            _time: f32,
            _tag: u8,
            _exclude_extinct: bool,
        ) -> Vec<CloneSize> {
            self.sizes.clone()
        }
    }

    struct MockSpawner {
        per_run: Vec<CloneSize>,
        spawned: Cell<usize>,
        fail: bool,
    }

    impl MockSpawner {
        fn yielding(per_run: Vec<CloneSize>) -> Self {
            MockSpawner { per_run, spawned: Cell::new(0), fail: false }
        }
    }

    impl SpawnSim for MockSpawner {
        type Sim = MockSim;

        fn spawn(
            &self,
            _seed: &SeedConfig,
            _timepoints: &[f32],
        ) -> anyhow::Result<MockSim> {
            self.spawned.set(self.spawned.get() + 1);
            if self.fail {
                anyhow::bail!("forced termination")
            }
            Ok(MockSim { sizes: self.per_run.clone() })
        }
    }

    fn target_two_timepoints() -> TargetData {
        TargetData::new(vec![
            (10., (1..=16).collect()),
            (28., (1..=16).collect()),
        ])
        .unwrap()
    }

    fn config(required: usize, budget: usize) -> FitConfig {
        FitConfig {
            grid_shape: (20, 20),
            required_clones: required,
            retry_budget: budget,
            ..Default::default()
        }
    }

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(26)
    }

    #[test]
    fn no_seed_fails_before_spawning_the_simulator() {
        let spawner = MockSpawner::yielding((1..=200).collect());
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 50),
            spawner,
            0,
        );
        let candidate = Candidate { fitness: 2., induction: 0. };
        match scorer.score_with_rng(&candidate, &mut rng()) {
            Err(ScoreError::NoSeed) => {}
            other => panic!("expected NoSeed, got {:?}", other.map(|s| s.distance)),
        }
        assert_eq!(scorer.spawner.spawned.get(), 0);
    }

    #[test]
    fn loop_stops_after_one_sufficient_realisation() {
        let spawner = MockSpawner::yielding((1..=150).collect());
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 50),
            spawner,
            0,
        );
        let candidate = Candidate { fitness: 2., induction: 0.05 };
        scorer.score_with_rng(&candidate, &mut rng()).unwrap();
        assert_eq!(scorer.spawner.spawned.get(), 1);
    }

    #[test]
    fn loop_exhausts_the_retry_budget_then_fails() {
        // 3 clones per realisation, 12 retries: 36 < 100 at every time point
        let spawner = MockSpawner::yielding(vec![1, 2, 3]);
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 12),
            spawner,
            0,
        );
        let candidate = Candidate { fitness: 2., induction: 0.05 };
        match scorer.score_with_rng(&candidate, &mut rng()) {
            Err(ScoreError::InsufficientClones) => {}
            other => panic!("expected InsufficientClones, got {:?}", other.map(|s| s.distance)),
        }
        assert_eq!(scorer.spawner.spawned.get(), 12);
    }

    #[test]
    fn accumulation_spans_retries() {
        // 40 clones per realisation: sufficiency needs 3 realisations
        let spawner = MockSpawner::yielding((1..=40).collect());
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 50),
            spawner,
            0,
        );
        let candidate = Candidate { fitness: 2., induction: 0.05 };
        scorer.score_with_rng(&candidate, &mut rng()).unwrap();
        assert_eq!(scorer.spawner.spawned.get(), 3);
    }

    #[test]
    fn subsample_has_exactly_the_required_count_without_repeats() {
        let spawner = MockSpawner::yielding((1..=150).collect());
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 50),
            spawner,
            0,
        );
        let seed =
            SeedConfig::place(2., 0.05, 20, 20, &mut rng()).unwrap();
        let samples = scorer
            .accumulate(&seed, &[10., 28.], &mut rng())
            .unwrap();
        for sample in samples {
            assert_eq!(sample.len(), 100);
            // the pool held distinct values, so sampling without
            // replacement yields no repeats and stays a subset
            let mut sorted = sample.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), 100);
            assert!(sample.iter().all(|size| (1..=150).contains(size)));
        }
    }

    #[test]
    fn simulator_fault_is_absorbed_into_the_sentinel() {
        let mut spawner = MockSpawner::yielding(vec![1]);
        spawner.fail = true;
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 50),
            spawner,
            0,
        );
        let candidate = Candidate { fitness: 2., induction: 0.05 };
        let score = scorer.distance_for(&candidate);
        assert!((score.distance - ERROR_DISTANCE).abs() < f32::EPSILON);
    }

    #[test]
    fn sentinel_is_returned_for_unscoreable_candidates() {
        let spawner = MockSpawner::yielding(vec![1, 2]);
        let scorer = Scorer::new(
            "test",
            target_two_timepoints(),
            config(100, 2),
            spawner,
            0,
        );
        let candidate = Candidate { fitness: 2., induction: 0. };
        let score = scorer.distance_for(&candidate);
        assert!((score.distance - ERROR_DISTANCE).abs() < f32::EPSILON);
    }

    #[test]
    fn identical_target_and_simulation_scores_zero() {
        let observations: Vec<CloneSize> = (1..=100).collect();
        let target = TargetData::new(vec![
            (10., observations.clone()),
            (28., observations.clone()),
        ])
        .unwrap();
        // each realisation yields exactly the target observations, and the
        // subsample of 100 out of 100 is the whole pool
        let spawner = MockSpawner::yielding(observations);
        let scorer =
            Scorer::new("test", target, config(100, 50), spawner, 0);
        let candidate = Candidate { fitness: 2., induction: 0.05 };
        let score = scorer.score_with_rng(&candidate, &mut rng()).unwrap();
        assert!((score.distance - 0f32).abs() < f32::EPSILON);
    }
}
