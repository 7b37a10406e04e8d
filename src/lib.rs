//! Stochastic models of NOTCH1-mutant clonal dynamics in the oesophageal
//! epithelium.
//!
//! There are two different ways of using this library:
//!
//! 1. score candidate parameter sets (a fitness advantage and an induction
//! rate) against an experimental clone-size dataset, producing the scalar
//! distance consumed by an approximate Bayesian computation (ABC) sampler
//!
//! 2. compare the haplosufficient against the haploinsufficient NOTCH1 model
//! by simulating many independent replicates of double-mutant takeover and
//! summarising the trajectories with credible bands
//!
//! # Scoring example
//! Score one candidate against the wild-type dataset.
//! ```no_run
//! use std::path::Path;
//!
//! use clonal_evo::data::{Condition, TargetData};
//! use clonal_evo::scoring::{Candidate, FitConfig, Scorer};
//! use clonal_evo::wf2d::Wf2dSpawner;
//!
//! let target =
//!     TargetData::load(Path::new("counts.csv"), Condition::Wt).unwrap();
//! let config = FitConfig::default();
//! let spawner = Wf2dSpawner { division_rate: config.division_rate };
//! let scorer = Scorer::new("wt", target, config, spawner, 0);
//!
//! // the sampler-facing call: failures come back as the sentinel distance
//! let score = scorer.distance_for(&Candidate { fitness: 2., induction: 0.01 });
//! println!("{}", score.distance);
//! ```
pub mod data;
pub mod distance;
pub mod scoring;
pub mod seed;
pub mod simulator;
pub mod trajectory;
pub mod wf2d;

#[doc(inline)]
pub use crate::scoring::{Candidate, Score, ScoreError, Scorer};
#[doc(inline)]
pub use crate::seed::SeedConfig;

/// Number of cells in one clone or in one subpopulation.
pub type CloneSize = u64;
