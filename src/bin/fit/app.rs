use anyhow::Context;
use chrono::Utc;
use clonal_evo::scoring::{Candidate, Scorer};
use clonal_evo::wf2d::Wf2dSpawner;
use indicatif::ParallelProgressIterator;
use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::{
    IndexedParallelIterator, IntoParallelIterator, ParallelIterator,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Priors of the original experimental design: fitness ~ U(0, 50) and
/// induction ~ U(0, 0.1).
const FITNESS_PRIOR: (f32, f32) = (0., 50.);
const INDUCTION_PRIOR: (f32, f32) = (0., 0.1);

/// One line of the sampling history persisted for later reload.
#[derive(Debug, Serialize)]
struct HistoryRecord {
    idx: usize,
    fitness: f32,
    induction: f32,
    distance: f32,
}

pub struct Fitting {
    pub scorer: Scorer<Wf2dSpawner>,
    pub candidates: usize,
    pub seed: u64,
    pub history: PathBuf,
    pub sequential: bool,
    pub verbose: u8,
}

impl Fitting {
    pub fn run(&self) -> anyhow::Result<()> {
        //! Draw candidates from the priors, score them across the worker
        //! pool and persist the full sampling history.
        let candidates = self.draw_candidates();
        if self.verbose > 0 {
            println!(
                "{} Scoring {} candidates with {} cores for {}",
                Utc::now(),
                candidates.len(),
                rayon::current_num_threads(),
                self.scorer.name()
            );
        }

        let scores: Vec<f32> = if self.sequential {
            candidates
                .iter()
                .map(|candidate| self.scorer.distance_for(candidate).distance)
                .collect()
        } else {
            candidates
                .clone()
                .into_par_iter()
                .progress_count(candidates.len() as u64)
                .map(|candidate| {
                    self.scorer.distance_for(&candidate).distance
                })
                .collect()
        };

        self.save(&candidates, &scores)
    }

    fn draw_candidates(&self) -> Vec<Candidate> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let fitness = Uniform::new(FITNESS_PRIOR.0, FITNESS_PRIOR.1);
        let induction = Uniform::new(INDUCTION_PRIOR.0, INDUCTION_PRIOR.1);
        (0..self.candidates)
            .map(|_| Candidate {
                fitness: fitness.sample(&mut rng),
                induction: induction.sample(&mut rng),
            })
            .collect()
    }

    fn save(
        &self,
        candidates: &[Candidate],
        scores: &[f32],
    ) -> anyhow::Result<()> {
        if let Some(dir) = self.history.parent() {
            fs::create_dir_all(dir)
                .with_context(|| "Cannot create dir".to_string())?;
        }
        if self.verbose > 1 {
            println!(
                "{} Saving the sampling history to {:#?}",
                Utc::now(),
                self.history
            );
        }
        let mut wtr = csv::Writer::from_path(&self.history)?;
        for (idx, (candidate, &distance)) in
            candidates.iter().zip(scores.iter()).enumerate()
        {
            wtr.serialize(HistoryRecord {
                idx,
                fitness: candidate.fitness,
                induction: candidate.induction,
                distance,
            })
            .with_context(|| {
                "Cannot serialize the sampling history".to_string()
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
