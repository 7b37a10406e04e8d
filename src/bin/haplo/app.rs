use anyhow::Context;
use chrono::Utc;
use clonal_evo::trajectory::{run_replicates, TrajectorySummary};
use clonal_evo::wf2d::{GeneticModel, MutationSim};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// One line of the trajectory summary: the credible band of the
/// double-mutant population at one sample time.
#[derive(Debug, Serialize)]
struct SummaryRecord {
    time: f32,
    lower: f64,
    median: f64,
    upper: f64,
}

pub struct Comparison {
    pub path2dir: PathBuf,
    pub runs: usize,
    pub samples: usize,
    pub side: usize,
    pub mutation_rate: f64,
    pub division_rate: f32,
    pub max_time: f32,
    pub het_fitness: f32,
    pub hom_fitness: f32,
    pub verbose: u8,
}

impl Comparison {
    pub fn run(&self) -> anyhow::Result<()> {
        //! Run the replicate set for both genetic models and save one
        //! summary file per model.
        for (model, filename) in [
            (GeneticModel::Haplosufficient, "haplosufficient"),
            (GeneticModel::Haploinsufficient, "haploinsufficient"),
        ] {
            println!(
                "{} Running {} {:?} replicates",
                Utc::now(),
                self.runs,
                model
            );
            let (summary, times) = self.aggregate(model);
            self.save(&summary, &times, &self.path2dir.join(filename))?;
        }
        Ok(())
    }

    fn build_sim(&self, model: GeneticModel) -> MutationSim {
        MutationSim::new(
            self.side,
            model,
            self.het_fitness,
            self.hom_fitness,
            self.mutation_rate,
            self.division_rate,
            self.max_time,
            self.samples,
        )
    }

    fn aggregate(
        &self,
        model: GeneticModel,
    ) -> (TrajectorySummary, Vec<f32>) {
        let total_pop = (self.side * self.side) as u64;
        let matrix =
            run_replicates(self.runs, self.samples, total_pop, |rng| {
                let mut sim = self.build_sim(model);
                sim.run(rng).to_vec()
            });
        let times = self.build_sim(model).sample_times();
        (matrix.summarise(), times)
    }

    fn save(
        &self,
        summary: &TrajectorySummary,
        times: &[f32],
        path2file: &Path,
    ) -> anyhow::Result<()> {
        fs::create_dir_all(&self.path2dir)
            .with_context(|| "Cannot create dir".to_string())?;
        let path2file = path2file.with_extension("csv");
        if self.verbose > 0 {
            println!(
                "{} Saving the trajectory summary to {:#?}",
                Utc::now(),
                path2file
            );
        }
        let mut wtr = csv::Writer::from_path(&path2file)?;
        for (idx, &time) in times.iter().enumerate() {
            wtr.serialize(SummaryRecord {
                time,
                lower: summary.lower[idx],
                median: summary.median[idx],
                upper: summary.upper[idx],
            })
            .with_context(|| {
                "Cannot serialize the trajectory summary".to_string()
            })?;
        }
        wtr.flush()?;
        Ok(())
    }
}
