use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "haplo")]
#[command(
    about = "Compare the haplosufficient and haploinsufficient NOTCH1 models",
    long_about = "Simulate many independent replicates of double-mutant \
takeover under the two competing genetic models and summarise the population \
trajectories with the median and the 95% credible band"
)]
pub struct Cli {
    /// Directory where the trajectory summaries are stored
    #[arg(value_name = "DIR")]
    pub path: PathBuf,
    /// Number of independent replicates per genetic model
    #[arg(long, default_value_t = 100)]
    pub runs: usize,
    /// Number of sample intervals per replicate (each trajectory has
    /// samples + 1 entries)
    #[arg(long, default_value_t = 200)]
    pub samples: usize,
    /// Side of the square lattice
    #[arg(long, default_value_t = 500)]
    pub side: usize,
    /// Mutation rate per allele per division
    #[arg(long, default_value_t = 0.000005)]
    pub mutation_rate: f64,
    /// Divisions per cell per day
    #[arg(long, default_value_t = 0.27)]
    pub division_rate: f32,
    /// Time horizon of each replicate (days)
    #[arg(long, default_value_t = 5000.)]
    pub max_time: f32,
    /// Fitness of cells with one mutated allele under haploinsufficiency
    #[arg(long, default_value_t = 2.3)]
    pub het_fitness: f32,
    /// Fitness of double-mutant cells
    #[arg(long, default_value_t = 7.0)]
    pub hom_fitness: f32,
    #[arg(short, long, action = ArgAction::Count, default_value_t = 0)]
    pub verbose: u8,
}
