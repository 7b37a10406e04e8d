use clap::{ArgAction, Parser};
use clonal_evo::data::Condition;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "fit")]
#[command(
    about = "Fit the fitness and induction rate of labelled clones",
    long_about = "Score candidate fitness/induction parameter sets against the \
clonal counting dataset by simulating clone-size distributions on a 2D lattice \
and comparing them with the summed Kolmogorov-Smirnov distance"
)]
pub struct Cli {
    /// The experimental condition to fit against
    #[arg(value_enum)]
    pub condition: Condition,
    /// CSV export of the clonal counting dataset
    #[arg(long, value_name = "FILE", default_value = "clonal_counts.csv")]
    pub data: PathBuf,
    /// Directory where the sampling history is stored
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub path: PathBuf,
    /// Number of candidate parameter sets drawn from the priors
    #[arg(long, default_value_t = 1000)]
    pub candidates: usize,
    /// Seed for the candidate draws
    #[arg(long, default_value_t = 26)]
    pub seed: u64,
    /// Score candidates sequentially instead of using rayon for
    /// parallelisation
    #[arg(short, long, action = ArgAction::SetTrue, default_value_t = false)]
    pub sequential: bool,
    #[arg(short, long, action = ArgAction::Count, default_value_t = 0)]
    pub verbose: u8,
}
