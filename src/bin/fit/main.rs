use app::Fitting;
use chrono::Utc;
use clap::Parser;
use clap_app::Cli;
use clonal_evo::data::TargetData;
use clonal_evo::scoring::{FitConfig, Scorer};
use clonal_evo::wf2d::Wf2dSpawner;

mod app;
mod clap_app;

fn main() {
    let cli = Cli::parse();
    println!("{} Starting the fitting for {}", Utc::now(), cli.condition);

    let target = match TargetData::load(&cli.data, cli.condition) {
        Ok(target) => target,
        Err(err) => {
            eprintln!(
                "{} Error while loading the dataset: {:?}",
                Utc::now(),
                err
            );
            std::process::exit(1);
        }
    };

    let config = FitConfig::default();
    let spawner = Wf2dSpawner { division_rate: config.division_rate };
    let fitting = Fitting {
        scorer: Scorer::new(
            &format!("clone_size_distance_{}", cli.condition),
            target,
            config,
            spawner,
            cli.verbose,
        ),
        candidates: cli.candidates,
        seed: cli.seed,
        history: cli.condition.history_path(&cli.path),
        sequential: cli.sequential,
        verbose: cli.verbose,
    };

    std::process::exit(match fitting.run() {
        Ok(()) => {
            println!("{} End fitting", Utc::now());
            0
        }
        Err(err) => {
            eprintln!("{} Error while fitting: {:?}", Utc::now(), err);
            1
        }
    });
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;

    Cli::command().debug_assert()
}
