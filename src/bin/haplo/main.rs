use app::Comparison;
use chrono::Utc;
use clap::Parser;
use clap_app::Cli;

mod app;
mod clap_app;

fn main() {
    let cli = Cli::parse();
    println!("{} Starting the model comparison", Utc::now());

    let comparison = Comparison {
        path2dir: cli.path,
        runs: cli.runs,
        samples: cli.samples,
        side: cli.side,
        mutation_rate: cli.mutation_rate,
        division_rate: cli.division_rate,
        max_time: cli.max_time,
        het_fitness: cli.het_fitness,
        hom_fitness: cli.hom_fitness,
        verbose: cli.verbose,
    };

    std::process::exit(match comparison.run() {
        Ok(()) => {
            println!("{} End model comparison", Utc::now());
            0
        }
        Err(err) => {
            eprintln!(
                "{} Error while comparing the models: {:?}",
                Utc::now(),
                err
            );
            1
        }
    });
}

#[test]
fn verify_cli() {
    use clap::CommandFactory;

    Cli::command().debug_assert()
}
