use clap::Parser;
use efl_finder::{
    console::{write_solutions, Args, PartialArgs, SearchDescription},
    error::{EflError, EflResult},
    search::Search,
};
use env_logger::Env;
use log::info;
use std::{fs::File, io};

fn main() -> EflResult<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    //parse CLI arguments
    let args = Args::try_from(PartialArgs::parse())?;

    //read search description and build the topology and the configuration
    let description = SearchDescription::from_file(&args.config_path)?;
    let topology = description.topology()?;
    let mut config = description.config()?;
    if let Some(nr_of_threads) = args.nr_of_threads {
        config = config.with_nr_of_threads(nr_of_threads)?;
    }

    //run the search
    let report = Search::new(config)?.run(topology.as_ref())?;
    let statistics = report.statistics();
    info!(
        "{} units, {} candidates evaluated, {} solutions found",
        statistics.nr_of_units, statistics.nr_of_candidates, statistics.nr_of_accepted
    );

    //write the solutions
    let solutions = report.sorted_solutions();
    if let Some(path) = &args.output_path {
        let file = File::create(path).map_err(|e| {
            EflError::Console(format!("cannot create file {} : {}", path.display(), e))
        })?;
        write_solutions(&solutions, file)?;
        info!("solutions written to {}", path.display());
        Ok(())
    } else {
        write_solutions(&solutions, io::stdout().lock())
    }
}
