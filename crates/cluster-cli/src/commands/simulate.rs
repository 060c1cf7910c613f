use crate::cli::SimulateArgs;
use crate::config::PartialRunConfig;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use clusterexact::{
    core::io::layout::{read_layout_csv, write_distributions_csv},
    engine::progress::ProgressReporter,
    workflows::{self, result::SimulationResult},
};
use tracing::{info, warn};

pub fn run(args: SimulateArgs, threads: Option<usize>) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialRunConfig::from_file(path)?,
        None => PartialRunConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args, threads)?;

    info!("Loading layout from {:?}", &args.layout);
    let layout = read_layout_csv(&args.layout)?;
    println!("Loaded {} sites from {}.", layout.num_sites(), args.layout.display());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the ClusterExact workflow...");
    let result = workflows::ground_state::run(&layout, &config, &reporter)?;
    print_summary(&result);

    if args.compare {
        info!("Invoking the exhaustive reference workflow...");
        let reference = workflows::exhaustive::run(&layout, &config, &reporter)?;
        print_summary(&reference);
        if result.configurations() == reference.configurations() {
            println!("✓ Both searches found the same {} distribution(s).", result.len());
        } else {
            warn!(
                cluster_exact = result.len(),
                exhaustive = reference.len(),
                "Searches disagree."
            );
            return Err(CliError::Other(anyhow::anyhow!(
                "{} found {} distribution(s) but {} found {}",
                result.algorithm_name,
                result.len(),
                reference.algorithm_name,
                reference.len()
            )));
        }
    }

    if let Some(output) = &args.output {
        info!("Writing {} distribution(s) to {:?}", result.len(), output);
        write_distributions_csv(output, &result.charge_distributions).map_err(|e| {
            CliError::FileParsing {
                path: output.clone(),
                source: e.into(),
            }
        })?;
        println!("Distributions written to: {}", output.display());
    }

    Ok(())
}

fn print_summary(result: &SimulationResult) {
    println!(
        "{}: {} valid distribution(s) in {:.3}s.",
        result.algorithm_name,
        result.len(),
        result.runtime.as_secs_f64()
    );
    if result.is_empty() {
        println!("  No physically valid distribution exists.");
    }
    for ground_state in result.ground_states() {
        println!(
            "  Ground state {} (Energy: {:.6} eV)",
            ground_state.configuration, ground_state.system_energy
        );
    }
}
