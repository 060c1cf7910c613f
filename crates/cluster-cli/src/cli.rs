use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ClusterExact CLI - exact ground-state search for silicon dangling bond layouts.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for the search.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Find every physically valid charge distribution of a dangling bond layout.
    Simulate(SimulateArgs),
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Path to the layout CSV file with an `x,y,z` header, one site per line.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub layout: PathBuf,

    /// Path to a run configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write every valid charge distribution to this CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    // --- Search Overrides ---
    /// Override the opening angle of the hierarchy's observation cones, in degrees.
    #[arg(long, value_name = "DEG")]
    pub cone_angle: Option<f64>,

    /// Override the combined cluster size from which potential bounds are cached.
    #[arg(long, value_name = "INT")]
    pub bound_cache_min_size: Option<usize>,

    /// Only consider negative and neutral charges.
    #[arg(long)]
    pub no_positive: bool,

    /// Also run the exhaustive reference search and report whether both agree.
    #[arg(long)]
    pub compare: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S physics.mu-minus=-0.25
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
