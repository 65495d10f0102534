use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod configure;
mod extract;

/// emharvest - Cryo-EM acquisition metadata harvester
#[derive(Parser)]
#[command(name = "emharvest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use this TOML config file instead of the per-user one
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Options of the extract command.
#[derive(clap::Args)]
pub struct ExtractArgs {
    /// Dataset directory
    #[arg(value_name = "DIR", required_unless_present = "input")]
    directory: Option<PathBuf>,

    /// Dataset directory (takes precedence over DIR)
    #[arg(short = 'i', long, value_name = "DIR")]
    input: Option<PathBuf>,

    /// Also write a zip archive of all XML files
    #[arg(short = 'z', long)]
    zip: bool,

    /// Also write the full merged metadata as <dataset>_full.json
    #[arg(short = 'f', long)]
    full: bool,

    /// Converted output file (defaults to <dataset>_converted.json)
    #[arg(short = 'o', long, value_name = "OUT")]
    output: Option<PathBuf>,

    /// Directory for the zip archive and the full metadata
    #[arg(long, value_name = "DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Spherical aberration, overrides the config file
    #[arg(long, value_name = "V")]
    cs: Option<String>,

    /// Gain reference flip/rotate hint, overrides the config file
    #[arg(long, value_name = "V", alias = "gain_flip_rotate")]
    gain_flip_rotate: Option<String>,

    /// Folder where EPU mirrors its metadata, overrides the config file
    #[arg(long, value_name = "DIR", alias = "epu")]
    mirror: Option<PathBuf>,

    /// Regex for non-standard metadata folder names
    #[arg(long, value_name = "REGEX", alias = "folder_filter")]
    folder_filter: Option<String>,

    /// Print the converted metadata to stdout as well
    #[arg(long, alias = "cli_out")]
    stdout: bool,

    /// Do not draw the progress line
    #[arg(long)]
    no_progress: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and merge the metadata of a dataset directory
    Extract(ExtractArgs),

    /// Create or replace the config file interactively
    Configure {
        /// Only print the current configuration
        #[arg(long)]
        show: bool,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Extract(args) => extract::run(args, cli.config),
        Commands::Configure { show } => configure::run(cli.config, show),
    }
}
