use anyhow::{Context, Result};
use log::{info, warn};
use std::io::Write;
use std::path::PathBuf;

use emharvest::convert::{InstrumentConstants, PassthroughConverter, SchemaConverter};
use emharvest::extract::{dataset_name, read_metadata, ExtractOptions};

use super::config::Config;
use super::ExtractArgs;

/// Fallback dataset name for the converted output.
const FALLBACK_DATASET_NAME: &str = "Dataset";

fn load_config(explicit: Option<PathBuf>) -> Result<Config> {
    match explicit {
        Some(path) => Config::from_file(&path),
        None => match Config::default_path() {
            Ok(path) => Ok(Config::load_if_present(&path)?.unwrap_or_default()),
            Err(e) => {
                warn!("{e:#}");
                Ok(Config::default())
            }
        },
    }
}

/// Command-line values win over configured ones, field by field.
fn resolve_settings(args: &ExtractArgs, config: Config) -> (InstrumentConstants, Option<PathBuf>) {
    let configured = config.instrument_constants();
    let constants = InstrumentConstants {
        cs: args.cs.clone().unwrap_or(configured.cs),
        gain_flip_rotate: args
            .gain_flip_rotate
            .clone()
            .unwrap_or(configured.gain_flip_rotate),
    };
    let mirror = args
        .mirror
        .clone()
        .or(config.paths.mirror_folder)
        .filter(|path| !path.as_os_str().is_empty());
    (constants, mirror)
}

/// Extract a dataset and convert the merged record
pub fn run(args: ExtractArgs, config_path: Option<PathBuf>) -> Result<()> {
    let root = args
        .input
        .clone()
        .or_else(|| args.directory.clone())
        .context("No dataset directory given")?;

    let config = load_config(config_path)?;
    let (constants, mirror_folder) = resolve_settings(&args, config);

    let options = ExtractOptions {
        root: root.clone(),
        folder_filter: args.folder_filter.clone(),
        mirror_folder,
        create_zip: args.zip,
        write_full_metadata: args.full,
        output_dir: args.output_dir.clone(),
        show_progress: !args.no_progress,
    };

    info!("Extracting metadata from {}", root.display());
    let data = read_metadata(&options).context("The extraction went wrong")?;

    let output = args.output.clone().unwrap_or_else(|| {
        let name = dataset_name(&root).unwrap_or_else(|| FALLBACK_DATASET_NAME.to_string());
        PathBuf::from(format!("{name}_converted.json"))
    });
    let converted = PassthroughConverter
        .convert(&data, &constants, Some(&output))
        .context("The conversion went wrong")?;

    if args.stdout {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(&converted)?;
        writeln!(stdout)?;
    }
    Ok(())
}
