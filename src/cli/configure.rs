use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use super::config::Config;

const CS_PROMPT: &str = "What is your instrument's spherical aberration (CS)?";
const GAIN_PROMPT: &str = "What rotation or flipping is needed when importing the gain \
                           reference (e.g. into cryoSPARC)?";
const MIRROR_PROMPT: &str = "Where does EPU mirror its output and metadata XMLs (usually on \
                             the microscope PC)? Leave empty if unknown or unreachable.";

fn ask<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> Result<Option<String>> {
    writeln!(output, "{question}")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer).context("Error reading input")?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Ask for every setting; empty answers leave the setting unset.
pub fn prompt_config<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<Config> {
    let mut config = Config::default();
    config.instrument.cs = ask(input, output, CS_PROMPT)?;
    config.instrument.gainref_flip_rotate = ask(input, output, GAIN_PROMPT)?;
    config.paths.mirror_folder = ask(input, output, MIRROR_PROMPT)?.map(PathBuf::from);
    Ok(config)
}

/// Show or interactively replace the configuration
pub fn run(config_path: Option<PathBuf>, show: bool) -> Result<()> {
    let path = Config::resolve_path(config_path)?;

    match Config::load_if_present(&path) {
        Ok(Some(current)) => {
            let rendered = current.to_toml()?;
            println!("Current config ({}):\n{rendered}", path.display());
        }
        Ok(None) => eprintln!("No prior config at {}", path.display()),
        Err(e) => eprintln!("No prior config obtainable: {e:#}"),
    }
    if show {
        return Ok(());
    }

    let stdin = std::io::stdin();
    let config = prompt_config(&mut stdin.lock(), &mut std::io::stdout())?;
    config.save(&path)?;
    println!("Generated config at {}", path.display());
    Ok(())
}
