use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use satgrid::{config::GridConfig, dataset::DatasetSummary, discovery, logging::init_logging};

/// Print the name and shape of every variable in the first netCDF file of
/// the inspection directory.
#[derive(Debug, Parser)]
struct Cli {
    /// TOML configuration file; values in it override the defaults and are
    /// in turn overridden by SATGRID_* environment variables.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Print the configuration that would be used and exit.
    #[clap(long)]
    show_config: bool,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

fn main() -> ExitCode {
    let clargs = Cli::parse();
    let config = match GridConfig::load(clargs.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {e:?}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(clargs.verbosity.log_level_filter(), config.log_file.as_deref());

    match main_inner(clargs, config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("ERROR: {e:?}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` if there was no file to inspect.
fn main_inner(clargs: Cli, config: GridConfig) -> error_stack::Result<bool, CliError> {
    if clargs.show_config {
        let text = config
            .to_toml()
            .change_context_lazy(|| CliError::context("Could not display configuration"))?;
        println!("{text}");
        return Ok(true);
    }

    let dir = config.inspect_dir();
    log::debug!("Looking for files to inspect in {}", dir.display());
    let sample = discovery::first_file(dir, &config.plot_extensions)
        .change_context_lazy(|| CliError::context("Could not list the inspection directory"))?;

    let Some(sample) = sample else {
        println!("No netCDF files found in the specified directory.");
        return Ok(false);
    };
    log::info!("Inspecting {}", sample.display());

    let summary = DatasetSummary::open(&sample)
        .change_context_lazy(|| CliError::context("Could not read the sample file"))?;
    summary
        .write_listing(&mut std::io::stdout().lock())
        .change_context_lazy(|| CliError::context("Could not print the variable listing"))?;
    Ok(true)
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Context(String),
}

impl CliError {
    fn context<S: ToString>(ctx: S) -> Self {
        Self::Context(ctx.to_string())
    }
}
