use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use satgrid::{config::GridConfig, error::RunError, logging::init_logging, resample};

/// Resample every netCDF file in the input directory onto a regular
/// latitude/longitude grid, using an interpolation method chosen from a menu.
///
/// Output goes to <output_root>/<method>/interpolated_<file name>.
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

    if let Err(e) = main_inner(clargs, config) {
        // The notice for an invalid menu choice has already been printed
        if let RunError::InvalidChoice = e.current_context() {
            log::debug!("{e:?}");
        } else {
            eprintln!("ERROR: {e:?}");
        }
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn main_inner(clargs: Cli, config: GridConfig) -> error_stack::Result<(), RunError> {
    if clargs.show_config {
        let text = config
            .to_toml()
            .change_context_lazy(|| RunError::context("Could not display configuration"))?;
        println!("{text}");
        return Ok(());
    }

    // Failures of individual files are reported as they happen and do not
    // change the exit status.
    let report = resample::run_with_menu(
        &config,
        &mut std::io::stdin().lock(),
        &mut std::io::stdout().lock(),
    )?;
    for (path, err) in report.failed.iter() {
        log::warn!("Not resampled: {} ({err})", path.display());
    }
    Ok(())
}
