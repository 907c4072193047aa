use std::{
    io::{BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use error_stack::ResultExt;
use satgrid::{
    config::GridConfig,
    dataset::DatasetSummary,
    discovery,
    logging::init_logging,
    plotting::{self, render, OutputFormat, PlotStyle},
};

/// Draw maps of one variable from the first netCDF file in the plot
/// directory, one image per time step (and level, for 4D variables).
#[derive(Debug, Parser)]
struct Cli {
    /// TOML configuration file; values in it override the defaults and are
    /// in turn overridden by SATGRID_* environment variables.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Colour by the base 10 logarithm of the values. Zero and negative
    /// values are left blank.
    #[clap(long)]
    log_scale: bool,

    /// Label for the colour bar, e.g. the variable's units.
    #[clap(long)]
    cb_label: Option<String>,

    /// Image format to write, "png" or "html".
    #[clap(long, default_value_t = OutputFormat::Png)]
    format: OutputFormat,

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

/// Returns `Ok(false)` if there was nothing to plot.
fn main_inner(clargs: Cli, config: GridConfig) -> error_stack::Result<bool, CliError> {
    let dir = config.plot_dir();
    let file = discovery::first_file(dir, &config.plot_extensions)
        .change_context_lazy(|| CliError::context("Could not list the plot directory"))?;
    let Some(file) = file else {
        println!("No netCDF files found in the specified directory.");
        return Ok(false);
    };
    log::info!("Plotting from {}", file.display());

    let summary = DatasetSummary::open(&file)
        .change_context_lazy(|| CliError::context("Could not read the file to plot"))?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Variables in the netCDF file:").change_context_lazy(print_err)?;
    summary.write_listing(&mut stdout).change_context_lazy(print_err)?;

    write!(stdout, "Enter the name of the variable: ").change_context_lazy(print_err)?;
    stdout.flush().change_context_lazy(print_err)?;
    let mut varname = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut varname)
        .change_context_lazy(|| CliError::context("Could not read the variable name"))?;
    let varname = varname.trim();

    if !summary.contains(varname) {
        writeln!(stdout, "Variable not found in the dataset.").change_context_lazy(print_err)?;
        return Ok(false);
    }

    let frames = plotting::frames_from_path(&file, varname, &config)
        .change_context_lazy(|| CliError::context(format!("Could not plot '{varname}'")))?;

    let extent = plotting::map_extent(
        frames.first().and_then(|f| f.bounds()),
        config.map_padding,
    );
    let style = PlotStyle {
        log_scale: clargs.log_scale,
        colorbar_label: clargs.cb_label,
        format: clargs.format,
    };

    std::fs::create_dir_all(&config.plot_output_dir).change_context_lazy(|| {
        CliError::context(format!(
            "Could not create plot output directory {}",
            config.plot_output_dir.display()
        ))
    })?;
    for frame in frames.iter() {
        let path = render::write_frame(frame, &extent, &style, &config.plot_output_dir);
        writeln!(stdout, "{}: {}", frame.title, path.display()).change_context_lazy(print_err)?;
    }
    log::info!(
        "Wrote {} maps of '{varname}' to {}",
        frames.len(),
        config.plot_output_dir.display()
    );
    Ok(true)
}

fn print_err() -> CliError {
    CliError::context("Error writing to the terminal")
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
