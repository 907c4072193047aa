//! Resampling gridded files onto a regular latitude/longitude grid.
//!
//! The batch driver, [`Resampler::run`], never stops on a bad file: a file
//! whose latitude or longitude has a single value is skipped, and any other
//! error is reported and the next file processed.
use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use error_stack::ResultExt;
use ndarray::ArrayD;
use netcdf::{
    types::{FloatType, NcVariableType},
    Extents,
};

use crate::{
    config::GridConfig,
    discovery,
    error::{GridError, RunError},
    grid::TargetAxis,
    interpolation::{interp_along_axis, InterpolationKind, InterpolationMethod},
    menu::{self, MenuError, INVALID_CHOICE_MSG},
    nc_utils::{self, NcArray, FILL_VALUE_ATTR},
};

/// Prefix added to input file names to name the output files.
pub const OUTPUT_PREFIX: &str = "interpolated_";

/// Name of the output file for `input`, or `None` if it has no file name.
pub fn output_file_name(input: &Path) -> Option<String> {
    let name = input.file_name()?.to_string_lossy();
    Some(format!("{OUTPUT_PREFIX}{name}"))
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Written(PathBuf),
    /// Either spatial coordinate had a single value.
    Skipped { lat_size: usize, lon_size: usize },
}

#[derive(Debug, Default)]
pub struct ResampleReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl ResampleReport {
    pub fn total(&self) -> usize {
        self.written.len() + self.skipped.len() + self.failed.len()
    }
}

/// Resamples files with one interpolation method into `<output_root>/<method>/`.
pub struct Resampler<'c> {
    config: &'c GridConfig,
    kind: InterpolationKind,
    method: Box<dyn InterpolationMethod>,
    output_dir: PathBuf,
    /// Output file names already written during this run.
    written_names: Vec<String>,
}

impl<'c> Resampler<'c> {
    pub fn new(config: &'c GridConfig, kind: InterpolationKind) -> Self {
        Self {
            config,
            kind,
            method: kind.interpolator(config.polynomial_order),
            output_dir: config.method_output_dir(kind.name()),
            written_names: vec![],
        }
    }

    pub fn kind(&self) -> InterpolationKind {
        self.kind
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the method's output directory (and any missing parents).
    pub fn prepare_output_dir(&self) -> error_stack::Result<(), GridError> {
        std::fs::create_dir_all(&self.output_dir).change_context_lazy(|| {
            GridError::context(format!(
                "Could not create output directory {}",
                self.output_dir.display()
            ))
        })
    }

    /// Resample each of `files` in turn, printing progress to `out`.
    ///
    /// Errors for individual files are printed, logged, and collected in the
    /// returned report; they do not stop the remaining files.
    pub fn run<W: Write>(&mut self, files: &[PathBuf], out: &mut W) -> ResampleReport {
        let mut report = ResampleReport::default();
        for path in files {
            match self.process_file(path, out) {
                Ok(FileOutcome::Written(out_path)) => report.written.push(out_path),
                Ok(FileOutcome::Skipped { .. }) => report.skipped.push(path.to_path_buf()),
                Err(e) => {
                    let filename = display_name(path);
                    if let Err(print_err) =
                        writeln!(out, "Error occurred while processing {filename}: {e}")
                    {
                        log::warn!("Could not print the error for {filename}: {print_err}");
                    }
                    log::error!("Error occurred while processing {}: {e:?}", path.display());
                    report.failed.push((path.to_path_buf(), e.to_string()));
                }
            }
        }

        log::info!(
            "Resampling with method '{}' finished: {} written, {} skipped, {} failed (of {} files)",
            self.kind,
            report.written.len(),
            report.skipped.len(),
            report.failed.len(),
            report.total()
        );
        report
    }

    /// Resample one file.
    pub fn process_file<W: Write>(
        &mut self,
        path: &Path,
        out: &mut W,
    ) -> error_stack::Result<FileOutcome, GridError> {
        let filename = display_name(path);
        let print_err = || GridError::context("Error writing progress message");

        let src = netcdf::open(path).change_context_lazy(|| GridError::open(path))?;
        let lat = nc_utils::read_coordinate(&src, &self.config.lat_name)?;
        let lon = nc_utils::read_coordinate(&src, &self.config.lon_name)?;

        writeln!(out, "File: {filename}").change_context_lazy(print_err)?;
        writeln!(out, "lat size: {}", lat.len()).change_context_lazy(print_err)?;
        writeln!(out, "lon size: {}", lon.len()).change_context_lazy(print_err)?;

        if lat.len() == 1 || lon.len() == 1 {
            writeln!(out, "Skipping file {filename} due to invalid dimensions")
                .change_context_lazy(print_err)?;
            return Ok(FileOutcome::Skipped {
                lat_size: lat.len(),
                lon_size: lon.len(),
            });
        }

        let step = self.config.step;
        let no_values =
            |name: &str| GridError::context(format!("Coordinate '{name}' has no valid values"));
        let new_lat = TargetAxis::spanning(&self.config.lat_name, &lat, step)
            .ok_or_else(|| no_values(&self.config.lat_name))?;
        let new_lon = TargetAxis::spanning(&self.config.lon_name, &lon, step)
            .ok_or_else(|| no_values(&self.config.lon_name))?;
        log::debug!(
            "{filename}: resampling {}x{} grid to {}x{}",
            lat.len(),
            lon.len(),
            new_lat.len(),
            new_lon.len()
        );

        let output_filename = output_file_name(path)
            .ok_or_else(|| GridError::context(format!("{} has no file name", path.display())))?;
        let output_path = self.output_dir.join(&output_filename);

        if self.written_names.contains(&output_filename) && output_path.exists() {
            std::fs::remove_file(&output_path).change_context_lazy(|| {
                GridError::context(format!("Could not remove existing {}", output_path.display()))
            })?;
            writeln!(out, "Existing file {output_filename} removed")
                .change_context_lazy(print_err)?;
        }

        // Moved to output_path only once every variable is written
        let partial_path = self.output_dir.join(format!(".{output_filename}{PARTIAL_SUFFIX}"));

        let grid = SpatialGrid {
            lat_name: &self.config.lat_name,
            lon_name: &self.config.lon_name,
            src_lat: &lat,
            src_lon: &lon,
            new_lat: &new_lat,
            new_lon: &new_lon,
        };
        if let Err(e) = resample_file(&src, &partial_path, &grid, self.method.as_ref()) {
            remove_partial(&partial_path);
            return Err(e);
        }
        std::fs::rename(&partial_path, &output_path)
            .change_context_lazy(|| GridError::write(&output_path))
            .attach_printable_lazy(|| format!("moving {} into place", partial_path.display()))
            .inspect_err(|_| remove_partial(&partial_path))?;

        writeln!(out, "Interpolated variables saved to {}", output_path.display())
            .change_context_lazy(print_err)?;
        self.written_names.push(output_filename);
        Ok(FileOutcome::Written(output_path))
    }
}

/// Ask for the interpolation method on `output`/`input`, then resample every
/// input file with it.
///
/// The method output directory is only created once a valid method has been
/// chosen; an invalid answer prints a notice and returns
/// [`RunError::InvalidChoice`] without touching the filesystem.
pub fn run_with_menu<R: BufRead, W: Write>(
    config: &GridConfig,
    input: &mut R,
    output: &mut W,
) -> error_stack::Result<ResampleReport, RunError> {
    let kind = match menu::prompt_method(input, output) {
        Ok(kind) => kind,
        Err(e @ MenuError::InvalidChoice(_)) => {
            if let Err(print_err) = writeln!(output, "{INVALID_CHOICE_MSG}") {
                log::warn!("Could not print the invalid choice notice: {print_err}");
            }
            return Err(e).change_context(RunError::InvalidChoice);
        }
        Err(e) => {
            return Err(e)
                .change_context_lazy(|| RunError::context("Could not read the menu choice"));
        }
    };
    log::info!("Using interpolation method '{kind}'");

    let mut resampler = Resampler::new(config, kind);
    resampler
        .prepare_output_dir()
        .change_context_lazy(|| RunError::context("Could not set up the output directory"))?;

    let files = discovery::find_files(&config.input_dir, &config.extensions)
        .change_context_lazy(|| RunError::context("Could not list the input files"))?;
    if files.is_empty() {
        log::warn!(
            "No files ending in {} found in {}",
            config.extensions.join(" or "),
            config.input_dir.display()
        );
    }

    Ok(resampler.run(&files, output))
}

/// Suffix of the temporary file an output is written to before it is complete.
const PARTIAL_SUFFIX: &str = ".part";

fn remove_partial(partial_path: &Path) {
    if partial_path.exists() {
        if let Err(e) = std::fs::remove_file(partial_path) {
            log::warn!("Could not remove incomplete output {}: {e}", partial_path.display());
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Source and target spatial coordinates for one file.
struct SpatialGrid<'a> {
    lat_name: &'a str,
    lon_name: &'a str,
    src_lat: &'a [f64],
    src_lon: &'a [f64],
    new_lat: &'a TargetAxis,
    new_lon: &'a TargetAxis,
}

/// Write a copy of `src` to `dest_path` with every variable on the
/// latitude/longitude dimensions interpolated to the new grid.
fn resample_file(
    src: &netcdf::File,
    dest_path: &Path,
    grid: &SpatialGrid,
    method: &dyn InterpolationMethod,
) -> error_stack::Result<(), GridError> {
    let write_err = || GridError::write(dest_path);

    // The coordinates' dimensions are what the data variables use
    let lat_dim = coordinate_dim(src, grid.lat_name)?;
    let lon_dim = coordinate_dim(src, grid.lon_name)?;

    let mut dest = netcdf::create(dest_path).change_context_lazy(write_err)?;
    nc_utils::copy_global_attributes(src, &mut dest).change_context_lazy(write_err)?;

    for dim in src.dimensions() {
        let name = dim.name();
        let len = if name == lat_dim {
            grid.new_lat.len()
        } else if name == lon_dim {
            grid.new_lon.len()
        } else {
            dim.len()
        };
        dest.add_dimension(&name, len)
            .change_context_lazy(write_err)
            .attach_printable_lazy(|| format!("adding dimension '{name}'"))?;
    }

    for var in src.variables() {
        let varname = var.name();
        let dim_names: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let dim_refs: Vec<&str> = dim_names.iter().map(|s| s.as_str()).collect();
        let vartype = var.vartype();

        if varname == grid.lat_name || varname == grid.lon_name {
            let axis = if varname == grid.lat_name {
                grid.new_lat
            } else {
                grid.new_lon
            };
            let values = ndarray::Array1::from_vec(axis.values.clone()).into_dyn();
            let mut new_var = NcArray::F64(values)
                .put_to(&mut dest, &varname, &dim_refs, None)
                .change_context_lazy(write_err)?;
            nc_utils::copy_var_attributes(&var, &mut new_var, &[FILL_VALUE_ATTR])
                .change_context_lazy(write_err)?;
            continue;
        }

        let lat_axis = dim_names.iter().position(|d| d == &lat_dim);
        let lon_axis = dim_names.iter().position(|d| d == &lon_dim);
        let fill = nc_utils::get_fill_value(&var);

        if lat_axis.is_none() && lon_axis.is_none() {
            if !nc_utils::is_supported_type(&vartype) {
                log::warn!(
                    "Variable '{varname}' has unsupported type {}, not copying it",
                    nc_utils::type_name(&vartype)
                );
                continue;
            }
            let data = NcArray::get_from(&var)?;
            let mut new_var = data
                .put_to(&mut dest, &varname, &dim_refs, fill)
                .change_context_lazy(write_err)?;
            nc_utils::copy_var_attributes(&var, &mut new_var, &[FILL_VALUE_ATTR])
                .change_context_lazy(write_err)?;
            continue;
        }

        if !nc_utils::is_numeric_type(&vartype) {
            log::warn!(
                "Variable '{varname}' is on the spatial grid but has non-numeric type {}, \
                 not copying it",
                nc_utils::type_name(&vartype)
            );
            continue;
        }

        let read_err = || GridError::context(format!("Error reading variable '{varname}'"));
        let mut data = var
            .get::<f64, _>(Extents::All)
            .change_context_lazy(read_err)?;
        if let Some(fill) = fill {
            data.mapv_inplace(|v| if v == fill { f64::NAN } else { v });
        }

        let interp_err = || GridError::context(format!("Error interpolating variable '{varname}'"));
        if let Some(axis) = lat_axis {
            data = interp_along_axis(data.view(), axis, grid.src_lat, &grid.new_lat.values, method)
                .change_context_lazy(interp_err)
                .attach_printable_lazy(|| format!("along '{lat_dim}'"))?;
        }
        if let Some(axis) = lon_axis {
            data = interp_along_axis(data.view(), axis, grid.src_lon, &grid.new_lon.values, method)
                .change_context_lazy(interp_err)
                .attach_printable_lazy(|| format!("along '{lon_dim}'"))?;
        }

        if let Some(fill) = fill {
            data.mapv_inplace(|v| if v.is_nan() { fill } else { v });
        }

        let out_data = to_output_array(data, &vartype);
        let mut new_var = out_data
            .put_to(&mut dest, &varname, &dim_refs, fill)
            .change_context_lazy(write_err)?;
        nc_utils::copy_var_attributes(&var, &mut new_var, &[FILL_VALUE_ATTR])
            .change_context_lazy(write_err)?;
    }

    Ok(())
}

/// Name of the (single) dimension of coordinate variable `name`.
fn coordinate_dim(src: &netcdf::File, name: &str) -> error_stack::Result<String, GridError> {
    let var = src
        .variable(name)
        .ok_or_else(|| GridError::missing_variable(name))?;
    let dims = var.dimensions();
    if dims.len() != 1 {
        return Err(GridError::CoordinateNotOneDimensional {
            name: name.to_string(),
            ndim: dims.len(),
        }
        .into());
    }
    Ok(dims[0].name())
}

/// Single precision input stays single precision; everything else is written as double.
fn to_output_array(data: ArrayD<f64>, vartype: &NcVariableType) -> NcArray {
    match vartype {
        NcVariableType::Float(FloatType::F32) => NcArray::F32(data.mapv(|v| v as f32)),
        _ => NcArray::F64(data),
    }
}
