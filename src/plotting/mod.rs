//! Map frames of a gridded variable, one per time step (and level).
//!
//! Building the frames only needs netCDF; drawing them needs the `plotting`
//! feature, which provides the [`render`] module.
use std::path::Path;

use error_stack::ResultExt;
use ndarray::{s, Array2, Ix3, Ix4};
use netcdf::Extents;

use crate::{config::GridConfig, error::GridError, grid::finite_bounds, nc_utils};

#[cfg(feature = "plotting")]
pub mod render;

/// File format for rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Html,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Html => "html",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlotStyle {
    /// Colour by log10 of the values; zero and negative values are left blank.
    pub log_scale: bool,
    pub colorbar_label: Option<String>,
    pub format: OutputFormat,
}

/// A latitude/longitude rectangle, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl MapBounds {
    pub const GLOBE: MapBounds = MapBounds {
        min_lat: -90.0,
        max_lat: 90.0,
        min_lon: -180.0,
        max_lon: 180.0,
    };

    /// Bounds of the given coordinates, or `None` if either has no non-NaN value.
    pub fn from_coords(lat: &[f64], lon: &[f64]) -> Option<Self> {
        let (min_lat, max_lat) = finite_bounds(lat)?;
        let (min_lon, max_lon) = finite_bounds(lon)?;
        Some(Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        })
    }

    pub fn padded(&self, padding: f64) -> Self {
        Self {
            min_lat: self.min_lat - padding,
            max_lat: self.max_lat + padding,
            min_lon: self.min_lon - padding,
            max_lon: self.max_lon + padding,
        }
    }
}

/// The area to draw: the data bounds plus `padding` on each side, or the
/// whole globe if the bounds are unknown.
pub fn map_extent(bounds: Option<MapBounds>, padding: f64) -> MapBounds {
    bounds
        .map(|b| b.padded(padding))
        .unwrap_or(MapBounds::GLOBE)
}

/// One 2D slice of a variable, ready to draw.
#[derive(Debug, Clone)]
pub struct MapFrame {
    pub title: String,
    /// File name without extension
    pub file_stem: String,
    pub lat: Vec<f64>,
    pub lon: Vec<f64>,
    /// Values indexed by (lat, lon), with missing data as NaN.
    pub values: Array2<f64>,
}

impl MapFrame {
    pub fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.file_stem, format.extension())
    }

    pub fn bounds(&self) -> Option<MapBounds> {
        MapBounds::from_coords(&self.lat, &self.lon)
    }

    /// Values to colour by: unchanged, or their base 10 logarithm with
    /// non-positive values replaced by NaN.
    pub fn color_values(&self, log_scale: bool) -> Array2<f64> {
        if log_scale {
            self.values
                .mapv(|v| if v > 0.0 { v.log10() } else { f64::NAN })
        } else {
            self.values.clone()
        }
    }
}

pub fn frame_stem(varname: &str, itime: usize, ilev: Option<usize>) -> String {
    match ilev {
        Some(ilev) => format!("{varname}_t{}_lev{}", itime + 1, ilev + 1),
        None => format!("{varname}_t{}", itime + 1),
    }
}

/// Split a (time, lat, lon) or (time, lev, lat, lon) variable into one frame
/// per time step and level.
pub fn frames_for_variable(
    file: &netcdf::File,
    varname: &str,
    config: &GridConfig,
) -> error_stack::Result<Vec<MapFrame>, GridError> {
    let var = file
        .variable(varname)
        .ok_or_else(|| GridError::missing_variable(varname))?;
    let ndim = var.dimensions().len();
    if ndim != 3 && ndim != 4 {
        return Err(GridError::UnsupportedRank {
            name: varname.to_string(),
            ndim,
        }
        .into());
    }
    if !nc_utils::is_numeric_type(&var.vartype()) {
        return Err(GridError::UnsupportedType {
            name: varname.to_string(),
            vartype: nc_utils::type_name(&var.vartype()).to_string(),
        }
        .into());
    }

    let lat = nc_utils::read_coordinate(file, &config.lat_name)?;
    let lon = nc_utils::read_coordinate(file, &config.lon_name)?;

    let mut data = var
        .get::<f64, _>(Extents::All)
        .change_context_lazy(|| GridError::context(format!("Error reading variable '{varname}'")))?;
    if let Some(fill) = nc_utils::get_fill_value(&var) {
        data.mapv_inplace(|v| if v == fill { f64::NAN } else { v });
    }

    let shape = data.shape();
    if shape[ndim - 2] != lat.len() || shape[ndim - 1] != lon.len() {
        return Err(GridError::context(format!(
            "The last two dimensions of '{varname}' ({}, {}) do not match \
             the lengths of '{}' ({}) and '{}' ({})",
            shape[ndim - 2],
            shape[ndim - 1],
            config.lat_name,
            lat.len(),
            config.lon_name,
            lon.len()
        ))
        .into());
    }

    let mut frames = vec![];
    let shape_err = || GridError::context(format!("Unexpected shape for '{varname}'"));
    if ndim == 3 {
        let data = data.into_dimensionality::<Ix3>().change_context_lazy(shape_err)?;
        for (itime, slice) in data.outer_iter().enumerate() {
            frames.push(MapFrame {
                title: format!("{varname} at timestamp {}", itime + 1),
                file_stem: frame_stem(varname, itime, None),
                lat: lat.clone(),
                lon: lon.clone(),
                values: slice.to_owned(),
            });
        }
    } else {
        let data = data.into_dimensionality::<Ix4>().change_context_lazy(shape_err)?;
        let (ntime, nlev, _, _) = data.dim();
        for itime in 0..ntime {
            for ilev in 0..nlev {
                frames.push(MapFrame {
                    title: format!(
                        "{varname} at timestamp {}, elevation {}",
                        itime + 1,
                        ilev + 1
                    ),
                    file_stem: frame_stem(varname, itime, Some(ilev)),
                    lat: lat.clone(),
                    lon: lon.clone(),
                    values: data.slice(s![itime, ilev, .., ..]).to_owned(),
                });
            }
        }
    }

    log::debug!("Split '{varname}' into {} frames", frames.len());
    Ok(frames)
}

/// Open `path` and build the frames for `varname`.
pub fn frames_from_path(
    path: &Path,
    varname: &str,
    config: &GridConfig,
) -> error_stack::Result<Vec<MapFrame>, GridError> {
    let file = netcdf::open(path).change_context_lazy(|| GridError::open(path))?;
    frames_for_variable(&file, varname, config)
}
