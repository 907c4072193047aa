//! Common errors across the satgrid crate

use std::path::{Path, PathBuf};

/// Errors related to reading, resampling, and writing gridded netCDF files
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("Could not open {}", .0.display())]
    Open(PathBuf),
    #[error("Could not write {}", .0.display())]
    Write(PathBuf),
    #[error("Missing expected variable: {0}")]
    MissingVariable(String),
    #[error("Coordinate '{name}' must be one dimensional, got {ndim} dimensions")]
    CoordinateNotOneDimensional { name: String, ndim: usize },
    #[error("Coordinate '{0}' must be strictly increasing or strictly decreasing")]
    NonMonotonicCoordinate(String),
    #[error("Variable '{name}' has type {vartype}, which cannot be handled")]
    UnsupportedType { name: String, vartype: String },
    #[error(
        "Variable '{name}' has {ndim} dimensions, only 3D (time, lat, lon) \
         or 4D (time, lev, lat, lon) variables can be plotted"
    )]
    UnsupportedRank { name: String, ndim: usize },
    #[error("{0}")]
    Context(String),
}

impl GridError {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::Open(path.as_ref().to_path_buf())
    }

    pub fn write<P: AsRef<Path>>(path: P) -> Self {
        Self::Write(path.as_ref().to_path_buf())
    }

    pub fn missing_variable<S: ToString>(varname: S) -> Self {
        Self::MissingVariable(varname.to_string())
    }

    pub fn non_monotonic<S: ToString>(varname: S) -> Self {
        Self::NonMonotonicCoordinate(varname.to_string())
    }

    pub fn context<S: ToString>(ctx: S) -> Self {
        Self::Context(ctx.to_string())
    }
}

/// Errors that end an interactive resampling run before any file is processed
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Invalid interpolation method selected")]
    InvalidChoice,
    #[error("{0}")]
    Context(String),
}

impl RunError {
    pub fn context<S: ToString>(ctx: S) -> Self {
        Self::Context(ctx.to_string())
    }
}

/// Errors from loading the program configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not load configuration: {0}")]
    Load(String),
    #[error("Invalid configuration value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid<S: ToString>(key: &'static str, reason: S) -> Self {
        Self::Invalid {
            key,
            reason: reason.to_string(),
        }
    }
}

/// Errors related to finding input files
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Input path {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("Error globbing for input files: {0}")]
    Glob(String),
}
