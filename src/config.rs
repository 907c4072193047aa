//! Program configuration.
//!
//! All three programs read the same settings. Values are layered, from lowest
//! to highest precedence:
//!
//! 1. the built-in defaults (see [`GridConfig::default`]),
//! 2. an optional [TOML](https://toml.io/en/) file given with `--config`,
//! 3. environment variables with the `SATGRID_` prefix, e.g.
//!    `SATGRID_INPUT_DIR=/data/merra2`.
//!
//! A minimal configuration file pointing at a MERRA-2 download might be:
//!
//! ```toml
//! input_dir = "/data/Input/Satellite/Merra-2"
//! output_root = "/data/Output/Merra-2"
//! ```
//!
//! which reads every `.nc`/`.nc4` file from the input directory and writes the
//! resampled files to `/data/Output/Merra-2/<method>/`.
use std::path::{Path, PathBuf};

use error_stack::ResultExt;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix for environment variables that override configuration values.
pub const ENV_PREFIX: &str = "SATGRID_";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Directory containing the files to resample.
    pub input_dir: PathBuf,

    /// Root directory for resampled output; each method gets a subdirectory.
    pub output_root: PathBuf,

    /// Directory to take the sample file from when inspecting. Defaults
    /// to `output_root`.
    pub inspect_dir: Option<PathBuf>,

    /// Directory to take the file to plot from. Defaults to `output_root`.
    pub plot_dir: Option<PathBuf>,

    /// Directory the rendered map images are written to.
    pub plot_output_dir: PathBuf,

    /// File name endings recognized as netCDF files for resampling.
    pub extensions: Vec<String>,

    /// File name endings recognized as netCDF files for inspection and plotting.
    pub plot_extensions: Vec<String>,

    pub lat_name: String,
    pub lon_name: String,
    pub time_name: String,
    pub level_name: String,

    /// Spacing of the output latitude/longitude grid, in degrees.
    pub step: f64,

    /// Order of the piecewise polynomial used by the "polynomial" method.
    pub polynomial_order: usize,

    /// Degrees added around the data bounds when plotting.
    pub map_padding: f64,

    /// If set, log messages are also appended to this file.
    pub log_file: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_root: PathBuf::from("./output"),
            inspect_dir: None,
            plot_dir: None,
            plot_output_dir: PathBuf::from("./plots"),
            extensions: vec![".nc".to_string(), ".nc4".to_string()],
            plot_extensions: vec![".nc".to_string()],
            lat_name: "lat".to_string(),
            lon_name: "lon".to_string(),
            time_name: "time".to_string(),
            level_name: "lev".to_string(),
            step: 0.1,
            polynomial_order: 3,
            map_padding: 0.5,
            log_file: None,
        }
    }
}

impl GridConfig {
    /// Load the configuration, merging the defaults, `config_file` (if given),
    /// and the `SATGRID_` environment variables.
    pub fn load(config_file: Option<&Path>) -> error_stack::Result<Self, ConfigError> {
        Self::load_with_env(config_file, ENV_PREFIX)
    }

    fn load_with_env(
        config_file: Option<&Path>,
        env_prefix: &str,
    ) -> error_stack::Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::Load(format!(
                    "configuration file {} does not exist",
                    path.display()
                ))
                .into());
            }
            figment = figment.merge(Toml::file(path));
        }

        let config: Self = figment
            .merge(Env::prefixed(env_prefix))
            .extract()
            .map_err(|e| ConfigError::Load(e.to_string()))
            .attach_printable_lazy(|| match config_file {
                Some(p) => format!("configuration file was {}", p.display()),
                None => "no configuration file given".to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(ConfigError::invalid(
                "step",
                format!("must be a positive number, got {}", self.step),
            ));
        }

        if self.extensions.is_empty() {
            return Err(ConfigError::invalid("extensions", "must list at least one extension"));
        }

        if self.plot_extensions.is_empty() {
            return Err(ConfigError::invalid(
                "plot_extensions",
                "must list at least one extension",
            ));
        }

        if self.polynomial_order == 0 {
            return Err(ConfigError::invalid("polynomial_order", "must be at least 1"));
        }

        if !self.map_padding.is_finite() || self.map_padding < 0.0 {
            return Err(ConfigError::invalid(
                "map_padding",
                format!("must be zero or positive, got {}", self.map_padding),
            ));
        }

        Ok(())
    }

    pub fn inspect_dir(&self) -> &Path {
        self.inspect_dir.as_deref().unwrap_or(&self.output_root)
    }

    pub fn plot_dir(&self) -> &Path {
        self.plot_dir.as_deref().unwrap_or(&self.output_root)
    }

    /// Render the configuration as TOML, in the same form the `--config` file takes.
    pub fn to_toml(&self) -> error_stack::Result<String, ConfigError> {
        toml::to_string_pretty(self).change_context_lazy(|| {
            ConfigError::Load("could not serialize configuration".to_string())
        })
    }

    /// The directory resampled files for the method `method_name` go in.
    pub fn method_output_dir(&self, method_name: &str) -> PathBuf {
        self.output_root.join(method_name)
    }
}
