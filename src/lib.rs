pub mod config;
pub mod dataset;
pub mod discovery;
pub mod error;
pub mod grid;
pub mod interpolation;
pub mod logging;
pub mod menu;
pub mod nc_utils;
pub mod plotting;
pub mod resample;

#[cfg(test)]
pub(crate) mod test_utils;
