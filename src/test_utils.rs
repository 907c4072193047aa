//! Builders for small synthetic netCDF files used by the unit tests.
use std::path::Path;

use ndarray::{Array, ArrayD, IxDyn};
use netcdf::Extents;

/// Description of a synthetic MERRA-2 like file.
///
/// The file always has `time`, `lat`, and `lon` coordinates and a float
/// variable `T(time, lat, lon)` equal to [`TestGrid::t_value`]. With
/// [`TestGrid::with_levels`] it also has a `lev` coordinate and a double
/// variable `QV(time, lev, lat, lon)`.
#[derive(Debug, Clone)]
pub(crate) struct TestGrid {
    pub(crate) ntime: usize,
    pub(crate) nlev: Option<usize>,
    pub(crate) lat: Vec<f64>,
    pub(crate) lon: Vec<f64>,
    /// Replace the value at this (time, lat, lon) index of T with the fill value.
    pub(crate) fill_at: Option<[usize; 3]>,
}

pub(crate) const T_FILL: f32 = 1e15;

impl TestGrid {
    pub(crate) fn new(lat: Vec<f64>, lon: Vec<f64>) -> Self {
        Self {
            ntime: 2,
            nlev: None,
            lat,
            lon,
            fill_at: None,
        }
    }

    pub(crate) fn with_levels(mut self, nlev: usize) -> Self {
        self.nlev = Some(nlev);
        self
    }

    pub(crate) fn with_fill_at(mut self, index: [usize; 3]) -> Self {
        self.fill_at = Some(index);
        self
    }

    /// Values of T are linear in latitude and longitude, so linear
    /// interpolation reproduces them exactly.
    pub(crate) fn t_value(itime: usize, lat: f64, lon: f64) -> f64 {
        250.0 + itime as f64 + 0.5 * lat + 0.1 * lon
    }

    pub(crate) fn qv_value(itime: usize, ilev: usize, lat: f64, lon: f64) -> f64 {
        0.01 * (itime + 1) as f64 + 0.001 * ilev as f64 + 1e-4 * lat - 1e-5 * lon
    }
}

pub(crate) fn write_grid_file(path: &Path, grid: &TestGrid) {
    let mut file = netcdf::create(path).expect("should be able to create test file");
    file.add_attribute("Title", "Synthetic test grid")
        .expect("should be able to add global attribute");

    file.add_dimension("time", grid.ntime).unwrap();
    if let Some(nlev) = grid.nlev {
        file.add_dimension("lev", nlev).unwrap();
    }
    file.add_dimension("lat", grid.lat.len()).unwrap();
    file.add_dimension("lon", grid.lon.len()).unwrap();

    let times: Vec<i32> = (0..grid.ntime as i32).map(|i| i * 180).collect();
    put_1d(&mut file, "time", &times, "minutes since 2020-01-01 00:30:00");
    if let Some(nlev) = grid.nlev {
        let levels: Vec<f64> = (0..nlev).map(|i| 1000.0 - 25.0 * i as f64).collect();
        put_1d(&mut file, "lev", &levels, "hPa");
    }
    put_1d(&mut file, "lat", &grid.lat, "degrees_north");
    put_1d(&mut file, "lon", &grid.lon, "degrees_east");

    let shape = [grid.ntime, grid.lat.len(), grid.lon.len()];
    let t = Array::from_shape_fn(shape, |(it, j, i)| {
        if grid.fill_at == Some([it, j, i]) {
            T_FILL
        } else {
            TestGrid::t_value(it, grid.lat[j], grid.lon[i]) as f32
        }
    });
    let mut var = file.add_variable::<f32>("T", &["time", "lat", "lon"]).unwrap();
    var.set_fill_value(T_FILL).unwrap();
    var.put(t.view(), Extents::All).unwrap();
    var.put_attribute("long_name", "air_temperature").unwrap();
    var.put_attribute("units", "K").unwrap();

    if let Some(nlev) = grid.nlev {
        let shape = [grid.ntime, nlev, grid.lat.len(), grid.lon.len()];
        let qv = Array::from_shape_fn(shape, |(it, k, j, i)| {
            TestGrid::qv_value(it, k, grid.lat[j], grid.lon[i])
        });
        let mut var = file
            .add_variable::<f64>("QV", &["time", "lev", "lat", "lon"])
            .unwrap();
        var.put(qv.view(), Extents::All).unwrap();
        var.put_attribute("units", "kg kg-1").unwrap();
    }
}

/// Write a file holding one float variable with the given dimensions and no
/// coordinate variables.
pub(crate) fn write_single_variable_file(path: &Path, varname: &str, dims: &[(&str, usize)]) {
    let mut file = netcdf::create(path).expect("should be able to create test file");
    for (name, len) in dims {
        file.add_dimension(name, *len).unwrap();
    }
    let shape: Vec<usize> = dims.iter().map(|(_, n)| *n).collect();
    let dim_names: Vec<&str> = dims.iter().map(|(name, _)| *name).collect();
    let data = ArrayD::<f32>::from_elem(IxDyn(&shape), 1.0);
    let mut var = file.add_variable::<f32>(varname, &dim_names).unwrap();
    var.put(data.view(), Extents::All).unwrap();
}

fn put_1d<T: netcdf::NcTypeDescriptor + Copy>(
    file: &mut netcdf::FileMut,
    name: &str,
    values: &[T],
    units: &str,
) {
    let mut var = file.add_variable::<T>(name, &[name]).unwrap();
    var.put(ndarray::ArrayView1::from(values), Extents::All)
        .unwrap();
    var.put_attribute("units", units).unwrap();
}
