//! Summaries of the variables in a gridded netCDF file.
use std::{
    io::Write,
    path::{Path, PathBuf},
};

use error_stack::ResultExt;
use indexmap::IndexMap;

use crate::{error::GridError, nc_utils::format_shape};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableSummary {
    pub name: String,
    pub dims: Vec<String>,
    pub shape: Vec<usize>,
}

impl VariableSummary {
    pub fn from_variable(var: &netcdf::Variable) -> Self {
        let dims = var.dimensions();
        Self {
            name: var.name(),
            dims: dims.iter().map(|d| d.name()).collect(),
            shape: dims.iter().map(|d| d.len()).collect(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns `true` if the variable is indexed by a dimension named `dim`.
    pub fn has_dim(&self, dim: &str) -> bool {
        self.dims.iter().any(|d| d == dim)
    }
}

/// Every variable in a file (coordinates included), in the order they are
/// stored in the file.
#[derive(Debug, Clone)]
pub struct DatasetSummary {
    pub path: PathBuf,
    pub variables: IndexMap<String, VariableSummary>,
}

impl DatasetSummary {
    pub fn open(path: &Path) -> error_stack::Result<Self, GridError> {
        let file = netcdf::open(path).change_context_lazy(|| GridError::open(path))?;
        Ok(Self::from_file(&file, path))
    }

    pub fn from_file(file: &netcdf::File, path: &Path) -> Self {
        let variables = file
            .variables()
            .map(|var| {
                let summary = VariableSummary::from_variable(&var);
                (summary.name.clone(), summary)
            })
            .collect();
        Self {
            path: path.to_path_buf(),
            variables,
        }
    }

    pub fn get(&self, name: &str) -> Option<&VariableSummary> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// Write one `name: shape` line per variable.
    pub fn write_listing<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for var in self.variables.values() {
            writeln!(out, "{}: {}", var.name, format_shape(&var.shape))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{write_grid_file, write_single_variable_file, TestGrid};

    #[test]
    fn test_single_variable_listing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temperature.nc");
        write_single_variable_file(&path, "temperature", &[("time", 2), ("lat", 3), ("lon", 4)]);

        let summary = DatasetSummary::open(&path).unwrap();
        let mut out = Vec::new();
        summary.write_listing(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "temperature: (2, 3, 4)\n");

        let var = summary.get("temperature").unwrap();
        assert_eq!(var.dims, ["time", "lat", "lon"]);
        assert!(var.has_dim("lat"));
        assert!(!var.has_dim("lev"));
    }

    #[test]
    fn test_listing_keeps_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.nc4");
        let grid = TestGrid::new(vec![10.0, 10.5, 11.0], vec![20.0, 20.625, 21.25, 21.875])
            .with_levels(2);
        write_grid_file(&path, &grid);

        let summary = DatasetSummary::open(&path).unwrap();
        let names: Vec<&str> = summary.variables.keys().map(|k| k.as_str()).collect();
        assert_eq!(names, ["time", "lev", "lat", "lon", "T", "QV"]);

        let mut out = Vec::new();
        summary.write_listing(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("lat: (3,)\n"));
        assert!(text.contains("T: (2, 3, 4)\n"));
        assert!(text.contains("QV: (2, 2, 3, 4)\n"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = DatasetSummary::open(Path::new("/no/such/file.nc")).unwrap_err();
        assert!(matches!(err.current_context(), GridError::Open(_)));
    }
}
