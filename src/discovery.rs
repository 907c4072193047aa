//! Finding the netCDF files to work on.
use std::path::{Path, PathBuf};

use error_stack::ResultExt;
use itertools::Itertools;

use crate::error::DiscoveryError;

/// List the files directly inside `dir` whose names end with any of `extensions`.
///
/// The extensions are matched literally against the end of the file name, so
/// `".nc"` does not match `file.nc4`; list both if both are wanted. The result
/// is sorted by path and has no duplicates, even if the extensions overlap.
/// Subdirectories are not searched.
pub fn find_files<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
) -> error_stack::Result<Vec<PathBuf>, DiscoveryError> {
    if !dir.is_dir() {
        return Err(DiscoveryError::NotADirectory(dir.to_path_buf()).into());
    }

    let escaped_dir = glob::Pattern::escape(&dir.to_string_lossy());
    let mut files = vec![];
    for ext in extensions {
        let ext = ext.as_ref();
        let pattern = format!("{escaped_dir}/*{}", glob::Pattern::escape(ext));
        let matches = glob::glob(&pattern)
            .map_err(|e| DiscoveryError::Glob(e.to_string()))
            .attach_printable_lazy(|| format!("pattern was {pattern}"))?;

        for entry in matches {
            let entry = entry.map_err(|e| DiscoveryError::Glob(e.to_string()))?;
            if entry.is_file() {
                files.push(entry);
            }
        }
    }

    let files = files.into_iter().sorted().dedup().collect_vec();
    log::debug!(
        "Found {} files in {} matching {}",
        files.len(),
        dir.display(),
        extensions.iter().map(|e| e.as_ref()).join(", ")
    );
    Ok(files)
}

/// Return the first (by name) matching file in `dir`, or `None` if there are none.
pub fn first_file<S: AsRef<str>>(
    dir: &Path,
    extensions: &[S],
) -> error_stack::Result<Option<PathBuf>, DiscoveryError> {
    let files = find_files(dir, extensions)?;
    Ok(files.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "b.nc4");
        touch(dir.path(), "a.nc");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "c.nc.bak");
        std::fs::create_dir(dir.path().join("sub.nc")).unwrap();

        let files = find_files(dir.path(), &[".nc", ".nc4"]).unwrap();
        let names = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect_vec();
        assert_eq!(names, ["a.nc", "b.nc4"]);

        let files = find_files(dir.path(), &[".nc"]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_overlapping_extensions_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "a.nc");
        let files = find_files(dir.path(), &[".nc", "c"]).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_first_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(first_file(dir.path(), &[".nc"]).unwrap(), None);
        touch(dir.path(), "z.nc");
        touch(dir.path(), "m.nc");
        let first = first_file(dir.path(), &[".nc"]).unwrap().unwrap();
        assert_eq!(first.file_name().unwrap(), "m.nc");
    }

    #[test]
    fn test_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_files(&dir.path().join("missing"), &[".nc"]).unwrap_err();
        assert!(matches!(
            err.current_context(),
            DiscoveryError::NotADirectory(_)
        ));
    }
}
