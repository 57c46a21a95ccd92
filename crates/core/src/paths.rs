//! Destination path sanitizing for downloaded files.

use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Return a writable path that no existing file occupies.
///
/// Missing parent directories are created. When `path` is taken, a numeric
/// suffix (`_1`, `_2`, ...) is inserted before the final extension until a
/// free name is found.
pub fn ensure_path_correctness(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(dir) = parent {
        if !dir.exists() {
            log::info!("{} does not exist. Will attempt to create it", dir.display());
            fs::create_dir_all(dir)?;
        }
    }

    let mut candidate = path.to_path_buf();
    let mut i = 1;
    while candidate.exists() {
        candidate = with_numeric_suffix(path, i);
        log::debug!(
            "{} already exists. Will try {}",
            path.display(),
            candidate.display()
        );
        i += 1;
    }

    log::debug!("{} is valid. Will write to it", candidate.display());
    Ok(candidate)
}

/// `dir/name.ext` -> `dir/name_<n>.ext`
fn with_numeric_suffix(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    path.with_file_name(file_name)
}
