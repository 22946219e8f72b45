use std::path::{Path, PathBuf};

use crate::utils::config::PackagePaths;

/// Sibling temp path for an atomic replace: `<target>.tmp` in the same directory.
pub fn temp_path_for(target: &Path) -> PathBuf {
    let fallback = PackagePaths::get().default_index_file();
    let name = target
        .file_name()
        .or_else(|| fallback.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

/// Remove a leftover temp file (crash between write and replace). Missing file is fine.
pub fn remove_stale_temp(temp_path: &Path) {
    if temp_path.exists() {
        let _ = std::fs::remove_file(temp_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_sibling() {
        let p = temp_path_for(Path::new("/var/data/index.json"));
        assert_eq!(p, PathBuf::from("/var/data/index.json.tmp"));
    }

    #[test]
    fn remove_stale_temp_missing_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        remove_stale_temp(&dir.path().join("nope.tmp"));
    }
}
