//! "All ready drives": mount points of the disks the OS currently lists.

use log::debug;
use std::collections::BTreeSet;
use std::path::PathBuf;
use sysinfo::Disks;

/// Mount points of every listed disk that is currently a readable directory, deduplicated
/// and sorted. Falls back to the home directory when the platform lists none.
pub fn ready_drive_roots() -> Vec<PathBuf> {
    let disks = Disks::new_with_refreshed_list();
    let roots: BTreeSet<PathBuf> = disks
        .list()
        .iter()
        .map(|d| d.mount_point().to_path_buf())
        .filter(|p| p.is_dir())
        .collect();

    if roots.is_empty() {
        debug!("No disks listed; falling back to home directory");
        return dirs::home_dir().into_iter().collect();
    }
    // Nested mounts (e.g. /boot under /) would be walked twice; keep only outermost ones.
    let mut outer: Vec<PathBuf> = Vec::new();
    for root in roots {
        if !outer.iter().any(|o| root.starts_with(o)) {
            outer.push(root);
        }
    }
    debug!("Ready drives: {:?}", outer);
    outer
}
