//! Traversal engine: a single-threaded, pre-order walk over every root.
//!
//! Each directory lists its files first (by name), then descends into its subdirectories
//! (by name), so discovery order is deterministic for a given tree. Expected filesystem errors
//! skip one path and the walk carries on; unexpected ones are handed to the consumer as
//! [`WalkEvent::Error`]. Cancellation is polled before every entry.

use std::cmp::Ordering;
use std::ops::ControlFlow;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::EntryRecord;
use crate::engine::tools::{
    SkipReason, attribute_skip_reason, is_excluded, is_os_hidden_file, is_protected_name,
};

use super::context::{WalkContext, WalkEvent, WalkSummary};
use super::error_handler::{WalkErrorClass, classify_walk_error};

/// Files before directories, then by name.
fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}

/// Skip policy for one entry below the root. `None` keeps it.
fn skip_reason(ctx: &WalkContext, entry: &DirEntry) -> Option<SkipReason> {
    if entry.depth() == 0 {
        return None;
    }
    let path = entry.path();
    if is_excluded(path, &ctx.exclude) {
        return Some(SkipReason::Excluded);
    }
    let ft = entry.file_type();
    let dir_like = ft.is_dir() || (ft.is_symlink() && path.is_dir());
    if !dir_like {
        if ctx.is_own_file(path) {
            return Some(SkipReason::Excluded);
        }
        if ctx.skip_os_hidden && is_os_hidden_file(path) {
            return Some(SkipReason::Excluded);
        }
        return None;
    }
    if entry
        .file_name()
        .to_str()
        .is_some_and(|n| is_protected_name(n, &ctx.protected_dir_names))
    {
        return Some(SkipReason::Protected);
    }
    // Attribute read errors are rare; descend and let the listing fail if it must.
    entry
        .metadata()
        .ok()
        .and_then(|meta| attribute_skip_reason(&meta))
}

fn record_skip(ctx: &WalkContext, summary: &mut WalkSummary, path: &Path, reason: String) {
    ctx.logger
        .log(&format!("Skipped {}: {}", path.display(), reason));
    summary.skipped.push((path.to_path_buf(), reason));
}

fn handle_error<F>(
    ctx: &WalkContext,
    summary: &mut WalkSummary,
    err: walkdir::Error,
    on_event: &mut F,
) where
    F: FnMut(WalkEvent),
{
    match classify_walk_error(err) {
        WalkErrorClass::Expected { path, reason } => {
            let path = path.unwrap_or_default();
            record_skip(ctx, summary, &path, reason);
        }
        WalkErrorClass::Unexpected(e) => {
            summary.unexpected_errors += 1;
            on_event(WalkEvent::Error(e));
        }
    }
}

fn walk_root<F>(
    ctx: &WalkContext,
    root: &Path,
    summary: &mut WalkSummary,
    on_event: &mut F,
) -> ControlFlow<()>
where
    F: FnMut(WalkEvent),
{
    let mut ignored = 0_usize;
    let iter = WalkDir::new(root)
        .follow_links(false)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|e| match skip_reason(ctx, e) {
            Some(reason) => {
                log::debug!("Ignoring {} ({})", e.path().display(), reason.as_str());
                ignored += 1;
                false
            }
            None => true,
        });

    let mut flow = ControlFlow::Continue(());
    for item in iter {
        if ctx.is_cancelled() {
            flow = ControlFlow::Break(());
            break;
        }
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                handle_error(ctx, summary, err, on_event);
                continue;
            }
        };
        let is_dir = entry.file_type().is_dir();
        if is_dir {
            on_event(WalkEvent::DirectoryBoundary);
            if entry.depth() == 0 || !ctx.index_directories {
                continue;
            }
        }
        let path = entry.path();
        if path.to_str().is_none() {
            record_skip(ctx, summary, path, "path is not valid UTF-8".to_string());
            continue;
        }
        match entry.metadata() {
            Ok(meta) => {
                summary.added += 1;
                on_event(WalkEvent::Record(EntryRecord::from_metadata(path, &meta)));
            }
            Err(err) => handle_error(ctx, summary, err, on_event),
        }
    }
    summary.ignored += ignored;
    flow
}

/// Walk every root in `ctx`, calling `on_event` for each record, directory boundary and
/// unexpected error. Returns when all roots are done or cancellation is observed.
pub fn walk_roots<F>(ctx: &WalkContext, mut on_event: F) -> WalkSummary
where
    F: FnMut(WalkEvent),
{
    let mut summary = WalkSummary::default();
    for root in &ctx.roots {
        if ctx.is_cancelled() {
            summary.cancelled = true;
            break;
        }
        if !root.is_dir() {
            record_skip(ctx, &mut summary, root, "not a directory".to_string());
            continue;
        }
        log::debug!("Walking root {}", root.display());
        if walk_root(ctx, root, &mut summary, &mut on_event).is_break() {
            summary.cancelled = true;
            break;
        }
    }
    summary
}
