use std::path::PathBuf;

use super::context::WalkSummary;

/// Classification of a walk error: expected ones skip a path, unexpected ones are surfaced.
#[derive(Debug)]
pub enum WalkErrorClass {
    /// Permission, missing path, path too long or other I/O failure on a single path.
    Expected {
        path: Option<PathBuf>,
        reason: String,
    },
    /// Anything else (e.g. a filesystem loop).
    Unexpected(anyhow::Error),
}

/// Sort a walkdir error into the expected / unexpected taxonomy.
pub fn classify_walk_error(err: walkdir::Error) -> WalkErrorClass {
    let path = err.path().map(PathBuf::from);
    if let Some(io) = err.io_error() {
        return WalkErrorClass::Expected {
            path,
            reason: format!("{:?} {}", io.kind(), io),
        };
    }
    let context = match &path {
        Some(p) => format!("walk error at {}", p.display()),
        None => "walk error".to_string(),
    };
    WalkErrorClass::Unexpected(anyhow::Error::new(err).context(context))
}

/// Log a one-line summary of skipped paths after the walk has finished.
pub fn report_skipped_paths(summary: &WalkSummary) {
    let skipped = summary.skipped.len();
    if skipped > 0 {
        log::warn!(
            "Skipped {} paths due to permission errors or access issues",
            skipped
        );
        for (p, reason) in &summary.skipped {
            log::debug!("  skipped: {} ({})", p.display(), reason);
        }
    }
    if summary.unexpected_errors > 0 {
        log::warn!(
            "{} unexpected errors during walk",
            summary.unexpected_errors
        );
    }
}
