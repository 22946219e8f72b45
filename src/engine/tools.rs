//! Path filters and the directory skip policy used by the walker.

use std::path::Path;

/// Why a directory was not descended into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    System,
    ReparsePoint,
    Protected,
    Excluded,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::System => "system directory",
            SkipReason::ReparsePoint => "reparse point",
            SkipReason::Protected => "protected metadata folder",
            SkipReason::Excluded => "excluded",
        }
    }
}

/// Check if a file should be excluded based on OS-specific clutter names
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" => true,
            // Linux
            ".directory" => true,
            // macOS resource forks, Linux per-volume trash
            _ => name.starts_with("._") || name.starts_with(".Trash-"),
        }
    } else {
        false
    }
}

/// True when `name` equals one of the protected folder names, ignoring ASCII case.
pub fn is_protected_name(name: &str, protected: &[String]) -> bool {
    protected.iter().any(|p| p.eq_ignore_ascii_case(name))
}

/// Windows attribute check: `FILE_ATTRIBUTE_SYSTEM` / `FILE_ATTRIBUTE_REPARSE_POINT`.
#[cfg(windows)]
pub fn attribute_skip_reason(meta: &std::fs::Metadata) -> Option<SkipReason> {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x400;
    let attrs = meta.file_attributes();
    if attrs & FILE_ATTRIBUTE_REPARSE_POINT != 0 {
        Some(SkipReason::ReparsePoint)
    } else if attrs & FILE_ATTRIBUTE_SYSTEM != 0 {
        Some(SkipReason::System)
    } else {
        None
    }
}

/// Non-Windows: no system attribute; a symlink is the reparse-point analogue.
#[cfg(not(windows))]
pub fn attribute_skip_reason(meta: &std::fs::Metadata) -> Option<SkipReason> {
    if meta.file_type().is_symlink() {
        Some(SkipReason::ReparsePoint)
    } else {
        None
    }
}

/// Returns true if any exclude pattern matches the name or the full path.
pub fn is_excluded(path: &Path, exclude_patterns: &[String]) -> bool {
    if exclude_patterns.is_empty() {
        return false;
    }
    let name = match path.file_name().and_then(|n| n.to_str()) {
        Some(n) => n,
        None => return false,
    };
    let path_str = path.to_str().unwrap_or("");
    exclude_patterns
        .iter()
        .any(|pattern| glob_match(pattern, name) || glob_match(pattern, path_str))
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    // Last '*' seen in the pattern, and the text position it is currently absorbing up to.
    let mut star: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ti));
            pi += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_name_ignores_case() {
        let names = vec!["System Volume Information".to_string()];
        assert!(is_protected_name("system volume information", &names));
        assert!(!is_protected_name("System Volume", &names));
    }

    #[test]
    fn skip_reason_labels() {
        assert_eq!(SkipReason::ReparsePoint.as_str(), "reparse point");
    }
}
