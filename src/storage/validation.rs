//! Filename validation
//!
//! The single security boundary of the file manager: every user-supplied
//! name passes through `is_valid_filename` before the filesystem is touched.

use std::path::{Component, Path, PathBuf};

/// Characters that are never allowed in a filename.
pub const FORBIDDEN_CHARACTERS: [char; 10] = ['~', '<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Returns true if `name` is safe to use as a direct child of `managed_directory`.
///
/// Only the shape of the name is checked, never whether the entry exists.
pub fn is_valid_filename(managed_directory: &Path, name: &str) -> bool {
    if name.is_empty() || name.starts_with('.') {
        return false;
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return false;
    }

    if name
        .chars()
        .any(|c| FORBIDDEN_CHARACTERS.contains(&c) || is_control_character(c))
    {
        return false;
    }

    is_direct_child(managed_directory, name)
}

fn is_control_character(c: char) -> bool {
    (c as u32) < 0x20
}

/// Structural containment check: `managed_directory/name` must normalize to a
/// path whose parent is the normalized `managed_directory`.
fn is_direct_child(managed_directory: &Path, name: &str) -> bool {
    let base = normalize_lexically(managed_directory);
    let candidate = normalize_lexically(&managed_directory.join(name));

    candidate != base && candidate.parent() == Some(base.as_path())
}

/// Resolves `.` and `..` components without consulting the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
