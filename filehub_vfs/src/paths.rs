//! Key construction and name validation for the two-level virtual namespace.
//!
//! Three key shapes exist:
//! - `files/<fileName>` — a loose file at the root.
//! - `folders/<folderName>/<fileName>` — a file inside a folder.
//! - `folders/<folderName>/placeholder.txt` — the folder's existence marker.

use crate::{VfsConfig, VfsError, VfsResult};

/// Prefix for loose (non-foldered) files.
pub const FILES_PREFIX: &str = "files";
/// Prefix under which every folder lives.
pub const FOLDERS_PREFIX: &str = "folders";
/// Reserved object name witnessing a folder's existence. Internal
/// bookkeeping only; it is filtered out of every caller-facing listing.
pub const FOLDER_MARKER: &str = "placeholder.txt";

pub(crate) const MARKER_CONTENT: &[u8] = b"placeholder";

pub fn loose_file_key(file_name: &str) -> String {
    format!("{FILES_PREFIX}/{file_name}")
}

pub fn folder_prefix(folder: &str) -> String {
    format!("{FOLDERS_PREFIX}/{folder}")
}

pub fn folder_file_key(folder: &str, file_name: &str) -> String {
    format!("{FOLDERS_PREFIX}/{folder}/{file_name}")
}

pub fn marker_key(folder: &str) -> String {
    folder_file_key(folder, FOLDER_MARKER)
}

/// Last segment of a key, used as the suggested download name.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Validates one folder or file name. A name that passed is a single key
/// segment: non-empty, no separator, and not the reserved marker name (a
/// file named like the marker would be indistinguishable from the folder's
/// bookkeeping object).
pub(crate) fn validate_name(name: &str, config: &VfsConfig) -> VfsResult<()> {
    if name.trim().is_empty() {
        return Err(VfsError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty",
        });
    }
    if name.contains(config.path_separator) {
        return Err(VfsError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain the path separator",
        });
    }
    if name == FOLDER_MARKER {
        return Err(VfsError::InvalidName {
            name: name.to_string(),
            reason: "name is reserved for folder markers",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        assert_eq!(loose_file_key("a.txt"), "files/a.txt");
        assert_eq!(folder_file_key("docs", "a.txt"), "folders/docs/a.txt");
        assert_eq!(marker_key("docs"), "folders/docs/placeholder.txt");
        assert_eq!(basename("folders/docs/a.txt"), "a.txt");
        assert_eq!(basename("a.txt"), "a.txt");
    }

    #[test]
    fn rejects_bad_names() {
        let config = VfsConfig::default();
        assert!(validate_name("", &config).is_err());
        assert!(validate_name("   ", &config).is_err());
        assert!(validate_name("a/b", &config).is_err());
        assert!(validate_name(FOLDER_MARKER, &config).is_err());
        assert!(validate_name("docs", &config).is_ok());
        assert!(validate_name("report.pdf", &config).is_ok());
    }

    #[test]
    fn separator_is_configurable() {
        let config = VfsConfig {
            path_separator: ':',
            ..VfsConfig::default()
        };
        assert!(validate_name("a:b", &config).is_err());
        assert!(validate_name("a/b", &config).is_ok());
    }
}
