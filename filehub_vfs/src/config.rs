use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VfsConfig {
    /// Page size applied to every prefix listing.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
    /// When true (the default), creating a folder that already exists simply
    /// rewrites its marker, so creation is idempotent and retry-safe. When
    /// false, an existing marker is reported as a conflict.
    #[serde(default = "default_overwrite_markers")]
    pub overwrite_markers: bool,
    /// Character rejected inside folder and file names. Names containing it
    /// would silently change the key hierarchy.
    #[serde(default = "default_path_separator")]
    pub path_separator: char,
}

fn default_list_page_size() -> usize {
    100
}

fn default_overwrite_markers() -> bool {
    true
}

fn default_path_separator() -> char {
    '/'
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            list_page_size: default_list_page_size(),
            overwrite_markers: default_overwrite_markers(),
            path_separator: default_path_separator(),
        }
    }
}
