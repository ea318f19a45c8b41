//! Identifies the file that a match or diagnostic refers to.
use core::fmt;
use std::path::Path;
use std::sync::Arc;

/// FileId is the path of a searched file exactly as it is printed.
///
/// The text is taken from the path that was searched without any
/// normalization, so a file found as `svd/a.xml` prints as `svd/a.xml`.
/// Cloning is cheap because every match in a file shares the same text.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct FileId(Arc<str>);

impl FileId {
    /// Creates a file identifier from the path.
    pub fn from_path(path: &Path) -> Self {
        FileId(Arc::from(path.to_string_lossy().as_ref()))
    }

    /// Creates a file identifier from the slice. The slice
    /// is normally the file path.
    pub fn from_string(path: &str) -> Self {
        FileId(Arc::from(path))
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
