//! File discovery
//!
//! Resolves the path given on the command line into the files to search.
//! A file is searched as is. A directory is searched for files whose path
//! relative to the directory matches a glob. The glob only descends into
//! subdirectories when it has several components or contains `**`.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};
use log::{debug, info, trace};
use walkdir::WalkDir;
use xpathgrep_problems::Problem;

use crate::{
    diagnostic::{Diagnostic, Label},
    file_id::FileId,
};

/// The glob used when none is given.
pub const DEFAULT_GLOB: &str = "*.xml";

/// What the input path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathType {
    /// Nothing exists at the path.
    Missing,
    /// A regular file, searched regardless of the glob.
    File,
    /// A directory, searched for files matching the glob.
    Directory,
    /// Exists but is neither a file nor a directory.
    Other,
}

/// The result of file discovery.
#[derive(Debug)]
pub struct DiscoveredFiles {
    pub path_type: PathType,
    /// The files to search, in the order to search them.
    pub files: Vec<PathBuf>,
}

/// Discovers the files to search at the path.
///
/// Returns an error if the glob is invalid or the directory cannot be read.
/// A missing path is not an error; it is reported as [`PathType::Missing`]
/// with no files.
pub fn discover(path: &Path, glob: &str) -> Result<DiscoveredFiles, Diagnostic> {
    let path_type = if !path.exists() {
        PathType::Missing
    } else if path.is_file() {
        PathType::File
    } else if path.is_dir() {
        PathType::Directory
    } else {
        PathType::Other
    };

    debug!("Path {} is {:?}", path.display(), path_type);

    let files = match path_type {
        PathType::File => vec![path.to_path_buf()],
        PathType::Directory => enumerate_dir(path, glob)?,
        PathType::Missing | PathType::Other => vec![],
    };

    Ok(DiscoveredFiles { path_type, files })
}

/// Enumerates files under the directory whose relative path matches the glob.
///
/// Entries are visited sorted by file name so that the order is stable
/// across platforms. Matching directories are not returned.
fn enumerate_dir(dir: &Path, glob: &str) -> Result<Vec<PathBuf>, Diagnostic> {
    let glob = relative_glob(glob);
    let matcher = compile_glob(glob, dir)?;

    let mut walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();
    if let Some(depth) = max_depth(glob) {
        walker = walker.max_depth(depth);
    }

    let mut files = vec![];
    for entry in walker {
        let entry = entry.map_err(|e| {
            let at = e.path().unwrap_or(dir).to_path_buf();
            Diagnostic::problem(
                Problem::CannotReadDirectory,
                Label::file(FileId::from_path(&at), e.to_string()),
            )
        })?;

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };

        if !matcher.is_match(relative) {
            continue;
        }

        if !entry.file_type().is_file() {
            trace!("Skipping {}, not a file", entry.path().display());
            continue;
        }

        files.push(entry.into_path());
    }

    info!(
        "Found {} files matching {} in {}",
        files.len(),
        glob,
        dir.display()
    );
    Ok(files)
}

fn compile_glob(glob: &str, dir: &Path) -> Result<GlobMatcher, Diagnostic> {
    GlobBuilder::new(glob)
        .literal_separator(true)
        .build()
        .map(|g| g.compile_matcher())
        .map_err(|e| {
            Diagnostic::problem(
                Problem::GlobInvalid,
                Label::file(FileId::from_path(dir), e.to_string()),
            )
            .with_context("glob", glob)
        })
}

/// The glob without leading `./`, since it is matched against paths
/// relative to the directory.
fn relative_glob(glob: &str) -> &str {
    let mut glob = glob;
    while let Some(rest) = glob.strip_prefix("./") {
        glob = rest;
    }
    glob
}

/// The deepest level of the directory tree the glob can match, or `None`
/// when the glob recurses.
fn max_depth(glob: &str) -> Option<usize> {
    if glob.contains("**") {
        return None;
    }
    Some(glob.split('/').filter(|c| !c.is_empty()).count().max(1))
}
