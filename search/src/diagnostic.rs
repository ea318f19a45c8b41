//! Diagnostics describe why a search could not complete.
//!
//! A diagnostic carries a stable problem code, the file it relates to and,
//! when known, the byte range in that file. The command line renders
//! these with source snippets; library callers can inspect them directly.

use std::{fmt, ops::Range};

use xpathgrep_problems::Problem;

use crate::file_id::FileId;

/// Where in a file a label points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Location {
    /// The file in its entirety rather than a particular position.
    File,
    /// Byte offsets from the start of the decoded text (0-indexed).
    OffsetRange(Range<usize>),
}

/// A label that refers to a file, possibly a range in the file, with a
/// message describing what happened there.
#[derive(Clone, Debug)]
pub struct Label {
    /// The position of the label.
    pub location: Location,

    /// Identifier for the file.
    pub file_id: FileId,

    /// A message describing this label.
    pub message: String,
}

impl Label {
    /// A label for the whole file.
    pub fn file(file_id: impl Into<FileId>, message: impl Into<String>) -> Self {
        Self {
            location: Location::File,
            file_id: file_id.into(),
            message: message.into(),
        }
    }

    pub fn offset(
        file_id: impl Into<FileId>,
        offset: impl Into<Range<usize>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            location: Location::OffsetRange(offset.into()),
            file_id: file_id.into(),
            message: message.into(),
        }
    }
}

/// A diagnostic has a code indicative of the category and a primary label.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// A normally unique value describing the type of diagnostic.
    pub code: String,

    description: String,

    /// The primary label.
    pub primary: Label,

    /// Additional descriptions to the constant description.
    pub described: Vec<String>,
}

impl Diagnostic {
    /// Creates a diagnostic from the problem code and with the specified label.
    pub fn problem(problem: Problem, primary: Label) -> Self {
        Self {
            code: problem.code().to_string(),
            description: problem.message().to_string(),
            primary,
            described: vec![],
        }
    }

    /// Adds context to the problem description (primary text).
    pub fn with_context(mut self, description: &str, item: impl fmt::Display) -> Self {
        self.described.push(format!("{}={}", description, item));
        self
    }

    /// Returns the description for the diagnostic including any context.
    pub fn description(&self) -> String {
        if self.described.is_empty() {
            self.description.clone()
        } else {
            format!("{} ({})", self.description, self.described.join(", "))
        }
    }

    pub fn file_id(&self) -> &FileId {
        &self.primary.file_id
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}: {}",
            self.code,
            self.primary.file_id,
            self.description(),
            self.primary.message
        )
    }
}

impl std::error::Error for Diagnostic {}
