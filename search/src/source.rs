//! Reads files into text for parsing.

use std::path::Path;

use log::{debug, trace};
use xpathgrep_problems::Problem;

use crate::{
    diagnostic::{Diagnostic, Label},
    file_id::FileId,
};

/// Reads the file at the path as text, detecting the encoding.
///
/// A byte order mark selects the encoding directly and is not part of the
/// returned text.
pub fn read_file_content(path: &Path) -> Result<String, Diagnostic> {
    debug!("Reading file {}", path.display());

    let bytes = std::fs::read(path)
        .map_err(|e| diagnostic(Problem::CannotReadFile, path, e.to_string()))?;

    decode(&bytes, path).ok_or_else(|| {
        diagnostic(
            Problem::UnsupportedEncoding,
            path,
            String::from("The file is not UTF-8 or latin1"),
        )
    })
}

fn decode(bytes: &[u8], path: &Path) -> Option<String> {
    // Tried in order. Windows-1252 is a superset of latin1 and picks up older
    // files that declare ISO-8859-1.
    let decoders: [&'static encoding_rs::Encoding; 2] =
        [encoding_rs::UTF_8, encoding_rs::WINDOWS_1252];

    decoders.into_iter().find_map(|d| {
        let (res, encoding_used, had_errors) = d.decode(bytes);
        if had_errors {
            trace!(
                "Path {} did not match encoding {}",
                path.display(),
                encoding_used.name()
            );
            return None;
        }
        trace!(
            "Path {} matched encoding {}",
            path.display(),
            encoding_used.name()
        );
        Some(res.into_owned())
    })
}

fn diagnostic(problem: Problem, path: &Path, message: String) -> Diagnostic {
    Diagnostic::problem(problem, Label::file(FileId::from_path(path), message))
}
