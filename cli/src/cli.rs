//! Implements the command line behavior.

use codespan_reporting::{
    diagnostic::{Diagnostic, Label},
    files::SimpleFiles,
    term::{
        self,
        termcolor::{ColorChoice, StandardStream},
    },
};
use log::{debug, info};
use std::{
    io::Write,
    ops::Range,
    path::Path,
};
use xpathgrep_search::{discover, search_file, source::read_file_content, Location, PathType};

/// Searches the file, or the files in the directory matching the glob, and
/// writes one line per matching node to `out`.
///
/// A missing path is reported on `out` and is not an error. The first file
/// that cannot be read, is not well-formed or where the expression cannot
/// be evaluated stops the search; its diagnostic is written to standard
/// error unless `suppress_output` is set.
pub fn search<W: Write>(
    out: &mut W,
    xpath: &str,
    path: &Path,
    glob: &str,
    suppress_output: bool,
) -> Result<(), String> {
    let discovered = discover(path, glob).map_err(|d| fail(d, suppress_output))?;

    if discovered.path_type == PathType::Missing {
        writeln!(out, "Path does not exist:  {}", path.display()).map_err(write_error)?;
    }

    info!("Searching {} files", discovered.files.len());

    for file in &discovered.files {
        debug!("Searching {}", file.display());

        let matches = search_file(file, xpath).map_err(|d| fail(d, suppress_output))?;
        for found in matches {
            writeln!(out, "{}", found).map_err(write_error)?;
        }
    }

    out.flush().map_err(write_error)
}

fn write_error(err: std::io::Error) -> String {
    format!("Unable to write output. {}", err)
}

/// Reports the diagnostic and converts it into the error returned from main.
fn fail(diagnostic: xpathgrep_search::Diagnostic, suppress_output: bool) -> String {
    if !suppress_output {
        handle_diagnostic(&diagnostic);
    }
    format!(
        "Search stopped at {} ({})",
        diagnostic.file_id(),
        diagnostic.code
    )
}

fn handle_diagnostic(diagnostic: &xpathgrep_search::Diagnostic) {
    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();

    // The source is read again only to show it next to the message.
    let name = diagnostic.file_id().to_string();
    let content = match diagnostic.primary.location {
        Location::OffsetRange(_) => read_file_content(Path::new(&name)).unwrap_or_default(),
        Location::File => String::new(),
    };

    let range = label_range(&diagnostic.primary.location, content.len());

    let mut files: SimpleFiles<String, String> = SimpleFiles::new();
    let file_id = files.add(name, content);

    let report = Diagnostic::error()
        .with_code(diagnostic.code.clone())
        .with_message(diagnostic.description())
        .with_labels(vec![
            Label::primary(file_id, range).with_message(diagnostic.primary.message.clone())
        ]);

    let _ = term::emit(&mut writer.lock(), &config, &files, &report).map_err(|err| {
        eprintln!("Failed writing to terminal: {}", err);
    });
}

/// The range to underline, limited to the source that is shown.
fn label_range(location: &Location, len: usize) -> Range<usize> {
    match location {
        Location::OffsetRange(range) if range.end <= len && range.start <= range.end => {
            range.clone()
        }
        _ => 0..0,
    }
}
