//! Searches a single XML file for nodes that match an XPath expression.

use std::{fmt, path::Path};

use log::{debug, warn};
use sxd_xpath::Value;
use xpathgrep_problems::Problem;

use crate::{
    diagnostic::{Diagnostic, Label},
    document::{parse_package, positions, Line, LineIndex},
    file_id::FileId,
    source::read_file_content,
};

/// The source line of a match.
///
/// Displays as the line number, or `?` when the line could not be
/// determined for the node or its parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLine(pub Option<Line>);

impl fmt::Display for SourceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(line) => write!(f, "{}", line),
            None => f.write_str("?"),
        }
    }
}

/// A node that matched the expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub file_id: FileId,
    pub line: SourceLine,
}

impl fmt::Display for Match {
    /// Formats the match as `<file>:(<line>)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({})", self.file_id, self.line)
    }
}

/// The matches from searching one file, in document order.
///
/// The sequence is consumed once; search the file again to get the
/// matches again.
#[derive(Debug)]
pub struct Matches {
    file_id: FileId,
    lines: std::vec::IntoIter<SourceLine>,
}

impl Iterator for Matches {
    type Item = Match;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.next().map(|line| Match {
            file_id: self.file_id.clone(),
            line,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.lines.size_hint()
    }
}

impl ExactSizeIterator for Matches {}

/// Reads and parses the file and evaluates the expression against it.
///
/// The file is read and parsed from scratch on every call. Errors reading
/// the file, parsing the XML or evaluating the expression are returned
/// rather than skipped.
pub fn search_file(path: &Path, xpath: &str) -> Result<Matches, Diagnostic> {
    let text = read_file_content(path)?;
    search_text(&text, FileId::from_path(path), xpath)
}

/// Parses the text and evaluates the expression against it.
///
/// The expression must select a node-set; expressions that produce a
/// number, string or boolean are an error because they have no position.
pub fn search_text(text: &str, file_id: FileId, xpath: &str) -> Result<Matches, Diagnostic> {
    let positions = positions(text, &file_id)?;
    let package = parse_package(text, &positions, &file_id)?;
    let document = package.as_document();
    let index = LineIndex::new(&document, &positions.lines, &file_id);

    let value = sxd_xpath::evaluate_xpath(&document, xpath)
        .map_err(|e| xpath_diagnostic(e, &file_id, xpath))?;

    let nodes = match value {
        Value::Nodeset(nodes) => nodes.document_order(),
        other => {
            return Err(Diagnostic::problem(
                Problem::XPathNotNodeSet,
                Label::file(
                    file_id.clone(),
                    format!("Expression evaluated to {:?}", other),
                ),
            )
            .with_context("expression", xpath))
        }
    };

    debug!("File {} has {} matches", file_id, nodes.len());

    let lines: Vec<SourceLine> = nodes
        .into_iter()
        .map(|node| {
            let line = index.line_of(node);
            if line.is_none() {
                warn!("No source line for matched node {:?} in {}", node, file_id);
            }
            SourceLine(line)
        })
        .collect();

    Ok(Matches {
        file_id,
        lines: lines.into_iter(),
    })
}

fn xpath_diagnostic(err: sxd_xpath::Error, file_id: &FileId, xpath: &str) -> Diagnostic {
    let problem = match err {
        sxd_xpath::Error::Parsing(_) => Problem::XPathSyntax,
        _ => Problem::XPathEvaluation,
    };
    Diagnostic::problem(problem, Label::file(file_id.clone(), err.to_string()))
        .with_context("expression", xpath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpathgrep_test::shared_resource_path;

    const DEVICE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<device schemaVersion="1.1">
  <name>STM32F0</name>
  <peripherals>
    <peripheral derivedFrom="GPIOA">
      <name>GPIOB</name>
    </peripheral>
    <peripheral>
      <name>GPIOA</name>
      <!-- registers omitted -->
    </peripheral>
  </peripherals>
</device>
"#;

    fn lines(matches: Matches) -> Vec<String> {
        matches.map(|m| m.to_string()).collect()
    }

    #[test]
    fn search_text_when_elements_match_then_one_match_per_node() {
        let matches = search_text(DEVICE, FileId::from_string("dev.xml"), "//name").unwrap();

        assert_eq!(
            lines(matches),
            vec!["dev.xml:(3)", "dev.xml:(6)", "dev.xml:(9)"]
        );
    }

    #[test]
    fn search_text_when_attribute_matches_then_owning_element_line() {
        let matches =
            search_text(DEVICE, FileId::from_string("dev.xml"), "//@derivedFrom").unwrap();

        assert_eq!(lines(matches), vec!["dev.xml:(5)"]);
    }

    #[test]
    fn search_text_when_text_matches_then_parent_line() {
        let matches = search_text(
            DEVICE,
            FileId::from_string("dev.xml"),
            "//peripheral/name/text()",
        )
        .unwrap();

        assert_eq!(lines(matches), vec!["dev.xml:(6)", "dev.xml:(9)"]);
    }

    #[test]
    fn search_text_when_comment_matches_then_comment_line() {
        let matches = search_text(DEVICE, FileId::from_string("dev.xml"), "//comment()").unwrap();

        assert_eq!(lines(matches), vec!["dev.xml:(10)"]);
    }

    #[test]
    fn search_text_when_root_matches_then_first_line() {
        let matches = search_text(DEVICE, FileId::from_string("dev.xml"), "/").unwrap();

        assert_eq!(lines(matches), vec!["dev.xml:(1)"]);
    }

    #[test]
    fn search_text_when_no_match_then_empty() {
        let matches = search_text(DEVICE, FileId::from_string("dev.xml"), "//cpu").unwrap();

        assert_eq!(matches.len(), 0);
    }

    #[test]
    fn search_text_when_predicate_then_only_selected_nodes() {
        let matches = search_text(
            DEVICE,
            FileId::from_string("dev.xml"),
            "//peripheral[@derivedFrom]/name",
        )
        .unwrap();

        assert_eq!(lines(matches), vec!["dev.xml:(6)"]);
    }

    #[test]
    fn search_text_when_invalid_expression_then_xpath_syntax() {
        let err = search_text(DEVICE, FileId::from_string("dev.xml"), "//[").unwrap_err();

        assert_eq!(err.code, Problem::XPathSyntax.code());
        assert!(err.description().contains("//["));
    }

    #[test]
    fn search_text_when_unknown_function_then_xpath_evaluation() {
        let err =
            search_text(DEVICE, FileId::from_string("dev.xml"), "//name[nosuch()]").unwrap_err();

        assert_eq!(err.code, Problem::XPathEvaluation.code());
    }

    #[test]
    fn search_text_when_expression_is_number_then_not_node_set() {
        let err =
            search_text(DEVICE, FileId::from_string("dev.xml"), "count(//name)").unwrap_err();

        assert_eq!(err.code, Problem::XPathNotNodeSet.code());
    }

    #[test]
    fn search_text_when_malformed_then_xml_malformed() {
        let err = search_text("<device><name>", FileId::from_string("bad.xml"), "//foo")
            .unwrap_err();

        assert_eq!(err.code, Problem::XmlMalformed.code());
        assert_eq!(err.file_id(), &FileId::from_string("bad.xml"));
    }

    #[test]
    fn search_text_when_internal_entity_then_matches_with_lines() {
        let text = "<!DOCTYPE device [<!ENTITY e \"v\">]>\n<device>\n<name>&e;</name>\n</device>";

        let matches = search_text(text, FileId::from_string("p.xml"), "//name").unwrap();

        assert_eq!(lines(matches), vec!["p.xml:(3)"]);
    }

    #[test]
    fn search_text_when_entity_value_then_expanded_text_selectable() {
        let text = "<!DOCTYPE device [<!ENTITY e \"GPIOA\">]>\n<device>\n<name>&e;</name>\n<name>x</name>\n</device>";

        let matches =
            search_text(text, FileId::from_string("p.xml"), "//name[text()='GPIOA']").unwrap();

        assert_eq!(lines(matches), vec!["p.xml:(3)"]);
    }

    #[test]
    fn search_text_when_internal_subset_without_entities_then_matches() {
        let text = "<!DOCTYPE device [<!ELEMENT device ANY>]>\n<device>\n  <!-- c -->\n  <name>X</name>\n</device>";

        let names = search_text(text, FileId::from_string("p.xml"), "//name").unwrap();
        let comments = search_text(text, FileId::from_string("p.xml"), "//comment()").unwrap();

        assert_eq!(lines(names), vec!["p.xml:(4)"]);
        assert_eq!(lines(comments), vec!["p.xml:(3)"]);
    }

    #[test]
    fn search_file_when_shared_device_then_name_on_line_three() {
        let path = shared_resource_path("device.xml");

        let matches = search_file(&path, "/device/name").unwrap();

        let expected = format!("{}:(3)", path.display());
        assert_eq!(lines(matches), vec![expected]);
    }

    #[test]
    fn search_file_when_called_twice_then_same_matches() {
        let path = shared_resource_path("device.xml");

        let first = lines(search_file(&path, "//field").unwrap());
        let second = lines(search_file(&path, "//field").unwrap());

        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn source_line_when_unknown_then_question_mark() {
        assert_eq!(SourceLine(None).to_string(), "?");
    }
}
