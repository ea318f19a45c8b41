//! xpathgrep search - finds XML nodes matching an XPath expression and the
//! source lines they start on.
//!
//! The XPath work is done by `sxd-xpath`; this crate handles the parts
//! around it:
//!
//! - **discovery**: turns a file or directory plus glob into files to search
//! - **source**: reads files, detecting the text encoding
//! - **document**: parses XML and maps nodes to source lines
//! - **search**: evaluates the expression against one file
//!
//! # Example Usage
//!
//! ```rust
//! use xpathgrep_search::{search_text, FileId};
//!
//! let xml = "<device>\n  <name>STM32F0</name>\n</device>";
//! let matches = search_text(xml, FileId::from_string("device.xml"), "//name").unwrap();
//!
//! let lines: Vec<String> = matches.map(|m| m.to_string()).collect();
//! assert_eq!(lines, vec!["device.xml:(2)"]);
//! ```

pub mod diagnostic;
pub mod discovery;
pub mod document;
pub mod file_id;
pub mod search;
pub mod source;

pub use diagnostic::{Diagnostic, Label, Location};
pub use discovery::{discover, DiscoveredFiles, PathType, DEFAULT_GLOB};
pub use file_id::FileId;
pub use search::{search_file, search_text, Match, Matches, SourceLine};
