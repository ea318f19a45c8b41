//! Problem codes reported by xpathgrep.
//!
//! The enumeration is generated at build time from
//! `resources/problem-codes.csv` so that codes stay stable between
//! releases and documentation can refer to them.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));
