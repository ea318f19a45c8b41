//! XML fixtures shared by the tests of the workspace crates.
//!
//! Fixtures live in `resources/test` at the workspace root. The `set`
//! directory holds a small corpus: `a.xml` has a `name` element on line 2,
//! `b.xml` has none, and `nested/c.xml` is only reached by recursive globs.
use std::path::PathBuf;

/// The directory that holds the shared fixtures.
pub fn shared_resource_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("resources")
        .join("test")
}

/// The path of a fixture file or directory, relative to the fixtures directory.
pub fn shared_resource_path(name: &str) -> PathBuf {
    shared_resource_dir().join(name)
}
