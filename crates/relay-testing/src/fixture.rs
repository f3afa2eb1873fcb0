//! JSON fixture loader.
//!
//! Loads payload samples from `fixtures/` at the workspace root.

use std::path::{Path, PathBuf};

use serde_json::Value;

/// Load a JSON fixture file relative to the workspace root.
///
/// # Example
/// ```no_run
/// use relay_testing::fixture::Fixture;
/// let val = Fixture::load("fixtures/meta/inbound_text.json");
/// ```
pub struct Fixture;

impl Fixture {
    /// Resolve `relative_path` against the nearest ancestor of the crate
    /// directory that contains it.
    pub fn path(relative_path: &str) -> PathBuf {
        let start = std::env::var("CARGO_MANIFEST_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::current_dir().unwrap());
        start
            .ancestors()
            .map(|dir| dir.join(relative_path))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| Path::new(&start).join(relative_path))
    }

    /// Load and parse a fixture JSON file.
    ///
    /// Panics if the file is missing or invalid JSON.
    pub fn load(relative_path: &str) -> Value {
        serde_json::from_str(&Self::raw(relative_path))
            .unwrap_or_else(|e| panic!("invalid JSON in fixture {relative_path}: {e}"))
    }

    /// Load a fixture file verbatim (for signature checks over raw bytes).
    pub fn raw(relative_path: &str) -> String {
        let full_path = Self::path(relative_path);
        std::fs::read_to_string(&full_path)
            .unwrap_or_else(|e| panic!("fixture not found at {}: {}", full_path.display(), e))
    }
}
