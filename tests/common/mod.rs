//! Shared test utilities for the E2E tests.
//!
//! Every fixture gets its own temporary directory that serves both as the
//! configuration root (via `OFFLINECOPY_CONFIG_DIR`) and as the parent of
//! any target destination directories the test creates. Commands built
//! through the fixture are fully isolated from the developer's real
//! configuration.

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// A temporary directory doubling as configuration root and target parent.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a destination directory under the fixture and return its path.
    pub fn make_dest(&self, name: &str) -> PathBuf {
        let child = self.temp_dir.child(name);
        child.create_dir_all().expect("Failed to create dest dir");
        child.path().to_path_buf()
    }

    /// Add a file with the given fixture-relative path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the targets store inside the fixture's configuration root.
    pub fn targets_path(&self) -> PathBuf {
        self.temp_dir.path().join("config").join("targets.yaml")
    }

    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command running in this fixture's directory with the
    /// configuration root pointed inside the fixture.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("offlinecopy");
        cmd.current_dir(self.path())
            .env("OFFLINECOPY_CONFIG_DIR", self.path().join("config"))
            .env_remove("NO_COLOR")
            .env_remove("CLICOLOR_FORCE");
        cmd
    }

    /// Register a target for `dest` and return the destination path.
    pub fn add_target(&self, source: &str, dest: &str) -> PathBuf {
        let dest = self.make_dest(dest);
        self.command()
            .arg("add")
            .arg(source)
            .arg(&dest)
            .assert()
            .success();
        dest
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
