//! Common test utilities for bpm integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch directory with its own bundle store
#[allow(dead_code)]
pub struct TestWorkspace {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Store directory used by [`TestWorkspace::bpm`]
    pub fn store(&self) -> PathBuf {
        self.path.join(".store")
    }

    /// `bpm` running in the workspace against its private store
    #[allow(deprecated)]
    pub fn bpm(&self) -> Command {
        let mut cmd = Command::cargo_bin("bpm").expect("bpm binary");
        cmd.current_dir(&self.path)
            .env("BPM_PATH", self.store())
            .env_remove("BPM_FETCH_RETRIES")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from workspace
    pub fn read_file(&self, path: &str) -> String {
        let file_path = self.path.join(path);
        std::fs::read_to_string(&file_path).expect("Failed to read file")
    }

    /// Check if a file exists in workspace
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Copy a fixture bundle from `tests/common/fixtures/bundles`
    pub fn copy_fixture_bundle(&self, fixture_name: &str, target_name: &str) -> PathBuf {
        let fixture_path = fixtures_dir().join(fixture_name);
        let target_path = self.path.join(target_name);
        copy_dir_recursive(&fixture_path, &target_path).expect("Failed to copy fixture bundle");
        target_path
    }

    /// The `authz` fixture with its local `common` dependency next to it
    pub fn with_authz_fixture(&self) -> PathBuf {
        self.copy_fixture_bundle("common", "common");
        self.copy_fixture_bundle("authz", "authz")
    }

    /// Initialise a git repository at `dir` and commit everything in it
    pub fn init_git_repo(&self, dir: &str) -> String {
        let path = self.path.join(dir);
        let repo = git2::Repository::init(&path).expect("Failed to init repository");
        let mut index = repo.index().expect("index");
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .expect("add");
        index.write().expect("write index");
        let tree = repo
            .find_tree(index.write_tree().expect("write tree"))
            .expect("tree");
        let sig = git2::Signature::now("Test", "test@test.com").expect("signature");
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .expect("commit");
        format!("file://{}", path.display())
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("common")
        .join("fixtures")
        .join("bundles")
}

/// Recursively copy a directory
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        std::fs::create_dir_all(dst)?;
    }

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if file_type.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
