// Test fixtures for integration testing

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Synthetic directory tree for chunking runs
#[allow(dead_code)] // Used in integration tests
pub struct TestRepo {
    pub dir: TempDir,
    pub files: Vec<PathBuf>,
}

impl TestRepo {
    /// Small mixed repository: source, docs, ignored and binary files
    #[allow(dead_code)] // Used in integration tests
    pub fn small() -> Self {
        let repo = Self::with_files(&[
            ("keep.py", "def keep():\n    return 'kept'\n"),
            ("notes.txt", "Plain notes about the project.\n"),
            ("src/lib.rs", "pub fn helper() -> u32 {\n    42\n}\n"),
            ("README.md", "# Test Project\n\nThis is a test.\n"),
            (".git/config", "[core]\n\trepositoryformatversion = 0\n"),
            ("node_modules/pkg/index.js", "module.exports = {};\n"),
        ]);
        repo.write_bytes("ignored.bin", b"\x7fELF\x00\x01\x02\x03");
        repo
    }

    /// `count` Python modules of similar size
    #[allow(dead_code)] // Used in integration tests
    pub fn modules(count: usize) -> Self {
        let files: Vec<(String, String)> = (0..count)
            .map(|i| {
                (
                    format!("pkg/module_{i:03}.py"),
                    format!("# Module {i}\ndef func_{i}():\n    return {i}\n"),
                )
            })
            .collect();

        Self::with_files(
            files
                .iter()
                .map(|(f, c)| (f.as_str(), c.as_str()))
                .collect::<Vec<_>>()
                .as_slice(),
        )
    }

    /// Create with custom files
    pub fn with_files(files: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let mut repo = Self {
            dir,
            files: Vec::new(),
        };

        for (path, content) in files {
            let full_path = repo.write_bytes(path, content.as_bytes());
            repo.files.push(full_path);
        }

        repo
    }

    /// Write raw bytes to a path relative to the repository
    pub fn write_bytes(&self, path: &str, content: &[u8]) -> PathBuf {
        let full_path = self.dir.path().join(path);
        std::fs::create_dir_all(full_path.parent().unwrap()).unwrap();
        std::fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Get path to the repository
    #[allow(dead_code)] // Used in integration tests
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Root list for a pipeline
    #[allow(dead_code)] // Used in integration tests
    pub fn roots(&self) -> Vec<PathBuf> {
        vec![self.dir.path().to_path_buf()]
    }
}
