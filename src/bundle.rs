use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// The directory tree a run writes into.
///
/// Each step owns a disjoint subdirectory and creates it lazily, only when it
/// actually has something to write. The tree is write-only during collection
/// and read-only once handed to the archiver.
#[derive(Debug, Clone)]
pub struct OutputTree {
    root: PathBuf,
}

impl OutputTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        OutputTree { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create (if needed) and return a step's subdirectory.
    pub fn subdir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        Ok(dir)
    }

    /// Write a file under `subdir/`, creating the directory on first use.
    pub fn write(&self, subdir: &str, file: &str, contents: &[u8]) -> Result<PathBuf> {
        let path = self.subdir(subdir)?.join(file);
        std::fs::write(&path, contents)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Write a file directly at the tree root.
    pub fn write_root(&self, file: &str, contents: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("creating {}", self.root.display()))?;
        let path = self.root.join(file);
        std::fs::write(&path, contents)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    /// Copy a host file verbatim into `subdir/`, keeping its file name.
    pub fn copy_in(&self, subdir: &str, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .with_context(|| format!("{} has no file name", source.display()))?;
        let dest = self.subdir(subdir)?.join(name);
        std::fs::copy(source, &dest)
            .with_context(|| format!("copying {}", source.display()))?;
        Ok(dest)
    }
}

/// Remove a previous run's bundle directory and archive at the same paths.
pub fn reset(bundle_dir: &Path, archive: &Path) -> Result<()> {
    if bundle_dir.exists() {
        std::fs::remove_dir_all(bundle_dir)
            .with_context(|| format!("removing stale {}", bundle_dir.display()))?;
    }
    if archive.exists() {
        std::fs::remove_file(archive)
            .with_context(|| format!("removing stale {}", archive.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subdirs_are_created_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let tree = OutputTree::new(dir.path().join("collect"));
        assert!(!tree.root().exists());

        tree.write("system", "pkglist.txt", b"pkg-1\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(tree.root().join("system/pkglist.txt")).unwrap(),
            "pkg-1\n"
        );
    }

    #[test]
    fn copy_in_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("kubeconfig");
        std::fs::write(&source, "clusters: []\n").unwrap();

        let tree = OutputTree::new(dir.path().join("collect"));
        tree.copy_in("eks", &source).unwrap();
        assert!(tree.root().join("eks/kubeconfig").is_file());
    }

    #[test]
    fn reset_deletes_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("collect");
        let archive = dir.path().join("collect.tgz");
        std::fs::create_dir_all(bundle.join("system")).unwrap();
        std::fs::write(&archive, b"old").unwrap();

        reset(&bundle, &archive).unwrap();
        assert!(!bundle.exists());
        assert!(!archive.exists());
    }
}
