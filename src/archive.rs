use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::Path;

/// Pack the finished output tree into a single gzip-compressed tarball.
/// The tree itself is left in place.
pub fn pack(tree_root: &Path, archive_path: &Path) -> Result<()> {
    let prefix = tree_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("collect");

    let file = File::create(archive_path)
        .with_context(|| format!("creating {}", archive_path.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder
        .append_dir_all(prefix, tree_root)
        .with_context(|| format!("archiving {}", tree_root.display()))?;

    builder
        .into_inner()
        .context("flushing archive")?
        .finish()
        .context("finishing gzip stream")?;

    Ok(())
}
