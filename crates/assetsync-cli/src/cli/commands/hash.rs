//! Hash command: compute the MD5 digest of a file.

use anyhow::Result;
use assetsync_core::checksum;
use std::path::Path;

/// Compute and print the MD5 of the given file.
pub async fn run_hash(path: &Path) -> Result<()> {
    let digest = checksum::hash_path(path).await?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
