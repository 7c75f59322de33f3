use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// An uploaded file parked in its own directory under the scratch root.
///
/// Each upload gets a fresh directory, so two requests sending the same
/// filename never touch each other's bytes. Dropping the value removes the
/// directory; [`ScratchFile::remove`] does the same but reports failures.
#[derive(Debug)]
pub struct ScratchFile {
    dir: TempDir,
    path: PathBuf,
}

impl ScratchFile {
    pub async fn persist(root: &Path, filename: &str, bytes: &[u8]) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("upload-").tempdir_in(root)?;
        let path = dir.path().join(filename);
        tokio::fs::write(&path, bytes).await?;
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn remove(self) -> io::Result<()> {
        self.dir.close()
    }
}
