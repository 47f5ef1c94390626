// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Local scoped file holding a downloaded export

use std::io::{self, SeekFrom};
use std::path::Path;
use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt};

const ARTIFACT_PREFIX: &str = "emqx-export-";
const ARTIFACT_SUFFIX: &str = ".json";

/// Temporary file that is deleted when dropped
///
/// The file handle is closed before the path is removed. `release` does the
/// same explicitly and reports a failed removal.
#[derive(Debug)]
pub struct ScopedArtifact {
    file: File,
    path: TempPath,
    len: u64,
}

impl ScopedArtifact {
    /// Create an empty `emqx-export-*.json` file in `dir`, or the system temp dir
    pub fn create(dir: Option<&Path>) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(ARTIFACT_PREFIX).suffix(ARTIFACT_SUFFIX);

        let named = match dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };

        let (file, path) = named.into_parts();
        Ok(Self {
            file: File::from_std(file),
            path,
            len: 0,
        })
    }

    pub async fn write_all(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    /// Flush pending writes and move the cursor back to the start
    pub async fn rewind(&mut self) -> io::Result<()> {
        self.file.flush().await?;
        self.file.seek(SeekFrom::Start(0)).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the local resource, used as the object key
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Bytes written so far
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Close the handle and delete the file
    pub fn release(self) -> io::Result<()> {
        let ScopedArtifact { file, path, .. } = self;
        drop(file);
        path.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_name_pattern() {
        let dir = TempDir::new().unwrap();
        let artifact = ScopedArtifact::create(Some(dir.path())).unwrap();

        let name = artifact.file_name();
        assert!(name.starts_with("emqx-export-"));
        assert!(name.ends_with(".json"));
        assert_eq!(artifact.path().parent().unwrap(), dir.path());
        assert!(artifact.is_empty());
    }

    #[tokio::test]
    async fn test_rewind_positions_cursor_at_start() {
        let dir = TempDir::new().unwrap();
        let mut artifact = ScopedArtifact::create(Some(dir.path())).unwrap();

        artifact.write_all(b"hello ").await.unwrap();
        artifact.write_all(b"world").await.unwrap();
        artifact.rewind().await.unwrap();
        assert_eq!(artifact.len(), 11);

        let mut content = String::new();
        artifact.file_mut().read_to_string(&mut content).await.unwrap();
        assert_eq!(content, "hello world");
    }

    #[tokio::test]
    async fn test_drop_deletes_file() {
        let dir = TempDir::new().unwrap();
        let mut artifact = ScopedArtifact::create(Some(dir.path())).unwrap();
        artifact.write_all(b"data").await.unwrap();

        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_deletes_file() {
        let dir = TempDir::new().unwrap();
        let artifact = ScopedArtifact::create(Some(dir.path())).unwrap();

        let path = artifact.path().to_path_buf();
        artifact.release().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_create_in_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");
        assert!(ScopedArtifact::create(Some(&missing)).is_err());
    }
}
