use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::errors::{Result, SchulCloudError};

/// 上传目录中按存储文件名保存的文件内容
#[derive(Debug, Clone)]
pub struct BlobStore {
    dir: PathBuf,
}

impl BlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_config() -> Self {
        Self::new(&AppConfig::get().upload.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, storage_file_name: &str) -> PathBuf {
        self.dir.join(storage_file_name)
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SchulCloudError::file_operation(format!("创建上传目录失败: {e}")))
    }

    pub async fn read(&self, storage_file_name: &str) -> Result<Vec<u8>> {
        match tokio::fs::read(self.path(storage_file_name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SchulCloudError::not_found("File content not found"))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn write(&self, storage_file_name: &str, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;
        tokio::fs::write(self.path(storage_file_name), bytes).await?;
        Ok(())
    }

    /// 删除内容，文件不存在时忽略
    pub async fn remove(&self, storage_file_name: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path(storage_file_name)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let blobs = BlobStore::new(dir.path().join("nested"));

        blobs.write("a.txt", b"hallo").await.unwrap();
        assert_eq!(blobs.read("a.txt").await.unwrap(), b"hallo");

        blobs.remove("a.txt").await.unwrap();
        blobs.remove("a.txt").await.unwrap();
        assert_eq!(blobs.read("a.txt").await.unwrap_err().status().as_u16(), 404);
    }
}
