use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem storage. Reads resolve against the working directory (input
/// paths are given as typed); writes land under `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    fn output_file(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.output_file(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_under_base_path() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        storage.write_file("report.json", b"{}").await.unwrap();

        let written = base.join("report.json");
        assert!(written.exists());
        let data = storage.read_file(written.to_str().unwrap()).await.unwrap();
        assert_eq!(data, b"{}");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let storage = LocalStorage::new("./unused".to_string());
        let err = storage.read_file("/definitely/not/here.csv").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::ElasticityError::IoError(_)));
    }
}
