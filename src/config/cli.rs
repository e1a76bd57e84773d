use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::Path;

/// Writes export files under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
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
    async fn test_write_creates_nested_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("2023/races.json", b"[]").await.unwrap();

        let data = tokio::fs::read(temp_dir.path().join("2023/races.json")).await.unwrap();
        assert_eq!(data, b"[]");
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("champions.csv", b"old").await.unwrap();
        storage.write_file("champions.csv", b"new").await.unwrap();

        let data = tokio::fs::read(temp_dir.path().join("champions.csv")).await.unwrap();
        assert_eq!(data, b"new");
    }
}
