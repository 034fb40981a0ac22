#[cfg(test)]
#[path = "file_test.rs"]
mod tests;

use std::fs;
use std::path;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Storage;
use crate::domain::models::StorageName;

/// Stores each key as `<dir>/<key>.json`.
pub struct FileStorage {
    pub dir: path::PathBuf,
}

impl Default for FileStorage {
    fn default() -> FileStorage {
        return FileStorage::new(path::PathBuf::from(Config::get(ConfigKey::StorageDir)));
    }
}

impl FileStorage {
    pub fn new(dir: path::PathBuf) -> FileStorage {
        return FileStorage { dir };
    }

    fn get_file_path(&self, key: &str) -> Result<path::PathBuf> {
        if key.is_empty() || key.contains(&['/', '\\', '.'][..]) {
            bail!(format!("Invalid storage key '{key}'"));
        }

        return Ok(self.dir.join(format!("{key}.json")));
    }
}

impl Storage for FileStorage {
    fn name(&self) -> StorageName {
        return StorageName::File;
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let file_path = self.get_file_path(key)?;
        if !file_path.exists() {
            return Ok(None);
        }

        let payload = fs::read_to_string(file_path)?;
        return Ok(Some(payload));
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file_path = self.get_file_path(key)?;
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }

        // Readers never see a half written file.
        let tmp_path = file_path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &file_path)?;

        tracing::debug!(path = ?file_path, bytes = value.len(), "Wrote storage file");

        return Ok(());
    }

    fn remove(&self, key: &str) -> Result<()> {
        let file_path = self.get_file_path(key)?;
        if !file_path.exists() {
            return Ok(());
        }

        fs::remove_file(file_path)?;
        return Ok(());
    }
}
