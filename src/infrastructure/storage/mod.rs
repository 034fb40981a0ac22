pub mod file;
pub mod memory;

use anyhow::bail;
use anyhow::Result;

use crate::domain::models::StorageBox;
use crate::domain::models::StorageName;

pub struct StorageManager {}

impl StorageManager {
    pub fn get(name: StorageName) -> Result<StorageBox> {
        if name == StorageName::File {
            return Ok(Box::<file::FileStorage>::default());
        }

        if name == StorageName::Memory {
            return Ok(Box::<memory::MemoryStorage>::default());
        }

        bail!(format!("No storage implemented for {name}"))
    }
}
