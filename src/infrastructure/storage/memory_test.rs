use anyhow::Result;

use super::MemoryStorage;
use crate::domain::models::Storage;
use crate::domain::models::StorageName;

#[test]
fn it_returns_none_for_missing_keys() -> Result<()> {
    let storage = MemoryStorage::default();
    assert_eq!(storage.get("chatHistory")?, None);
    assert_eq!(storage.name(), StorageName::Memory);
    return Ok(());
}

#[test]
fn it_overwrites_values() -> Result<()> {
    let storage = MemoryStorage::default();
    storage.set("chatHistory", "[1]")?;
    storage.set("chatHistory", "[2]")?;

    assert_eq!(storage.get("chatHistory")?, Some("[2]".to_string()));
    return Ok(());
}

#[test]
fn it_shares_values_between_clones() -> Result<()> {
    let storage = MemoryStorage::default();
    let other = storage.clone();
    storage.set("chatHistory", "[]")?;

    assert_eq!(other.get("chatHistory")?, Some("[]".to_string()));

    other.remove("chatHistory")?;
    assert_eq!(storage.get("chatHistory")?, None);
    return Ok(());
}

#[test]
fn it_removes_missing_keys() -> Result<()> {
    MemoryStorage::default().remove("nothing")?;
    return Ok(());
}
