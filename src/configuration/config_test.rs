use std::fs;
use std::time::Duration;

use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() -> Result<()> {
    let res = Config::serialize_default(cli::build());
    let doc = res.parse::<toml_edit::Document>()?;

    assert_eq!(doc.get("backend").and_then(|e| return e.as_str()), Some("simulated"));
    assert_eq!(doc.get("storage").and_then(|e| return e.as_str()), Some("file"));
    assert_eq!(
        doc.get("response-delay-min").and_then(|e| return e.as_integer()),
        Some(1000)
    );
    assert!(doc.get("storage-dir").is_none());
    assert!(doc.get("session-id").is_none());
    assert!(res.contains("# username = \"\""));
    assert!(res.contains("[possible values: file, memory]"));

    return Ok(());
}

#[test]
fn it_has_defaults_for_every_key() {
    assert_eq!(Config::default(ConfigKey::Backend), "simulated");
    assert_eq!(Config::default(ConfigKey::Storage), "file");
    assert_eq!(Config::default(ConfigKey::ResponseTimeout), "0");
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("config.toml"));
    assert!(Config::default(ConfigKey::StorageDir).ends_with("parlor"));
}

#[test]
fn it_lists_keys_in_kebab_case() {
    assert_eq!(ConfigKey::SessionID.to_string(), "session-id");
    assert_eq!(ConfigKey::StorageDir.to_string(), "storage-dir");
    assert_eq!(ConfigKey::ResponseDelayMin.to_string(), "response-delay-min");
}

// Config is process wide, so loading is covered by a single test.
#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let good_path = dir.path().join("config.toml");
    fs::write(
        &good_path,
        "storage = \"memory\"\nresponse-timeout = 2500\nusername = \"Ada\"\n",
    )?;
    let good_path_str = good_path.to_string_lossy().to_string();

    let matches = cli::build().try_get_matches_from(vec![
        "parlor",
        "-c",
        &good_path_str,
        "--response-delay-max",
        "10",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Storage), "memory");
    assert_eq!(Config::get(ConfigKey::Username), "Ada");
    assert_eq!(Config::get(ConfigKey::ResponseDelayMax), "10");
    assert_eq!(Config::get(ConfigKey::Backend), "simulated");
    assert_eq!(
        Config::response_timeout(),
        Some(Duration::from_millis(2500))
    );

    let bad_path = dir.path().join("bad-config.toml");
    fs::write(&bad_path, "storage = \"cloud\"\n")?;
    let bad_path_str = bad_path.to_string_lossy().to_string();

    let matches = cli::build().try_get_matches_from(vec!["parlor", "-c", &bad_path_str])?;
    let err = Config::load(cli::build(), vec![&matches]).await.unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r###"
    config.toml has an invalid value for key 'storage': cloud
    Possible values are: file, memory
    "###);

    Config::set(ConfigKey::ResponseTimeout, "0");
    assert_eq!(Config::response_timeout(), None);

    return Ok(());
}
