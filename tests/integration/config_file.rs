use std::{fs, time::Duration};

use claimer_ethereum::classify::FailureKind;
use claimer_node::config::Config;
use eyre::Result;
use tempfile::TempDir;

use crate::common::{init_test_logging, TEST_KEY};

#[test]
fn test_load_writes_defaults() -> Result<()> {
    init_test_logging();
    let dir = TempDir::new()?;
    let path = dir.path().join("nested").join("config.toml");

    let config = Config::load(&path)?;
    assert_eq!(config, Config::default());
    assert!(path.exists());

    let written: Config = toml::from_str(&fs::read_to_string(&path)?)?;
    assert_eq!(written, config);
    Ok(())
}

#[test]
fn test_load_partial_config() -> Result<()> {
    init_test_logging();
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[eth]
rpc = "http://localhost:8545/"

[claim]
gas_price_gwei = 30
interval = "90s"

[claim.error_codes]
"-32010" = "insufficient_funds"
"#,
    )?;

    let config = Config::load(&path)?;
    assert_eq!(config.eth.rpc.as_str(), "http://localhost:8545/");
    assert_eq!(config.claim.gas_price_gwei, 30);
    assert_eq!(config.claim.interval, Duration::from_secs(90));
    assert_eq!(
        config.claim.error_codes.get("-32010"),
        Some(&FailureKind::InsufficientFunds)
    );
    // Missing values fall back to defaults
    assert_eq!(config.claim.gas_limit, 100_000);
    assert_eq!(config.claim.contract, Config::default().claim.contract);
    assert_eq!(config.log.level, "info");

    // Filled in values are written back
    let saved = fs::read_to_string(&path)?;
    assert!(saved.contains("gas_limit = 100000"));
    Ok(())
}

#[test]
fn test_invalid_config_is_not_overwritten() -> Result<()> {
    init_test_logging();
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");
    fs::write(&path, "[claim]\ngas_limit = \"lots\"\n")?;

    assert!(Config::load(&path).is_err());
    assert_eq!(fs::read_to_string(&path)?, "[claim]\ngas_limit = \"lots\"\n");
    Ok(())
}

#[test]
fn test_saved_config_has_no_key_material() -> Result<()> {
    init_test_logging();
    let dir = TempDir::new()?;
    let path = dir.path().join("config.toml");

    let mut config = Config::default();
    config.claim.interval = Duration::from_secs(600);
    config.save(&path)?;

    let saved = fs::read_to_string(&path)?;
    assert!(!saved.contains(TEST_KEY));
    assert!(!saved.to_lowercase().contains("private"));
    assert!(saved.contains("interval = \"10m\""));

    assert_eq!(Config::load(&path)?, config);
    Ok(())
}
