use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shelf_ledger::FinePolicy;
use shelf_store::FileStore;

use crate::cli::Cli;

/// Environment variable that overrides the configured password.
pub const PASSWORD_ENV: &str = "SHELF_PASSWORD";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    pub data_dir: PathBuf,
    /// Shared credential for privileged actions. `None` disables them.
    pub password: Option<String>,
    pub grace_days: i64,
    pub daily_fine: Decimal,
    pub currency: String,
}

impl Default for ShelfConfig {
    fn default() -> Self {
        let policy = FinePolicy::default();
        Self {
            data_dir: PathBuf::from("."),
            password: None,
            grace_days: policy.grace_days,
            daily_fine: policy.daily_fine,
            currency: "zł".into(),
        }
    }
}

impl ShelfConfig {
    pub const DEFAULT_FILE: &'static str = "shelf.toml";

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Config file named on the command line, else `./shelf.toml` when it
    /// exists, else defaults. Then the environment and flags override.
    pub fn resolve(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None if Path::new(Self::DEFAULT_FILE).exists() => {
                Self::load(Path::new(Self::DEFAULT_FILE))?
            }
            None => Self::default(),
        };
        if let Ok(secret) = env::var(PASSWORD_ENV) {
            config.password = Some(secret);
        }
        if let Some(dir) = &cli.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }

    pub fn fine_policy(&self) -> FinePolicy {
        FinePolicy {
            grace_days: self.grace_days,
            daily_fine: self.daily_fine,
        }
    }

    pub fn store(&self) -> FileStore {
        FileStore::in_dir(&self.data_dir)
    }
}
