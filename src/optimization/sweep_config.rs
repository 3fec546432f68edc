use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::backtest::data::DataReader;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Backtests allowed in flight at once.
    pub workers: usize,

    /// Directory holding the `round{r}/` CSV folders.
    pub data_root: PathBuf,

    /// Match leftover order quantity against same-timestamp tape prints.
    pub match_trades: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            workers: 12,
            data_root: PathBuf::from(DataReader::DEFAULT_ROOT),
            match_trades: true,
        }
    }
}

static CONFIG: OnceCell<SweepConfig> = OnceCell::new();

impl SweepConfig {
    const FILE_NAME: &'static str = "sweep.yml";

    /// Process-wide config from `sweep.yml`, defaults when the file is absent.
    pub fn load() -> Result<&'static SweepConfig> {
        CONFIG.get_or_try_init(|| Self::from_file(Path::new(Self::FILE_NAME)))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read sweep config {}", path.display()))?;
        Self::from_yaml(&raw)
            .with_context(|| format!("failed to parse sweep config {}", path.display()))
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        let config: SweepConfig = serde_yaml::from_str(raw)?;
        config
            .validate()
            .context("sweep config validation failed")?;
        Ok(config)
    }

    /// Reader rooted at `PROSPERITY_DATA_ROOT`, falling back to `data_root`.
    pub fn data_reader(&self) -> DataReader {
        DataReader::from_env_or(&self.data_root)
    }

    fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("workers must be > 0");
        }
        if self.data_root.as_os_str().is_empty() {
            bail!("data_root must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SweepConfig::from_yaml("workers: 4\n").unwrap();
        assert_eq!(config.workers, 4);
        assert!(config.match_trades);
        assert_eq!(config.data_root, PathBuf::from("data"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let error = SweepConfig::from_yaml("workers: 0\n").unwrap_err();
        assert!(format!("{error:#}").contains("workers must be > 0"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = SweepConfig::from_file(&dir.path().join("sweep.yml")).unwrap();
        assert_eq!(config, SweepConfig::default());
    }

    #[test]
    fn test_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sweep.yml");
        fs::write(&path, "data_root: /srv/prosperity\nmatch_trades: false\n").unwrap();

        let config = SweepConfig::from_file(&path).unwrap();
        assert_eq!(config.data_root, PathBuf::from("/srv/prosperity"));
        assert!(!config.match_trades);
    }
}
