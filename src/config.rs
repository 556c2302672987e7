use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::filter::DEFAULT_SMALL_MANUFACTURER_THRESHOLD;

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default so a config file may set any
/// subset of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub small_manufacturer_threshold: usize,
    pub histogram_bins: usize,
    pub preview_rows: usize,
    /// Initial comparison pair. Empty means the two most frequent manufacturers.
    pub default_manufacturers: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("vehicles_us.csv"),
            small_manufacturer_threshold: DEFAULT_SMALL_MANUFACTURER_THRESHOLD,
            histogram_bins: 30,
            preview_rows: 100,
            default_manufacturers: Vec::new(),
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        if self.default_manufacturers.len() > 2 {
            bail!(
                "default_manufacturers takes at most two names, got {}",
                self.default_manufacturers.len()
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: DashboardConfig,
    /// Print the column report for the data file and exit.
    pub check_columns: bool,
}

pub const USAGE: &str = "usage: vehicle-dash [--config FILE.json] [--check-columns] [DATA.csv]";

impl CliArgs {
    /// Parse arguments (without the program name).
    ///
    /// Precedence: built-in defaults, then `--config`, then the positional
    /// data path.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut config_path: Option<PathBuf> = None;
        let mut data_path: Option<PathBuf> = None;
        let mut check_columns = false;

        let mut args = args.into_iter().map(Into::into);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().context("--config needs a file path")?;
                    config_path = Some(PathBuf::from(value));
                }
                "--check-columns" => check_columns = true,
                "-h" | "--help" => bail!("{USAGE}"),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ if data_path.is_some() => bail!("more than one data path given\n{USAGE}"),
                _ => data_path = Some(PathBuf::from(&arg)),
            }
        }

        let mut config = match config_path {
            Some(path) => DashboardConfig::from_file(&path)?,
            None => DashboardConfig::default(),
        };
        if let Some(path) = data_path {
            config.data_path = path;
        }

        Ok(CliArgs {
            config,
            check_columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_arguments() {
        let args = CliArgs::parse(Vec::<String>::new()).unwrap();
        assert_eq!(args.config, DashboardConfig::default());
        assert_eq!(args.config.small_manufacturer_threshold, 1000);
        assert!(!args.check_columns);
    }

    #[test]
    fn positional_path_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"data_path": "from_file.csv", "histogram_bins": 12}}"#).unwrap();
        let path = file.path().to_string_lossy().to_string();

        let args = CliArgs::parse(["--config", path.as_str(), "other.csv"]).unwrap();
        assert_eq!(args.config.data_path, PathBuf::from("other.csv"));
        assert_eq!(args.config.histogram_bins, 12);
        assert_eq!(args.config.preview_rows, 100);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"histogram_bins": 0}}"#).unwrap();
        assert!(DashboardConfig::from_file(file.path()).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"colour": "red"}}"#).unwrap();
        assert!(DashboardConfig::from_file(file.path()).is_err());
    }

    #[test]
    fn unknown_flags_and_extra_paths_fail() {
        assert!(CliArgs::parse(["--verbose"]).is_err());
        assert!(CliArgs::parse(["a.csv", "b.csv"]).is_err());
        assert!(CliArgs::parse(["--config"]).is_err());
        assert!(CliArgs::parse(["--check-columns"]).unwrap().check_columns);
    }
}
