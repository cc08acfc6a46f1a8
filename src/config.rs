use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::qf::ContributionPolicy;

/// Default configuration file looked up when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "qf-calc.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub calculator: CalculatorConfig,
    pub share: ShareConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CalculatorConfig {
    /// Match budget of a fresh calculator
    pub default_match: f64,
    /// Number of empty grants in a fresh calculator
    pub default_grants: usize,
    /// Treat negative contributions as invalid input instead of passing them through
    pub reject_negative: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ShareConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DisplayConfig {
    pub currency: String,
    pub decimals: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            calculator: CalculatorConfig {
                default_match: 1000.0,
                default_grants: 4,
                reject_negative: false,
            },
            share: ShareConfig {
                base_url: "https://wtfisqf.com/".to_string(),
            },
            display: DisplayConfig {
                currency: "$".to_string(),
                decimals: 2,
            },
        }
    }
}

impl Config {
    /// Load defaults, then the optional config file, then `QF_*` environment variables
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(
                config::File::from(Path::new(path.unwrap_or(DEFAULT_CONFIG_PATH)))
                    .format(config::FileFormat::Toml)
                    .required(path.is_some()),
            )
            .add_source(
                config::Environment::with_prefix("QF")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.calculator.default_match.is_nan() || self.calculator.default_match < 0.0 {
            anyhow::bail!(
                "calculator.default_match must be a non-negative number, got {}",
                self.calculator.default_match
            );
        }
        url::Url::parse(&self.share.base_url)
            .map_err(|e| anyhow::anyhow!("Invalid share.base_url {:?}: {}", self.share.base_url, e))?;
        Ok(())
    }

    pub fn contribution_policy(&self) -> ContributionPolicy {
        if self.calculator.reject_negative {
            ContributionPolicy::Reject
        } else {
            ContributionPolicy::Propagate
        }
    }

    /// Render the configuration as TOML, used by `qf-calc init`
    pub fn to_toml(&self) -> crate::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    // Tests that call `Config::load` read the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_defaults_match_original_calculator() {
        let config = Config::default();
        assert_eq!(config.calculator.default_match, 1000.0);
        assert_eq!(config.calculator.default_grants, 4);
        assert!(!config.calculator.reject_negative);
        assert_eq!(config.contribution_policy(), ContributionPolicy::Propagate);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let _env = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[calculator]\ndefault_match = 500.0\nreject_negative = true\n\n[display]\ndecimals = 3"
        )
        .unwrap();

        let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config.calculator.default_match, 500.0);
        assert_eq!(config.calculator.default_grants, 4);
        assert_eq!(config.display.decimals, 3);
        assert_eq!(config.display.currency, "$");
        assert_eq!(config.contribution_policy(), ContributionPolicy::Reject);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let _env = env_lock();
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(Config::load(Some(missing.to_str().unwrap())).is_err());
    }

    #[test]
    fn test_rejects_negative_default_match() {
        let mut config = Config::default();
        config.calculator.default_match = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_output_loads_back() {
        let _env = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let rendered = Config::default().to_toml().unwrap();
        file.write_all(rendered.as_bytes()).unwrap();

        let config = Config::load(Some(file.path().to_str().unwrap())).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_environment_overrides_file() {
        let _env = env_lock();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[calculator]\ndefault_match = 500.0\ndefault_grants = 6").unwrap();

        std::env::set_var("QF_CALCULATOR__DEFAULT_GRANTS", "2");
        std::env::set_var("QF_CALCULATOR__REJECT_NEGATIVE", "true");
        let loaded = Config::load(Some(file.path().to_str().unwrap()));
        std::env::remove_var("QF_CALCULATOR__DEFAULT_GRANTS");
        std::env::remove_var("QF_CALCULATOR__REJECT_NEGATIVE");

        let config = loaded.unwrap();
        assert_eq!(config.calculator.default_grants, 2);
        assert_eq!(config.calculator.default_match, 500.0);
        assert_eq!(config.contribution_policy(), ContributionPolicy::Reject);
    }
}
