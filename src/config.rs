use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalogue::{Catalogue, CatalogueError, DEFAULT_PAIRS};

pub const TOKEN_ENV: &str = "TELOXIDE_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("no bot token: set telegram.token or TELOXIDE_TOKEN")]
    MissingToken,
    #[error("broadcast interval must satisfy 0 < min ({min}) < max ({max}) minutes")]
    InvalidInterval { min: u64, max: u64 },
    #[error("invalid image url {url:?}: {reason}")]
    InvalidImageUrl { url: String, reason: String },
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct RatebotConfig {
    pub telegram: TelegramCfg,
    pub store: StoreCfg,
    pub broadcast: BroadcastCfg,
    pub catalogue: CatalogueCfg,
    pub log: LogCfg,
    pub random: RandomCfg,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TelegramCfg {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct StoreCfg {
    pub path: PathBuf,
}

impl Default for StoreCfg {
    fn default() -> Self {
        StoreCfg {
            path: PathBuf::from("user_data.json"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BroadcastCfg {
    pub enabled: bool,
    pub min_interval_mins: u64,
    pub max_interval_mins: u64,
    pub on_start: bool,
}

impl Default for BroadcastCfg {
    fn default() -> Self {
        BroadcastCfg {
            enabled: true,
            min_interval_mins: 10,
            max_interval_mins: 60,
            on_start: false,
        }
    }
}

impl BroadcastCfg {
    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_mins * 60)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_secs(self.max_interval_mins * 60)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct CatalogueCfg {
    /// Defaults to the built-in list when empty.
    pub pairs: Vec<String>,
    pub default_image: Option<String>,
    pub images: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LogCfg {
    pub dir: PathBuf,
    pub level: String,
}

impl Default for LogCfg {
    fn default() -> Self {
        LogCfg {
            dir: PathBuf::from("logs"),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RandomCfg {
    pub seed: Option<u64>,
}

impl RatebotConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.broadcast;
        if b.min_interval_mins == 0 || b.min_interval_mins >= b.max_interval_mins {
            return Err(ConfigError::InvalidInterval {
                min: b.min_interval_mins,
                max: b.max_interval_mins,
            });
        }
        self.catalogue()?;
        Ok(())
    }

    /// Token from the file, falling back to `TELOXIDE_TOKEN`.
    pub fn token(&self) -> Result<String, ConfigError> {
        self.telegram
            .token
            .clone()
            .or_else(|| std::env::var(TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn catalogue(&self) -> Result<Catalogue, ConfigError> {
        let cfg = &self.catalogue;
        let pairs = if cfg.pairs.is_empty() {
            DEFAULT_PAIRS.iter().map(|p| p.to_string()).collect()
        } else {
            cfg.pairs.clone()
        };

        let mut catalogue = Catalogue::new(pairs)?;
        if let Some(url) = &cfg.default_image {
            check_url(url)?;
            catalogue = catalogue.with_default_image(url.clone());
        }
        for (pair, url) in &cfg.images {
            check_url(url)?;
            catalogue = catalogue.with_image(pair, url.clone())?;
        }
        Ok(catalogue)
    }
}

fn check_url(url: &str) -> Result<(), ConfigError> {
    reqwest::Url::parse(url)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidImageUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = RatebotConfig::parse("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.store.path, PathBuf::from("user_data.json"));
        assert!(config.broadcast.enabled);
        assert_eq!(config.broadcast.min_interval(), Duration::from_secs(600));
        assert_eq!(config.broadcast.max_interval(), Duration::from_secs(3600));
        assert_eq!(config.log.level, "info");
        assert_eq!(config.catalogue().unwrap().len(), 64);
        assert_eq!(config.catalogue().unwrap().image_for("GOLD"), None);
    }

    #[test]
    fn full_file() {
        let config = RatebotConfig::parse(
            r#"
            [telegram]
            token = "123:abc"

            [store]
            path = "data/users.json"

            [broadcast]
            min_interval_mins = 1
            max_interval_mins = 2
            on_start = true

            [catalogue]
            pairs = ["GOLD", "SILVER"]
            default_image = "https://example.com/default.png"

            [catalogue.images]
            SILVER = "https://example.com/silver.png"

            [random]
            seed = 42
            "#,
        )
        .unwrap();
        config.validate().unwrap();

        assert_eq!(config.token().unwrap(), "123:abc");
        assert!(config.broadcast.on_start);
        assert_eq!(config.random.seed, Some(42));
        let catalogue = config.catalogue().unwrap();
        assert_eq!(catalogue.pairs().to_vec(), vec!["GOLD".to_string(), "SILVER".to_string()]);
        assert_eq!(catalogue.image_for("GOLD"), Some("https://example.com/default.png"));
        assert_eq!(catalogue.image_for("SILVER"), Some("https://example.com/silver.png"));
    }

    #[test]
    fn rejects_inverted_interval() {
        let config = RatebotConfig::parse(
            "[broadcast]\nmin_interval_mins = 60\nmax_interval_mins = 10\n",
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidInterval { min: 60, max: 10 })
        ));
    }

    #[test]
    fn rejects_bad_catalogue() {
        let unknown = RatebotConfig::parse(
            "[catalogue]\npairs = [\"GOLD\"]\n[catalogue.images]\nSILVER = \"https://example.com/s.png\"\n",
        )
        .unwrap();
        assert!(matches!(
            unknown.validate(),
            Err(ConfigError::Catalogue(CatalogueError::UnknownImagePair(_)))
        ));

        let duplicate = RatebotConfig::parse("[catalogue]\npairs = [\"GOLD\", \"GOLD\"]\n").unwrap();
        assert!(matches!(
            duplicate.validate(),
            Err(ConfigError::Catalogue(CatalogueError::Duplicate(_)))
        ));

        let bad_url = RatebotConfig::parse("[catalogue]\ndefault_image = \"not a url\"\n").unwrap();
        assert!(matches!(
            bad_url.validate(),
            Err(ConfigError::InvalidImageUrl { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RatebotConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
