#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::Result;
use crate::utils::validation::{validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://data.alexa.com/data";

#[cfg(feature = "cli")]
pub use cli::CliConfig;

/// 排名查詢端點的設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// 查詢參數 `cli=10&url=<domain>` 會附加在此 URL 之後
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<()> {
        validate_url("base_url", &self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::RankError;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_str() {
        let config = ClientConfig::from_toml_str(r#"base_url = "https://rank.example.net/data""#)
            .unwrap();
        assert_eq!(config.base_url, "https://rank.example.net/data");

        // 缺少的欄位使用預設值
        let config = ClientConfig::from_toml_str("").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_from_toml_str_rejects_bad_values() {
        assert!(matches!(
            ClientConfig::from_toml_str(r#"base_url = "ftp://rank.example.net""#),
            Err(RankError::InvalidConfigValueError { .. })
        ));
        assert!(matches!(
            ClientConfig::from_toml_str("base_url = ["),
            Err(RankError::TomlError(_))
        ));
    }
}
