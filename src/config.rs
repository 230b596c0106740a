//! Startup configuration, read once from the `config/` tree.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub fn conf_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

pub fn json_conf_from_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config in {}", path.display()))
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BotConf {
    pub token: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    pub log_file: PathBuf,
    #[serde(default = "default_confirm_timeout_secs")]
    pub confirm_timeout_secs: u64,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_confirm_timeout_secs() -> u64 {
    30
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageConf {
    pub enabled: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ModerationConf {
    pub enabled: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot: BotConf,
    pub message: MessageConf,
    pub moderation: ModerationConf,
}

impl Config {
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            bot: conf_from_file(dir.join("bot.toml"))?,
            message: json_conf_from_file(dir.join("message.json"))?,
            moderation: json_conf_from_file(dir.join("moderation.json"))?,
        })
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.bot.confirm_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_reads_the_whole_config_tree() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bot.toml"),
            "token = \"abc\"\nlog_file = \"/tmp/audit.log\"\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("message.json"), "{\"enabled\": true}").unwrap();
        std::fs::write(dir.path().join("moderation.json"), "{\"enabled\": true}").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.bot.token, "abc");
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.confirm_timeout(), Duration::from_secs(30));
        assert!(config.message.enabled);
    }

    #[test]
    fn explicit_settings_override_the_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bot.toml"),
            "token = \"abc\"\nprefix = \"?\"\nlog_file = \"audit.log\"\nconfirm_timeout_secs = 5\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("message.json"), "{\"enabled\": false}").unwrap();
        std::fs::write(dir.path().join("moderation.json"), "{\"enabled\": true}").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.bot.prefix, "?");
        assert_eq!(config.confirm_timeout(), Duration::from_secs(5));
        assert!(!config.message.enabled);
    }

    #[test]
    fn missing_files_are_reported_with_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::load(dir.path()).unwrap_err();
        assert!(error.to_string().contains("bot.toml"));
    }
}
