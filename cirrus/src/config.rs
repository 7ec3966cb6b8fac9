use std::{path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;

use cirrus_client::{DEFAULT_PORT, Login};

#[serde_with::serde_as]
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct ReconnectConfig {
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    pub delay: Duration,
    /// Consecutive attempts before giving up, reset once connected.
    pub attempts: u32,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub password: Option<String>,
    pub nickname: String,
    username: Option<String>,
    realname: Option<String>,
    #[serde(default = "default_mode")]
    pub mode: u8,
    #[serde(default)]
    pub channels: Vec<String>,
    pub reconnect: Option<ReconnectConfig>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// invisible
fn default_mode() -> u8 {
    8
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, anyhow::Error> {
        let config: Config = serde_yml::from_str(str)?;
        anyhow::ensure!(!config.address.is_empty(), "address cannot be empty");
        anyhow::ensure!(!config.nickname.is_empty(), "nickname cannot be empty");
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, anyhow::Error> {
        let string = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {path:?}"))?;
        Config::load_from_str(string.as_str())
            .with_context(|| format!("parsing config file {path:?}"))
    }
}

impl Config {
    /// Username and realname default to the nickname.
    pub fn login(&self) -> Login {
        Login {
            password: self.password.clone(),
            mode: self.mode,
            nickname: self.nickname.clone(),
            username: self
                .username
                .clone()
                .unwrap_or_else(|| self.nickname.clone()),
            realname: self
                .realname
                .clone()
                .unwrap_or_else(|| self.nickname.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::panic_in_result_fn)]

    use std::{path::PathBuf, str::FromStr, time::Duration};

    use rstest::rstest;

    use crate::config::{Config, ReconnectConfig};

    fn default_yaml_path() -> anyhow::Result<PathBuf> {
        let workspace_path = env!("CARGO_MANIFEST_DIR");
        Ok(PathBuf::from_str(workspace_path)?.join("../cirrus.yml"))
    }

    #[test]
    fn load_valid_config_from_path() -> anyhow::Result<()> {
        let config = Config::load_from_path(&default_yaml_path()?)?;
        assert_eq!(config.port, 6667);
        assert!(!config.channels.is_empty());
        assert!(config.reconnect.is_some());

        Ok(())
    }

    #[test]
    fn defaults() -> anyhow::Result<()> {
        let config = Config::load_from_str("address: irc.example.net\nnickname: guest\n")?;
        assert_eq!(config.port, 6667);
        assert_eq!(config.mode, 8);
        assert!(config.channels.is_empty());
        assert!(config.reconnect.is_none());

        let login = config.login();
        assert_eq!(login.password, None);
        assert_eq!(login.username, "guest");
        assert_eq!(login.realname, "guest");

        Ok(())
    }

    #[test]
    fn full() -> anyhow::Result<()> {
        let yaml = "
address: 127.0.0.1
port: 6697
password: hunter2
nickname: guest
username: gst
realname: A Guest
mode: 0
channels: ['#rust', '#irc']
reconnect:
  delay: 10
  attempts: 3
";
        let config = Config::load_from_str(yaml)?;
        assert_eq!(config.port, 6697);
        assert_eq!(config.channels, ["#rust", "#irc"]);
        assert_eq!(
            config.reconnect,
            Some(ReconnectConfig {
                delay: Duration::from_secs(10),
                attempts: 3
            })
        );

        let login = config.login();
        assert_eq!(login.password.as_deref(), Some("hunter2"));
        assert_eq!(login.mode, 0);
        assert_eq!(login.username, "gst");
        assert_eq!(login.realname, "A Guest");

        Ok(())
    }

    #[rstest]
    #[case("nickname: guest\n")]
    #[case("address: localhost\nnickname: ''\n")]
    #[case("address: ''\nnickname: guest\n")]
    #[case("address: localhost\nnickname: guest\nport: 70000\n")]
    #[case("address: localhost\nnickname: guest\nreconnect: {delay: 5}\n")]
    fn invalid(#[case] yaml: &str) {
        Config::load_from_str(yaml).unwrap_err();
    }
}
