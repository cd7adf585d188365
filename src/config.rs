// src/config.rs
//! `config.json` loading. All validation happens here, before any network
//! activity — a bad config is a fatal error, not a per-run one.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config.json";
pub const DEFAULT_OUTPUT_MD: &str = "bilibili_dynamics.md";
pub const DEFAULT_IMAGE_DIR: &str = "bili_images";
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Session cookie bundle for authenticated fetches. `dedeuserid` is
/// optional upstream as well.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub sessdata: String,
    #[serde(default)]
    pub bili_jct: String,
    #[serde(default)]
    pub buvid3: String,
    #[serde(default)]
    pub dedeuserid: Option<String>,
}

impl Credentials {
    /// Login mode needs all three of sessdata, bili_jct and buvid3.
    pub fn is_complete(&self) -> bool {
        !self.sessdata.trim().is_empty()
            && !self.bili_jct.trim().is_empty()
            && !self.buvid3.trim().is_empty()
    }
}

/// SMTP account for email mode. All fields required together.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub sender: String,
    pub password: String,
    pub receiver: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target_uid: u64,
    #[serde(default = "default_output_md")]
    pub output_md_file: String,
    #[serde(default = "default_image_dir")]
    pub image_dir: String,
    #[serde(default)]
    pub credentials: Option<Credentials>,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Email-mode polling interval; the original fired once a day.
    #[serde(default = "default_check_interval")]
    pub check_interval_secs: u64,
}

fn default_output_md() -> String {
    DEFAULT_OUTPUT_MD.to_string()
}
fn default_image_dir() -> String {
    DEFAULT_IMAGE_DIR.to_string()
}
fn default_check_interval() -> u64 {
    DEFAULT_CHECK_INTERVAL_SECS
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Credentials for login mode, falling back to anonymous with a warning
    /// when the bundle is incomplete rather than failing the run.
    pub fn login_credentials(&self, use_login: bool) -> Option<Credentials> {
        if !use_login {
            return None;
        }
        match &self.credentials {
            Some(c) if c.is_complete() => Some(c.clone()),
            _ => {
                tracing::warn!(
                    "login requested but sessdata/bili_jct/buvid3 are incomplete, \
                     falling back to anonymous fetch"
                );
                None
            }
        }
    }

    /// Email mode refuses to start without a full mail account.
    pub fn email_config(&self) -> Result<&EmailConfig> {
        match &self.email {
            Some(e) => Ok(e),
            None => bail!("email mode requires an `email` section in the config"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let f = write_config(r#"{ "target_uid": 12345 }"#);
        let cfg = Config::load(f.path()).unwrap();
        assert_eq!(cfg.target_uid, 12345);
        assert_eq!(cfg.output_md_file, DEFAULT_OUTPUT_MD);
        assert_eq!(cfg.image_dir, DEFAULT_IMAGE_DIR);
        assert!(cfg.credentials.is_none());
        assert!(cfg.email_config().is_err());
    }

    #[test]
    fn invalid_json_is_an_error_with_context() {
        let f = write_config("{ not json");
        let err = Config::load(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }

    #[test]
    fn incomplete_credentials_fall_back_to_anonymous() {
        let f = write_config(
            r#"{ "target_uid": 1, "credentials": { "sessdata": "only-this" } }"#,
        );
        let cfg = Config::load(f.path()).unwrap();
        assert!(cfg.login_credentials(true).is_none());
        assert!(cfg.login_credentials(false).is_none());
    }

    #[test]
    fn complete_credentials_enable_login_mode() {
        let f = write_config(
            r#"{
                "target_uid": 1,
                "credentials": { "sessdata": "s", "bili_jct": "j", "buvid3": "b" }
            }"#,
        );
        let cfg = Config::load(f.path()).unwrap();
        assert!(cfg.login_credentials(true).is_some());
    }

    #[test]
    fn email_bundle_must_be_complete() {
        // serde rejects a partial bundle outright: all five fields or nothing.
        let f = write_config(
            r#"{ "target_uid": 1, "email": { "sender": "a@b.c" } }"#,
        );
        assert!(Config::load(f.path()).is_err());
    }
}
