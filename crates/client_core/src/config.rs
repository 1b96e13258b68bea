use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "contacts.toml";
pub const CONTACTS_COLLECTION: &str = "contatos";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    pub base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            auth_token: None,
            request_timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `{base_url}/contatos`, with the base validated as an absolute URL.
    pub fn collection_url(&self) -> Result<Url, url::ParseError> {
        let base = Url::parse(self.base_url.trim())?;
        Url::parse(&format!(
            "{}/{CONTACTS_COLLECTION}",
            base.as_str().trim_end_matches('/')
        ))
    }
}

/// Defaults, then `contacts.toml` in the working directory, then environment.
pub fn load_gateway_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    if let Err(err) = apply_file(&mut config, Path::new(DEFAULT_CONFIG_FILE)) {
        warn!(error = %err, "ignoring unreadable gateway config file");
    }
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Same layering as [`load_gateway_config`], but the file must exist.
pub fn load_gateway_config_from(path: &Path) -> anyhow::Result<GatewayConfig> {
    let mut config = GatewayConfig::default();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read gateway config '{}'", path.display()))?;
    apply_toml(&mut config, &raw)
        .with_context(|| format!("failed to parse gateway config '{}'", path.display()))?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_file(config: &mut GatewayConfig, path: &Path) -> anyhow::Result<()> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Ok(());
    };
    apply_toml(config, &raw)
}

pub(crate) fn apply_toml(config: &mut GatewayConfig, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)?;

    if let Some(v) = file_cfg.get("api_url").and_then(toml::Value::as_str) {
        config.base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("auth_token").and_then(toml::Value::as_str) {
        config.auth_token = non_empty(v);
    }
    match file_cfg.get("request_timeout_secs") {
        Some(toml::Value::Integer(secs)) if *secs > 0 => {
            config.request_timeout_secs = *secs as u64;
        }
        Some(other) => warn!(value = %other, "ignoring invalid request_timeout_secs"),
        None => {}
    }
    Ok(())
}

pub(crate) fn apply_env_overrides(
    config: &mut GatewayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    if let Some(v) = lookup("CONTACTS_API_URL") {
        config.base_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        config.base_url = v;
    }

    if let Some(v) = lookup("CONTACTS_AUTH_TOKEN") {
        config.auth_token = non_empty(&v);
    }
    if let Some(v) = lookup("APP__AUTH_TOKEN") {
        config.auth_token = non_empty(&v);
    }

    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        match v.parse::<u64>() {
            Ok(parsed) if parsed > 0 => config.request_timeout_secs = parsed,
            _ => warn!(value = %v, "ignoring invalid APP__REQUEST_TIMEOUT_SECS"),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_url_appends_contatos_once() {
        let config = GatewayConfig::with_base_url("http://localhost:3000/");
        assert_eq!(
            config.collection_url().expect("url").as_str(),
            "http://localhost:3000/contatos"
        );

        let nested = GatewayConfig::with_base_url("https://api.example.com/v1");
        assert_eq!(
            nested.collection_url().expect("url").as_str(),
            "https://api.example.com/v1/contatos"
        );
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        assert!(GatewayConfig::with_base_url("not a url")
            .collection_url()
            .is_err());
    }

    #[test]
    fn file_values_then_env_values_win() {
        let mut config = GatewayConfig::default();
        apply_toml(
            &mut config,
            "api_url = \"http://file:4000\"\nauth_token = \"from-file\"\nrequest_timeout_secs = 5\n",
        )
        .expect("toml");
        assert_eq!(config.base_url, "http://file:4000");
        assert_eq!(config.auth_token.as_deref(), Some("from-file"));
        assert_eq!(config.request_timeout_secs, 5);

        let env: HashMap<&str, &str> = [
            ("CONTACTS_API_URL", "http://env-legacy:1"),
            ("APP__API_URL", "http://env:2"),
            ("APP__AUTH_TOKEN", "  "),
            ("APP__REQUEST_TIMEOUT_SECS", "nope"),
        ]
        .into_iter()
        .collect();
        apply_env_overrides(&mut config, |key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://env:2");
        assert_eq!(config.auth_token, None);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn missing_file_keeps_defaults() {
        let mut config = GatewayConfig::default();
        apply_file(&mut config, Path::new("definitely/not/here.toml")).expect("no file is fine");
        assert_eq!(config, GatewayConfig::default());
    }

    #[test]
    fn explicit_config_file_must_exist() {
        assert!(load_gateway_config_from(Path::new("definitely/not/here.toml")).is_err());
    }
}
