use std::{collections::HashMap, fs, path::Path, time::Duration};

use serde::Deserialize;
use tracing::warn;
use url::Url;

pub const SETTINGS_FILE: &str = "roomzy.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub server_url: String,
    pub request_timeout: Duration,
    pub auth_delay: Duration,
    pub post_login_destination: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".into(),
            request_timeout: Duration::from_secs(10),
            auth_delay: Duration::from_secs(1),
            post_login_destination: "/dashboard".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    server_url: Option<String>,
    request_timeout_ms: Option<u64>,
    auth_delay_ms: Option<u64>,
    post_login_destination: Option<String>,
}

/// Defaults, then `roomzy.toml` in the working directory, then the process environment.
pub fn load_settings() -> ClientSettings {
    let env: HashMap<String, String> = std::env::vars().collect();
    load_settings_from(Path::new(SETTINGS_FILE), &env)
}

pub fn load_settings_from(path: &Path, env: &HashMap<String, String>) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, file_cfg),
            Err(err) => warn!(path = %path.display(), "ignoring unreadable settings file: {err}"),
        }
    }

    if let Some(v) = env.get("ROOMZY_SERVER_URL") {
        apply_server_url(&mut settings, v);
    }
    if let Some(v) = env.get("APP__SERVER_URL") {
        apply_server_url(&mut settings, v);
    }

    if let Some(ms) = env
        .get("APP__REQUEST_TIMEOUT_MS")
        .and_then(|v| v.parse::<u64>().ok())
    {
        settings.request_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = env
        .get("APP__AUTH_DELAY_MS")
        .and_then(|v| v.parse::<u64>().ok())
    {
        settings.auth_delay = Duration::from_millis(ms);
    }

    if let Some(v) = env.get("APP__POST_LOGIN_DESTINATION") {
        if v.starts_with('/') {
            settings.post_login_destination = v.clone();
        }
    }

    settings
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.server_url {
        apply_server_url(settings, &v);
    }
    if let Some(ms) = file_cfg.request_timeout_ms {
        settings.request_timeout = Duration::from_millis(ms);
    }
    if let Some(ms) = file_cfg.auth_delay_ms {
        settings.auth_delay = Duration::from_millis(ms);
    }
    if let Some(v) = file_cfg.post_login_destination {
        if v.starts_with('/') {
            settings.post_login_destination = v;
        }
    }
}

fn apply_server_url(settings: &mut ClientSettings, raw: &str) {
    match normalize_server_url(raw) {
        Some(url) => settings.server_url = url,
        None => warn!(value = raw, "ignoring invalid server url"),
    }
}

/// Trims whitespace and trailing slashes. Only http(s) URLs are accepted.
pub fn normalize_server_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
