use std::{collections::HashMap, fs};

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub database_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8787".into(),
            database_url: "sqlite://./data/promo.db".into(),
        }
    }
}

/// Defaults, then an optional `server.toml` overlay, then environment
/// variables (plain names and `PROMO__`-prefixed ones) win.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("database_url") {
                settings.database_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Ok(v) = std::env::var("PROMO__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Ok(v) = std::env::var("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Ok(v) = std::env::var("PROMO__DATABASE_URL") {
        settings.database_url = v;
    }

    settings
}

/// Accepts bare file paths and `sqlite:`-prefixed forms; anything already
/// carrying a scheme passes through untouched. Parent-directory creation
/// happens in the storage layer.
pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:") || raw_database_url.contains("://") {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        return format!("sqlite://{}", path.replace('\\', "/"));
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_file_path_to_sqlite_url() {
        assert_eq!(
            normalize_database_url("./data/test.db"),
            "sqlite://./data/test.db"
        );
    }

    #[test]
    fn keeps_full_urls_and_memory_urls_untouched() {
        assert_eq!(
            normalize_database_url("sqlite://./data/promo.db"),
            "sqlite://./data/promo.db"
        );
        assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn expands_bare_sqlite_prefix() {
        assert_eq!(
            normalize_database_url("sqlite:data/promo.db"),
            "sqlite://data/promo.db"
        );
    }

    #[test]
    fn empty_input_falls_back_to_the_default_url() {
        assert_eq!(
            normalize_database_url("  "),
            Settings::default().database_url
        );
    }
}
