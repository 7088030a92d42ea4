use std::{collections::HashMap, fs};

use tracing::debug;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
        }
    }
}

/// Resolution order: built-in default, then `console.toml`, then
/// `RELAY_SERVER_URL`. The `--server-url` flag wins over all of these.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("console.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("RELAY_SERVER_URL") {
        settings.server_url = v;
    }

    debug!(server_url = %settings.server_url, "resolved relay settings");
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_relay() {
        assert_eq!(Settings::default().server_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn env_var_overrides_default() {
        std::env::set_var("RELAY_SERVER_URL", "http://relay.test:9");
        let settings = load_settings();
        std::env::remove_var("RELAY_SERVER_URL");
        assert_eq!(settings.server_url, "http://relay.test:9");
    }
}
