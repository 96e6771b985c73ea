use anyhow::Result;
use clap::Parser;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "snipbin")]
#[command(about = "Runs the snipbin service", long_about = None)]
pub struct Cli {
    #[arg(short = 'c', long = "config")]
    pub config_path: Option<String>,
}

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".snipbin")
}

pub fn default_config_path() -> PathBuf {
    default_config_dir().join("config.yaml")
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct App {
    database: String,
    port: i32,
    /// Base for fully qualified references in hyperlinked output. Defaults
    /// to localhost on the configured port.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl App {
    pub fn get_db(&self) -> &str {
        &self.database
    }

    pub fn get_port(&self) -> i32 {
        self.port
    }

    pub fn public_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None => format!("http://localhost:{}", self.port),
        }
    }
}

/// A seeded account. Credential management proper lives outside this
/// service; accounts and their tokens come from the config file.
#[derive(Debug, Deserialize, Clone)]
pub struct Credential {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct Auth {
    #[serde(default)]
    pub users: Vec<Credential>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub app: App,
    #[serde(default)]
    pub auth: Auth,
}

impl Config {
    pub fn new(path: &str) -> Result<Self> {
        let cfg = Config::load_config(path)?;
        Ok(cfg)
    }

    fn load_config(path: &str) -> Result<Config> {
        let yaml_str = fs::read_to_string(path)?;
        let yaml_with_env = Config::substitute_env_vars(&yaml_str)?;
        let config: Config = serde_yaml::from_str(&yaml_with_env)?;
        Ok(config)
    }

    fn substitute_env_vars(yaml_str: &str) -> Result<String> {
        let mut result = yaml_str.to_string();
        let mut offset = 0;

        while let Some(start) = result[offset..].find("${") {
            let actual_start = offset + start;
            if let Some(end) = result[actual_start..].find("}") {
                let var_name = &result[actual_start + 2..actual_start + end];

                // Handle default values like ${VAR:-default}
                let env_value = if let Some(default_start) = var_name.find(":-") {
                    let actual_var = &var_name[..default_start];
                    let default_val = &var_name[default_start + 2..];
                    env::var(actual_var).unwrap_or_else(|_| default_val.to_string())
                } else {
                    env::var(var_name).unwrap_or_else(|_| {
                        tracing::warn!("environment variable '{}' not found", var_name);
                        String::new()
                    })
                };

                result.replace_range(actual_start..actual_start + end + 1, &env_value);
                offset = actual_start + env_value.len();
            } else {
                break;
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config_document() {
        let yaml = r#"
app:
  database: snipbin.db
  port: 8080
auth:
  users:
    - username: alice
      token: alice-token
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.app.get_db(), "snipbin.db");
        assert_eq!(cfg.app.get_port(), 8080);
        assert_eq!(cfg.app.public_base_url(), "http://localhost:8080");
        assert_eq!(cfg.auth.users.len(), 1);
        assert_eq!(cfg.auth.users[0].username, "alice");
    }

    #[test]
    fn auth_section_is_optional() {
        let yaml = "app:\n  database: snipbin.db\n  port: 8080\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(cfg.auth.users.is_empty());
    }

    #[test]
    fn env_substitution_honors_defaults() {
        let substituted =
            Config::substitute_env_vars("port: ${SNIPBIN_TEST_UNSET_PORT:-9090}").unwrap();
        assert_eq!(substituted, "port: 9090");
    }

    #[test]
    fn configured_base_url_wins() {
        let yaml = "app:\n  database: d\n  port: 8080\n  base_url: https://snipbin.example\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.app.public_base_url(), "https://snipbin.example");
    }
}
