use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_db_path")]
    pub db_path: String,
    /// Handler program files are opened with; may be overridden per
    /// invocation.
    #[serde(default)]
    pub handler_program: Option<String>,
    /// Extensions applied to an empty preference store on first run.
    #[serde(default = "default_extensions")]
    pub default_extensions: Vec<String>,
}

fn default_db_path() -> String {
    "randplay.db".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["mp4".to_string(), "avi".to_string()]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            handler_program: None,
            default_extensions: default_extensions(),
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.db_path, "randplay.db");
        assert_eq!(config.default_extensions, vec!["mp4", "avi"]);
        assert!(config.handler_program.is_none());
    }
}
