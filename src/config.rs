use config::{Config, ConfigError, Environment, File};
use secrecy::SecretString;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database_url: SecretString,
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub questions_per_page: u32,
}

impl Settings {
    /// Defaults, then an optional `config.*` file, then `TRIVIA_*` variables (`.env` included).
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_sources(Environment::with_prefix("TRIVIA").try_parsing(true))
    }

    fn from_sources(env: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_url", "sqlite:trivia.db")?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("questions_per_page", 10)?
            .add_source(File::with_name("config").required(false))
            .add_source(env)
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix("TRIVIA")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_sources(env(&[])).unwrap();
        assert_eq!(settings.database_url.expose_secret(), "sqlite:trivia.db");
        assert_eq!(settings.address(), "0.0.0.0:8080");
        assert_eq!(settings.questions_per_page, 10);
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_sources(env(&[
            ("TRIVIA_DATABASE_URL", "sqlite::memory:"),
            ("TRIVIA_PORT", "5000"),
            ("TRIVIA_QUESTIONS_PER_PAGE", "25"),
        ]))
        .unwrap();
        assert_eq!(settings.database_url.expose_secret(), "sqlite::memory:");
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.questions_per_page, 25);
    }

    #[test]
    fn bad_port_is_rejected() {
        assert!(Settings::from_sources(env(&[("TRIVIA_PORT", "eighty")])).is_err());
    }
}
