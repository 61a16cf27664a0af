use anyhow::{Context, Result};

const BASE_URL_ENV: &str = "SLASHCHAT_BASE_URL";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Self { base_url })
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("invalid backend base URL '{}'", self.base_url))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_uses_default_base_url() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::remove_var(BASE_URL_ENV);

        let config = Config::load().expect("config should load");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_strips_trailing_slash_from_override() {
        let _env_lock = crate::test_support::ENV_LOCK.blocking_lock();
        std::env::set_var(BASE_URL_ENV, "https://chat.example.com/ ");

        let config = Config::load().expect("config should load");
        assert_eq!(config.base_url, "https://chat.example.com");

        std::env::remove_var(BASE_URL_ENV);
    }

    #[test]
    fn test_validate_rejects_unparseable_url() {
        let config = Config {
            base_url: "chat backend".to_string(),
        };
        assert!(config.validate().is_err());
    }
}
