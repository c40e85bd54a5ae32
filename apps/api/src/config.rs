use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";

/// Tried in order when `GEMINI_MODEL` is unset or empty.
pub const FALLBACK_GEMINI_MODELS: [&str; 3] =
    ["gemini-3-flash-preview", "gemini-2.0-flash", "gemini-1.5-flash"];

/// Which text-generation provider backs the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AiService {
    #[default]
    Gemini,
    OpenAi,
}

impl AiService {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiService::Gemini => "gemini",
            AiService::OpenAi => "openai",
        }
    }
}

impl fmt::Display for AiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiService {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(AiService::Gemini),
            "openai" => Ok(AiService::OpenAi),
            other => bail!("Invalid AI_SERVICE '{other}' (expected 'gemini' or 'openai')"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// API keys are optional at startup; requests fail with a clear error until one is set.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub ai_service: AiService,
    pub gemini_api_key: Option<String>,
    pub gemini_models: Vec<String>,
    pub gemini_api_base: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_base: String,
    pub static_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests don't touch process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai_service = match non_empty("AI_SERVICE") {
            Some(raw) => raw.parse::<AiService>()?,
            None => AiService::default(),
        };

        Ok(Config {
            port: non_empty("PORT")
                .unwrap_or_else(|| "3000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            ai_service,
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_models: non_empty("GEMINI_MODEL")
                .map(|raw| parse_model_list(&raw))
                .unwrap_or_default(),
            gemini_api_base: non_empty("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_model: non_empty("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_api_base: non_empty("OPENAI_API_BASE")
                .unwrap_or_else(|| DEFAULT_OPENAI_API_BASE.to_string()),
            static_dir: PathBuf::from(
                non_empty("STATIC_DIR").unwrap_or_else(|| "public".to_string()),
            ),
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The configured Gemini models, or the built-in fallback list.
    pub fn gemini_models(&self) -> Vec<String> {
        if self.gemini_models.is_empty() {
            FALLBACK_GEMINI_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            self.gemini_models.clone()
        }
    }

    pub fn active_api_key(&self) -> Option<&str> {
        match self.ai_service {
            AiService::Gemini => self.gemini_api_key.as_deref(),
            AiService::OpenAi => self.openai_api_key.as_deref(),
        }
    }
}

fn parse_model_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_env_is_empty() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.ai_service, AiService::Gemini);
        assert!(config.gemini_api_key.is_none());
        assert_eq!(config.openai_model, "gpt-4.1");
        assert_eq!(config.static_dir, PathBuf::from("public"));
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_fallback_models_used_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(
            config.gemini_models(),
            vec!["gemini-3-flash-preview", "gemini-2.0-flash", "gemini-1.5-flash"]
        );
    }

    #[test]
    fn test_model_list_is_split_and_trimmed() {
        let config = config_from(&[("GEMINI_MODEL", " gemini-2.5-flash , ,gemini-2.0-flash ")])
            .unwrap();
        assert_eq!(
            config.gemini_models(),
            vec!["gemini-2.5-flash", "gemini-2.0-flash"]
        );
    }

    #[test]
    fn test_only_commas_falls_back() {
        let config = config_from(&[("GEMINI_MODEL", ", ,")]).unwrap();
        assert_eq!(config.gemini_models().len(), 3);
    }

    #[test]
    fn test_ai_service_parsing() {
        assert_eq!("OpenAI".parse::<AiService>().unwrap(), AiService::OpenAi);
        assert_eq!(" gemini ".parse::<AiService>().unwrap(), AiService::Gemini);
        assert!("claude".parse::<AiService>().is_err());
    }

    #[test]
    fn test_invalid_ai_service_is_a_startup_error() {
        assert!(config_from(&[("AI_SERVICE", "bard")]).is_err());
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let config = config_from(&[("GEMINI_API_KEY", "   ")]).unwrap();
        assert!(config.active_api_key().is_none());
    }

    #[test]
    fn test_active_api_key_follows_service() {
        let config = config_from(&[
            ("AI_SERVICE", "openai"),
            ("GEMINI_API_KEY", "g-key"),
            ("OPENAI_API_KEY", "o-key"),
        ])
        .unwrap();
        assert_eq!(config.active_api_key(), Some("o-key"));
    }
}
