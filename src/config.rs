//! Environment-driven configuration shared by both crews.
//!
//! Keys come from the process environment, optionally seeded from a `.env`
//! file in the working directory. Command-line flags win over the
//! environment.

use std::io::{self, Write};

use crate::utilities::exceptions::ConfigError;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL_NAME";
pub const OPENAI_API_BASE_ENV: &str = "OPENAI_API_BASE";
pub const SERPER_API_KEY_ENV: &str = "SERPER_API_KEY";

/// Model used when neither `--model` nor `OPENAI_MODEL_NAME` is set.
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Load `.env` from the working directory. A missing file is not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => log::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Value of `name` in the process environment, if set and not blank.
pub fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// OpenAI API key from the environment.
pub fn get_openai_api_key() -> Result<String, ConfigError> {
    load_dotenv();
    non_empty_env(OPENAI_API_KEY_ENV).ok_or_else(|| {
        ConfigError::MissingApiKey(
            "OpenAI API key not found. Please set OPENAI_API_KEY in your .env file".to_string(),
        )
    })
}

/// Serper API key from the environment.
pub fn get_serper_api_key() -> Result<String, ConfigError> {
    load_dotenv();
    non_empty_env(SERPER_API_KEY_ENV).ok_or_else(|| {
        ConfigError::MissingApiKey(
            "Serper API key not found. Please set SERPER_API_KEY in your .env file".to_string(),
        )
    })
}

/// Resolved language model settings for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub api_base: Option<String>,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl LlmSettings {
    /// Resolve settings from flags, falling back to `env` lookups such as
    /// [`non_empty_env`].
    pub fn resolve_with<F>(
        flag_api_key: Option<String>,
        flag_model: Option<String>,
        env: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = flag_api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| env(OPENAI_API_KEY_ENV))
            .ok_or_else(|| {
                ConfigError::MissingApiKey(
                    "OpenAI API key is required. Set it in .env file or pass via --openai-api-key"
                        .to_string(),
                )
            })?;

        let model = flag_model
            .filter(|m| !m.trim().is_empty())
            .or_else(|| env(OPENAI_MODEL_ENV))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Self {
            api_key,
            model,
            api_base: env(OPENAI_API_BASE_ENV),
        })
    }
}

/// Format a crew result between banner lines.
pub fn format_result(result: &str) -> String {
    format!("\n=== Result ===\n{}\n=============\n", result)
}

/// Print a crew result between banner lines.
pub fn pretty_print_result(result: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", format_result(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_flag_wins_over_env() {
        let settings = LlmSettings::resolve_with(
            Some("sk-flag".into()),
            Some("gpt-4o".into()),
            env_from(&[(OPENAI_API_KEY_ENV, "sk-env"), (OPENAI_MODEL_ENV, "gpt-4")]),
        )
        .unwrap();
        assert_eq!(settings.api_key, "sk-flag");
        assert_eq!(settings.model, "gpt-4o");
    }

    #[test]
    fn test_env_fallback_and_default_model() {
        let settings =
            LlmSettings::resolve_with(None, None, env_from(&[(OPENAI_API_KEY_ENV, "sk-env")]))
                .unwrap();
        assert_eq!(settings.api_key, "sk-env");
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.api_base, None);
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let err = LlmSettings::resolve_with(None, None, env_from(&[])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "OpenAI API key is required. Set it in .env file or pass via --openai-api-key"
        );
    }

    #[test]
    fn test_blank_flag_falls_back_to_env() {
        let settings = LlmSettings::resolve_with(
            Some("  ".into()),
            None,
            env_from(&[(OPENAI_API_KEY_ENV, "sk-env")]),
        )
        .unwrap();
        assert_eq!(settings.api_key, "sk-env");
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings =
            LlmSettings::resolve_with(Some("sk-secret".into()), None, env_from(&[])).unwrap();
        assert!(!format!("{:?}", settings).contains("sk-secret"));
    }

    #[test]
    fn test_format_result_banner() {
        assert_eq!(
            format_result("done"),
            "\n=== Result ===\ndone\n=============\n"
        );
    }
}
