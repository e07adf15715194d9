//! Dispatch configuration and loading

use crate::{Error, Result};
use http::HeaderValue;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Settings shared by every [`Context`](crate::Context) a dispatcher creates
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// `Content-Type` written with JSON envelopes
    pub json_content_type: String,

    /// `Content-Type` written with plain text bodies
    pub text_content_type: String,

    /// Upper bound for [`Context::body_bytes`](crate::Context::body_bytes)
    pub max_body_size: usize,

    /// Emit a `debug` event describing every dispatched request
    pub log_dispatch: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            json_content_type: "application/json; charset=utf-8".to_string(),
            text_content_type: "text/plain; charset=utf-8".to_string(),
            max_body_size: 10 * 1024 * 1024,
            log_dispatch: true,
        }
    }
}

impl DispatchConfig {
    /// Check that the configured values can actually be written to a response
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("json_content_type", &self.json_content_type),
            ("text_content_type", &self.text_content_type),
        ] {
            if value.is_empty() {
                return Err(Error::Config(format!("{field} must not be empty")));
            }
            HeaderValue::from_str(value)
                .map_err(|e| Error::Config(format!("{field} is not a valid header value: {e}")))?;
        }

        if self.max_body_size == 0 {
            return Err(Error::Config(
                "max_body_size must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format
    Yaml,
    /// TOML format
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| Error::Config("Unable to detect config format".to_string()))?;

        match ext {
            "yaml" | "yml" => Ok(ConfigFormat::Yaml),
            "toml" => Ok(ConfigFormat::Toml),
            "json" => Ok(ConfigFormat::Json),
            _ => Err(Error::Config(format!("Unsupported config format: {ext}"))),
        }
    }
}

/// Load configuration from a file, detecting the format from its extension
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<DispatchConfig> {
    let path = path.as_ref();

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read config file: {e}")))?;

    let format = ConfigFormat::from_path(path)?;

    load_from_str(&content, format)
}

/// Load configuration from a string
///
/// `${VAR}` and `${VAR:-default}` are expanded from the environment before
/// parsing. The parsed configuration is validated.
pub fn load_from_str(content: &str, format: ConfigFormat) -> Result<DispatchConfig> {
    let expanded = expand_env_vars(content)?;

    let config: DispatchConfig = match format {
        ConfigFormat::Yaml => serde_yaml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse YAML: {e}")))?,
        ConfigFormat::Toml => toml::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {e}")))?,
        ConfigFormat::Json => serde_json::from_str(&expanded)
            .map_err(|e| Error::Config(format!("Failed to parse JSON: {e}")))?,
    };

    config.validate()?;

    tracing::debug!(?format, "loaded dispatch configuration");

    Ok(config)
}

// `${NAME}` or `${NAME:-fallback}`; the first unresolved name is an error.
fn expand_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(?P<name>[A-Za-z_][A-Za-z0-9_]*)(?::-(?P<fallback>[^}]*))?\}")
        .map_err(|e| Error::Config(format!("Invalid placeholder pattern: {e}")))?;

    let mut unresolved: Option<String> = None;
    let expanded = pattern.replace_all(content, |caps: &Captures<'_>| {
        let name = &caps["name"];
        env::var(name)
            .ok()
            .or_else(|| caps.name("fallback").map(|m| m.as_str().to_owned()))
            .unwrap_or_else(|| {
                unresolved.get_or_insert_with(|| name.to_owned());
                String::new()
            })
    });

    match unresolved {
        Some(name) => Err(Error::Config(format!(
            "Environment variable '{name}' not set and no default provided"
        ))),
        None => Ok(expanded.into_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_are_valid() {
        let config = DispatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.json_content_type, "application/json; charset=utf-8");
        assert!(config.log_dispatch);
    }

    #[test]
    fn test_detect_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("stdapi.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("stdapi.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(&PathBuf::from("stdapi.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(&PathBuf::from("stdapi.ini")).is_err());
    }

    #[test]
    fn test_load_partial_yaml_keeps_defaults() {
        let config = load_from_str("log_dispatch: false\n", ConfigFormat::Yaml).unwrap();

        assert!(!config.log_dispatch);
        assert_eq!(config.max_body_size, 10 * 1024 * 1024);
        assert_eq!(config.text_content_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_load_toml() {
        let config = load_from_str(
            "json_content_type = \"application/vnd.api+json\"\nmax_body_size = 4096\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.json_content_type, "application/vnd.api+json");
        assert_eq!(config.max_body_size, 4096);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(load_from_str(r#"{"max_body_size": 0}"#, ConfigFormat::Json).is_err());
        assert!(load_from_str(r#"{"text_content_type": ""}"#, ConfigFormat::Json).is_err());
        assert!(load_from_str("max_body_size: [", ConfigFormat::Yaml).is_err());
    }

    #[test]
    fn test_env_var_with_default() {
        env::remove_var("STDAPI_UNSET_BODY_LIMIT");

        let config = load_from_str(
            "max_body_size: ${STDAPI_UNSET_BODY_LIMIT:-2048}\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.max_body_size, 2048);
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("STDAPI_TEST_JSON_TYPE", "application/problem+json");

        let config = load_from_str(
            "json_content_type: \"${STDAPI_TEST_JSON_TYPE}\"\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.json_content_type, "application/problem+json");

        env::remove_var("STDAPI_TEST_JSON_TYPE");
    }

    #[test]
    fn test_env_var_mixed_placeholders() {
        env::set_var("STDAPI_TEST_TEXT_TYPE", "text/markdown");
        env::remove_var("STDAPI_UNSET_LIMIT");

        let config = load_from_str(
            "text_content_type: \"${STDAPI_TEST_TEXT_TYPE}\"\nmax_body_size: ${STDAPI_UNSET_LIMIT:-64}\n",
            ConfigFormat::Yaml,
        )
        .unwrap();
        assert_eq!(config.text_content_type, "text/markdown");
        assert_eq!(config.max_body_size, 64);

        env::remove_var("STDAPI_TEST_TEXT_TYPE");
    }

    #[test]
    fn test_missing_env_var_without_default() {
        env::remove_var("STDAPI_DEFINITELY_MISSING");
        let result = load_from_str(
            "json_content_type: \"${STDAPI_DEFINITELY_MISSING}\"\n",
            ConfigFormat::Yaml,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(file, r#"{{"log_dispatch": false, "max_body_size": 512}}"#).unwrap();

        let config = load_from_file(file.path()).unwrap();
        assert!(!config.log_dispatch);
        assert_eq!(config.max_body_size, 512);
    }
}
