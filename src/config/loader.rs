use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use regex::Regex;
use std::path::Path;

use super::schema::Config;
use crate::backend::BackendVersion;
use crate::error::{ConfigError, Result};

const ENV_PREFIX: &str = "IMAGE_SERVICE_";
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Load `image-service.{toml,json,yaml,yml}` from the working directory,
/// overridden by `IMAGE_SERVICE_` environment variables.
pub fn load_from_env_or_file() -> Result<Config> {
    let figment = Figment::new()
        .merge(Toml::file("image-service.toml"))
        .merge(Json::file("image-service.json"))
        .merge(Yaml::file("image-service.yaml"))
        .merge(Yaml::file("image-service.yml"))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    finish(figment)
}

pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    let figment = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => Figment::new().merge(Toml::file(path)),
        Some("json") => Figment::new().merge(Json::file(path)),
        Some("yaml") | Some("yml") => Figment::new().merge(Yaml::file(path)),
        _ => {
            return Err(ConfigError::Parse(
                "Unsupported config file format. Use .toml, .json, .yaml, or .yml".into(),
            )
            .into());
        }
    };

    finish(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
}

fn finish(figment: Figment) -> Result<Config> {
    let config: Config = figment
        .extract()
        .map_err(|e| ConfigError::Parse(e.to_string()))?;

    validate(&config)?;
    apply_env_substitutions(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.discovery.enabled_versions.is_empty() {
        return Err(ConfigError::Validation(
            "At least one image API version must be enabled".into(),
        )
        .into());
    }

    for (index, version) in config.discovery.enabled_versions.iter().enumerate() {
        if config.discovery.enabled_versions[..index].contains(version) {
            return Err(ConfigError::Validation(format!(
                "Image API version {} is enabled more than once",
                version.as_str()
            ))
            .into());
        }
    }

    if let Some(visibility) = &config.defaults.visibility {
        if !BackendVersion::V2.visibility_values().contains(&visibility.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Default visibility '{}' is not one of {:?}",
                visibility,
                BackendVersion::V2.visibility_values()
            ))
            .into());
        }
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        return Err(ConfigError::Validation(format!(
            "Unknown log level '{}'",
            config.logging.level
        ))
        .into());
    }

    Ok(())
}

fn apply_env_substitutions(mut config: Config) -> Result<Config> {
    if let Some(location) = &mut config.defaults.image_location {
        *location = substitute_env_vars(location)?;
    }

    // an empty location means "no default"
    if config.defaults.image_location.as_deref() == Some("") {
        config.defaults.image_location = None;
    }

    Ok(config)
}

/// Expand `${NAME}` and `${NAME:-default}` references.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::Parse(e.to_string()))?;
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let reference = &cap[1];
        let (name, default) = match reference.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (reference, None),
        };

        let value = match (std::env::var(name), default) {
            (Ok(value), _) => value,
            (Err(_), Some(default)) => default.to_string(),
            (Err(_), None) => {
                return Err(ConfigError::EnvVar(format!(
                    "Environment variable '{}' not found",
                    name
                ))
                .into());
            }
        };
        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}
