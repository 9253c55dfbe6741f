use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{ConfigError, Result};

/// Install the global `tracing` subscriber.
///
/// A non-empty `RUST_LOG` takes over filtering entirely; otherwise the
/// configured level applies to this crate. Returns `false` when a subscriber
/// was already installed, which is left in place.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(&config.level, rust_log.as_deref())?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "Logging initialised");
    }
    Ok(installed)
}

fn build_filter(level: &str, rust_log: Option<&str>) -> Result<EnvFilter> {
    let directive: Directive = format!("image_service_compat={}", level.to_lowercase())
        .parse()
        .map_err(|e| ConfigError::Validation(format!("Invalid log level: {e}")))?;

    match rust_log {
        Some(directives) if !directives.trim().is_empty() => Ok(EnvFilter::new(directives)),
        _ => Ok(EnvFilter::default().add_directive(directive)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_harmless() {
        let config = LoggingConfig::default();
        init(&config).unwrap();
        assert!(!init(&config).unwrap());
    }

    #[test]
    fn test_configured_level_applies_without_rust_log() {
        let filter = build_filter("DEBUG", None).unwrap();
        assert!(filter.to_string().contains("image_service_compat=debug"));

        let filter = build_filter("warn", Some("  ")).unwrap();
        assert!(filter.to_string().contains("image_service_compat=warn"));
    }

    #[test]
    fn test_rust_log_overrides_configured_level() {
        let filter = build_filter("info", Some("image_service_compat=trace")).unwrap();
        let rendered = filter.to_string();
        assert!(rendered.contains("image_service_compat=trace"));
        assert!(!rendered.contains("image_service_compat=info"));
    }

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LoggingConfig {
            level: "loud".into(),
            json: false,
        };
        assert!(init(&config).is_err());
    }
}
