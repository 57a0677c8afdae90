//! Main configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, LogFormat, LoggingConfig, PipelineConfig, BUILTIN_PIPES};

/// Complete Lyra configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use lyra_config::LyraConfig;
///
/// let config = LyraConfig::default();
/// assert_eq!(config.pipeline.default_schema_policy, "prevent-execution");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct LyraConfig {
    /// Request pipeline configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LyraConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A default pipe is not a built-in pipe, or is listed twice
    /// - A default policy name is empty
    /// - `max_unwrap_depth` is zero
    /// - The log level is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, name) in self.pipeline.default_pipes.iter().enumerate() {
            if !BUILTIN_PIPES.contains(&name.as_str()) {
                return Err(ConfigError::invalid_value(
                    "pipeline.default_pipes",
                    format!("unknown pipe '{name}', expected one of {BUILTIN_PIPES:?}"),
                ));
            }
            if self.pipeline.default_pipes[..i].contains(name) {
                return Err(ConfigError::invalid_value(
                    "pipeline.default_pipes",
                    format!("pipe '{name}' listed more than once"),
                ));
            }
        }

        if self.pipeline.default_schema_policy.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "pipeline.default_schema_policy",
                "must not be empty",
            ));
        }

        if self.pipeline.default_parameter_policy.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "pipeline.default_parameter_policy",
                "must not be empty",
            ));
        }

        if self.pipeline.max_unwrap_depth == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.max_unwrap_depth",
                "must be at least 1",
            ));
        }

        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }

        Ok(())
    }

    /// Development preset: pretty debug logs, failing properties are logged
    /// and skipped instead of aborting the request.
    ///
    /// # Example
    ///
    /// ```
    /// use lyra_config::{LogFormat, LyraConfig};
    ///
    /// let config = LyraConfig::development();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// assert_eq!(config.pipeline.default_schema_policy, "log-and-continue");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        Self {
            pipeline: PipelineConfig {
                default_schema_policy: "log-and-continue".to_string(),
                ..PipelineConfig::default()
            },
            logging: LoggingConfig {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
        }
    }

    /// Production preset: JSON info logs, strict validation.
    #[must_use]
    pub fn production() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig {
                enabled: true,
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(LyraConfig::default().validate().is_ok());
        assert!(LyraConfig::development().validate().is_ok());
        assert!(LyraConfig::production().validate().is_ok());
    }

    #[test]
    fn test_unknown_pipe_rejected() {
        let mut config = LyraConfig::default();
        config.pipeline.default_pipes.push("compressor".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("compressor"));
    }

    #[test]
    fn test_duplicate_pipe_rejected() {
        let mut config = LyraConfig::default();
        config.pipeline.default_pipes = vec![
            "request-caster".to_string(),
            "request-caster".to_string(),
        ];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_pipe_list_is_valid() {
        let mut config = LyraConfig::default();
        config.pipeline.default_pipes.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_unwrap_depth_rejected() {
        let mut config = LyraConfig::default();
        config.pipeline.max_unwrap_depth = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "pipeline.max_unwrap_depth"
        ));
    }

    #[test]
    fn test_blank_policy_rejected() {
        let mut config = LyraConfig::default();
        config.pipeline.default_parameter_policy = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
