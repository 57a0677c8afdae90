//! Configuration section types.

use serde::{Deserialize, Serialize};

/// Name of the schema validation pipe.
pub const PROPERTY_VALIDATOR: &str = "property-validator";

/// Name of the required-property pipe.
pub const SCHEMA_ENFORCER: &str = "schema-enforcer";

/// Name of the string-casting pipe.
pub const REQUEST_CASTER: &str = "request-caster";

/// Pipes the engine knows how to build from configuration, in default order.
pub const BUILTIN_PIPES: [&str; 3] = [PROPERTY_VALIDATOR, SCHEMA_ENFORCER, REQUEST_CASTER];

/// Policy used when a route names none.
pub const DEFAULT_POLICY: &str = "prevent-execution";

/// Default bound on chained deferred resolver results.
pub const DEFAULT_MAX_UNWRAP_DEPTH: usize = 32;

fn default_true() -> bool {
    true
}

fn default_pipes() -> Vec<String> {
    BUILTIN_PIPES.iter().map(ToString::to_string).collect()
}

fn default_policy() -> String {
    DEFAULT_POLICY.to_string()
}

const fn default_max_unwrap_depth() -> usize {
    DEFAULT_MAX_UNWRAP_DEPTH
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Request pipeline configuration.
///
/// # Example
///
/// ```
/// use lyra_config::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.default_pipes.len(), 3);
/// assert_eq!(config.max_unwrap_depth, 32);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Built-in pipes installed at construction, in order.
    #[serde(default = "default_pipes")]
    pub default_pipes: Vec<String>,

    /// Policy for schema validation failures when a route names none.
    #[serde(default = "default_policy")]
    pub default_schema_policy: String,

    /// Policy for missing required properties when a route names none.
    #[serde(default = "default_policy")]
    pub default_parameter_policy: String,

    /// How many chained deferred results a resolver may return.
    #[serde(default = "default_max_unwrap_depth")]
    pub max_unwrap_depth: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_pipes: default_pipes(),
            default_schema_policy: default_policy(),
            default_parameter_policy: default_policy(),
            max_unwrap_depth: default_max_unwrap_depth(),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_defaults_from_empty_table() {
        let config: PipelineConfig = toml::from_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(
            config.default_pipes,
            vec!["property-validator", "schema-enforcer", "request-caster"]
        );
        assert_eq!(config.default_schema_policy, "prevent-execution");
    }

    #[test]
    fn test_pipeline_rejects_unknown_fields() {
        let result: Result<PipelineConfig, _> = toml::from_str("max_depth = 3");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_serde() {
        let format: LogFormat = serde_json::from_str(r#""pretty""#).unwrap();
        assert_eq!(format, LogFormat::Pretty);
        assert_eq!(serde_json::to_string(&LogFormat::Json).unwrap(), r#""json""#);
    }

    #[test]
    fn test_logging_partial_table() {
        let config: LoggingConfig = toml::from_str(r#"level = "debug""#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
    }
}
