//! Typed configuration for Lyra.
//!
//! Lyra's engine is configured in code, but the parts that tend to differ
//! between deployments can be loaded from files and the environment:
//!
//! - [`PipelineConfig`] - which built-in pipes to install, the policies used
//!   when a route names none, and the deferred-result unwrap bound
//! - [`LoggingConfig`] - filter directive and output format
//!
//! Loading is layered (defaults, then file, then environment) and strict:
//! unknown fields are rejected.
//!
//! # Example
//!
//! ```no_run
//! use lyra_config::ConfigLoader;
//!
//! # fn main() -> Result<(), lyra_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("lyra.toml")?
//!     .with_env_prefix("LYRA")
//!     .load()?;
//!
//! println!("pipes: {:?}", config.pipeline.default_pipes);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [pipeline]
//! default_pipes = ["property-validator", "schema-enforcer", "request-caster"]
//! default_schema_policy = "prevent-execution"
//! default_parameter_policy = "prevent-execution"
//! max_unwrap_depth = 32
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `LYRA__PIPELINE__DEFAULT_PIPES=property-validator,request-caster`
//! - `LYRA__PIPELINE__MAX_UNWRAP_DEPTH=8`
//! - `LYRA__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/lyra-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::LyraConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LyraConfig::default();
        assert_eq!(config.pipeline.default_pipes.len(), BUILTIN_PIPES.len());
        assert_eq!(config.pipeline.max_unwrap_depth, DEFAULT_MAX_UNWRAP_DEPTH);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_config_toml_roundtrip_shape() {
        let rendered = toml::to_string(&LyraConfig::development()).unwrap();
        assert!(rendered.contains("[pipeline]"));
        assert!(rendered.contains(r#"format = "pretty""#));
    }
}
