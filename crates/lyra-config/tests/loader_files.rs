//! File-based loading tests.

use std::io::Write;

use lyra_config::{ConfigError, ConfigLoader, LogFormat, LyraConfig};
use tempfile::{Builder, NamedTempFile};

fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn loads_toml_file() {
    let file = temp_file(
        ".toml",
        r#"
[pipeline]
default_pipes = ["request-caster"]
default_parameter_policy = "dont-validate"

[logging]
format = "pretty"
"#,
    );

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.pipeline.default_pipes, vec!["request-caster"]);
    assert_eq!(config.pipeline.default_parameter_policy, "dont-validate");
    assert_eq!(config.pipeline.default_schema_policy, "prevent-execution");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn loads_json_file() {
    let file = temp_file(".json", r#"{"logging": {"level": "warn"}}"#);

    let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();

    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.pipeline, LyraConfig::default().pipeline);
}

#[test]
fn file_replaces_preset() {
    let file = temp_file(".toml", "[logging]\nlevel = \"error\"\n");

    let config = ConfigLoader::new()
        .with_development()
        .with_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    // Sections come from the file; missing keys fall back to defaults, not the preset.
    assert_eq!(config.logging.level, "error");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(config.pipeline.default_schema_policy, "prevent-execution");
}

#[test]
fn rejects_unknown_extension() {
    let file = temp_file(".yaml", "pipeline: {}\n");

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
}

#[test]
fn rejects_unknown_fields_in_file() {
    let file = temp_file(".toml", "[pipeline]\npipes = []\n");

    let result = ConfigLoader::new().with_file(file.path());
    assert!(matches!(result, Err(ConfigError::Toml(_))));
}

#[test]
fn invalid_pipe_fails_on_load() {
    let file = temp_file(".toml", "[pipeline]\ndefault_pipes = [\"gzip\"]\n");

    let loader = ConfigLoader::new().with_file(file.path()).unwrap();
    assert!(matches!(loader.load(), Err(ConfigError::InvalidValue { .. })));
}

#[test]
fn optional_file_is_loaded_when_present() {
    let file = temp_file(".toml", "[pipeline]\nmax_unwrap_depth = 3\n");

    let config = ConfigLoader::new()
        .with_optional_file(file.path())
        .unwrap()
        .load()
        .unwrap();

    assert_eq!(config.pipeline.max_unwrap_depth, 3);
}
