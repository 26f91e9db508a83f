//! Tests for config loading and precedence.

use super::*;
use std::io::Write;

fn temp_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("sweb_loader_test_{name}.toml"));
    let mut file = std::fs::File::create(&path).expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    path
}

#[test]
fn missing_file_is_not_an_error() {
    let result = load_config_file("/nonexistent/sweb/config.toml");
    assert_eq!(result, Ok(None));
}

#[test]
fn valid_file_parses_all_fields() {
    let path = temp_config(
        "all_fields",
        r#"
controls = "nano"
log_file_path = "/tmp/sweb-test.log"
timeout_secs = 10
user_agent = "test-agent"
"#,
    );

    let config = load_config_file(&path).expect("load").expect("present");
    assert_eq!(config.controls.as_deref(), Some("nano"));
    assert_eq!(
        config.log_file_path,
        Some(PathBuf::from("/tmp/sweb-test.log"))
    );
    assert_eq!(config.timeout_secs, Some(10));
    assert_eq!(config.user_agent.as_deref(), Some("test-agent"));

    let _ = std::fs::remove_file(path);
}

#[test]
fn empty_file_yields_all_defaults() {
    let path = temp_config("empty", "");
    let config = load_config_file(&path).expect("load").expect("present");
    assert_eq!(config, ConfigFile::default());

    let resolved = merge_config(Some(config));
    assert_eq!(resolved, ResolvedConfig::default());

    let _ = std::fs::remove_file(path);
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let path = temp_config("broken", "controls = [unterminated");
    let result = load_config_file(&path);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));

    let _ = std::fs::remove_file(path);
}

#[test]
fn unknown_keys_are_rejected() {
    let path = temp_config("unknown_key", "not_a_real_option = true\n");
    let result = load_config_file(&path);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));

    let _ = std::fs::remove_file(path);
}

#[test]
fn file_values_override_defaults() {
    let file = ConfigFile {
        controls: Some("emacs".to_string()),
        timeout_secs: Some(5),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));
    assert_eq!(resolved.controls, "emacs");
    assert_eq!(resolved.timeout_secs, 5);
    // Untouched fields keep their defaults.
    assert_eq!(resolved.user_agent, ResolvedConfig::default().user_agent);
}

#[test]
fn cli_override_beats_file_value() {
    let file = ConfigFile {
        controls: Some("emacs".to_string()),
        ..ConfigFile::default()
    };

    let resolved = merge_config(Some(file));
    let resolved = apply_cli_overrides(resolved, Some("nano".to_string()));
    assert_eq!(resolved.controls, "nano");
}

#[test]
fn cli_none_preserves_resolved_value() {
    let resolved = apply_cli_overrides(ResolvedConfig::default(), None);
    assert_eq!(resolved.controls, "vim");
}

#[test]
fn default_log_path_ends_with_crate_log() {
    let path = default_log_path();
    assert!(path.to_string_lossy().ends_with("sweb.log"));
}
