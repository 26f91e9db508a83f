//! Configuration: control schemes and the on-disk config file.

pub mod controls;
pub mod loader;

pub use controls::{ControlPreset, ControlScheme, InputToken, KeyResolver, Resolution};
pub use loader::{
    apply_cli_overrides, default_config_path, default_log_path, load_config_file,
    load_config_with_precedence, merge_config, ConfigError, ConfigFile, ResolvedConfig,
};
