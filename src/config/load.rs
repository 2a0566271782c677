use std::{env, path::PathBuf};

use super::schema::Settings;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment
/// variables (prefix `BINDERY__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(::config::File::from(path.as_path()).required(false));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("BINDERY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(mode) = &self.organize.dir_mode {
            parse_mode(mode).map_err(|e| format!("organize.dir_mode: {e}"))?;
        }
        if let Some(mode) = &self.organize.file_mode {
            parse_mode(mode).map_err(|e| format!("organize.file_mode: {e}"))?;
        }
        if self.concat.format.trim().trim_start_matches('.').is_empty() {
            return Err("concat.format must not be empty".to_string());
        }
        if self.concat.output_name.trim().is_empty() {
            return Err("concat.output_name must not be empty".to_string());
        }
        Ok(())
    }

    /// Render the effective settings as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// Parse an octal permission string such as `"0775"`, `"775"` or `"0o775"`.
pub fn parse_mode(raw: &str) -> Result<u32, String> {
    let digits = raw.trim();
    let digits = digits
        .strip_prefix("0o")
        .or_else(|| digits.strip_prefix("0O"))
        .unwrap_or(digits);
    if digits.is_empty() {
        return Err("empty permission mode".to_string());
    }
    let mode = u32::from_str_radix(digits, 8)
        .map_err(|_| format!("'{raw}' is not an octal permission mode"))?;
    if mode > 0o7777 {
        return Err(format!("'{raw}' is out of range (max 7777)"));
    }
    Ok(mode)
}

/// Resolve the config path from `BINDERY_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("BINDERY_CONFIG_PATH") {
        let p = PathBuf::from(p);
        return Some(p);
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/bindery/config.toml`
/// or `~/.config/bindery/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else if let Some(home) = env::var_os("HOME") {
        Some(PathBuf::from(home).join(".config"))
    } else {
        None
    };

    config_home.map(|d| d.join("bindery").join("config.toml"))
}
