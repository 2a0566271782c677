use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/bindery/config.toml` or `~/.config/bindery/config.toml`
///
/// Precedence (highest wins):
/// 1) Command-line flags
/// 2) Environment variables (prefix `BINDERY__`, `__` as nested separator)
/// 3) Config file (if present)
/// 4) Struct defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub log: LogSettings,
    pub organize: OrganizeSettings,
    pub concat: ConcatSettings,
    pub library: LibrarySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default verbosity when neither `--log-level` nor `RUST_LOG` is given.
    pub level: LogLevel,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[serde(alias = "warning")]
    #[value(alias = "warning")]
    Warn,
    #[serde(alias = "critical")]
    #[value(alias = "critical")]
    Error,
}

impl LogLevel {
    pub fn as_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OrganizeSettings {
    /// Library root files are organized into. Defaults to the working directory.
    pub destination: Option<PathBuf>,
    /// Octal mode enforced on every author/title directory (e.g. "0775").
    ///
    /// No default: either this or `--dir-mode` must be set.
    pub dir_mode: Option<String>,
    /// Octal mode enforced on every moved file (e.g. "0664").
    pub file_mode: Option<String>,
    /// Remove source directories left empty after a batch.
    pub prune: bool,
    /// Characters stripped from author/title before they become path segments.
    pub reject_characters: String,
}

impl Default for OrganizeSettings {
    fn default() -> Self {
        Self {
            destination: None,
            dir_mode: None,
            file_mode: None,
            prune: false,
            reject_characters: "'\"/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConcatSettings {
    /// Extension (without dot) of the tracks to concatenate.
    pub format: String,
    /// Base name of the produced file; `.m4b` is appended.
    pub output_name: String,
    /// ffmpeg executable used for merging.
    pub ffmpeg: String,
    /// ffprobe executable used by the `ffprobe` probe backend.
    pub ffprobe: String,
    /// How track durations are measured.
    pub probe: ProbeBackend,
}

impl Default for ConcatSettings {
    fn default() -> Self {
        Self {
            format: "mp3".to_string(),
            output_name: "output".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            probe: ProbeBackend::Ffprobe,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProbeBackend {
    /// Ask `ffprobe` for the container duration.
    Ffprobe,
    /// Read the duration from the container headers in-process.
    #[serde(alias = "native")]
    Lofty,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Whether to follow symlinks while walking a source directory.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            follow_links: true,
            include_hidden: false,
        }
    }
}
