use super::load::{default_config_path, parse_mode, resolve_config_path};
use super::schema::*;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

#[test]
fn resolve_config_path_prefers_bindery_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("BINDERY_CONFIG_PATH", "/tmp/bindery-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        std::path::PathBuf::from("/tmp/bindery-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/xdg-config-home")
            .join("bindery")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        std::path::PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("bindery")
            .join("config.toml")
    );
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[log]
level = "warning"

[organize]
destination = "/srv/audiobooks"
dir_mode = "0770"
file_mode = "0660"
prune = true
reject_characters = "'\":"

[concat]
format = "m4a"
output_name = "book"
ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
probe = "lofty"

[library]
follow_links = false
include_hidden = true
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BINDERY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::remove("BINDERY__ORGANIZE__DIR_MODE");

    let s = Settings::load().unwrap();
    assert_eq!(s.log.level, LogLevel::Warn);
    assert_eq!(
        s.organize.destination.as_deref(),
        Some(std::path::Path::new("/srv/audiobooks"))
    );
    assert_eq!(s.organize.dir_mode.as_deref(), Some("0770"));
    assert_eq!(s.organize.file_mode.as_deref(), Some("0660"));
    assert!(s.organize.prune);
    assert_eq!(s.organize.reject_characters, "'\":");
    assert_eq!(s.concat.format, "m4a");
    assert_eq!(s.concat.output_name, "book");
    assert_eq!(s.concat.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
    assert_eq!(s.concat.ffprobe, "ffprobe");
    assert_eq!(s.concat.probe, ProbeBackend::Lofty);
    assert!(!s.library.follow_links);
    assert!(s.library.include_hidden);
    assert!(s.validate().is_ok());
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[organize]
prune = false
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("BINDERY_CONFIG_PATH", cfg_path.to_str().unwrap());
    let _g2 = EnvGuard::set("BINDERY__ORGANIZE__PRUNE", "true");

    let s = Settings::load().unwrap();
    assert!(s.organize.prune);
}

#[test]
fn defaults_leave_permission_modes_unset() {
    let s = Settings::default();
    assert!(s.organize.dir_mode.is_none());
    assert!(s.organize.file_mode.is_none());
    assert_eq!(s.concat.format, "mp3");
    assert_eq!(s.concat.probe, ProbeBackend::Ffprobe);
    assert!(s.validate().is_ok());
}

#[test]
fn validate_rejects_bad_modes() {
    let mut s = Settings::default();
    s.organize.dir_mode = Some("0789".to_string());
    let err = s.validate().unwrap_err();
    assert!(err.contains("organize.dir_mode"));

    let mut s = Settings::default();
    s.concat.format = " . ".to_string();
    assert!(s.validate().is_err());
}

#[test]
fn parse_mode_accepts_common_spellings() {
    assert_eq!(parse_mode("0775").unwrap(), 0o775);
    assert_eq!(parse_mode("775").unwrap(), 0o775);
    assert_eq!(parse_mode("0o664").unwrap(), 0o664);
    assert_eq!(parse_mode(" 2775 ").unwrap(), 0o2775);
    assert!(parse_mode("").is_err());
    assert!(parse_mode("rwx").is_err());
    assert!(parse_mode("17777").is_err());
}

#[test]
fn to_toml_round_trips_through_the_loader_schema() {
    let mut s = Settings::default();
    s.organize.dir_mode = Some("0775".to_string());
    let rendered = s.to_toml().unwrap();
    assert!(rendered.contains("[organize]"));
    assert!(rendered.contains("dir_mode = \"0775\""));
    let parsed: Settings = toml::from_str(&rendered).unwrap();
    assert_eq!(parsed.organize.dir_mode.as_deref(), Some("0775"));
}
