use crate::config;

/// Load settings once at startup. Logging isn't up yet, so problems go to stderr.
pub fn load_settings() -> config::Settings {
    match config::Settings::load() {
        Ok(s) => {
            if let Err(msg) = s.validate() {
                eprintln!("bindery: invalid config, using defaults: {msg}");
                config::Settings::default()
            } else {
                s
            }
        }
        Err(e) => {
            // Config is optional; failures should not prevent the tool from running.
            eprintln!("bindery: failed to load config, using defaults: {e}");
            config::Settings::default()
        }
    }
}
