use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DisplaySettings, InputDefaults, LogFormat, LoggingSettings,
    DEFAULT_DELTA_THRESHOLD_PCT,
};

/// The file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "forecast.toml";

/// Prefix of environment variable overrides, e.g. `FORECAST__DISPLAY__DELTA_THRESHOLD_PCT`.
pub const ENV_PREFIX: &str = "FORECAST";

/// Loads and validates the application configuration.
///
/// With `path`, that file must exist. Without it, `forecast.toml` in the
/// working directory is read if present. `FORECAST__*` environment variables
/// are layered on top in both cases.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name(DEFAULT_CONFIG_FILE).required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(env_source())
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let mut config = builder.try_deserialize::<Config>()?;

    // The merged `[defaults]` table can hold one field under two spellings,
    // one from each layer. Re-apply the environment so it always wins.
    let env_only = config::Config::builder()
        .add_source(env_source())
        .build()?
        .try_deserialize::<Config>()?;
    config.defaults.overlay(&env_only.defaults);

    config.validate()?;

    Ok(config)
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    /// Serializes tests that read the process environment.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Clears every `FORECAST__*` variable, applies `assignments`, and
    /// restores the previous environment on drop.
    struct EnvScope {
        original: Vec<(String, String)>,
        assigned: Vec<String>,
        _lock: MutexGuard<'static, ()>,
    }

    impl EnvScope {
        fn new(assignments: &[(&str, &str)]) -> Self {
            let lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let prefix = format!("{ENV_PREFIX}__");
            let original: Vec<(String, String)> = std::env::vars()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect();
            for (key, _) in &original {
                unsafe { std::env::remove_var(key) };
            }
            for (key, value) in assignments {
                unsafe { std::env::set_var(key, value) };
            }
            EnvScope {
                original,
                assigned: assignments.iter().map(|(key, _)| key.to_string()).collect(),
                _lock: lock,
            }
        }
    }

    impl Drop for EnvScope {
        fn drop(&mut self) {
            for key in &self.assigned {
                unsafe { std::env::remove_var(key) };
            }
            for (key, value) in &self.original {
                unsafe { std::env::set_var(key, value) };
            }
        }
    }

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_every_section() {
        let _env = EnvScope::new(&[]);
        let file = write_config(
            r#"
            [defaults]
            total_ad_spend = 150000.0
            aov = 99.5

            [display]
            delta_threshold_pct = 0.5
            clamp_text_entry = true

            [logging]
            level = "debug"
            format = "compact"
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.defaults.total_ad_spend, Some(150_000.0));
        assert_eq!(config.defaults.aov, Some(99.5));
        assert_eq!(config.display.delta_threshold_pct, 0.5);
        assert!(config.display.clamp_text_entry);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let _env = EnvScope::new(&[]);
        let file = write_config("[defaults]\ncpm = 12.5\n");

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.defaults.cpm, Some(12.5));
        assert_eq!(config.display, DisplaySettings::default());
        assert_eq!(config.logging, LoggingSettings::default());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let _env = EnvScope::new(&[]);
        let file = write_config("[display]\ndelta_threshold_pct = -2.0\n");

        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn explicit_path_must_exist() {
        let _env = EnvScope::new(&[]);
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");

        assert!(matches!(
            load_config(Some(missing.as_path())),
            Err(ConfigError::LoadError(_))
        ));
    }

    #[test]
    fn camel_case_file_keys_are_read() {
        let _env = EnvScope::new(&[]);
        let file = write_config("[defaults]\ntotalAdSpend = 150000\norderFormConversion = 25.0\n");

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.defaults.total_ad_spend, Some(150_000.0));
        assert_eq!(config.defaults.order_form_conversion, Some(25.0));
    }

    #[test]
    fn environment_overrides_camel_case_file_keys() {
        let _env = EnvScope::new(&[
            ("FORECAST__DEFAULTS__TOTAL_AD_SPEND", "120000"),
            ("FORECAST__DISPLAY__DELTA_THRESHOLD_PCT", "0.5"),
        ]);
        let file = write_config("[defaults]\ntotalAdSpend = 150000\naov = 99.0\n");

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.defaults.total_ad_spend, Some(120_000.0));
        assert_eq!(config.defaults.aov, Some(99.0));
        assert_eq!(config.display.delta_threshold_pct, 0.5);
    }

    #[test]
    fn environment_overrides_snake_case_file_keys() {
        let _env = EnvScope::new(&[("FORECAST__DEFAULTS__CPM", "55")]);
        let file = write_config("[defaults]\ncpm = 12.5\n");

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.defaults.cpm, Some(55.0));
    }

    #[test]
    fn unknown_default_key_fails_to_load() {
        let _env = EnvScope::new(&[]);
        let file = write_config("[defaults]\nclicks = 3.0\n");

        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::LoadError(_))
        ));
    }
}
