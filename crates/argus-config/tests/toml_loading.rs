//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use argus_config::{ArgusConfig, ConfigError};
use argus_core::enums::Severity;
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};

fn layered(file: &str) -> Figment {
    Figment::from(Serialized::defaults(ArgusConfig::default())).merge(Toml::file(file))
}

#[test]
fn loads_scheduler_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[scheduler]
max_concurrency = 8
max_retries = 5
retry_base_delay_ms = 250
task_timeout_ms = 30000
",
        )?;

        let config: ArgusConfig = layered("config.toml").extract()?;

        assert_eq!(config.scheduler.max_concurrency, 8);
        assert_eq!(config.scheduler.max_retries, 5);
        assert_eq!(config.scheduler.retry_base_delay_ms, 250);
        assert_eq!(config.scheduler.task_timeout_ms, 30_000);
        Ok(())
    });
}

#[test]
fn loads_confidence_minimums_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[confidence]
filter_enabled = true
min_evidence = 4

[confidence.severity_minimums]
critical = 0.1
high = 0.2
medium = 0.3
low = 0.4
info = 0.5
",
        )?;

        let config: ArgusConfig = layered("config.toml").extract()?;

        assert!(config.confidence.filter_enabled);
        assert_eq!(config.confidence.min_evidence, 4);
        assert!((config.confidence.minimum_for(Severity::Critical) - 0.1).abs() < f64::EPSILON);
        assert!((config.confidence.minimum_for(Severity::Info) - 0.5).abs() < f64::EPSILON);
        // Untouched fields keep their defaults.
        assert!((config.confidence.high_threshold - 0.8).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn loads_merge_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[merge]
duplicate_threshold = 0.75
prefer_static_for_conflict = false
max_results = 50
",
        )?;

        let config: ArgusConfig = layered("config.toml").extract()?;

        assert!((config.merge.duplicate_threshold - 0.75).abs() < f64::EPSILON);
        assert!(!config.merge.prefer_static_for_conflict);
        assert_eq!(config.merge.max_results, Some(50));
        assert!((config.merge.ai_confidence_threshold - 0.6).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn loads_general_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[general]
data_dir = "/var/lib/argus"
trail_enabled = false
"#,
        )?;

        let config: ArgusConfig = layered("config.toml").extract()?;

        assert_eq!(config.general.data_dir, "/var/lib/argus");
        assert_eq!(config.general.database_file, "argus.db");
        assert!(!config.general.trail_enabled);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[scheduler]
max_concurrency = 8
",
        )?;
        jail.set_env("ARGUS_SCHEDULER__MAX_CONCURRENCY", "2");

        let config: ArgusConfig = layered("config.toml")
            .merge(Env::prefixed("ARGUS_").split("__"))
            .extract()?;

        assert_eq!(config.scheduler.max_concurrency, 2);
        Ok(())
    });
}

#[test]
fn project_config_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        let dir = jail.directory().display().to_string();
        jail.set_env("XDG_CONFIG_HOME", dir);
        jail.create_dir(".argus")?;
        jail.create_file(
            ".argus/config.toml",
            r"
[merge]
max_results = 10
",
        )?;

        let config = ArgusConfig::from_figment(&ArgusConfig::figment())
            .map_err(|e| e.to_string())?;
        assert_eq!(config.merge.max_results, Some(10));
        Ok(())
    });
}

#[test]
fn invalid_values_fail_validation() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[scheduler]
max_concurrency = 0
",
        )?;

        let err = ArgusConfig::from_figment(&layered("config.toml")).unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "scheduler.max_concurrency"),
            "unexpected error: {err}"
        );
        Ok(())
    });
}

#[test]
fn malformed_toml_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[scheduler\nmax_concurrency = ")?;

        let err = ArgusConfig::from_figment(&layered("config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}
