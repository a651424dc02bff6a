use decorum_core::config::{ConfigError, ConfigValue, DecorumConfig};
use decorum_core::scheduler::{RegistrationMode, RegistrationSettings};
use serial_test::serial;
use std::time::Duration;

#[test]
fn test_empty_config() {
    let config = DecorumConfig::empty();
    assert!(matches!(
        config.get::<String>("nonexistent"),
        Err(ConfigError::NotFound(_))
    ));
    assert_eq!(config.profile(), "test");
}

#[test]
fn test_set_and_get() {
    let mut config = DecorumConfig::empty();
    config.set("decorum.tracing.filter", "debug");
    config.set("decorum.registration.delay", 25i64);
    assert_eq!(config.get::<String>("decorum.tracing.filter").unwrap(), "debug");
    assert_eq!(config.get::<u64>("decorum.registration.delay").unwrap(), 25);
    assert!(config.contains_key("decorum.tracing.filter"));
}

#[test]
fn test_type_conversions() {
    let mut config = DecorumConfig::empty();
    config.set("int", ConfigValue::Integer(42));
    config.set("float", ConfigValue::Float(2.5));
    config.set("flag", ConfigValue::String("yes".into()));
    config.set("null", ConfigValue::Null);
    config.set("negative", ConfigValue::Integer(-1));

    assert_eq!(config.get::<i64>("int").unwrap(), 42);
    assert_eq!(config.get::<f64>("float").unwrap(), 2.5);
    assert!(config.get::<bool>("flag").unwrap());
    assert_eq!(config.get::<String>("int").unwrap(), "42");
    assert!(config.get::<Option<String>>("null").unwrap().is_none());
    assert!(matches!(
        config.get::<u64>("negative"),
        Err(ConfigError::TypeMismatch { expected: "u64", .. })
    ));
}

#[test]
fn test_lists_from_yaml_and_comma_strings() {
    let yaml = r#"
decorum:
  middlewares:
    - auth
    - cors
"#;
    let mut config = DecorumConfig::from_yaml_str(yaml, "test").unwrap();
    let from_yaml: Vec<String> = config.get("decorum.middlewares").unwrap();
    assert_eq!(from_yaml, vec!["auth", "cors"]);

    config.set("decorum.middlewares", "auth, cors");
    let from_env: Vec<String> = config.get("decorum.middlewares").unwrap();
    assert_eq!(from_env, vec!["auth", "cors"]);
}

#[test]
fn test_invalid_yaml_is_a_load_error() {
    assert!(matches!(
        DecorumConfig::from_yaml_str("decorum: [unclosed", "test"),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_registration_settings_default_to_explicit() {
    let settings = RegistrationSettings::from_config(&DecorumConfig::empty()).unwrap();
    assert_eq!(settings, RegistrationSettings::explicit());
}

#[test]
fn test_registration_settings_from_yaml() {
    let yaml = r#"
decorum:
  registration:
    mode: Debounced
    delay: 15
"#;
    let config = DecorumConfig::from_yaml_str(yaml, "test").unwrap();
    let settings = RegistrationSettings::from_config(&config).unwrap();
    assert_eq!(settings.mode, RegistrationMode::Debounced);
    assert_eq!(settings.delay, Duration::from_millis(15));
}

#[test]
fn test_unknown_registration_mode_is_rejected() {
    let mut config = DecorumConfig::empty();
    config.set("decorum.registration.mode", "eventually");
    assert!(matches!(
        RegistrationSettings::from_config(&config),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

#[test]
fn test_malformed_registration_delay_is_rejected() {
    let mut config = DecorumConfig::empty();
    config.set("decorum.registration.delay", "soon");
    assert!(matches!(
        RegistrationSettings::from_config(&config),
        Err(ConfigError::TypeMismatch { .. })
    ));
}

// ── File and environment loading ────────────────────────────────────────

fn write(dir: &std::path::Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

#[test]
#[serial]
fn test_profile_file_overrides_base_file() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "application.yaml",
        "decorum:\n  registration:\n    mode: explicit\n    delay: 5\n",
    );
    write(
        dir.path(),
        "application-prod.yaml",
        "decorum:\n  registration:\n    mode: debounced\n",
    );

    let config = DecorumConfig::load_from(dir.path(), "prod").unwrap();
    assert_eq!(config.profile(), "prod");
    assert_eq!(config.get::<String>("decorum.registration.mode").unwrap(), "debounced");
    assert_eq!(config.get::<i64>("decorum.registration.delay").unwrap(), 5);
}

#[test]
#[serial]
fn test_missing_files_yield_an_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = DecorumConfig::load_from(dir.path(), "dev").unwrap();
    assert!(!config.contains_key("decorum.registration.mode"));
}

#[test]
#[serial]
fn test_env_var_overrides_yaml() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application.yaml", "decorum:\n  tracing:\n    json: false\n");

    std::env::set_var("DECORUM_TRACING_JSON", "true");
    let config = DecorumConfig::load_from(dir.path(), "dev");
    std::env::remove_var("DECORUM_TRACING_JSON");

    assert!(config.unwrap().get::<bool>("decorum.tracing.json").unwrap());
}

#[test]
#[serial]
fn test_profile_env_var_wins_over_argument() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "application-staging.yaml", "decorum:\n  tracing:\n    filter: warn\n");

    std::env::set_var("DECORUM_PROFILE", "staging");
    let config = DecorumConfig::load_from(dir.path(), "dev");
    std::env::remove_var("DECORUM_PROFILE");

    let config = config.unwrap();
    assert_eq!(config.profile(), "staging");
    assert_eq!(config.get::<String>("decorum.tracing.filter").unwrap(), "warn");
}

#[test]
#[serial]
fn test_dotenv_file_feeds_the_environment() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), ".env.dotenvtest", "DECORUM_REGISTRATION_DELAY=70\n");

    let config = DecorumConfig::load_from(dir.path(), "dotenvtest");
    std::env::remove_var("DECORUM_REGISTRATION_DELAY");

    assert_eq!(config.unwrap().get::<u64>("decorum.registration.delay").unwrap(), 70);
}
