use std::collections::HashMap;
use std::path::Path;

use super::value::ConfigValue;
use super::ConfigError;

pub(crate) type Values = HashMap<String, ConfigValue>;

/// Merge a YAML file into `values`. A missing file is not an error.
pub(crate) fn load_yaml_file(path: &Path, values: &mut Values) -> Result<(), ConfigError> {
    if !path.exists() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    load_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

pub(crate) fn load_yaml_str(content: &str, values: &mut Values) -> Result<(), ConfigError> {
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten("", &yaml, values);
    Ok(())
}

/// `decorum: {registration: {mode: x}}` becomes `decorum.registration.mode = x`.
fn flatten(prefix: &str, value: &serde_yaml::Value, out: &mut Values) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (k, v) in map {
                let segment = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    other => serde_yaml::to_string(other)
                        .map(|s| s.trim().to_string())
                        .unwrap_or_default(),
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(&key, v, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix.to_string(), ConfigValue::from_yaml(leaf));
        }
        _ => {}
    }
}

/// `DECORUM_REGISTRATION_MODE` → `decorum.registration.mode`.
pub(crate) fn env_key_to_config_key(env_key: &str) -> Option<String> {
    let rest = env_key.strip_prefix("DECORUM_")?;
    if rest.is_empty() || rest == "PROFILE" {
        return None;
    }
    Some(format!("decorum.{}", rest.to_ascii_lowercase().replace('_', ".")))
}

/// Overlay `DECORUM_*` environment variables onto `values`.
pub(crate) fn overlay_env(values: &mut Values, vars: impl IntoIterator<Item = (String, String)>) {
    for (env_key, env_value) in vars {
        if let Some(key) = env_key_to_config_key(&env_key) {
            values.insert(key, ConfigValue::String(env_value));
        }
    }
}
