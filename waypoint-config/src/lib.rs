//! Loader for `waypoint.yaml` with environment overlays.
//!
//! Merges an optional YAML file with `WAYPOINT_`-prefixed environment
//! variables (nested keys split on `__`, e.g. `WAYPOINT_BROWSER__PORT`),
//! expands `${VAR}` placeholders in string values, and materialises a
//! [`waypoint_common::WaypointConfig`].

use config::{Config, ConfigError, Environment, File};
use serde_json::Value;
use std::path::Path;
use waypoint_common::WaypointConfig;

const MAX_ENV_EXPANSION_DEPTH: usize = 8;

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut current = std::mem::take(s);
                for _ in 0..MAX_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&current) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => current.clone(),
                    };
                    if expanded == current {
                        break;
                    }
                    current = expanded;
                }
                *s = current;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

/// Builder hiding the `config` crate wiring (YAML + env overrides).
pub struct WaypointConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for WaypointConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl WaypointConfigLoader {
    /// Start with the defaults: `WAYPOINT_` env overrides, nothing else.
    ///
    /// ```
    /// use waypoint_config::WaypointConfigLoader;
    ///
    /// let cfg = WaypointConfigLoader::new().load().expect("defaults load");
    /// assert!(cfg.browser.headless);
    /// ```
    pub fn new() -> Self {
        let builder = Config::builder().add_source(
            Environment::with_prefix("WAYPOINT")
                .separator("__")
                .try_parsing(true),
        );
        Self { builder }
    }

    /// Attach a config file; the `config` crate infers format by suffix.
    /// Missing files are tolerated so env-only deployments keep working.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet; handy for tests and CLI overrides.
    ///
    /// ```
    /// use waypoint_config::WaypointConfigLoader;
    ///
    /// let cfg = WaypointConfigLoader::new()
    ///     .with_yaml_str("browser:\n  port: 4444\n")
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(cfg.browser.port, 4444);
    /// ```
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// `${VAR}` placeholders are expanded before typed deserialization so
    /// secrets can live in the environment rather than on disk.
    pub fn load(self) -> Result<WaypointConfig, ConfigError> {
        let merged = self.builder.build()?;

        let mut value: Value = merged.try_deserialize()?;
        expand_env_in_value(&mut value);

        serde_json::from_value(value).map_err(|e| ConfigError::Message(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_simple_string() {
        temp_env::with_var("WAYPOINT_TEST_FOO", Some("bar"), || {
            let mut v = json!("prefix-${WAYPOINT_TEST_FOO}-suffix");
            expand_env_in_value(&mut v);
            assert_eq!(v, json!("prefix-bar-suffix"));
        });
    }

    #[test]
    fn expands_inside_arrays_and_objects() {
        temp_env::with_var("WAYPOINT_TEST_CITY", Some("Lagos"), || {
            let mut v = json!([
                "hello-${WAYPOINT_TEST_CITY}",
                { "loc": "${WAYPOINT_TEST_CITY}" },
                42,
                true,
                null
            ]);
            expand_env_in_value(&mut v);
            assert_eq!(v[0], json!("hello-Lagos"));
            assert_eq!(v[1]["loc"], json!("Lagos"));
            assert_eq!(v[2], json!(42));
        });
    }

    #[test]
    fn unresolvable_placeholders_are_left_alone() {
        let mut v = json!("${WAYPOINT_TEST_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("${WAYPOINT_TEST_DOES_NOT_EXIST}"));
    }
}
