//! Layer merging and CLI overrides
//!
//! Merge rules:
//! - Objects: deep-merge by key
//! - Arrays: REPLACE (a later flag list replaces an earlier one)
//! - Scalars: override (last wins)

use serde_json::{Map, Value};

use super::loaded::{toml_to_json, ConfigError};

/// Deep merge `overlay` onto `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

/// Parse one `key=value` CLI override into an object layer.
///
/// The value is read as a TOML value (`true`, `10`, `["-g"]`) and falls back
/// to a plain string. Dotted keys build nested objects.
pub fn parse_override(raw: &str) -> Result<Value, ConfigError> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        ConfigError::ValidationError(format!("override '{}' is not of the form key=value", raw))
    })?;
    let key = key.trim();
    if key.is_empty() || key.split('.').any(str::is_empty) {
        return Err(ConfigError::ValidationError(format!(
            "override '{}' has an empty key",
            raw
        )));
    }

    let mut value = parse_value(value.trim());
    for part in key.rsplit('.') {
        let mut map = Map::new();
        map.insert(part.to_string(), value);
        value = Value::Object(map);
    }
    Ok(value)
}

/// Parse every override into a single layer (None when there are none)
pub fn parse_overrides(raw: &[String]) -> Result<Option<Value>, ConfigError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let layers = raw
        .iter()
        .map(|r| parse_override(r))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(merge_layers(layers)))
}

fn parse_value(raw: &str) -> Value {
    match toml::from_str::<toml::Table>(&format!("v = {}", raw)) {
        Ok(mut table) => table
            .remove("v")
            .map(toml_to_json)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        Err(_) => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(json!({"host_os": "Linux"}), json!({"host_os": "Darwin"}));
        assert_eq!(result["host_os"], "Darwin");
    }

    #[test]
    fn test_flag_lists_replace() {
        let result = deep_merge(
            json!({"debug_info_flags": ["-gline-tables-only"]}),
            json!({"debug_info_flags": ["-g", "-O0"]}),
        );
        assert_eq!(result["debug_info_flags"], json!(["-g", "-O0"]));
    }

    #[test]
    fn test_layers_keep_untouched_keys() {
        let result = merge_layers(vec![
            json!({"android": false, "has_libcxx": false}),
            json!({"host_os": "Linux", "has_libcxx": true}),
            json!({"android": true}),
        ]);
        assert_eq!(result, json!({"android": true, "has_libcxx": true, "host_os": "Linux"}));
    }

    #[test]
    fn test_parse_override_types() {
        assert_eq!(parse_override("android=true").unwrap(), json!({"android": true}));
        assert_eq!(parse_override("deflake_threshold=10").unwrap(), json!({"deflake_threshold": 10}));
        assert_eq!(
            parse_override("debug_info_flags=[\"-g\"]").unwrap(),
            json!({"debug_info_flags": ["-g"]})
        );
        assert_eq!(parse_override("host_os=NetBSD").unwrap(), json!({"host_os": "NetBSD"}));
        assert_eq!(
            parse_override("netbsd_noaslr_prefix=/usr/sbin/paxctl +a").unwrap(),
            json!({"netbsd_noaslr_prefix": "/usr/sbin/paxctl +a"})
        );
    }

    #[test]
    fn test_parse_override_dotted_and_empty_value() {
        assert_eq!(parse_override("a.b=1").unwrap(), json!({"a": {"b": 1}}));
        assert_eq!(parse_override("target_cflags=").unwrap(), json!({"target_cflags": ""}));
    }

    #[test]
    fn test_parse_override_rejects_malformed() {
        assert!(parse_override("android").is_err());
        assert!(parse_override("=true").is_err());
        assert!(parse_override("a..b=1").is_err());
    }

    #[test]
    fn test_parse_overrides_last_wins() {
        let raw = vec!["host_os=Linux".to_string(), "host_os=FreeBSD".to_string()];
        assert_eq!(parse_overrides(&raw).unwrap(), Some(json!({"host_os": "FreeBSD"})));
        assert_eq!(parse_overrides(&[]).unwrap(), None);
    }
}
