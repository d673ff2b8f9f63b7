//! Rule-based validation of a settings tree before it is deserialized.

use std::collections::BTreeMap;

use regex::Regex;
use serde_json::Value;

use super::{ConfigError, ConfigResult, ValidationErrors};

pub type ValidationFn = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Rules keyed by dotted path. Rules for absent keys pass; errors are
/// reported in key order.
#[derive(Default)]
pub struct ConfigValidator {
    type_rules: BTreeMap<String, ValueType>,
    pattern_rules: BTreeMap<String, Regex>,
    custom_rules: BTreeMap<String, ValidationFn>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl ValueType {
    /// `None` for JSON `null`.
    pub fn of(value: &Value) -> Option<Self> {
        Some(match value {
            Value::Null => return None,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        })
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        })
    }
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_type(mut self, key: impl Into<String>, value_type: ValueType) -> Self {
        self.type_rules.insert(key.into(), value_type);
        self
    }

    pub fn expect_pattern(mut self, key: impl Into<String>, pattern: &str) -> ConfigResult<Self> {
        let key = key.into();
        let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidValue {
            key: key.clone(),
            message: format!("Invalid regex pattern: {}", e),
        })?;
        self.pattern_rules.insert(key, regex);
        Ok(self)
    }

    pub fn custom<F>(mut self, key: impl Into<String>, validator: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.custom_rules.insert(key.into(), Box::new(validator));
        self
    }

    pub fn validate(&self, config: &Value) -> ConfigResult<()> {
        let errors = self.collect_errors(config);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationErrors(ValidationErrors(errors)))
        }
    }

    pub fn collect_errors(&self, config: &Value) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (key, expected) in &self.type_rules {
            if let Some(found) = get_nested(config, key).and_then(ValueType::of)
                && found != *expected
            {
                errors.push(ConfigError::InvalidValue {
                    key: key.clone(),
                    message: format!("expected {}, got {}", expected, found),
                });
            }
        }

        for (key, pattern) in &self.pattern_rules {
            if let Some(value) = get_nested(config, key)
                && let Some(s) = value.as_str()
                && !pattern.is_match(s)
            {
                errors.push(ConfigError::InvalidValue {
                    key: key.clone(),
                    message: format!("'{}' does not match {}", s, pattern.as_str()),
                });
            }
        }

        for (key, validator) in &self.custom_rules {
            if let Some(value) = get_nested(config, key)
                && let Err(message) = validator(value)
            {
                errors.push(ConfigError::InvalidValue {
                    key: key.clone(),
                    message,
                });
            }
        }

        errors
    }
}

/// Looks up a dotted key; `null` counts as absent.
fn get_nested<'a>(config: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(config, |current, part| current.get(part))
        .filter(|value| !value.is_null())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_and_null_keys_pass() {
        let validator = ConfigValidator::new().expect_type("catalog.dir", ValueType::String);
        assert!(validator.validate(&json!({"catalog": {}})).is_ok());
        assert!(validator.validate(&json!({"catalog": {"dir": null}})).is_ok());
    }

    #[test]
    fn test_type_validation() {
        let validator = ConfigValidator::new().expect_type("catalog.builtin", ValueType::Boolean);
        assert!(validator.validate(&json!({"catalog": {"builtin": true}})).is_ok());

        let err = validator
            .validate(&json!({"catalog": {"builtin": "yes"}}))
            .unwrap_err();
        assert!(err.to_string().contains("expected boolean, got string"));
    }

    #[test]
    fn test_pattern_validation() {
        let validator = ConfigValidator::new()
            .expect_pattern("writer.index_file", r"^[a-z]+\.yaml$")
            .unwrap();
        assert!(validator.validate(&json!({"writer": {"index_file": "index.yaml"}})).is_ok());
        assert!(validator.validate(&json!({"writer": {"index_file": "../x"}})).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let result = ConfigValidator::new().expect_pattern("writer.index_file", "(");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_custom_validator() {
        let validator = ConfigValidator::new().custom("catalog.dir", |v| match v.as_str() {
            Some("") => Err("must not be empty".to_string()),
            _ => Ok(()),
        });
        assert!(validator.validate(&json!({"catalog": {"dir": "x"}})).is_ok());
        assert!(validator.validate(&json!({"catalog": {"dir": ""}})).is_err());
    }

    #[test]
    fn test_errors_are_collected_in_key_order() {
        let validator = ConfigValidator::new()
            .expect_type("writer.index_file", ValueType::String)
            .expect_type("catalog.builtin", ValueType::Boolean);
        let errors = validator.collect_errors(&json!({
            "catalog": {"builtin": 1},
            "writer": {"index_file": 2}
        }));
        let keys: Vec<String> = errors
            .iter()
            .map(|e| match e {
                ConfigError::InvalidValue { key, .. } => key.clone(),
                other => other.to_string(),
            })
            .collect();
        assert_eq!(keys, vec!["catalog.builtin", "writer.index_file"]);
    }
}
