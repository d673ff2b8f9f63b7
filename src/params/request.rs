use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::StandardParameter;

pub const STREAM_OPTIONS: &str = "stream_options";

/// A parsed chat-completion request body.
///
/// Top-level keys are sorted into three bags: the shared parameter
/// vocabulary, `stream_options`, and everything else. Values are kept as
/// sent; a JSON `null` still counts as present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody {
    known: BTreeMap<StandardParameter, Value>,
    stream_options: Option<Value>,
    unknown: Map<String, Value>,
}

impl RequestBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut body = Self::new();
        for (key, value) in map {
            body.insert(key, value);
        }
        body
    }

    /// Builder form of [`RequestBody::insert`].
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if key == STREAM_OPTIONS {
            self.stream_options = Some(value);
            return;
        }
        match StandardParameter::from(key.as_str()) {
            // Derived parameters are never read from the body.
            param if param.is_extension() || param.is_derived() => {
                self.unknown.insert(key, value);
            }
            param => {
                self.known.insert(param, value);
            }
        }
    }

    pub fn get(&self, param: &StandardParameter) -> Option<&Value> {
        self.known.get(param)
    }

    pub fn contains(&self, param: &StandardParameter) -> bool {
        self.known.contains_key(param)
    }

    pub fn remove(&mut self, param: &StandardParameter) -> Option<Value> {
        self.known.remove(param)
    }

    pub fn stream_options(&self) -> Option<&Value> {
        self.stream_options.as_ref()
    }

    pub fn unknown(&self) -> &Map<String, Value> {
        &self.unknown
    }

    /// Vocabulary parameters present in the body, in scan order.
    pub fn parameters(&self) -> impl Iterator<Item = &StandardParameter> {
        self.known.keys()
    }

    pub fn response_format_type(&self) -> Option<&str> {
        self.get(&StandardParameter::ResponseFormat)?
            .get("type")?
            .as_str()
    }

    pub fn requests_json_mode(&self) -> bool {
        matches!(
            self.response_format_type(),
            Some("json_object" | "json_schema")
        )
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty() && self.stream_options.is_none() && self.unknown.is_empty()
    }

    pub fn into_map(self) -> Map<String, Value> {
        let mut map = self.unknown;
        for (param, value) in self.known {
            map.insert(param.as_str().to_string(), value);
        }
        if let Some(options) = self.stream_options {
            map.insert(STREAM_OPTIONS.to_string(), options);
        }
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.clone().into_map())
    }
}

impl From<Map<String, Value>> for RequestBody {
    fn from(map: Map<String, Value>) -> Self {
        Self::from_map(map)
    }
}

impl TryFrom<Value> for RequestBody {
    type Error = crate::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            other => Err(crate::Error::InvalidRequest(format!(
                "request body must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }
}

impl std::str::FromStr for RequestBody {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = serde_json::from_str::<Value>(s)
            .map_err(|e| crate::Error::Parse(format!("request body is not JSON: {}", e)))?;
        Self::try_from(value)
    }
}

impl Serialize for RequestBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.clone().into_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RequestBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Map::deserialize(deserializer).map(Self::from_map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
