use serde::Serialize;
use serde_json::{Value, json};

use super::request::RequestBody;
use crate::models::{Endpoint, StandardParameter};

/// How one endpoint handles the parameters of one request.
///
/// A parameter lands in at most one of `supported` and `unsupported`;
/// keys outside the vocabulary land in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub supported: Vec<StandardParameter>,
    pub unsupported: Vec<StandardParameter>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// True when nothing in the request would be dropped or rejected.
    pub fn is_compatible(&self) -> bool {
        self.unsupported.is_empty()
    }

    fn classify(&mut self, param: StandardParameter, endpoint: &Endpoint) {
        if endpoint.supports(&param) {
            self.supported.push(param);
        } else {
            self.warnings.push(format!(
                "Parameter '{}' is not supported by {}",
                param,
                endpoint.identity()
            ));
            self.unsupported.push(param);
        }
    }
}

/// Screens `body` against `endpoint`.
///
/// Vocabulary parameters are checked in a fixed order, so the result does
/// not depend on key order in the body.
pub fn validate(body: &RequestBody, endpoint: &Endpoint) -> ValidationResult {
    let mut result = ValidationResult::default();

    for param in StandardParameter::KNOWN {
        if param.is_legacy() || param.is_derived() {
            continue;
        }
        let present = match param {
            StandardParameter::Stream => {
                body.contains(param) || body.stream_options().is_some()
            }
            _ => body.contains(param),
        };
        if present {
            result.classify(param.clone(), endpoint);
        }
        if *param == StandardParameter::ResponseFormat && body.requests_json_mode() {
            result.classify(StandardParameter::JsonMode, endpoint);
        }
    }

    let legacy = if body.contains(&StandardParameter::FunctionCall) {
        Some(StandardParameter::FunctionCall)
    } else if body.contains(&StandardParameter::Functions) {
        Some(StandardParameter::Functions)
    } else {
        None
    };
    if let Some(legacy) = legacy {
        if endpoint.supports(&StandardParameter::Tools) {
            result.warnings.push(format!(
                "Legacy parameter '{}' detected. Consider migrating to the 'tools' format.",
                legacy
            ));
        } else {
            result.warnings.push(format!(
                "Legacy parameter '{}' is not supported. This model may not support function calling.",
                legacy
            ));
            result.unsupported.push(legacy);
        }
    }

    result
}

/// Multi-line report for logs; empty when nothing is unsupported.
pub fn format_validation_errors(result: &ValidationResult, endpoint: &Endpoint) -> String {
    if result.unsupported.is_empty() {
        return String::new();
    }

    let supported: Vec<&str> = endpoint
        .supported_parameters
        .iter()
        .filter(|p| endpoint.supports(p))
        .map(StandardParameter::as_str)
        .collect();
    let mut report = format!("Incompatible parameters for {}:\n", endpoint.identity());
    report.push_str(&format!("  Unsupported: {}\n", join(&result.unsupported)));
    report.push_str(&format!("  Supported by endpoint: {}", supported.join(", ")));
    for warning in &result.warnings {
        report.push_str(&format!("\n  - {}", warning));
    }
    report
}

/// Rewrites `functions`/`function_call` into `tools`/`tool_choice`.
///
/// A legacy field is only rewritten when the modern field is absent and the
/// legacy value has a recognizable shape; otherwise it is left as sent.
pub fn translate_legacy(body: &RequestBody) -> RequestBody {
    let mut translated = body.clone();

    if !translated.contains(&StandardParameter::Tools)
        && let Some(Value::Array(functions)) = translated.get(&StandardParameter::Functions)
    {
        let tools: Vec<Value> = functions
            .iter()
            .map(|function| json!({"type": "function", "function": function}))
            .collect();
        translated.remove(&StandardParameter::Functions);
        translated.insert("tools", Value::Array(tools));
    }

    if !translated.contains(&StandardParameter::ToolChoice)
        && let Some(choice) = translated
            .get(&StandardParameter::FunctionCall)
            .and_then(tool_choice_for)
    {
        translated.remove(&StandardParameter::FunctionCall);
        translated.insert("tool_choice", choice);
    }

    translated
}

fn tool_choice_for(function_call: &Value) -> Option<Value> {
    match function_call {
        Value::String(mode) if mode == "auto" || mode == "none" => Some(function_call.clone()),
        Value::Object(call) => {
            let name = call.get("name")?.as_str()?;
            Some(json!({"type": "function", "function": {"name": name}}))
        }
        _ => None,
    }
}

fn join(params: &[StandardParameter]) -> String {
    params
        .iter()
        .map(StandardParameter::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
