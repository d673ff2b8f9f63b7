use serde::{Deserialize, Serialize};

use super::author::AuthorName;

pub type ModelId = String;

/// A logical model as declared by its author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub author: AuthorName,
    #[serde(default)]
    pub description: String,
    pub context_length: u64,
    pub max_output_tokens: u64,
    pub created: String,
    pub modality: Modality,
    pub tokenizer: String,
}

/// Input/output modalities. Older tables use the `"text+image->text"` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Modality {
    Legacy(String),
    Structured {
        inputs: Vec<String>,
        outputs: Vec<String>,
    },
}

impl Modality {
    pub fn structured(
        inputs: impl IntoIterator<Item = impl Into<String>>,
        outputs: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self::Structured {
            inputs: inputs.into_iter().map(Into::into).collect(),
            outputs: outputs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::Legacy(tag) => split_side(tag, 0),
            Self::Structured { inputs, .. } => inputs.iter().map(String::as_str).collect(),
        }
    }

    pub fn outputs(&self) -> Vec<&str> {
        match self {
            Self::Legacy(tag) => split_side(tag, 1),
            Self::Structured { outputs, .. } => outputs.iter().map(String::as_str).collect(),
        }
    }

    pub fn accepts(&self, modality: &str) -> bool {
        self.inputs().contains(&modality)
    }

    pub fn produces(&self, modality: &str) -> bool {
        self.outputs().contains(&modality)
    }
}

fn split_side(tag: &str, side: usize) -> Vec<&str> {
    tag.split("->")
        .nth(side)
        .map(|part| {
            part.split('+')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_modality() {
        let m = Modality::Legacy("text+image->text".into());
        assert_eq!(m.inputs(), vec!["text", "image"]);
        assert_eq!(m.outputs(), vec!["text"]);
        assert!(m.accepts("image"));
        assert!(!m.produces("image"));
    }

    #[test]
    fn test_structured_modality() {
        let m = Modality::structured(["text", "audio"], ["text"]);
        assert!(m.accepts("audio"));
        assert_eq!(m.outputs(), vec!["text"]);
    }

    #[test]
    fn test_modality_both_forms_deserialize() {
        let legacy: Modality = serde_json::from_str("\"text->text\"").unwrap();
        assert!(matches!(legacy, Modality::Legacy(_)));

        let structured: Modality =
            serde_json::from_str(r#"{"inputs":["text","image"],"outputs":["text"]}"#).unwrap();
        assert_eq!(structured.inputs(), vec!["text", "image"]);
    }

    #[test]
    fn test_malformed_legacy_tag() {
        let m = Modality::Legacy("text".into());
        assert_eq!(m.inputs(), vec!["text"]);
        assert!(m.outputs().is_empty());
    }
}
