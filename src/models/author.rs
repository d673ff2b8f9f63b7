use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Organization that publishes models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthorName {
    Anthropic,
    Openai,
    Google,
    MetaLlama,
    Mistralai,
    Moonshotai,
    Perplexity,
    XAi,
    Deepseek,
    Qwen,
    Amazon,
    Cohere,
    Nvidia,
    Zai,
}

impl AuthorName {
    pub const ALL: &'static [AuthorName] = &[
        Self::Anthropic,
        Self::Openai,
        Self::Google,
        Self::MetaLlama,
        Self::Mistralai,
        Self::Moonshotai,
        Self::Perplexity,
        Self::XAi,
        Self::Deepseek,
        Self::Qwen,
        Self::Amazon,
        Self::Cohere,
        Self::Nvidia,
        Self::Zai,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Openai => "openai",
            Self::Google => "google",
            Self::MetaLlama => "meta-llama",
            Self::Mistralai => "mistralai",
            Self::Moonshotai => "moonshotai",
            Self::Perplexity => "perplexity",
            Self::XAi => "x-ai",
            Self::Deepseek => "deepseek",
            Self::Qwen => "qwen",
            Self::Amazon => "amazon",
            Self::Cohere => "cohere",
            Self::Nvidia => "nvidia",
            Self::Zai => "zai",
        }
    }
}

impl fmt::Display for AuthorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|a| a.as_str() == lower)
            .ok_or_else(|| format!("unknown author: {}", s))
    }
}

/// Descriptive information about an author, carried by its table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorMetadata {
    pub name: AuthorName,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
