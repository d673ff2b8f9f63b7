use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Request parameter vocabulary shared by every endpoint table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardParameter {
    MaxTokens,
    MaxCompletionTokens,
    Temperature,
    TopP,
    TopK,
    MinP,
    Stop,
    Stream,
    FrequencyPenalty,
    PresencePenalty,
    RepetitionPenalty,
    Seed,
    Tools,
    ToolChoice,
    Functions,
    FunctionCall,
    Reasoning,
    ReasoningEffort,
    IncludeReasoning,
    Thinking,
    ResponseFormat,
    JsonMode,
    StructuredOutputs,
    Logprobs,
    TopLogprobs,
    LogitBias,
    Verbosity,
    Truncate,
    /// Provider-introduced parameter outside the shared vocabulary.
    Extension(String),
}

impl StandardParameter {
    /// Every named parameter, in the order request bodies are scanned.
    pub const KNOWN: &'static [StandardParameter] = &[
        Self::MaxTokens,
        Self::MaxCompletionTokens,
        Self::Temperature,
        Self::TopP,
        Self::TopK,
        Self::MinP,
        Self::Stop,
        Self::Stream,
        Self::FrequencyPenalty,
        Self::PresencePenalty,
        Self::RepetitionPenalty,
        Self::Seed,
        Self::Tools,
        Self::ToolChoice,
        Self::Functions,
        Self::FunctionCall,
        Self::Reasoning,
        Self::ReasoningEffort,
        Self::IncludeReasoning,
        Self::Thinking,
        Self::ResponseFormat,
        Self::JsonMode,
        Self::StructuredOutputs,
        Self::Logprobs,
        Self::TopLogprobs,
        Self::LogitBias,
        Self::Verbosity,
        Self::Truncate,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::MaxTokens => "max_tokens",
            Self::MaxCompletionTokens => "max_completion_tokens",
            Self::Temperature => "temperature",
            Self::TopP => "top_p",
            Self::TopK => "top_k",
            Self::MinP => "min_p",
            Self::Stop => "stop",
            Self::Stream => "stream",
            Self::FrequencyPenalty => "frequency_penalty",
            Self::PresencePenalty => "presence_penalty",
            Self::RepetitionPenalty => "repetition_penalty",
            Self::Seed => "seed",
            Self::Tools => "tools",
            Self::ToolChoice => "tool_choice",
            Self::Functions => "functions",
            Self::FunctionCall => "function_call",
            Self::Reasoning => "reasoning",
            Self::ReasoningEffort => "reasoning_effort",
            Self::IncludeReasoning => "include_reasoning",
            Self::Thinking => "thinking",
            Self::ResponseFormat => "response_format",
            Self::JsonMode => "json_mode",
            Self::StructuredOutputs => "structured_outputs",
            Self::Logprobs => "logprobs",
            Self::TopLogprobs => "top_logprobs",
            Self::LogitBias => "logit_bias",
            Self::Verbosity => "verbosity",
            Self::Truncate => "truncate",
            Self::Extension(name) => name,
        }
    }

    /// Parameters resolved by dedicated rules rather than the generic scan.
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Functions | Self::FunctionCall)
    }

    /// Parameters that never appear as a body key but are inferred from others.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::JsonMode)
    }

    pub fn is_extension(&self) -> bool {
        matches!(self, Self::Extension(_))
    }
}

impl From<&str> for StandardParameter {
    fn from(s: &str) -> Self {
        Self::KNOWN
            .iter()
            .find(|p| p.as_str() == s)
            .cloned()
            .unwrap_or_else(|| Self::Extension(s.to_string()))
    }
}

impl FromStr for StandardParameter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for StandardParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for StandardParameter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StandardParameter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from(name.as_str()))
    }
}
