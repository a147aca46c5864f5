use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

/// Query submitted by a caller and forwarded upstream as-is
///
/// Only `prompt` is interpreted by the gateway. Every other field
/// (`max_tokens`, `temperature`, ...) is kept in `parameters` and
/// serialized back next to the prompt.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    #[validate(length(min = 1), custom(function = "validate_prompt"))]
    pub prompt: String,
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl QueryRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            parameters: Map::new(),
        }
    }

    /// Attach a pass-through parameter
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }
}

fn validate_prompt(prompt: &str) -> Result<(), ValidationError> {
    if prompt.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Prompt cannot be empty".into());
        return Err(err);
    }
    Ok(())
}
