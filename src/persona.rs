// Persona: the shared system prompt and model options for every call.
//
// One immutable value is built at start-up and handed to both pipeline
// stages, so extraction and title generation speak with the same voice.

use serde::{Deserialize, Serialize};

/// Default system prompt: a technical writer who answers tersely.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert technical writer. \
Always give clear, concise, and straight-to-the-point answers.";

/// Default model name for OpenAI-compatible providers.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Model selection and sampling options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    pub model: String,
    pub temperature: f32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// A system prompt plus the options it is sent with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Persona {
    pub system_prompt: String,
    pub options: ModelOptions,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            options: ModelOptions::default(),
        }
    }
}

impl Persona {
    pub fn new(system_prompt: impl Into<String>, options: ModelOptions) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            options,
        }
    }

    /// Build a request for a single model call in this persona's voice.
    pub fn request(&self, user_prompt: impl Into<String>) -> ModelRequest {
        ModelRequest {
            system: self.system_prompt.clone(),
            user: user_prompt.into(),
            options: self.options.clone(),
        }
    }
}

/// Everything the Model Invoker needs to issue one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub system: String,
    pub user: String,
    pub options: ModelOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_persona_voice_and_options() {
        let persona = Persona::new(
            "Be brief.",
            ModelOptions {
                model: "local-llama".to_string(),
                temperature: 0.1,
            },
        );
        let req = persona.request("Extract topics");
        assert_eq!(req.system, "Be brief.");
        assert_eq!(req.user, "Extract topics");
        assert_eq!(req.options.model, "local-llama");
        assert!((req.options.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn default_persona_is_technical_writer() {
        let persona = Persona::default();
        assert!(persona.system_prompt.contains("technical writer"));
        assert_eq!(persona.options.model, DEFAULT_MODEL);
    }
}
