//! Model value object representing a language model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Language models the agent can be driven by (Value Object)
///
/// Well-known identifiers get their own variant so backends can infer a
/// provider family; anything else is carried through as [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // GPT models
    Gpt4Turbo,
    Gpt4o,
    Gpt4oMini,
    Gpt41,
    // Gemini models
    Gemini15Pro,
    Gemini15Flash,
    Gemini20Flash,
    Gemini10Pro,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Gpt4Turbo => "gpt-4-turbo",
            Model::Gpt4o => "gpt-4o",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gpt41 => "gpt-4.1",
            Model::Gemini15Pro => "gemini-1.5-pro",
            Model::Gemini15Flash => "gemini-1.5-flash",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::Gemini10Pro => "gemini-1.0-pro",
            Model::Custom(s) => s,
        }
    }

    /// Default model for OpenAI-compatible backends
    pub fn default_openai() -> Self {
        Model::Gpt4Turbo
    }

    /// Default model for Gemini / Vertex AI backends
    pub fn default_gemini() -> Self {
        Model::Gemini15Pro
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::default_openai()
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "gpt-4-turbo" => Model::Gpt4Turbo,
            "gpt-4o" => Model::Gpt4o,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gpt-4.1" => Model::Gpt41,
            "gemini-1.5-pro" => Model::Gemini15Pro,
            "gemini-1.5-flash" => Model::Gemini15Flash,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "gemini-1.0-pro" => Model::Gemini10Pro,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_roundtrip() {
        for model in [Model::Gpt4Turbo, Model::Gpt4oMini, Model::Gemini15Pro] {
            let parsed = Model::from(model.to_string().as_str());
            assert_eq!(model, parsed);
        }
    }

    #[test]
    fn test_custom_model() {
        let model = Model::from("my-finetune-v2");
        assert_eq!(model, Model::Custom("my-finetune-v2".to_string()));
        assert_eq!(model.to_string(), "my-finetune-v2");
    }

    #[test]
    fn test_model_default() {
        assert_eq!(Model::default(), Model::Gpt4Turbo);
        assert_eq!(Model::default_gemini().as_str(), "gemini-1.5-pro");
    }

    #[test]
    fn test_model_serde_as_string() {
        let json = serde_json::to_string(&Model::Gpt4o).unwrap();
        assert_eq!(json, "\"gpt-4o\"");
        let back: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Model::Gpt4o);
    }
}
