//! Capability domain entities

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};

/// JSON-Schema-ish type of a capability parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Object => "object",
        }
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameter specification for a capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityParameter {
    /// Parameter name as the model must spell it (e.g. "txHash")
    pub name: String,
    /// Description shown to the model
    pub description: String,
    /// Whether the validator requires this parameter
    pub required: bool,
    pub param_type: ParameterType,
    /// Allowed values, if the parameter is an enumeration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl CapabilityParameter {
    /// New string parameter; use the builder methods to refine it.
    pub fn new(name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required,
            param_type: ParameterType::String,
            enum_values: None,
            minimum: None,
            maximum: None,
            default: None,
        }
    }

    pub fn with_type(mut self, param_type: ParameterType) -> Self {
        self.param_type = param_type;
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_bounds(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Provider-neutral JSON Schema fragment for this parameter.
    pub fn to_json_schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".to_string(), json!(self.param_type.as_str()));
        prop.insert("description".to_string(), json!(self.description));
        if let Some(values) = &self.enum_values {
            prop.insert("enum".to_string(), json!(values));
        }
        if let Some(min) = self.minimum {
            prop.insert("minimum".to_string(), json!(min));
        }
        if let Some(max) = self.maximum {
            prop.insert("maximum".to_string(), json!(max));
        }
        if let Some(default) = &self.default {
            prop.insert("default".to_string(), default.clone());
        }
        Value::Object(prop)
    }
}

/// A named, schema-described operation the agent can invoke.
///
/// The parameter list is the single source of truth for both the schema sent
/// to the model and the validation performed before execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilitySpec {
    /// Unique name (e.g. "getBalance")
    pub name: String,
    /// Description shown to the model
    pub description: String,
    pub parameters: Vec<CapabilityParameter>,
}

impl CapabilitySpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, param: CapabilityParameter) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&CapabilityParameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the parameters the validator insists on, in declaration order.
    pub fn required_parameters(&self) -> impl Iterator<Item = &str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
    }

    /// Provider-neutral JSON Schema of the whole parameter object.
    ///
    /// ```
    /// use chain_agent_domain::capability::{CapabilityParameter, CapabilitySpec};
    ///
    /// let spec = CapabilitySpec::new("getBalance", "Get a balance")
    ///     .with_parameter(CapabilityParameter::new("address", "Wallet address", true));
    /// let schema = spec.parameters_schema();
    /// assert_eq!(schema["type"], "object");
    /// assert_eq!(schema["required"][0], "address");
    /// ```
    pub fn parameters_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.to_json_schema()))
            .collect();
        let required: Vec<&str> = self.required_parameters().collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    fn check_unique_parameters(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(DomainError::DuplicateParameter {
                    capability: self.name.clone(),
                    parameter: param.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Read-only catalogue of capabilities, in registration order.
///
/// Built once at startup through [`CapabilityRegistryBuilder`] and shared
/// process-wide; there is no way to mutate a built registry.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    specs: Vec<CapabilitySpec>,
    index: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::default()
    }

    /// All capabilities in registration order.
    pub fn list(&self) -> &[CapabilitySpec] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&CapabilitySpec> {
        self.index.get(name).map(|&i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.iter().map(|s| s.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Builder for [`CapabilityRegistry`]; rejects duplicate names on `build`.
#[derive(Debug, Default)]
pub struct CapabilityRegistryBuilder {
    specs: Vec<CapabilitySpec>,
}

impl CapabilityRegistryBuilder {
    pub fn register(mut self, spec: CapabilitySpec) -> Self {
        self.specs.push(spec);
        self
    }

    pub fn build(self) -> Result<CapabilityRegistry, DomainError> {
        let mut index = HashMap::with_capacity(self.specs.len());
        for (i, spec) in self.specs.iter().enumerate() {
            spec.check_unique_parameters()?;
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(DomainError::DuplicateCapability(spec.name.clone()));
            }
        }
        Ok(CapabilityRegistry {
            specs: self.specs,
            index,
        })
    }
}
