//! Contract API schema.
//!
//! The schema is built once when a contract is loaded and then consulted on
//! every call: the dispatcher reads the func type of the target method from
//! it, and the type converter reads the declared parameter types.

use indexmap::IndexMap;
use score_core::{DeclaredType, ScoreError, ScoreResult, StructField, TypedValue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Whether a method may change state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuncType {
    Readonly,
    Writable,
}

/// A declared method parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub name: String,
    pub param_type: DeclaredType,
    /// Optional parameters may be omitted by the caller.
    pub optional: bool,
    /// Value supplied when an optional parameter is omitted.
    pub default: Option<TypedValue>,
}

impl ParamDescriptor {
    fn to_json(&self) -> Value {
        let mut value = json!({
            "name": self.name,
            "type": self.param_type.to_string(),
        });
        if self.optional {
            value["default"] = self
                .default
                .as_ref()
                .map(TypedValue::to_json)
                .unwrap_or(Value::Null);
        }
        if let Some(fields) = self.param_type.fields() {
            value["fields"] = fields_to_json(fields);
        }
        value
    }
}

fn fields_to_json(fields: &[StructField]) -> Value {
    Value::Array(
        fields
            .iter()
            .map(|field| {
                let mut value = json!({
                    "name": field.name,
                    "type": field.field_type.to_string(),
                });
                if let Some(nested) = field.field_type.fields() {
                    value["fields"] = fields_to_json(nested);
                }
                value
            })
            .collect(),
    )
}

/// A callable method of a contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: String,
    pub inputs: Vec<ParamDescriptor>,
    pub outputs: Vec<DeclaredType>,
    pub readonly: bool,
    pub payable: bool,
}

impl FunctionDescriptor {
    /// Creates a state-changing method.
    pub fn writable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            readonly: false,
            payable: false,
        }
    }

    /// Creates a read-only method.
    pub fn readonly(name: impl Into<String>) -> Self {
        Self {
            readonly: true,
            ..Self::writable(name)
        }
    }

    /// Adds a required parameter.
    pub fn param(mut self, name: impl Into<String>, param_type: DeclaredType) -> Self {
        self.inputs.push(ParamDescriptor {
            name: name.into(),
            param_type,
            optional: false,
            default: None,
        });
        self
    }

    /// Adds an optional parameter.
    pub fn optional_param(
        mut self,
        name: impl Into<String>,
        param_type: DeclaredType,
        default: Option<TypedValue>,
    ) -> Self {
        self.inputs.push(ParamDescriptor {
            name: name.into(),
            param_type,
            optional: true,
            default,
        });
        self
    }

    /// Adds an output type.
    pub fn returns(mut self, output: DeclaredType) -> Self {
        self.outputs.push(output);
        self
    }

    /// Marks the method as accepting value transfer.
    pub fn payable(mut self) -> Self {
        self.payable = true;
        self
    }

    /// Gets the func type.
    pub fn func_type(&self) -> FuncType {
        if self.readonly {
            FuncType::Readonly
        } else {
            FuncType::Writable
        }
    }

    /// Finds a parameter by name.
    pub fn input(&self, name: &str) -> Option<&ParamDescriptor> {
        self.inputs.iter().find(|p| p.name == name)
    }

    fn validate(&self) -> ScoreResult<()> {
        if self.name.is_empty() {
            return Err(ScoreError::internal("Function name cannot be empty"));
        }
        let mut seen = HashSet::new();
        for input in &self.inputs {
            if !seen.insert(input.name.as_str()) {
                return Err(ScoreError::internal(format!(
                    "Duplicate parameter {} in {}",
                    input.name, self.name
                )));
            }
            if input.default.is_some() && !input.optional {
                return Err(ScoreError::internal(format!(
                    "Required parameter {} in {} has a default",
                    input.name, self.name
                )));
            }
        }
        Ok(())
    }

    fn to_json(&self) -> Value {
        json!({
            "type": "function",
            "name": self.name,
            "inputs": self.inputs.iter().map(ParamDescriptor::to_json).collect::<Vec<_>>(),
            "outputs": self
                .outputs
                .iter()
                .map(|o| json!({ "type": o.to_string() }))
                .collect::<Vec<_>>(),
            "readonly": if self.readonly { "0x1" } else { "0x0" },
            "payable": if self.payable { "0x1" } else { "0x0" },
        })
    }
}

/// An event-log parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: DeclaredType,
    pub indexed: bool,
}

/// An event log a contract may emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLogDescriptor {
    pub name: String,
    pub inputs: Vec<EventParam>,
}

impl EventLogDescriptor {
    /// Creates an event declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
        }
    }

    /// Adds a parameter.
    pub fn param(mut self, name: impl Into<String>, param_type: DeclaredType, indexed: bool) -> Self {
        self.inputs.push(EventParam {
            name: name.into(),
            param_type,
            indexed,
        });
        self
    }

    /// Number of indexed parameters.
    pub fn indexed_count(&self) -> usize {
        self.inputs.iter().filter(|p| p.indexed).count()
    }

    /// Gets the event signature, e.g. `Transfer(Address,Address,int)`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self.inputs.iter().map(|p| p.param_type.to_string()).collect();
        format!("{}({})", self.name, types.join(","))
    }
}

/// The method surface of a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreApi {
    functions: IndexMap<String, FunctionDescriptor>,
    events: Vec<EventLogDescriptor>,
}

impl ScoreApi {
    /// Creates an empty API.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a function.
    pub fn with_function(mut self, function: FunctionDescriptor) -> Self {
        self.functions.insert(function.name.clone(), function);
        self
    }

    /// Adds an event log declaration.
    pub fn with_event(mut self, event: EventLogDescriptor) -> Self {
        self.events.push(event);
        self
    }

    /// Finds a function by name.
    pub fn function(&self, name: &str) -> Option<&FunctionDescriptor> {
        self.functions.get(name)
    }

    /// Iterates over the functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDescriptor> {
        self.functions.values()
    }

    /// Gets the event declarations.
    pub fn events(&self) -> &[EventLogDescriptor] {
        &self.events
    }

    /// Finds an event declaration by name.
    pub fn event(&self, name: &str) -> Option<&EventLogDescriptor> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Validates the API.
    pub fn validate(&self) -> ScoreResult<()> {
        for function in self.functions.values() {
            function.validate()?;
        }
        let mut seen = HashSet::new();
        for event in &self.events {
            if !seen.insert(event.name.as_str()) {
                return Err(ScoreError::internal(format!(
                    "Duplicate event {}",
                    event.name
                )));
            }
        }
        Ok(())
    }

    /// Converts the API to its JSON descriptor list.
    pub fn to_json(&self) -> Value {
        let mut entries: Vec<Value> = self.functions.values().map(FunctionDescriptor::to_json).collect();
        entries.extend(self.events.iter().map(|event| {
            json!({
                "type": "eventlog",
                "name": event.name,
                "inputs": event
                    .inputs
                    .iter()
                    .map(|p| json!({
                        "name": p.name,
                        "type": p.param_type.to_string(),
                        "indexed": if p.indexed { "0x1" } else { "0x0" },
                    }))
                    .collect::<Vec<_>>(),
            })
        }));
        Value::Array(entries)
    }
}
