//! Parameter contracts for tools.
//!
//! A [`ParamSchema`] is an ordered list of tagged field descriptors. The same
//! descriptor drives both input validation and the JSON-schema-shaped
//! description advertised in the handshake, so the two can never disagree.

use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use std::fmt;

/// Shape and bounds of a single parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Length bounds are counted in characters, not bytes.
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
}

impl ParamKind {
    pub fn string() -> Self {
        ParamKind::String {
            min_length: None,
            max_length: None,
        }
    }

    pub fn string_length(min: usize, max: usize) -> Self {
        ParamKind::String {
            min_length: Some(min),
            max_length: Some(max),
        }
    }

    pub fn non_empty_string() -> Self {
        ParamKind::String {
            min_length: Some(1),
            max_length: None,
        }
    }

    pub fn integer_range(min: i64, max: i64) -> Self {
        ParamKind::Integer {
            minimum: Some(min),
            maximum: Some(max),
        }
    }

    pub fn number_range(min: f64, max: f64) -> Self {
        ParamKind::Number {
            minimum: Some(min),
            maximum: Some(max),
        }
    }

    fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String { .. } => "string",
            ParamKind::Integer { .. } => "integer",
            ParamKind::Number { .. } => "number",
        }
    }
}

/// Whether a parameter must be supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    Required,
    Optional,
    /// Filled in with the given value when the caller omits the field.
    Default(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamField {
    pub name: String,
    pub description: String,
    pub kind: ParamKind,
    pub presence: Presence,
}

impl ParamField {
    pub fn new(name: &str, description: &str, kind: ParamKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            presence: Presence::Required,
        }
    }

    pub fn optional(mut self) -> Self {
        self.presence = Presence::Optional;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.presence = Presence::Default(value.into());
        self
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }

    fn check(&self, value: &Value) -> Result<Value, String> {
        match &self.kind {
            ParamKind::String {
                min_length,
                max_length,
            } => {
                let text = value.as_str().ok_or_else(|| "expected a string".to_string())?;
                let len = text.chars().count();
                match (min_length, max_length) {
                    (Some(min), Some(max)) if min == max && len != *min => {
                        Err(format!("must be exactly {} characters (got {})", min, len))
                    }
                    (Some(min), _) if len < *min => {
                        Err(format!("must be at least {} characters (got {})", min, len))
                    }
                    (_, Some(max)) if len > *max => {
                        Err(format!("must be at most {} characters (got {})", max, len))
                    }
                    _ => Ok(value.clone()),
                }
            }
            ParamKind::Integer { minimum, maximum } => {
                let number = as_integer(value).ok_or_else(|| "expected an integer".to_string())?;
                check_range(number, *minimum, *maximum)?;
                Ok(Value::from(number))
            }
            ParamKind::Number { minimum, maximum } => {
                let number = value
                    .as_f64()
                    .ok_or_else(|| "expected a number".to_string())?;
                check_range(number, *minimum, *maximum)?;
                Ok(value.clone())
            }
        }
    }

    fn describe(&self) -> Value {
        let mut property = Map::new();
        property.insert("type".to_string(), json!(self.kind.json_type()));
        property.insert("description".to_string(), json!(self.description));
        match &self.kind {
            ParamKind::String {
                min_length,
                max_length,
            } => {
                if let Some(min) = min_length {
                    property.insert("minLength".to_string(), json!(min));
                }
                if let Some(max) = max_length {
                    property.insert("maxLength".to_string(), json!(max));
                }
            }
            ParamKind::Integer { minimum, maximum } => {
                if let Some(min) = minimum {
                    property.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = maximum {
                    property.insert("maximum".to_string(), json!(max));
                }
            }
            ParamKind::Number { minimum, maximum } => {
                if let Some(min) = minimum {
                    property.insert("minimum".to_string(), json!(min));
                }
                if let Some(max) = maximum {
                    property.insert("maximum".to_string(), json!(max));
                }
            }
        }
        if let Presence::Default(default) = &self.presence {
            property.insert("default".to_string(), default.clone());
        }
        Value::Object(property)
    }
}

// Accepts integral floats such as `10.0`, which some JSON encoders emit.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(number) = value.as_i64() {
        return Some(number);
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
        .map(|f| f as i64)
}

fn check_range<T>(value: T, minimum: Option<T>, maximum: Option<T>) -> Result<(), String>
where
    T: PartialOrd + fmt::Display + Copy,
{
    let below = minimum.map_or(false, |min| value < min);
    let above = maximum.map_or(false, |max| value > max);
    if !below && !above {
        return Ok(());
    }
    match (minimum, maximum) {
        (Some(min), Some(max)) => Err(format!(
            "must be between {} and {} (got {})",
            min, max, value
        )),
        (Some(min), None) => Err(format!("must be at least {} (got {})", min, value)),
        (None, Some(max)) => Err(format!("must be at most {} (got {})", max, value)),
        (None, None) => Ok(()),
    }
}

/// One violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint a payload violated, in schema field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_violations(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

/// Parameters that passed validation, with defaults filled in and unknown
/// fields dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedParams(Map<String, Value>);

impl ValidatedParams {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Deserialize into the handler's typed argument struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.clone()))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamSchema {
    fields: Vec<ParamField>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: ParamField) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    /// Names of the fields the caller must supply.
    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_required())
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Validate a raw payload. All fields are checked; the error lists every
    /// violation rather than stopping at the first.
    pub fn validate(&self, raw: &Value) -> Result<ValidatedParams, ValidationErrors> {
        let empty = Map::new();
        let input = match raw {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(ValidationErrors(vec![Violation {
                    field: "parameters".to_string(),
                    message: "expected an object".to_string(),
                }]))
            }
        };

        let mut validated = Map::new();
        let mut violations = Vec::new();

        for field in &self.fields {
            match input.get(&field.name).filter(|v| !v.is_null()) {
                Some(value) => match field.check(value) {
                    Ok(value) => {
                        validated.insert(field.name.clone(), value);
                    }
                    Err(message) => violations.push(Violation {
                        field: field.name.clone(),
                        message,
                    }),
                },
                None => match &field.presence {
                    Presence::Required => violations.push(Violation {
                        field: field.name.clone(),
                        message: "is required".to_string(),
                    }),
                    Presence::Optional => {}
                    Presence::Default(default) => {
                        validated.insert(field.name.clone(), default.clone());
                    }
                },
            }
        }

        if violations.is_empty() {
            Ok(ValidatedParams(validated))
        } else {
            Err(ValidationErrors(violations))
        }
    }

    /// JSON-schema-shaped description used in capability advertisement.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.clone(), f.describe()))
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": self.required(),
        })
    }
}
