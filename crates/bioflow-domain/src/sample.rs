//! Samples - caller-supplied workflow input values

use serde_json::{Map, Value};
use std::fmt;

/// One set of workflow input values, keyed by template field name
pub type Sample = Map<String, Value>;

/// Sample parameters as supplied by the caller
///
/// The shape is decided once, at the boundary, and never re-inspected
/// downstream: either a lone sample or an explicit list of samples.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleParams {
    /// A single mapping, replicated to the claimed sample count
    Single(Sample),

    /// A list of mappings, one per sample
    List(Vec<Sample>),
}

impl SampleParams {
    /// Decide the shape of a raw JSON value
    ///
    /// # Examples
    ///
    /// ```
    /// use bioflow_domain::SampleParams;
    /// use serde_json::json;
    ///
    /// let single = SampleParams::from_value(json!({"sample_id": "S1"})).unwrap();
    /// assert!(matches!(single, SampleParams::Single(_)));
    ///
    /// let list = SampleParams::from_value(json!([{"sample_id": "S1"}, {"sample_id": "S2"}])).unwrap();
    /// assert_eq!(list.len(), 2);
    ///
    /// assert!(SampleParams::from_value(json!("S1")).is_err());
    /// ```
    pub fn from_value(value: Value) -> Result<Self, ParamsShapeError> {
        match value {
            Value::Object(sample) => Ok(SampleParams::Single(sample)),
            Value::Array(items) => {
                let mut samples = Vec::with_capacity(items.len());
                for (position, item) in items.into_iter().enumerate() {
                    match item {
                        Value::Object(sample) => samples.push(sample),
                        other => {
                            return Err(ParamsShapeError {
                                position: Some(position),
                                found: json_kind(&other),
                            })
                        }
                    }
                }
                Ok(SampleParams::List(samples))
            }
            other => Err(ParamsShapeError {
                position: None,
                found: json_kind(&other),
            }),
        }
    }
}

/// Raw params were neither an object nor an array of objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamsShapeError {
    /// Offending list position, when the outer value was an array
    pub position: Option<usize>,

    /// JSON kind that was found instead of an object
    pub found: &'static str,
}

impl fmt::Display for ParamsShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(
                f,
                "params[{}] must be an object, found {}",
                position, self.found
            ),
            None => write!(
                f,
                "params must be an object or a list of objects, found {}",
                self.found
            ),
        }
    }
}

impl std::error::Error for ParamsShapeError {}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Soft error found while filling one sample
///
/// These never abort a batch; they are collected per sample and reported
/// alongside the (partial) filled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// A required field is absent from the sample
    MissingRequired(String),

    /// The sample carries keys the template does not declare (sorted)
    ExtraFields(Vec<String>),
}

impl FieldError {
    /// Field names this error is about
    pub fn fields(&self) -> Vec<&str> {
        match self {
            FieldError::MissingRequired(field) => vec![field.as_str()],
            FieldError::ExtraFields(fields) => fields.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::MissingRequired(field) => write!(f, "missing required field {}", field),
            FieldError::ExtraFields(fields) => {
                write!(f, "fields not declared in template: {}", fields.join(", "))
            }
        }
    }
}
