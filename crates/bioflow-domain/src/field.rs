//! Field classification derived from template annotations

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// How a template field must be treated when filling a sample
#[derive(Debug, Clone, PartialEq)]
pub enum FieldClass {
    /// No `(optional ...)` annotation: the sample must supply it
    Required,

    /// `(optional, default = X)`: the sample value wins, otherwise `X`
    OptionalWithDefault(Value),

    /// `(optional)`: written only when the sample supplies it
    OptionalWithoutDefault,
}

impl FieldClass {
    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldClass::Required => "required",
            FieldClass::OptionalWithDefault(_) => "optional_with_default",
            FieldClass::OptionalWithoutDefault => "optional_without_default",
        }
    }
}

/// A template split into its three field classes
///
/// Computed once per composition and shared by every sample of the batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Fields the sample must supply
    pub required: BTreeSet<String>,

    /// Optional fields and the default each one falls back to
    pub defaulted: BTreeMap<String, Value>,

    /// Optional fields without a default
    pub optional: BTreeSet<String>,
}

impl Classification {
    /// Record the class of one field
    pub fn insert(&mut self, name: impl Into<String>, class: FieldClass) {
        let name = name.into();
        match class {
            FieldClass::Required => {
                self.required.insert(name);
            }
            FieldClass::OptionalWithDefault(default) => {
                self.defaulted.insert(name, default);
            }
            FieldClass::OptionalWithoutDefault => {
                self.optional.insert(name);
            }
        }
    }
}
