//! Compose tool - Fill a workflow input template for a batch of samples

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use bioflow_compose::{compose_from_path, normalize_value, write_filled};
use bioflow_domain::FieldError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{info, warn};

/// Parameters for input composition
#[derive(Debug, Deserialize)]
pub struct ComposeParams {
    /// Template JSON path
    pub template_json: PathBuf,
    /// Where the filled inputs are written
    pub output_json: PathBuf,
    /// Number of samples the caller claims to provide
    pub sample_count: usize,
    /// One sample object or a list of them
    pub params: Value,
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "compose_input_json".to_string(),
        description: "Fill a workflow input template with sample values, applying template defaults. \
            Writes the filled samples to output_json only when every sample is valid; otherwise \
            returns the per-sample errors."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "template_json": {"type": "string", "description": "Path of the input template JSON"},
                "output_json": {"type": "string", "description": "Path of the inputs JSON to write"},
                "sample_count": {"type": "integer", "minimum": 1, "description": "Number of samples"},
                "params": {
                    "description": "Sample values: one object shared by every sample, or one object per sample",
                    "oneOf": [
                        {"type": "object"},
                        {"type": "array", "items": {"type": "object"}}
                    ]
                }
            },
            "required": ["template_json", "output_json", "sample_count", "params"]
        }),
    }
}

/// Handle compose_input_json tool invocation
///
/// Count and shape problems are hard errors. Missing or undeclared fields
/// are reported in an error result and nothing is written.
pub fn handle_compose(params: ComposeParams) -> Result<ToolCallResult, McpError> {
    let samples = normalize_value(params.sample_count, params.params)?;
    let composition = compose_from_path(&params.template_json, &samples)?;

    if !composition.is_success() {
        warn!(
            template = %params.template_json.display(),
            errors = composition.error_count(),
            "Composition produced field errors"
        );
        let text = composition.error_text();
        let samples = sample_errors(&composition.errors);
        return Ok(ToolCallResult::text(
            text.clone(),
            Some(json!({"errors": text, "samples": samples})),
            true,
        ));
    }

    write_filled(&params.output_json, &composition)?;
    info!(
        output = %params.output_json.display(),
        samples = composition.filled.len(),
        "Wrote workflow inputs"
    );

    Ok(ToolCallResult::text(
        format!(
            "Wrote {} sample(s) to {}",
            composition.filled.len(),
            params.output_json.display()
        ),
        Some(json!({
            "output_json": params.output_json,
            "sample_count": composition.filled.len(),
            "errors": ""
        })),
        false,
    ))
}

/// Per-sample error listing, numbered from 1 like the error text
fn sample_errors(errors: &[Vec<FieldError>]) -> Vec<Value> {
    errors
        .iter()
        .enumerate()
        .filter(|(_, errors)| !errors.is_empty())
        .map(|(index, errors)| {
            let details: Vec<Value> = errors
                .iter()
                .map(|e| json!({"message": e.to_string(), "fields": e.fields()}))
                .collect();
            json!({"sample": index + 1, "errors": details})
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_params_deserialize() {
        let params: ComposeParams = serde_json::from_value(json!({
            "template_json": "/tmp/template.json",
            "output_json": "/tmp/inputs.json",
            "sample_count": 2,
            "params": [{"sample_id": "S1"}, {"sample_id": "S2"}]
        }))
        .unwrap();
        assert_eq!(params.sample_count, 2);
        assert!(params.params.is_array());
    }

    #[test]
    fn test_sample_errors_skip_clean_samples() {
        let errors = vec![
            Vec::new(),
            vec![
                FieldError::MissingRequired("sample_id".to_string()),
                FieldError::ExtraFields(vec!["bogus".to_string(), "junk".to_string()]),
            ],
        ];
        let listing = sample_errors(&errors);

        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0]["sample"], 2);
        assert_eq!(listing[0]["errors"][0]["fields"], json!(["sample_id"]));
        assert_eq!(listing[0]["errors"][1]["fields"], json!(["bogus", "junk"]));
    }

    #[test]
    fn test_negative_count_rejected() {
        let result: Result<ComposeParams, _> = serde_json::from_value(json!({
            "template_json": "t.json",
            "output_json": "o.json",
            "sample_count": -1,
            "params": {}
        }));
        assert!(result.is_err());
    }
}
