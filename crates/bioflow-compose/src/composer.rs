//! Input composer: classify once, fill every sample, aggregate errors

use crate::classifier::classify;
use crate::error::{ComposeError, Result};
use crate::filler::fill;
use bioflow_domain::{FieldError, Sample, Template};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Outcome of composing a batch of samples
///
/// `filled` always has the same length and order as the input batch;
/// `errors[i]` holds the soft errors of sample `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    /// Filled samples, in input order
    pub filled: Vec<Sample>,

    /// Soft errors per sample, in input order
    pub errors: Vec<Vec<FieldError>>,
}

impl Composition {
    /// Whether no sample produced an error
    pub fn is_success(&self) -> bool {
        self.errors.iter().all(Vec::is_empty)
    }

    /// Total number of soft errors across the batch
    pub fn error_count(&self) -> usize {
        self.errors.iter().map(Vec::len).sum()
    }

    /// Combined error text; empty means every sample was filled cleanly
    ///
    /// Each failing sample contributes a `sample #N:` header (1-based)
    /// followed by one error per line. Blocks are separated by a blank line.
    pub fn error_text(&self) -> String {
        self.errors
            .iter()
            .enumerate()
            .filter(|(_, errors)| !errors.is_empty())
            .map(|(index, errors)| {
                let lines: Vec<String> = errors.iter().map(ToString::to_string).collect();
                format!("sample #{}:\n{}", index + 1, lines.join("\n"))
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Filled samples as a JSON array
    pub fn to_json(&self) -> Value {
        Value::Array(self.filled.iter().cloned().map(Value::Object).collect())
    }
}

/// Compose a batch of samples against a template
pub fn compose(template: &Template, samples: &[Sample]) -> Composition {
    let classification = classify(template);
    debug!(
        required = classification.required.len(),
        defaulted = classification.defaulted.len(),
        optional = classification.optional.len(),
        "Classified template"
    );

    let mut composition = Composition {
        filled: Vec::with_capacity(samples.len()),
        errors: Vec::with_capacity(samples.len()),
    };
    for sample in samples {
        let (filled, errors) = fill(sample, &classification, template);
        composition.filled.push(filled);
        composition.errors.push(errors);
    }
    composition
}

/// Read a template file: a JSON object of field name to specification
///
/// Non-string specifications are kept in their JSON text form, so they
/// classify as required unless that text carries an annotation.
pub fn load_template(path: &Path) -> Result<Template> {
    let raw = fs::read_to_string(path).map_err(|source| ComposeError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw).map_err(|e| ComposeError::InvalidTemplate {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let Value::Object(fields) = value else {
        return Err(ComposeError::InvalidTemplate {
            path: path.to_path_buf(),
            reason: "expected a JSON object of field specifications".to_string(),
        });
    };

    Ok(Template::from_specs(fields.into_iter().map(|(name, spec)| {
        let spec = match spec {
            Value::String(s) => s,
            other => other.to_string(),
        };
        (name, spec)
    })))
}

/// Read the template at `path` and compose the batch against it
pub fn compose_from_path(path: &Path, samples: &[Sample]) -> Result<Composition> {
    let template = load_template(path)?;
    let composition = compose(&template, samples);
    info!(
        template = %path.display(),
        samples = samples.len(),
        errors = composition.error_count(),
        "Composed workflow inputs"
    );
    Ok(composition)
}

/// Write filled samples as a pretty-printed JSON array, creating parent directories
pub fn write_filled(path: &Path, composition: &Composition) -> Result<()> {
    let output_error = |source| ComposeError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(output_error)?;
    }
    let body = serde_json::to_string_pretty(&composition.to_json())?;
    fs::write(path, body).map_err(output_error)?;
    Ok(())
}
