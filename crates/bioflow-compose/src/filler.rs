//! Sample filler

use bioflow_domain::{Classification, FieldError, Sample, Template};

/// Fill one sample according to the template's field classes
///
/// Rules are applied independently and errors accumulate:
///
/// - required fields are copied when present, otherwise reported missing
/// - defaulted fields always appear, taking the sample value over the default
/// - optional fields without a default appear only when supplied
/// - keys the template does not declare produce a single combined error
///
/// The filled map is returned even when errors were found.
pub fn fill(
    sample: &Sample,
    classification: &Classification,
    template: &Template,
) -> (Sample, Vec<FieldError>) {
    let mut filled = Sample::new();
    let mut errors = Vec::new();

    for name in &classification.required {
        match sample.get(name) {
            Some(value) => {
                filled.insert(name.clone(), value.clone());
            }
            None => errors.push(FieldError::MissingRequired(name.clone())),
        }
    }

    for (name, default) in &classification.defaulted {
        let value = sample.get(name).unwrap_or(default);
        filled.insert(name.clone(), value.clone());
    }

    for name in &classification.optional {
        if let Some(value) = sample.get(name) {
            filled.insert(name.clone(), value.clone());
        }
    }

    let mut extra: Vec<String> = sample
        .keys()
        .filter(|key| !template.contains(key))
        .cloned()
        .collect();
    if !extra.is_empty() {
        extra.sort();
        errors.push(FieldError::ExtraFields(extra));
    }

    (filled, errors)
}
