//! Template classifier
//!
//! Reads the `(optional[, default = X])` annotation embedded in each
//! specification string and decides the field's class. Pure: no I/O and no
//! failure modes; anything unrecognised degrades to "required" or to a
//! string default.

use bioflow_domain::{Classification, FieldClass, Template};
use regex::Regex;
use serde_json::{Number, Value};
use std::sync::LazyLock;
use tracing::debug;

static OPTIONAL_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*optional(?:\s*,\s*default\s*=\s*([^)]+))?\s*\)")
        .expect("optional annotation pattern is valid")
});

/// Typed default parsers, tried in order; the first success wins
const DEFAULT_PARSERS: [fn(&str) -> Option<Value>; 3] =
    [parse_boolean, parse_decimal, parse_integer];

/// Classify every field of a template
///
/// # Examples
///
/// ```
/// use bioflow_compose::classify;
/// use bioflow_domain::Template;
/// use serde_json::json;
///
/// let template = Template::from_specs([
///     ("sample_id", "String"),
///     ("threads", "Int (optional, default = 4)"),
///     ("extra_flag", "Boolean (optional)"),
/// ]);
/// let classification = classify(&template);
///
/// assert!(classification.required.contains("sample_id"));
/// assert_eq!(classification.defaulted["threads"], json!(4));
/// assert!(classification.optional.contains("extra_flag"));
/// ```
pub fn classify(template: &Template) -> Classification {
    let mut classification = Classification::default();
    for (name, spec) in template {
        let class = parse_spec(spec);
        debug!(field = name, class = class.as_str(), "Classified template field");
        classification.insert(name, class);
    }
    classification
}

/// Classify a single specification string
pub fn parse_spec(spec: &str) -> FieldClass {
    match OPTIONAL_ANNOTATION.captures(spec) {
        None => FieldClass::Required,
        Some(captures) => match captures.get(1) {
            None => FieldClass::OptionalWithoutDefault,
            Some(raw) => FieldClass::OptionalWithDefault(parse_default(raw.as_str())),
        },
    }
}

/// Parse a default literal: boolean, then decimal, then integer, else string
///
/// Surrounding whitespace and quotes are stripped first.
pub fn parse_default(raw: &str) -> Value {
    let literal = unquote(raw);
    DEFAULT_PARSERS
        .iter()
        .find_map(|parser| parser(literal))
        .unwrap_or_else(|| Value::String(literal.to_string()))
}

fn unquote(raw: &str) -> &str {
    raw.trim().trim_matches(|c| c == '"' || c == '\'').trim()
}

fn parse_boolean(literal: &str) -> Option<Value> {
    if literal.eq_ignore_ascii_case("true") {
        Some(Value::Bool(true))
    } else if literal.eq_ignore_ascii_case("false") {
        Some(Value::Bool(false))
    } else {
        None
    }
}

// Only literals containing a dot are decimals; NaN and infinities have no
// JSON form and fall through to the string parser.
fn parse_decimal(literal: &str) -> Option<Value> {
    if !literal.contains('.') {
        return None;
    }
    let value: f64 = literal.parse().ok()?;
    Number::from_f64(value).map(Value::Number)
}

fn parse_integer(literal: &str) -> Option<Value> {
    if literal.contains('.') {
        return None;
    }
    literal.parse::<i64>().ok().map(Value::from)
}
