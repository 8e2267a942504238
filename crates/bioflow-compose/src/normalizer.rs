//! Sample count normalization

use crate::error::{ComposeError, Result};
use bioflow_domain::{Sample, SampleParams};
use serde_json::Value;
use std::iter;

/// Reconcile the claimed sample count with the supplied params
///
/// A single mapping, or a one-element list, is replicated to the claimed
/// count. A list of exactly the claimed length is used as-is. Any other
/// length is a `CountMismatch`.
///
/// # Examples
///
/// ```
/// use bioflow_compose::normalize;
/// use bioflow_domain::SampleParams;
/// use serde_json::{json, Map};
///
/// let mut sample = Map::new();
/// sample.insert("sample_id".to_string(), json!("S1"));
///
/// let samples = normalize(3, SampleParams::Single(sample.clone())).unwrap();
/// assert_eq!(samples.len(), 3);
/// assert!(samples.iter().all(|s| *s == sample));
///
/// assert!(normalize(3, SampleParams::List(vec![sample.clone(), sample])).is_err());
/// ```
pub fn normalize(sample_count: usize, params: SampleParams) -> Result<Vec<Sample>> {
    if sample_count == 0 {
        return Err(ComposeError::InvalidSampleCount(sample_count));
    }

    match params {
        SampleParams::Single(sample) => Ok(replicate(sample, sample_count)),
        SampleParams::List(samples) if samples.len() == sample_count => Ok(samples),
        SampleParams::List(mut samples) if samples.len() == 1 => {
            let sample = samples.remove(0);
            Ok(replicate(sample, sample_count))
        }
        SampleParams::List(samples) => Err(ComposeError::CountMismatch {
            expected: sample_count,
            found: samples.len(),
        }),
    }
}

/// Decide the params shape of a raw JSON value, then normalize it
pub fn normalize_value(sample_count: usize, params: Value) -> Result<Vec<Sample>> {
    let params = SampleParams::from_value(params)?;
    normalize(sample_count, params)
}

fn replicate(sample: Sample, count: usize) -> Vec<Sample> {
    iter::repeat_n(sample, count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(id: &str) -> Sample {
        let mut sample = Sample::new();
        sample.insert("sample_id".to_string(), json!(id));
        sample
    }

    #[test]
    fn test_single_mapping_with_count_one() {
        let samples = normalize(1, SampleParams::Single(sample("S1"))).unwrap();
        assert_eq!(samples, vec![sample("S1")]);
    }

    #[test]
    fn test_full_list_kept_in_order() {
        let list = vec![sample("S1"), sample("S2"), sample("S3")];
        let samples = normalize(3, SampleParams::List(list.clone())).unwrap();
        assert_eq!(samples, list);
    }

    #[test]
    fn test_mismatch_names_both_counts() {
        let err = normalize(3, SampleParams::List(vec![sample("S1"), sample("S2")])).unwrap_err();
        assert!(matches!(err, ComposeError::CountMismatch { expected: 3, found: 2 }));
        let message = err.to_string();
        assert!(message.contains("sample_count=3"));
        assert!(message.contains("2 entries"));
    }

    #[test]
    fn test_empty_list_is_mismatch() {
        let err = normalize(2, SampleParams::List(Vec::new())).unwrap_err();
        assert!(matches!(err, ComposeError::CountMismatch { expected: 2, found: 0 }));
    }

    #[test]
    fn test_zero_count_rejected() {
        let err = normalize(0, SampleParams::Single(sample("S1"))).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidSampleCount(0)));
    }

    #[test]
    fn test_invalid_shape_from_value() {
        let err = normalize_value(2, json!("S1")).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidParamsType(_)));

        let err = normalize_value(2, json!([{"a": 1}, [1, 2]])).unwrap_err();
        assert!(err.to_string().contains("params[1]"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn sample_strategy() -> impl Strategy<Value = Sample> {
        proptest::collection::btree_map("[a-z_]{1,8}", "[A-Za-z0-9]{0,8}", 0..5).prop_map(|m| {
            m.into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect()
        })
    }

    proptest! {
        /// Property: a single mapping is replicated to exactly N copies
        #[test]
        fn test_single_replicated(n in 1usize..20, s in sample_strategy()) {
            let samples = normalize(n, SampleParams::Single(s.clone())).unwrap();
            prop_assert_eq!(samples.len(), n);
            prop_assert!(samples.iter().all(|x| *x == s));
        }

        /// Property: a one-element list behaves like a single mapping
        #[test]
        fn test_one_element_list_like_single(n in 1usize..20, s in sample_strategy()) {
            let from_list = normalize(n, SampleParams::List(vec![s.clone()])).unwrap();
            let from_single = normalize(n, SampleParams::Single(s)).unwrap();
            prop_assert_eq!(from_list, from_single);
        }

        /// Property: other lengths are rejected
        #[test]
        fn test_other_lengths_rejected(n in 1usize..10, m in 0usize..10, s in sample_strategy()) {
            prop_assume!(m != 1 && m != n);
            let result = normalize(n, SampleParams::List(vec![s; m]));
            let is_mismatch = matches!(result, Err(ComposeError::CountMismatch { .. }));
            prop_assert!(is_mismatch);
        }
    }
}
