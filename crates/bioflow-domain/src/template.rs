//! Template module - a workflow's declared inputs

use std::collections::btree_map::{self, BTreeMap};

/// Mapping from workflow input name to its specification string
///
/// A specification string such as `"Int (optional, default = 4)"` carries the
/// WDL type and, optionally, an annotation marking the field optional and
/// giving its default. Field names are unique; the template is never mutated
/// after it has been read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    fields: BTreeMap<String, String>,
}

impl Template {
    /// Create an empty template
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a template from `(name, spec)` pairs
    ///
    /// # Examples
    ///
    /// ```
    /// use bioflow_domain::Template;
    ///
    /// let template = Template::from_specs([
    ///     ("sample_id", "String"),
    ///     ("threads", "Int (optional, default = 4)"),
    /// ]);
    /// assert_eq!(template.len(), 2);
    /// assert!(template.contains("threads"));
    /// ```
    pub fn from_specs<I, K, V>(specs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: specs
                .into_iter()
                .map(|(name, spec)| (name.into(), spec.into()))
                .collect(),
        }
    }

    /// Whether the template declares `name`
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Number of declared fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the template declares no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over declared field names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterate over `(name, spec)` pairs in sorted order
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.fields.iter(),
        }
    }
}

/// Iterator over the fields of a [`Template`]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(name, spec)| (name.as_str(), spec.as_str()))
    }
}

impl<'a> IntoIterator for &'a Template {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
