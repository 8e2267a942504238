//! Registry search types: conditions, query modes and hits

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Placeholder shown for hits that carry no usable name
pub const UNNAMED_WORKFLOW: &str = "Unnamed Workflow";

/// Boolean operator attached to a search condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    /// Condition should hold together with the others
    And,
    /// Condition may hold on its own
    Or,
}

impl BooleanOperator {
    /// Get the operator as it is written in queries
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
        }
    }

    /// Parse an operator, case-insensitively
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Some(BooleanOperator::And),
            "OR" => Some(BooleanOperator::Or),
            _ => None,
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How each condition is matched by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Analyzed match of the term against the field
    #[default]
    #[serde(alias = "phrase")]
    MatchPhrase,
    /// Case-insensitive `*term*` pattern match
    Wildcard,
}

impl QueryType {
    /// Get the query type name
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::MatchPhrase => "match_phrase",
            QueryType::Wildcard => "wildcard",
        }
    }

    /// Parse a query type name
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "match_phrase" | "phrase" => Some(QueryType::MatchPhrase),
            "wildcard" => Some(QueryType::Wildcard),
            _ => None,
        }
    }
}

/// One `(field, operator, term)` search condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCondition {
    /// Document field to search
    pub field: String,
    /// Boolean operator
    pub operator: BooleanOperator,
    /// Search term
    pub term: String,
}

impl SearchCondition {
    /// Create a condition
    pub fn new(field: impl Into<String>, operator: BooleanOperator, term: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            term: term.into(),
        }
    }

    /// Build a condition from a `[field, operator, term]` triple
    ///
    /// Returns `None` unless the triple has exactly three elements with a
    /// non-blank field and term. Unknown operators fall back to AND.
    ///
    /// # Examples
    ///
    /// ```
    /// use bioflow_domain::{BooleanOperator, SearchCondition};
    ///
    /// let condition = SearchCondition::from_triple(&["organization", "or", "broadinstitute"]).unwrap();
    /// assert_eq!(condition.operator, BooleanOperator::Or);
    ///
    /// assert!(SearchCondition::from_triple(&["organization", "AND"]).is_none());
    /// ```
    pub fn from_triple<S: AsRef<str>>(triple: &[S]) -> Option<Self> {
        let [field, operator, term] = triple else {
            return None;
        };
        let (field, term) = (field.as_ref().trim(), term.as_ref().trim());
        if field.is_empty() || term.is_empty() {
            return None;
        }
        let operator = BooleanOperator::parse(operator.as_ref()).unwrap_or(BooleanOperator::And);
        Some(Self::new(field, operator, term))
    }
}

/// One registry document returned by the search backend
///
/// Hits are read-only once retrieved; ranking only reorders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Backend document ID
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Workflow metadata
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,

    /// Backend relevance score (absent when the backend did not score)
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
}

impl SearchHit {
    /// Create a hit from its metadata and score
    pub fn new(source: Map<String, Value>, score: Option<f64>) -> Self {
        Self {
            id: None,
            source,
            score,
        }
    }

    /// A non-blank string field of the metadata
    pub fn text(&self, field: &str) -> Option<&str> {
        self.source
            .get(field)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Backend score, zero when unscored
    pub fn backend_score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    /// Name shown to users: workflow name, then generic name, then repository
    pub fn display_name(&self) -> &str {
        self.text("workflowName")
            .or_else(|| self.text("name"))
            .or_else(|| self.text("repository"))
            .unwrap_or(UNNAMED_WORKFLOW)
    }

    /// Registry path identifying the workflow
    pub fn workflow_path(&self) -> Option<&str> {
        self.text("full_workflow_path")
    }

    /// Title plus description, as scored by the reranker
    pub fn rerank_text(&self) -> String {
        let title = self
            .text("workflowName")
            .or_else(|| self.text("name"))
            .unwrap_or("");
        let description = self.text("description").unwrap_or("");
        format!("{} - {}", title, description)
    }
}

/// Backend response envelope (`hits.hits`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Hit container
    #[serde(default)]
    pub hits: HitList,
}

/// The `hits` object of a backend response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitList {
    /// Returned documents, in backend order
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

impl SearchResponse {
    /// Wrap hits in a response envelope
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits: HitList { hits },
        }
    }

    /// Hits in backend order
    pub fn hits(&self) -> &[SearchHit] {
        &self.hits.hits
    }

    /// Take ownership of the hits
    pub fn into_hits(self) -> Vec<SearchHit> {
        self.hits.hits
    }
}
