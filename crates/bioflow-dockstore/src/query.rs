//! Query builder
//!
//! Compiles `(field, operator, term)` conditions into the registry's
//! Elasticsearch request body. Every condition becomes one independent
//! clause and the clauses are OR-ed at the top level
//! (`minimum_should_match = 1`): recall is widened here and the reranker
//! narrows relevance afterwards.

use crate::error::{DockstoreError, Result};
use bioflow_domain::{QueryType, SearchCondition};
use serde_json::{json, Map, Value};

/// Number of documents requested from the backend
pub const DEFAULT_RESULT_SIZE: usize = 201;

/// Boost for phrase clauses and for wildcard clauses on ordinary fields
pub const DEFAULT_BOOST: u32 = 2;

/// Boost for wildcard clauses on path-identifying fields
pub const PATH_BOOST: u32 = 14;

/// Word distance tolerated by sentence matching
pub const SENTENCE_SLOP: u32 = 3;

/// Fields that identify a workflow by path
pub const PATH_FIELDS: [&str; 2] = ["full_workflow_path", "tool_path"];

/// Metadata fields returned for every hit
pub const SOURCE_FIELDS: [&str; 24] = [
    "all_authors",
    "approvedAITopic",
    "categories",
    "descriptorType",
    "descriptorTypeSubclass",
    "full_workflow_path",
    "gitUrl",
    "input_file_formats",
    "name",
    "namespace",
    "organization",
    "output_file_formats",
    "private_access",
    "providerUrl",
    "repository",
    "starredUsers",
    "toolname",
    "tool_path",
    "topicAutomatic",
    "topicSelection",
    "verified",
    "workflowName",
    "description",
    "workflowVersions",
];

/// Fields the backend highlights matches in
pub const HIGHLIGHT_FIELDS: [&str; 10] = [
    "full_workflow_path",
    "tool_path",
    "workflowVersions.sourceFiles.content",
    "tags.sourceFiles.content",
    "description",
    "labels",
    "all_authors.name",
    "topicAutomatic",
    "categories.topic",
    "categories.displayName",
];

/// Map user-facing field names to indexed document fields
pub fn resolve_field(field: &str) -> &str {
    match field {
        "author" => "all_authors.name",
        "content" => "workflowVersions.sourceFiles.content",
        other => other,
    }
}

/// How conditions are compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Phrase or wildcard matching
    pub query_type: QueryType,

    /// Phrase mode only: match terms as a sentence with some slop
    pub sentence: bool,

    /// Number of documents to request
    pub size: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            query_type: QueryType::default(),
            sentence: false,
            size: DEFAULT_RESULT_SIZE,
        }
    }
}

/// A compiled query
#[derive(Debug, Clone, PartialEq)]
pub struct BackendQuery {
    /// Request body sent to the backend
    pub body: Value,

    /// All condition terms joined by spaces; only the reranker sees this
    pub free_text: String,

    /// Conditions compiled into clauses
    pub conditions: Vec<SearchCondition>,
}

/// Compile conditions into a backend query
///
/// Fails with `EmptyQuery` when `conditions` is empty.
pub fn build(conditions: &[SearchCondition], options: &QueryOptions) -> Result<BackendQuery> {
    if conditions.is_empty() {
        return Err(DockstoreError::EmptyQuery);
    }

    let clauses: Vec<Value> = conditions
        .iter()
        .map(|condition| build_clause(condition, options))
        .collect();

    let highlight_fields: Map<String, Value> = HIGHLIGHT_FIELDS
        .iter()
        .map(|field| (field.to_string(), json!({})))
        .collect();

    let body = json!({
        "size": options.size,
        "_source": SOURCE_FIELDS,
        "sort": [
            {"archived": {"order": "asc"}},
            {"_score": {"order": "desc"}}
        ],
        "highlight": {
            "type": "unified",
            "pre_tags": ["<b>"],
            "post_tags": ["</b>"],
            "fields": highlight_fields
        },
        "query": {
            "bool": {
                "must": [{"match": {"_index": "workflows"}}],
                "should": clauses,
                "minimum_should_match": 1
            }
        }
    });

    Ok(BackendQuery {
        body,
        free_text: free_text(conditions),
        conditions: conditions.to_vec(),
    })
}

/// Compile one condition into a backend clause
pub fn build_clause(condition: &SearchCondition, options: &QueryOptions) -> Value {
    let field = resolve_field(&condition.field);
    let term = condition.term.as_str();

    match options.query_type {
        QueryType::Wildcard => {
            let boost = if PATH_FIELDS.contains(&field) {
                PATH_BOOST
            } else {
                DEFAULT_BOOST
            };
            json!({"wildcard": {field: {
                "value": format!("*{}*", term),
                "case_insensitive": true,
                "boost": boost
            }}})
        }
        QueryType::MatchPhrase if options.sentence => json!({"match_phrase": {field: {
            "query": term,
            "slop": SENTENCE_SLOP,
            "boost": DEFAULT_BOOST
        }}}),
        QueryType::MatchPhrase => json!({"match": {field: {
            "query": term,
            "boost": DEFAULT_BOOST
        }}}),
    }
}

/// Join every condition term into one natural-language query
pub fn free_text(conditions: &[SearchCondition]) -> String {
    conditions
        .iter()
        .map(|c| c.term.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Read conditions from raw `[field, operator, term]` JSON arrays
///
/// Items that are not arrays of exactly three non-blank strings are skipped.
pub fn conditions_from_json(items: &[Value]) -> Vec<SearchCondition> {
    items
        .iter()
        .filter_map(|item| {
            let parts = item.as_array()?;
            let strings: Option<Vec<&str>> = parts.iter().map(Value::as_str).collect();
            SearchCondition::from_triple(&strings?)
        })
        .collect()
}
