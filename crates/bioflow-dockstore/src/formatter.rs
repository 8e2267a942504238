//! Result formatter
//!
//! Renders selected hits either as a concise list of name → URL links or
//! as one detailed block per hit. Metadata that is absent or empty is left
//! out of a block rather than rendered as a blank line.

use bioflow_domain::SearchHit;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default base for workflow page URLs
pub const DEFAULT_WORKFLOW_BASE_URL: &str = "https://dockstore.org/workflows";

/// A selected hit together with the score it was selected with
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
    /// Registry document
    pub hit: SearchHit,
    /// Reranker score, or backend score when degraded
    pub score: f64,
}

/// How much of each hit to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Detail {
    /// Name and link only
    #[default]
    Concise,
    /// Name, link and every non-empty metadata field
    Full,
}

/// One workflow link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowLink {
    /// Display name
    pub name: String,
    /// Workflow page URL
    pub url: String,
    /// Selection score
    pub score: f64,
}

/// Rendered search results
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Links in rank order plus the same links as one markdown list
    Concise {
        /// Links, best first
        links: Vec<WorkflowLink>,
        /// `- [name](url)` lines
        text: String,
    },
    /// One text block per hit, best first
    Full {
        /// Links, best first
        links: Vec<WorkflowLink>,
        /// Detailed blocks
        blocks: Vec<String>,
    },
}

impl Rendered {
    /// Links in rank order
    pub fn links(&self) -> &[WorkflowLink] {
        match self {
            Rendered::Concise { links, .. } => links,
            Rendered::Full { links, .. } => links,
        }
    }

    /// Everything as one string
    pub fn to_text(&self) -> String {
        match self {
            Rendered::Concise { text, .. } => text.clone(),
            Rendered::Full { blocks, .. } => blocks.join("\n\n"),
        }
    }
}

/// Formats hits into links and text
#[derive(Debug, Clone)]
pub struct ResultFormatter {
    workflow_base_url: String,
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_WORKFLOW_BASE_URL)
    }
}

impl ResultFormatter {
    /// Create a formatter linking to pages under `workflow_base_url`
    pub fn new(workflow_base_url: impl Into<String>) -> Self {
        let base: String = workflow_base_url.into();
        Self {
            workflow_base_url: base.trim_end_matches('/').to_string(),
        }
    }

    /// Page URL of a hit
    pub fn workflow_url(&self, hit: &SearchHit) -> String {
        format!(
            "{}/{}",
            self.workflow_base_url,
            hit.workflow_path().unwrap_or_default()
        )
    }

    /// Link for a hit
    pub fn link(&self, scored: &ScoredHit) -> WorkflowLink {
        WorkflowLink {
            name: scored.hit.display_name().to_string(),
            url: self.workflow_url(&scored.hit),
            score: scored.score,
        }
    }

    /// Render hits at the requested detail
    pub fn format(&self, hits: &[ScoredHit], detail: Detail) -> Rendered {
        let links: Vec<WorkflowLink> = hits.iter().map(|h| self.link(h)).collect();
        match detail {
            Detail::Concise => {
                let text = links
                    .iter()
                    .map(|l| format!("- [{}]({})", l.name, l.url))
                    .collect::<Vec<_>>()
                    .join("\n");
                Rendered::Concise { links, text }
            }
            Detail::Full => {
                let blocks = hits
                    .iter()
                    .zip(&links)
                    .enumerate()
                    .map(|(i, (scored, link))| full_block(i + 1, &scored.hit, link))
                    .collect();
                Rendered::Full { links, blocks }
            }
        }
    }
}

fn full_block(rank: usize, hit: &SearchHit, link: &WorkflowLink) -> String {
    let mut lines = vec![
        format!("### {}. {}", rank, link.name),
        format!("URL: {}", link.url),
        format!("Score: {:.4}", link.score),
    ];

    if let Some(path) = hit.workflow_path() {
        lines.push(format!("Path: {}", path));
    }
    if let Some(descriptor) = hit.text("descriptorType") {
        lines.push(format!("Descriptor type: {}", descriptor));
    }
    push_list(&mut lines, "Categories", hit.source.get("categories"), &["displayName", "name", "topic"]);
    push_list(&mut lines, "Authors", hit.source.get("all_authors"), &["name"]);
    if let Some(organization) = hit.text("organization") {
        lines.push(format!("Organization: {}", organization));
    }
    push_list(&mut lines, "Input file formats", hit.source.get("input_file_formats"), &["value"]);
    push_list(&mut lines, "Output file formats", hit.source.get("output_file_formats"), &["value"]);
    if let Some(verified) = hit.source.get("verified").and_then(Value::as_bool) {
        lines.push(format!("Verified: {}", if verified { "yes" } else { "no" }));
    }
    if let Some(description) = hit.text("description") {
        let first = description.lines().next().unwrap_or_default();
        lines.push(format!("Description: {}", first));
    }

    lines.join("\n")
}

/// Append `label: a, b, c` when the list has at least one usable entry
fn push_list(lines: &mut Vec<String>, label: &str, value: Option<&Value>, keys: &[&str]) {
    let items = list_labels(value, keys);
    if !items.is_empty() {
        lines.push(format!("{}: {}", label, items.join(", ")));
    }
}

/// Readable labels of a metadata list whose entries are strings or objects
fn list_labels(value: Option<&Value>, keys: &[&str]) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(fields) => keys
                .iter()
                .find_map(|k| fields.get(*k).and_then(Value::as_str))
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scored(source: Value, score: f64) -> ScoredHit {
        ScoredHit {
            hit: SearchHit::new(source.as_object().cloned().unwrap_or_default(), Some(score)),
            score,
        }
    }

    #[test]
    fn test_concise_links_in_order() {
        let hits = vec![
            scored(json!({"workflowName": "cnv-somatic", "full_workflow_path": "github.com/broad/cnv"}), 0.9),
            scored(json!({"repository": "rnaseq", "full_workflow_path": "github.com/nf/rnaseq"}), 0.4),
        ];
        let rendered = ResultFormatter::default().format(&hits, Detail::Concise);

        assert_eq!(rendered.links()[0].name, "cnv-somatic");
        assert_eq!(rendered.links()[0].url, "https://dockstore.org/workflows/github.com/broad/cnv");
        assert_eq!(rendered.links()[1].name, "rnaseq");
        assert_eq!(
            rendered.to_text(),
            "- [cnv-somatic](https://dockstore.org/workflows/github.com/broad/cnv)\n\
             - [rnaseq](https://dockstore.org/workflows/github.com/nf/rnaseq)"
        );
    }

    #[test]
    fn test_unnamed_placeholder() {
        let rendered = ResultFormatter::default().format(&[scored(json!({}), 1.0)], Detail::Concise);
        assert_eq!(rendered.links()[0].name, "Unnamed Workflow");
    }

    #[test]
    fn test_full_block_includes_present_fields() {
        let hit = scored(
            json!({
                "name": "mutect2",
                "full_workflow_path": "github.com/broad/mutect2",
                "descriptorType": "WDL",
                "categories": [{"displayName": "Somatic"}, {"name": "Variant calling"}],
                "all_authors": [{"name": "A. Author"}, {"name": ""}],
                "organization": "broadinstitute",
                "input_file_formats": [{"value": "BAM"}],
                "verified": true,
                "description": "Calls somatic SNVs.\nSecond line."
            }),
            0.75,
        );
        let rendered = ResultFormatter::default().format(&[hit], Detail::Full);
        let text = rendered.to_text();

        assert!(text.starts_with("### 1. mutect2"));
        assert!(text.contains("Descriptor type: WDL"));
        assert!(text.contains("Categories: Somatic, Variant calling"));
        assert!(text.contains("Authors: A. Author\n"));
        assert!(text.contains("Organization: broadinstitute"));
        assert!(text.contains("Input file formats: BAM"));
        assert!(text.contains("Verified: yes"));
        assert!(text.contains("Description: Calls somatic SNVs."));
        assert!(!text.contains("Second line"));
        assert!(!text.contains("Output file formats"));
    }

    #[test]
    fn test_full_block_omits_absent_metadata() {
        let rendered = ResultFormatter::default().format(&[scored(json!({"name": "bare"}), 0.1)], Detail::Full);
        let Rendered::Full { blocks, .. } = rendered else {
            panic!("expected full rendering");
        };
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].lines().count(), 3);
        assert!(!blocks[0].contains("Authors"));
        assert!(!blocks[0].contains("Verified"));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let formatter = ResultFormatter::new("https://example.org/workflows/");
        let hit = scored(json!({"full_workflow_path": "a/b"}), 0.0);
        assert_eq!(formatter.link(&hit).url, "https://example.org/workflows/a/b");
    }
}
