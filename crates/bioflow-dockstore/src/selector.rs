//! Saved-result workflow selection
//!
//! A search can persist the raw backend response. The selector finds one
//! workflow in such a file and writes out its WDL sources, or summarizes
//! every workflow the file holds.

use crate::backend::parse_response;
use crate::error::{DockstoreError, Result};
use crate::formatter::{Detail, ResultFormatter, ScoredHit};
use bioflow_domain::{SearchHit, SearchResponse};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::WalkDir;

/// Conventional name of a saved search response
pub const RESULTS_FILE_NAME: &str = "dockstore_results.json";

/// Name of the summary written beside a saved search response
pub const SUMMARY_FILE_NAME: &str = "formatted_workflows.md";
use std::collections::HashMap;
use tracing::{info, warn};

/// One WDL source file carried by a hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WdlSource {
    /// Path of the file inside the workflow repository
    pub path: String,
    /// File content
    pub content: String,
}

/// Files written for one workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedWorkflow {
    /// Registry path of the workflow
    pub workflow_path: String,
    /// Directory the files were written to
    pub directory: PathBuf,
    /// Written files, in source order
    pub files: Vec<PathBuf>,
}

/// Write a raw backend response, creating parent directories
pub fn save_results(path: &Path, raw: &Value) -> Result<()> {
    let io_error = |source| DockstoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, serde_json::to_string_pretty(raw)?).map_err(io_error)
}

/// Read a saved backend response
pub fn load_results(path: &Path) -> Result<SearchResponse> {
    let raw = fs::read_to_string(path).map_err(|source| DockstoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&raw)?;
    parse_response(&value)
}

/// Most recently modified [`RESULTS_FILE_NAME`] anywhere under `root`
///
/// Unreadable entries are skipped.
pub fn find_latest_results(root: &Path) -> Option<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == RESULTS_FILE_NAME)
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((modified, entry.into_path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

/// Summary of a saved search response
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSummary {
    /// Saved response that was read
    pub results_path: PathBuf,
    /// Where the summary was written
    pub summary_path: PathBuf,
    /// Number of workflows summarized
    pub workflows: usize,
    /// Summary text, one detailed block per workflow
    pub text: String,
}

/// Render every hit of a saved response in backend order and write the
/// summary to [`SUMMARY_FILE_NAME`] in the same directory
pub fn summarize_results(results_path: &Path, formatter: &ResultFormatter) -> Result<ResultSummary> {
    let hits: Vec<ScoredHit> = load_results(results_path)?
        .into_hits()
        .into_iter()
        .map(|hit| ScoredHit {
            score: hit.backend_score(),
            hit,
        })
        .collect();

    let text = if hits.is_empty() {
        "No workflows in saved results".to_string()
    } else {
        formatter.format(&hits, Detail::Full).to_text()
    };

    let summary_path = results_path.with_file_name(SUMMARY_FILE_NAME);
    fs::write(&summary_path, &text).map_err(|source| DockstoreError::Io {
        path: summary_path.clone(),
        source,
    })?;
    info!(
        results = %results_path.display(),
        summary = %summary_path.display(),
        workflows = hits.len(),
        "Wrote results summary"
    );

    Ok(ResultSummary {
        results_path: results_path.to_path_buf(),
        summary_path,
        workflows: hits.len(),
        text,
    })
}

/// Hit whose `full_workflow_path` equals `workflow_path`
pub fn find_workflow<'a>(response: &'a SearchResponse, workflow_path: &str) -> Option<&'a SearchHit> {
    response
        .hits()
        .iter()
        .find(|hit| hit.workflow_path() == Some(workflow_path))
}

/// Every `.wdl` source file with content, across all versions
pub fn wdl_sources(hit: &SearchHit) -> Vec<WdlSource> {
    let versions = hit
        .source
        .get("workflowVersions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    versions
        .iter()
        .filter_map(|version| version.get("sourceFiles").and_then(Value::as_array))
        .flatten()
        .filter_map(|file| {
            let path = file.get("path").and_then(Value::as_str)?;
            let content = file.get("content").and_then(Value::as_str)?;
            (path.ends_with(".wdl") && !content.is_empty()).then(|| WdlSource {
                path: path.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}

/// Directory name for a workflow: the last segment of its path
pub fn workflow_dir_name(workflow_path: &str) -> &str {
    workflow_path
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or("workflow")
}

/// Write the WDL sources of `workflow_path` from a saved response
///
/// Files land in `<output_dir>/<last path segment>/<file name>`. The
/// layout is flat: sources sharing a file name overwrite each other in
/// source order, whether they are two versions of one file or different
/// files such as `/tasks/utils.wdl` and `/sub/utils.wdl`. Each target is
/// listed once in the result, and a clash between different source paths
/// is logged.
pub fn download_workflow(
    results_path: &Path,
    workflow_path: &str,
    output_dir: &Path,
) -> Result<DownloadedWorkflow> {
    let response = load_results(results_path)?;
    let hit = find_workflow(&response, workflow_path)
        .ok_or_else(|| DockstoreError::WorkflowNotFound(workflow_path.to_string()))?;

    let sources = wdl_sources(hit);
    if sources.is_empty() {
        return Err(DockstoreError::NoWdlFiles(workflow_path.to_string()));
    }

    let directory = output_dir.join(workflow_dir_name(workflow_path));
    fs::create_dir_all(&directory).map_err(|source| DockstoreError::Io {
        path: directory.clone(),
        source,
    })?;

    let mut files = Vec::with_capacity(sources.len());
    let mut written_from: HashMap<PathBuf, &str> = HashMap::new();
    for source_file in &sources {
        let file_name = Path::new(&source_file.path)
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("main.wdl"));
        let target = directory.join(file_name);
        fs::write(&target, &source_file.content).map_err(|source| DockstoreError::Io {
            path: target.clone(),
            source,
        })?;
        match written_from.insert(target.clone(), &source_file.path) {
            None => files.push(target),
            Some(previous) if previous != source_file.path => warn!(
                kept = %source_file.path,
                replaced = previous,
                target = %target.display(),
                "Workflow sources share a file name"
            ),
            Some(_) => {}
        }
    }

    info!(
        workflow = workflow_path,
        directory = %directory.display(),
        files = files.len(),
        "Wrote workflow sources"
    );

    Ok(DownloadedWorkflow {
        workflow_path: workflow_path.to_string(),
        directory,
        files,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dir_name() {
        assert_eq!(workflow_dir_name("github.com/broad/warp/WholeGenome"), "WholeGenome");
        assert_eq!(workflow_dir_name("github.com/broad/warp/"), "warp");
        assert_eq!(workflow_dir_name(""), "workflow");
    }

    #[test]
    fn test_wdl_sources_filters() {
        let source = json!({
            "workflowVersions": [
                {"sourceFiles": [
                    {"path": "/main.wdl", "content": "workflow main {}"},
                    {"path": "/README.md", "content": "readme"},
                    {"path": "/empty.wdl", "content": ""}
                ]},
                {"sourceFiles": [{"path": "/tasks/align.wdl", "content": "task align {}"}]},
                {"name": "no files"}
            ]
        });
        let hit = SearchHit::new(source.as_object().cloned().unwrap_or_default(), None);
        let sources = wdl_sources(&hit);
        let paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["/main.wdl", "/tasks/align.wdl"]);
    }

    #[test]
    fn test_find_latest_results_picks_newest() {
        let dir = tempfile::TempDir::new().unwrap();
        let older = dir.path().join("a").join(RESULTS_FILE_NAME);
        let newer = dir.path().join("b").join("c").join(RESULTS_FILE_NAME);
        save_results(&older, &json!({"hits": {"hits": []}})).unwrap();
        save_results(&newer, &json!({"hits": {"hits": []}})).unwrap();
        fs::write(dir.path().join("other.json"), "{}").unwrap();

        let old_time = SystemTime::now() - std::time::Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&older)
            .unwrap()
            .set_modified(old_time)
            .unwrap();

        assert_eq!(find_latest_results(dir.path()), Some(newer));
    }

    #[test]
    fn test_find_latest_results_none() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(find_latest_results(dir.path()), None);
    }

    #[test]
    fn test_summary_written_beside_results() {
        let dir = tempfile::TempDir::new().unwrap();
        let results = dir.path().join("run").join(RESULTS_FILE_NAME);
        save_results(
            &results,
            &json!({"hits": {"hits": [
                {"_score": 3.5, "_source": {"name": "cnv", "full_workflow_path": "github.com/org/cnv"}},
                {"_score": 1.0, "_source": {"name": "rnaseq", "full_workflow_path": "github.com/org/rnaseq"}}
            ]}}),
        )
        .unwrap();

        let summary = summarize_results(&results, &ResultFormatter::default()).unwrap();

        assert_eq!(summary.workflows, 2);
        assert_eq!(summary.summary_path, dir.path().join("run").join(SUMMARY_FILE_NAME));
        assert!(summary.text.contains("### 1. cnv"));
        assert!(summary.text.contains("### 2. rnaseq"));
        assert_eq!(fs::read_to_string(&summary.summary_path).unwrap(), summary.text);
    }

    #[test]
    fn test_same_file_name_from_different_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let results = dir.path().join("results.json");
        let raw = json!({"hits": {"hits": [{"_source": {
            "full_workflow_path": "github.com/org/pipeline",
            "workflowVersions": [{"sourceFiles": [
                {"path": "/main.wdl", "content": "workflow main {}"},
                {"path": "/tasks/utils.wdl", "content": "task from_tasks {}"},
                {"path": "/sub/utils.wdl", "content": "task from_sub {}"}
            ]}]
        }}]}});
        save_results(&results, &raw).unwrap();

        let out = dir.path().join("out");
        let downloaded = download_workflow(&results, "github.com/org/pipeline", &out).unwrap();

        let utils = out.join("pipeline").join("utils.wdl");
        assert_eq!(downloaded.files, vec![out.join("pipeline").join("main.wdl"), utils.clone()]);
        assert_eq!(fs::read_to_string(utils).unwrap(), "task from_sub {}");
    }
}
