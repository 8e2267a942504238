//! Docker tool - Resolve the registry URL of a built image

use crate::error::McpError;
use crate::protocol::{ToolCallResult, ToolDefinition};
use crate::services::Services;
use bioflow_platform::ImageRegistry;
use serde::Deserialize;
use serde_json::json;

/// Parameters for image URL resolution
#[derive(Debug, Deserialize)]
pub struct ImageUrlParams {
    /// Image repository name
    pub repo_name: String,
    /// Image tag
    pub tag: String,
    /// Registry host; defaults to the configured one
    #[serde(default)]
    pub registry: Option<String>,
    /// Registry namespace; defaults to the configured one
    #[serde(default)]
    pub namespace_name: Option<String>,
}

pub(crate) fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "get_docker_image_url".to_string(),
        description: "Get the full registry URL of a container image".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "repo_name": {"type": "string", "description": "Repository name"},
                "tag": {"type": "string", "description": "Image tag"},
                "registry": {"type": "string", "description": "Registry host"},
                "namespace_name": {"type": "string", "description": "Registry namespace"}
            },
            "required": ["repo_name", "tag"]
        }),
    }
}

/// Handle get_docker_image_url tool invocation
pub fn handle_image_url(services: &Services, params: ImageUrlParams) -> Result<ToolCallResult, McpError> {
    let registry = ImageRegistry {
        registry: params.registry.unwrap_or_else(|| services.registry.registry.clone()),
        namespace: params
            .namespace_name
            .unwrap_or_else(|| services.registry.namespace.clone()),
    };
    let url = registry.image_url(&params.repo_name, &params.tag)?;
    Ok(ToolCallResult::text(url.clone(), Some(json!({"image_url": url})), false))
}
