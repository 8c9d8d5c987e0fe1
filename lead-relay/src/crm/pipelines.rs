//! Pabau pipeline listing for operators.
//!
//! Fetches the lead pipelines and renders them as a plain-text tree so the
//! pipeline and stage IDs can be copied into configuration.

use std::fmt::Write as _;

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::DEFAULT_PABAU_API_BASE;

/// Placeholder shipped in example `.env` files.
pub const API_KEY_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

#[derive(Debug, Clone, Deserialize)]
pub struct Pipeline {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub stages: Option<Vec<Stage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: Option<String>,
}

/// Whether a configured key is usable.
pub fn is_usable_api_key(key: Option<&str>) -> bool {
    matches!(key.map(str::trim), Some(k) if !k.is_empty() && k != API_KEY_PLACEHOLDER)
}

/// Choose the API base: command-line flag, then environment, then the default.
///
/// Blank values are skipped.
pub fn resolve_api_base(flag: Option<&str>, env: Option<&str>) -> String {
    flag.into_iter()
        .chain(env)
        .map(str::trim)
        .find(|base| !base.is_empty())
        .unwrap_or(DEFAULT_PABAU_API_BASE)
        .to_string()
}

/// URL of the pipeline listing endpoint.
pub fn pipelines_url(api_base: &str, api_key: &str) -> String {
    format!(
        "{}/{}/leads/pipelines?order=ASC",
        api_base.trim_end_matches('/'),
        api_key
    )
}

/// Fetch the raw pipeline listing body.
pub async fn fetch_pipelines(client: &Client, url: &str) -> reqwest::Result<String> {
    client.get(url).send().await?.text().await
}

/// Render a parsed listing.
///
/// Arrays become a pipeline/stage tree; any other JSON is pretty-printed.
pub fn render_pipelines(listing: &Value) -> String {
    let mut out = String::from("\n=== PABAU PIPELINES ===\n\n");

    let Some(items) = listing.as_array() else {
        let pretty = serde_json::to_string_pretty(listing).unwrap_or_else(|_| listing.to_string());
        let _ = writeln!(out, "Response: {}", pretty);
        return out;
    };

    for (idx, item) in items.iter().enumerate() {
        let pipeline: Pipeline = serde_json::from_value(item.clone()).unwrap_or(Pipeline {
            id: item.get("id").cloned().unwrap_or(Value::Null),
            name: None,
            stages: None,
        });

        let _ = writeln!(
            out,
            "Pipeline {}: {}",
            idx + 1,
            pipeline.name.as_deref().unwrap_or("Unnamed")
        );
        let _ = writeln!(out, "  ID: {}", display_id(&pipeline.id));

        if let Some(stages) = &pipeline.stages {
            out.push_str("  Stages:\n");
            for stage in stages {
                let _ = writeln!(
                    out,
                    "    - {} (ID: {})",
                    stage.name.as_deref().unwrap_or("Unnamed Stage"),
                    display_id(&stage.id)
                );
            }
        }
        out.push('\n');
    }

    out
}

/// IDs arrive as numbers or strings; print them without JSON quoting.
fn display_id(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        Value::Null => "undefined".to_string(),
        other => other.to_string(),
    }
}
