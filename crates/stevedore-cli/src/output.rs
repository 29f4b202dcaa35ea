//! Serialization of the object graph for the CLI.

use serde::Serialize;
use stevedore_common::config::OutputFormat;
use stevedore_transform::OutputGraph;

/// Wrapper emitted for JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct List<'a> {
    api_version: &'static str,
    kind: &'static str,
    items: &'a OutputGraph,
}

/// Renders `graph` in the requested format.
///
/// YAML output is one document per object, each introduced by `---`.
///
/// # Errors
///
/// Returns an error if an object fails to serialize.
pub fn render(graph: &OutputGraph, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Yaml => {
            let mut out = String::new();
            for object in graph {
                out.push_str("---\n");
                out.push_str(&serde_yaml::to_string(object)?);
            }
            Ok(out)
        }
        OutputFormat::Json => {
            let list = List {
                api_version: "v1",
                kind: "List",
                items: graph,
            };
            let mut out = serde_json::to_string_pretty(&list)?;
            out.push('\n');
            Ok(out)
        }
    }
}
