//! Overrides command - print per-file compiler overrides of cloned contracts

use eyre::Result;
use serde_json::{json, Map, Value};
use solclone_engine::Project;

/// Print the overrides as a JSON object keyed by project-relative path
pub fn overrides(project: &Project) -> Result<()> {
    let overrides: Map<String, Value> = project
        .compiler_overrides()?
        .into_iter()
        .map(|o| (o.path, json!({ "version": o.version.to_string(), "settings": o.settings })))
        .collect();
    println!("{}", serde_json::to_string_pretty(&overrides)?);
    Ok(())
}
