//! Remappings command - print the import remappings of cloned contracts

use eyre::Result;
use solclone_engine::{compose_remappings, Project};

/// Print one `name=path` remapping per line
pub fn remappings(project: &Project) -> Result<()> {
    let records = project.journal().load()?;
    tracing::debug!(records = records.len(), "composing remappings");
    for remapping in compose_remappings(&records) {
        println!("{}={}", remapping.name, remapping.path);
    }
    Ok(())
}
