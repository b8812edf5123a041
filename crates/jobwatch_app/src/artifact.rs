use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tempfile::NamedTempFile;

/// Writes the page structure as pretty JSON, replacing `target` atomically
/// through a temp file in the same directory.
pub fn write_structure(target: &Path, structure: &Value) -> Result<()> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let content = serde_json::to_string_pretty(structure)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.as_file_mut().sync_all()?;
    tmp.persist(target)
        .map_err(|err| err.error)
        .with_context(|| format!("writing {}", target.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::write_structure;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = dir.path().join("out").join("page.json");

        write_structure(&target, &json!({ "hero": "old" })).expect("first write");
        write_structure(&target, &json!({ "hero": "new" })).expect("second write");

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&target).expect("read")).expect("json");
        assert_eq!(written, json!({ "hero": "new" }));
    }
}
