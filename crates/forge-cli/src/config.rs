use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// The optional `.forge.toml` project file. Every field is a default the
/// CLI flag of the same purpose overrides.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub strict: Option<bool>,
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

/// Loads `.forge.toml` from `path`. A missing file is not an error — it
/// just means every setting falls back to its CLI/built-in default.
pub fn load(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load(Path::new("/nonexistent/.forge.toml")).unwrap();
        assert!(config.skip.is_empty());
    }

    #[test]
    fn parses_declared_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".forge.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "target = \"Compile\"").unwrap();
        writeln!(file, "strict = true").unwrap();
        writeln!(file, "skip = [\"Test\"]").unwrap();
        writeln!(file, "[parameters]").unwrap();
        writeln!(file, "PUBLISH_TOKEN = \"abc\"").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.target, Some("Compile".to_string()));
        assert_eq!(config.strict, Some(true));
        assert_eq!(config.skip, vec!["Test".to_string()]);
        assert_eq!(config.parameters.get("PUBLISH_TOKEN").unwrap(), "abc");
    }

    #[test]
    fn target_is_absent_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".forge.toml");
        fs::write(&path, "strict = false\n").unwrap();
        let config = load(&path).unwrap();
        assert_eq!(config.target, None);
    }
}
