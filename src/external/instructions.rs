use std::path::PathBuf;

use crate::error::{Error, Result};

/// Named instruction templates that steer each AI call.
pub trait InstructionStore: Send + Sync {
    /// The template, or `None` when it does not exist.
    fn load(&self, agent_name: &str) -> Result<Option<String>>;

    /// The template, or `RequiredTemplateMissing` for call sites with
    /// fallback disabled.
    fn require(&self, agent_name: &str) -> Result<String> {
        self.load(agent_name)?
            .ok_or_else(|| Error::RequiredTemplateMissing(agent_name.to_string()))
    }
}

/// Markdown templates on disk, one file per agent, optional YAML front
/// matter stripped on load.
pub struct FsInstructionStore {
    dir: PathBuf,
}

impl FsInstructionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for FsInstructionStore {
    fn default() -> Self {
        Self::new(".claude/agents")
    }
}

impl InstructionStore for FsInstructionStore {
    fn load(&self, agent_name: &str) -> Result<Option<String>> {
        let path = self.dir.join(format!("{agent_name}.md"));
        if !path.exists() {
            log::warn!("instruction template not found: {}", path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(Some(strip_front_matter(&content)))
    }
}

fn strip_front_matter(content: &str) -> String {
    if let Some(rest) = content.strip_prefix("---") {
        if let Some(end) = rest.find("---") {
            return rest[end + 3..].trim().to_string();
        }
    }
    content.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_front_matter() {
        let content = "---\nname: analyzer\nmodel: any\n---\nDo the analysis.";
        assert_eq!(strip_front_matter(content), "Do the analysis.");
    }

    #[test]
    fn test_content_without_front_matter_is_untouched() {
        assert_eq!(strip_front_matter("Just instructions.\n"), "Just instructions.");
    }

    #[test]
    fn test_load_and_require() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("present.md"),
            "---\nkind: test\n---\nAnalyze carefully.",
        )
        .unwrap();

        let store = FsInstructionStore::new(dir.path());
        assert_eq!(
            store.load("present").unwrap().as_deref(),
            Some("Analyze carefully.")
        );
        assert!(store.load("absent").unwrap().is_none());
        assert!(matches!(
            store.require("absent").unwrap_err(),
            Error::RequiredTemplateMissing(name) if name == "absent"
        ));
    }
}
