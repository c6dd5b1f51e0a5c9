//! Session context captured when an entry is created.

use std::path::Path;

use crate::entry::EntryContent;

/// Where the session ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryContext {
    /// Working directory.
    pub project: Option<String>,
    /// Checked-out branch, if any.
    pub branch: Option<String>,
}

impl EntryContext {
    /// Inspect `dir`: the directory itself is the project, the branch is read
    /// from the nearest enclosing `.git/HEAD`. Detached heads have no branch.
    pub fn detect(dir: &Path) -> Self {
        Self {
            project: Some(dir.display().to_string()),
            branch: git_branch(dir),
        }
    }

    /// Fill the content's missing metadata. Values already present win.
    pub fn apply_to(&self, content: &mut EntryContent) {
        if content.project.is_none() {
            content.project.clone_from(&self.project);
        }
        if content.branch.is_none() {
            content.branch.clone_from(&self.branch);
        }
    }
}

fn git_branch(dir: &Path) -> Option<String> {
    dir.ancestors().find_map(|ancestor| {
        let head = std::fs::read_to_string(ancestor.join(".git").join("HEAD")).ok()?;
        Some(
            head.trim()
                .strip_prefix("ref: refs/heads/")
                .map(str::to_string),
        )
    })?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_branch_from_nested_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let git = tmp.path().join(".git");
        std::fs::create_dir_all(&git).unwrap();
        std::fs::write(git.join("HEAD"), "ref: refs/heads/feature/diary\n").unwrap();
        let nested = tmp.path().join("src").join("lib");
        std::fs::create_dir_all(&nested).unwrap();

        let ctx = EntryContext::detect(&nested);
        assert_eq!(ctx.branch.as_deref(), Some("feature/diary"));
        assert_eq!(ctx.project, Some(nested.display().to_string()));
    }

    #[test]
    fn detached_head_has_no_branch() {
        let tmp = tempfile::tempdir().unwrap();
        let git = tmp.path().join(".git");
        std::fs::create_dir_all(&git).unwrap();
        std::fs::write(git.join("HEAD"), "3f2a9c0d1e\n").unwrap();

        assert_eq!(EntryContext::detect(tmp.path()).branch, None);
    }

    #[test]
    fn apply_keeps_explicit_values() {
        let ctx = EntryContext {
            project: Some("/detected".to_string()),
            branch: Some("main".to_string()),
        };
        let mut content = EntryContent {
            project: Some("/explicit".to_string()),
            ..EntryContent::default()
        };
        ctx.apply_to(&mut content);
        assert_eq!(content.project.as_deref(), Some("/explicit"));
        assert_eq!(content.branch.as_deref(), Some("main"));
    }
}
