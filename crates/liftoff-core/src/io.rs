use crate::error::Result;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write a file atomically: contents land in a temp file in the target
/// directory, then rename over the destination. Readers never observe a
/// partially written file.
pub fn atomic_write(path: &Path, contents: &str) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Create a file only when absent. Returns true when the file was written.
pub fn write_if_missing(path: &Path, contents: &str) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, contents)?;
    Ok(true)
}

/// Append a line to the root .gitignore unless already present. Returns true
/// when the file changed.
pub fn ensure_gitignore_entry(root: &Path, entry: &str) -> Result<bool> {
    let path = root.join(".gitignore");
    let existing = if path.exists() {
        fs::read_to_string(&path)?
    } else {
        String::new()
    };
    if existing.lines().any(|line| line.trim() == entry) {
        return Ok(false);
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(entry);
    updated.push('\n');
    atomic_write(&path, &updated)?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn atomic_write_creates_parents() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a/b/c.txt");
        atomic_write(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }

    #[test]
    fn atomic_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        atomic_write(&path, "one").unwrap();
        atomic_write(&path, "two").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "two");
    }

    #[test]
    fn write_if_missing_respects_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f.txt");
        assert!(write_if_missing(&path, "first").unwrap());
        assert!(!write_if_missing(&path, "second").unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn gitignore_entry_added_once() {
        let dir = TempDir::new().unwrap();
        assert!(ensure_gitignore_entry(dir.path(), ".liftoff/runs/").unwrap());
        assert!(!ensure_gitignore_entry(dir.path(), ".liftoff/runs/").unwrap());
        let body = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert_eq!(body.matches(".liftoff/runs/").count(), 1);
    }

    #[test]
    fn gitignore_preserves_existing_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".gitignore"), "target/").unwrap();
        assert!(ensure_gitignore_entry(dir.path(), ".liftoff/runs/").unwrap());
        let body = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
        assert!(body.contains("target/"));
        assert!(body.contains(".liftoff/runs/"));
    }
}
