use anyhow::Context;
use std::path::{Path, PathBuf};

/// Resolve the workspace root. An explicit path wins; otherwise walk up from
/// the current directory looking for a `.liftoff` directory, then for a
/// `.git` directory, and fall back to the current directory itself.
pub fn resolve_root(explicit: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(root) = explicit {
        return root
            .canonicalize()
            .with_context(|| format!("workspace root '{}' does not exist", root.display()));
    }
    let cwd = std::env::current_dir().context("cannot determine current directory")?;
    if let Some(found) = find_up(&cwd, ".liftoff") {
        return Ok(found);
    }
    if let Some(found) = find_up(&cwd, ".git") {
        return Ok(found);
    }
    Ok(cwd)
}

fn find_up(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join(marker).is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_root_must_exist() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_root(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap());

        let missing = dir.path().join("nope");
        assert!(resolve_root(Some(missing)).is_err());
    }

    #[test]
    fn find_up_walks_to_the_marker() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".liftoff")).unwrap();
        let nested = dir.path().join("a/b/c");
        fs::create_dir_all(&nested).unwrap();

        let found = find_up(&nested, ".liftoff").unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn find_up_without_marker_is_none() {
        // Search from the filesystem root so no parent directory on the host
        // can satisfy the marker.
        assert!(find_up(Path::new("/"), ".liftoff-never-exists").is_none());
    }
}
