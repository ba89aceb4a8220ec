//! Idempotent `.gitignore` merge used to keep log files out of version control.

use std::{
    collections::HashSet,
    fs::{self, OpenOptions},
    io::{self, Write},
    path::Path,
};

use tracing::info;

use crate::error::{LoggerError, Result};

/// Make sure every line in `entries` is present in the file at `path`.
///
/// The file is created if missing. Only missing lines are appended, in the
/// order given; lines already present (compared after trimming) are never
/// repeated. Returns how many lines were added.
pub fn ensure_entries(path: &Path, entries: &[&str]) -> Result<usize> {
    merge(path, entries).map_err(|source| LoggerError::Gitignore {
        path: path.to_path_buf(),
        source,
    })
}

fn merge(path: &Path, entries: &[&str]) -> io::Result<usize> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    let present: HashSet<&str> = existing.lines().map(str::trim).collect();
    let mut seen = HashSet::new();
    let missing: Vec<&str> = entries
        .iter()
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty() && !present.contains(entry) && seen.insert(*entry))
        .collect();

    if missing.is_empty() {
        return Ok(0);
    }

    let mut out = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        out.push('\n');
    }
    for line in &missing {
        out.push_str(line);
        out.push('\n');
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(out.as_bytes())?;

    info!(path = %path.display(), added = missing.len(), "Updated gitignore");
    Ok(missing.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRIES: &[&str] = &["# daylog", "/logs/*.log"];

    #[test]
    fn test_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitignore");

        assert_eq!(ensure_entries(&path, ENTRIES).unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# daylog\n/logs/*.log\n");
    }

    #[test]
    fn test_second_run_adds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitignore");

        ensure_entries(&path, ENTRIES).unwrap();
        assert_eq!(ensure_entries(&path, ENTRIES).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# daylog\n/logs/*.log\n");
    }

    #[test]
    fn test_only_missing_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".gitignore");
        fs::write(&path, "target/\n# daylog").unwrap();

        assert_eq!(ensure_entries(&path, ENTRIES).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "target/\n# daylog\n/logs/*.log\n"
        );
    }

    #[test]
    fn test_read_failure_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();

        // A directory cannot be read as a gitignore file.
        let err = ensure_entries(dir.path(), ENTRIES).unwrap_err();
        assert!(matches!(err, LoggerError::Gitignore { .. }));
    }
}
