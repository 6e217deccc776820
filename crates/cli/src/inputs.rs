//! Locating and reading input files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;
use walkdir::WalkDir;

/// Expand files and directories into the list of manifest files to process.
///
/// Files are taken as given; directories are walked recursively for `*.json`.
/// Directory results are sorted so runs are reproducible.
pub fn collect_manifest_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_file() {
            paths.push(input.clone());
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && is_json(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            debug!(dir = ?input, files = found.len(), "Scanned input directory");
            paths.extend(found);
        } else {
            bail!("input path {input:?} does not exist");
        }
    }
    Ok(paths)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Display name of an input: its file name, or the full path as a fallback.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a text file.
pub async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {path:?}"))
}

/// Read every discharge report, in the given order.
pub async fn read_reports(paths: &[PathBuf]) -> Result<Vec<String>> {
    let mut reports = Vec::with_capacity(paths.len());
    for path in paths {
        reports.push(read_text(path).await?);
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn walks_directories_for_json_files() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("2024").join("march");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.json"), "[]").unwrap();
        fs::write(nested.join("a.JSON"), "[]").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let paths = collect_manifest_paths(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = paths.iter().map(|p| source_name(p)).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"a.JSON".to_string()));
        assert!(names.contains(&"b.json".to_string()));
        assert!(!names.contains(&"notes.txt".to_string()));
    }

    #[test]
    fn explicit_files_are_kept_whatever_the_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("call.txt");
        fs::write(&path, "[]").unwrap();
        assert_eq!(collect_manifest_paths(&[path.clone()]).unwrap(), vec![path]);
    }

    #[test]
    fn missing_paths_are_reported() {
        let dir = tempdir().unwrap();
        assert!(collect_manifest_paths(&[dir.path().join("absent")]).is_err());
    }

    #[tokio::test]
    async fn reads_reports_in_order() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("one.txt");
        let second = dir.path().join("two.txt");
        fs::write(&first, "TCNU1234567").unwrap();
        fs::write(&second, "MSKU7654321").unwrap();

        let reports = read_reports(&[first, second]).await.unwrap();
        assert_eq!(reports, vec!["TCNU1234567", "MSKU7654321"]);
    }
}
