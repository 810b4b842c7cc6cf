//! Line-oriented regex search over a directory tree.

use crate::errors::{CoreError, Result};
use crate::models::{FileScan, SearchMatch, SearchResult, SkipReason};
use regex::Regex;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Bytes inspected when deciding whether a file is binary.
const BINARY_SNIFF_LEN: usize = 512;

/// Joins the base directory and an optional relative sub path into a search root.
pub fn resolve_search_root(base: &Path, sub_path: &str) -> PathBuf {
    let sub_path = sub_path.trim();
    if sub_path.is_empty() {
        base.to_path_buf()
    } else {
        base.join(sub_path)
    }
}

/// Regex search service. Holds the compiled pattern; every call to
/// [`ContentSearch::run`] walks the filesystem afresh.
#[derive(Debug, Clone)]
pub struct ContentSearch {
    pattern: Regex,
}

impl ContentSearch {
    /// Compiles `pattern`. Fails with `InvalidPattern` before any I/O.
    pub fn new(pattern: &str) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| CoreError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern: compiled })
    }

    /// Compiles `pattern` and searches `root` in one step.
    pub fn search(root: &Path, pattern: &str, recursive: bool) -> Result<SearchResult> {
        Self::new(pattern)?.run(root, recursive)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Walks `root` top-down and collects matching lines in visit order.
    ///
    /// Within each directory its files are scanned first, in directory order,
    /// before any subdirectory is entered. When `recursive` is false only the
    /// files directly inside `root` are scanned. Files that are unreadable or
    /// not UTF-8 text are skipped. Symlinks to files are searched; symlinked
    /// directories are not entered.
    pub fn run(&self, root: &Path, recursive: bool) -> Result<SearchResult> {
        if !root.is_dir() {
            return Err(CoreError::DirectoryNotFound(root.to_path_buf()));
        }

        debug!(root = %root.display(), pattern = self.pattern(), recursive, "searching");

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .sort_by(|a, b| a.file_type().is_dir().cmp(&b.file_type().is_dir()));
        if !recursive {
            walker = walker.max_depth(1);
        }

        let mut result = SearchResult::default();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let is_file = if entry.path_is_symlink() {
                entry.path().is_file()
            } else {
                entry.file_type().is_file()
            };
            if !is_file {
                continue;
            }

            match self.scan_file(entry.path()) {
                FileScan::Scanned(matches) => {
                    result.files_scanned += 1;
                    result.matches.extend(matches);
                }
                FileScan::Skipped(reason) => {
                    debug!(path = %reason.path().display(), ?reason, "skipping file");
                    result.files_skipped += 1;
                }
            }
        }

        debug!(
            matches = result.count(),
            scanned = result.files_scanned,
            skipped = result.files_skipped,
            "search finished"
        );
        Ok(result)
    }

    /// Scans one file. Either every line was read and the matches are
    /// returned, or the file is skipped as a whole.
    pub fn scan_file(&self, path: &Path) -> FileScan {
        match self.read_matches(path) {
            Ok(matches) => FileScan::Scanned(matches),
            Err(err) => FileScan::Skipped(skip_reason(path, &err)),
        }
    }

    fn read_matches(&self, path: &Path) -> io::Result<Vec<SearchMatch>> {
        let bytes = fs::read(path)?;
        if bytes[..bytes.len().min(BINARY_SNIFF_LEN)].contains(&0) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "binary content"));
        }
        let text = String::from_utf8(bytes)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        let matches = universal_lines(&text)
            .into_iter()
            .enumerate()
            .filter(|(_, raw)| self.pattern.is_match(raw))
            .map(|(idx, raw)| SearchMatch {
                file_path: path.to_path_buf(),
                line_number: idx + 1,
                line_content: raw.trim().to_string(),
            })
            .collect();
        Ok(matches)
    }
}

/// Splits text into lines without their terminators. `\n`, `\r\n` and a
/// lone `\r` all end a line; a trailing terminator does not start a new one.
fn universal_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        match rest.find(|c: char| c == '\n' || c == '\r') {
            Some(idx) => {
                lines.push(&rest[..idx]);
                let width = if rest[idx..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[idx + width..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }
    lines
}

fn skip_reason(path: &Path, err: &io::Error) -> SkipReason {
    match err.kind() {
        io::ErrorKind::InvalidData => SkipReason::NotText(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => SkipReason::AccessDenied(path.to_path_buf()),
        _ => SkipReason::Unreadable(path.to_path_buf(), err.to_string()),
    }
}

/// Reads a whole file as UTF-8 text, for display commands.
pub fn read_text(path: &Path) -> Result<String> {
    let mut content = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut content))
        .map_err(|err| CoreError::io(path, err))?;
    Ok(content)
}
