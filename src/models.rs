use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::SystemTime;

/// Console command being dispatched.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum CommandKind {
    Dir,
    Cd,
    Type,
    Drives,
    Copy,
    Search,
    Delete,
    Recover,
    Bin,
    Help,
    Exit,
}

impl CommandKind {
    pub const ALL: [CommandKind; 11] = [
        Self::Dir,
        Self::Cd,
        Self::Type,
        Self::Drives,
        Self::Copy,
        Self::Search,
        Self::Delete,
        Self::Recover,
        Self::Bin,
        Self::Help,
        Self::Exit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dir => "dir",
            Self::Cd => "cd",
            Self::Type => "type",
            Self::Drives => "drives",
            Self::Copy => "copy",
            Self::Search => "search",
            Self::Delete => "delete",
            Self::Recover => "recover",
            Self::Bin => "bin",
            Self::Help => "help",
            Self::Exit => "exit",
        }
    }

    /// Parses a command word, ignoring ASCII case.
    pub fn parse(word: &str) -> Option<Self> {
        let word = word.to_ascii_lowercase();
        Self::ALL.into_iter().find(|kind| kind.as_str() == word)
    }

    pub fn usage(&self) -> &'static str {
        match self {
            Self::Dir => "List directory contents",
            Self::Cd => "Change the current directory or switch drives (e.g., 'cd D:')",
            Self::Type => "Display the contents of a file",
            Self::Drives => "List all available drives",
            Self::Copy => "Copy a file (source -> destination)",
            Self::Search => "Search for a term in files within a directory",
            Self::Delete => "For deletion and recovery of file",
            Self::Recover => "Recover a file from the recycle bin into the current directory",
            Self::Bin => "List files held in the recycle bin",
            Self::Help => "Show this help message",
            Self::Exit => "Exit the program",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A file currently held in the staging directory, as returned by a soft delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedEntry {
    pub original_path: PathBuf,
    /// Base name of the file, its key inside the staging directory.
    pub staged_name: String,
    pub staged_path: PathBuf,
    pub size_bytes: Option<u64>,
    pub deleted_at: DateTime<Utc>,
}

impl StagedEntry {
    pub fn new(original_path: PathBuf, staged_name: String, staged_path: PathBuf) -> Self {
        Self {
            original_path,
            staged_name,
            staged_path,
            size_bytes: None,
            deleted_at: Utc::now(),
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }
}

/// A file found in the staging directory when listing its contents.
#[derive(Debug, Clone)]
pub struct StagedFile {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: Option<SystemTime>,
}

/// One line in one file that satisfies the search pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMatch {
    pub file_path: PathBuf,
    /// 1-based line ordinal within the file.
    pub line_number: usize,
    /// The matched line, whitespace-trimmed.
    pub line_content: String,
}

/// Ordered matches of one search invocation, in traversal order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
    pub matches: Vec<SearchMatch>,
    pub files_scanned: usize,
    pub files_skipped: usize,
}

impl SearchResult {
    pub fn count(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Why a file was left out of a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Content is not valid UTF-8 or looks binary.
    NotText(PathBuf),
    /// Opening or reading was refused by the OS.
    AccessDenied(PathBuf),
    /// Any other read failure (file vanished, device error).
    Unreadable(PathBuf, String),
}

impl SkipReason {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::NotText(path) | Self::AccessDenied(path) | Self::Unreadable(path, _) => path,
        }
    }
}

/// Outcome of scanning a single file.
#[derive(Debug, Clone)]
pub enum FileScan {
    Scanned(Vec<SearchMatch>),
    Skipped(SkipReason),
}
