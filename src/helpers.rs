//! Shared utility helpers for console output and path handling.

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

/// Timestamp format used when printing staged files.
pub const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders a modification time in local time for listings.
pub fn serialize_system_time(time: SystemTime) -> String {
    let dt = DateTime::<Local>::from(time);
    dt.format(LISTING_TIME_FORMAT).to_string()
}

/// Human readable size rendering shared across commands.
pub fn print_size(bytes: u64) -> String {
    const SUFFIXES: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut idx = 0usize;

    while value >= 1024.0 && idx < SUFFIXES.len() - 1 {
        value /= 1024.0;
        idx += 1;
    }

    if idx == 0 {
        format!("{:.0} {}", value, SUFFIXES[idx])
    } else {
        format!("{:.1} {}", value, SUFFIXES[idx])
    }
}

/// Returns a normalized path by resolving `.` and `..` segments where possible.
pub fn canonical_or_relaxed(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// True when `name` is a single plain file name that cannot escape a directory.
pub fn is_bare_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    )
}

/// Available drive roots. Drive letters on Windows, mount points elsewhere.
pub fn list_drives() -> Vec<PathBuf> {
    if cfg!(windows) {
        ('A'..='Z')
            .map(|letter| PathBuf::from(format!("{letter}:\\")))
            .filter(|root| root.exists())
            .collect()
    } else {
        list_mount_points()
    }
}

fn list_mount_points() -> Vec<PathBuf> {
    fs::read_to_string("/proc/self/mounts")
        .map(|content| {
            content
                .lines()
                .filter_map(|line| {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    (fields.len() >= 2).then(|| PathBuf::from(unescape_mountpoint(fields[1])))
                })
                .filter(|path| path.exists())
                .collect()
        })
        .unwrap_or_else(|_| vec![PathBuf::from("/")])
}

fn unescape_mountpoint(value: &str) -> String {
    value
        .replace("\\011", "\t")
        .replace("\\012", "\n")
        .replace("\\040", " ")
        .replace("\\134", "\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn print_size_scales_units() {
        assert_eq!(print_size(0), "0 B");
        assert_eq!(print_size(1023), "1023 B");
        assert_eq!(print_size(1536), "1.5 K");
        assert_eq!(print_size(5 * 1024 * 1024), "5.0 M");
    }

    #[test]
    fn bare_file_names() {
        assert!(is_bare_file_name("report.txt"));
        assert!(is_bare_file_name(".hidden"));
        assert!(!is_bare_file_name(""));
        assert!(!is_bare_file_name(".."));
        assert!(!is_bare_file_name("."));
        assert!(!is_bare_file_name("a/b.txt"));
        assert!(!is_bare_file_name("/etc/passwd"));
        assert!(!is_bare_file_name("./a.txt"));
    }

    #[test]
    fn mountpoint_escapes_are_decoded() {
        assert_eq!(unescape_mountpoint("/mnt/my\\040disk"), "/mnt/my disk");
    }
}
