//! Interactive command prompt wired to the recycle bin and the search engine.

use crate::errors::CoreError;
use crate::fs::{copy_file, FileSystem, RealFileSystem};
use crate::helpers::{canonical_or_relaxed, list_drives, print_size, serialize_system_time};
use crate::models::CommandKind;
use crate::recycle_bin::RecycleBin;
use crate::search::{read_text, resolve_search_root, ContentSearch};
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const RULE_WIDTH: usize = 40;

/// Whether the prompt loop keeps going after a command.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A command prompt with its own working directory, reading commands from
/// `input` and writing everything user-facing to `output`.
pub struct Shell<R, W, F: FileSystem = RealFileSystem> {
    input: R,
    output: W,
    cwd: PathBuf,
    bin: RecycleBin<F>,
}

impl<R: BufRead, W: Write, F: FileSystem> Shell<R, W, F> {
    pub fn new(input: R, output: W, cwd: PathBuf, bin: RecycleBin<F>) -> Self {
        Self {
            input,
            output,
            cwd,
            bin,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Runs the prompt loop until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Welcome to the File Navigator.")?;
        writeln!(self.output, "Type 'help' for a list of commands.\n")?;

        loop {
            let label = format!("{}> ", self.cwd.display());
            let Some(line) = self.prompt(&label)? else {
                writeln!(self.output)?;
                return Ok(());
            };
            if line.is_empty() {
                continue;
            }
            if self.execute(&line)? == Flow::Exit {
                return Ok(());
            }
        }
    }

    /// Executes one command line.
    pub fn execute(&mut self, line: &str) -> io::Result<Flow> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(Flow::Continue);
        };
        let args: Vec<&str> = parts.collect();

        let Some(kind) = CommandKind::parse(word) else {
            writeln!(
                self.output,
                "'{}' is not recognized as an internal or external command.",
                word.to_ascii_lowercase()
            )?;
            return Ok(Flow::Continue);
        };
        debug!(command = %kind, ?args, "dispatching");

        match kind {
            CommandKind::Dir => self.dir()?,
            CommandKind::Cd => self.cd(&args)?,
            CommandKind::Type => self.type_file(&args)?,
            CommandKind::Drives => self.drives()?,
            CommandKind::Copy => self.copy()?,
            CommandKind::Search => self.search()?,
            CommandKind::Delete => self.delete_menu()?,
            CommandKind::Recover => match args.as_slice() {
                [] => writeln!(self.output, "The syntax of the command is incorrect.")?,
                _ => self.recover(&args.join(" "))?,
            },
            CommandKind::Bin => self.list_bin()?,
            CommandKind::Help => self.help()?,
            CommandKind::Exit => {
                writeln!(self.output, "Exiting File Navigator.")?;
                return Ok(Flow::Exit);
            }
        }
        Ok(Flow::Continue)
    }

    /// Writes `label` and reads one trimmed line. `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn resolve(&self, input: &str) -> PathBuf {
        self.cwd.join(input)
    }

    fn dir(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n Directory of {}\n", self.cwd.display())?;
        let entries = match fs::read_dir(&self.cwd) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                return writeln!(self.output, "Access denied.");
            }
            Err(err) => return writeln!(self.output, "{}", CoreError::io(&self.cwd, err).report()),
        };
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.metadata() {
                Ok(meta) if meta.is_dir() => writeln!(self.output, "<DIR>        {name}")?,
                Ok(meta) if meta.is_file() => {
                    writeln!(self.output, "{:>12} {name}", print_size(meta.len()))?
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn cd(&mut self, args: &[&str]) -> io::Result<()> {
        match args {
            [] => writeln!(self.output, "{}", self.cwd.display()),
            [".."] => {
                if let Some(parent) = self.cwd.parent() {
                    self.cwd = parent.to_path_buf();
                }
                Ok(())
            }
            [drive] if drive.ends_with(':') => {
                let root = PathBuf::from(format!("{}\\", drive.to_ascii_uppercase()));
                if root.is_dir() {
                    self.cwd = root;
                    Ok(())
                } else {
                    writeln!(
                        self.output,
                        "The system cannot find the drive specified: '{}'",
                        root.display()
                    )
                }
            }
            _ => {
                let target = self.resolve(&args.join(" "));
                if target.is_dir() {
                    self.cwd = canonical_or_relaxed(&target);
                    Ok(())
                } else {
                    writeln!(
                        self.output,
                        "The system cannot find the path specified: '{}'",
                        target.display()
                    )
                }
            }
        }
    }

    fn type_file(&mut self, args: &[&str]) -> io::Result<()> {
        if args.is_empty() {
            return writeln!(self.output, "The syntax of the command is incorrect.");
        }
        let name = args.join(" ");
        let path = self.resolve(&name);
        if !path.is_file() {
            return writeln!(self.output, "The system cannot find the file specified: '{name}'");
        }
        match read_text(&path) {
            Ok(content) => {
                let rule = "-".repeat(RULE_WIDTH);
                writeln!(self.output, "\n{rule}")?;
                writeln!(self.output, "{content}")?;
                writeln!(self.output, "{rule}")
            }
            Err(err) => {
                debug!(error = %err.report(), "type failed");
                writeln!(self.output, "Could not read the file '{name}'.")
            }
        }
    }

    fn drives(&mut self) -> io::Result<()> {
        let drives = list_drives();
        if drives.is_empty() {
            return writeln!(self.output, "No drives found.");
        }
        writeln!(self.output, "Available drives:")?;
        for drive in drives {
            writeln!(self.output, "  {}", drive.display())?;
        }
        Ok(())
    }

    fn copy(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- File Copy ---")?;
        let Some(source) = self.prompt("Enter the full path of the source file: ")? else {
            return Ok(());
        };
        let Some(destination) =
            self.prompt("Enter the full path of the destination file (including the new name): ")?
        else {
            return Ok(());
        };
        let source = self.resolve(&source);
        let destination = self.resolve(&destination);

        if !source.is_file() {
            return writeln!(self.output, "Source file '{}' does not exist.", source.display());
        }
        if let Some(parent) = destination.parent().filter(|p| !p.exists()) {
            writeln!(
                self.output,
                "Destination directory '{}' does not exist. Creating it.",
                parent.display()
            )?;
        }
        match copy_file(&RealFileSystem, &source, &destination) {
            Ok(_) => writeln!(
                self.output,
                "File '{}' successfully copied to '{}'.",
                source.display(),
                destination.display()
            ),
            Err(err) => writeln!(self.output, "An error occurred: {}", err.report()),
        }
    }

    fn search(&mut self) -> io::Result<()> {
        writeln!(self.output, "\n--- File Search ---")?;
        let Some(base) = self.prompt("Enter base directory path: ")? else {
            return Ok(());
        };
        let Some(sub) = self.prompt("Enter subdirectory path (relative to base directory): ")?
        else {
            return Ok(());
        };
        let Some(pattern) = self.prompt("Enter search term or regex pattern: ")? else {
            return Ok(());
        };
        let Some(recursive) = self.prompt("Search recursively? (yes/no): ")? else {
            return Ok(());
        };
        let recursive = recursive.eq_ignore_ascii_case("yes");

        let root = resolve_search_root(&self.resolve(&base), &sub);
        let result = ContentSearch::new(&pattern).and_then(|engine| {
            if root.is_dir() {
                writeln!(self.output, "Searching in: {}", root.display())
                    .map_err(|err| CoreError::io(&root, err))?;
            }
            engine.run(&root, recursive)
        });

        match result {
            Ok(result) if result.is_empty() => writeln!(self.output, "No matches found."),
            Ok(result) => {
                writeln!(self.output, "Found {} matches:", result.count())?;
                for m in &result.matches {
                    writeln!(
                        self.output,
                        "File: {}, Line: {}, Content: {}",
                        m.file_path.display(),
                        m.line_number,
                        m.line_content
                    )?;
                }
                Ok(())
            }
            Err(CoreError::DirectoryNotFound(dir)) => {
                writeln!(self.output, "The directory '{}' does not exist.", dir.display())
            }
            Err(CoreError::InvalidPattern { pattern, source }) => {
                writeln!(self.output, "Invalid search pattern '{pattern}': {source}")
            }
            Err(err) => writeln!(self.output, "Search failed: {}", err.report()),
        }
    }

    fn delete_menu(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nFile Management System")?;
        writeln!(self.output, "1. Delete a file")?;
        writeln!(self.output, "2. Recover a file")?;
        let Some(choice) = self.prompt("Enter your choice (1/2): ")? else {
            return Ok(());
        };
        match choice.as_str() {
            "1" => {
                let Some(path) = self.prompt("Enter the full path of the file to delete: ")? else {
                    return Ok(());
                };
                self.soft_delete(&path)
            }
            "2" => {
                let Some(name) = self.prompt("Enter the name of the file to recover: ")? else {
                    return Ok(());
                };
                self.recover(&name)
            }
            _ => writeln!(self.output, "Invalid choice. Please enter 1, 2."),
        }
    }

    fn soft_delete(&mut self, path: &str) -> io::Result<()> {
        let path = self.resolve(path);
        match self.bin.soft_delete(&path) {
            Ok(entry) => writeln!(
                self.output,
                "File moved to recycle bin: {}",
                entry.staged_path.display()
            ),
            Err(CoreError::NotFound(_)) => writeln!(self.output, "File not found!"),
            Err(err) => writeln!(self.output, "Error moving file to recycle bin: {}", err.report()),
        }
    }

    fn recover(&mut self, name: &str) -> io::Result<()> {
        match self.bin.restore(name, &self.cwd) {
            Ok(destination) => {
                writeln!(self.output, "File recovered to: {}", destination.display())
            }
            Err(CoreError::NotFound(_)) => writeln!(self.output, "File not found in recycle bin!"),
            Err(err) => writeln!(self.output, "Error recovering file: {}", err.report()),
        }
    }

    fn list_bin(&mut self) -> io::Result<()> {
        let entries = match self.bin.entries() {
            Ok(entries) => entries,
            Err(err) => return writeln!(self.output, "Could not read the recycle bin: {}", err.report()),
        };
        if entries.is_empty() {
            return writeln!(self.output, "The recycle bin is empty.");
        }
        writeln!(self.output, "Recycle bin: {}", self.bin.staging_dir().display())?;
        for entry in entries {
            let modified = entry
                .modified
                .map(serialize_system_time)
                .unwrap_or_else(|| "????-??-?? ??:??:??".to_string());
            writeln!(
                self.output,
                "{modified} {:>10} {}",
                print_size(entry.size_bytes),
                entry.name
            )?;
        }
        Ok(())
    }

    fn help(&mut self) -> io::Result<()> {
        writeln!(self.output, "\nAvailable Commands:")?;
        for kind in CommandKind::ALL {
            let usage = match kind {
                CommandKind::Cd => "cd [path]".to_string(),
                CommandKind::Type => "type [file]".to_string(),
                CommandKind::Recover => "recover [name]".to_string(),
                other => other.as_str().to_string(),
            };
            writeln!(self.output, "  {usage:<16}{}", kind.usage())?;
        }
        writeln!(self.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    struct Fixture {
        root: TempDir,
        bin_dir: PathBuf,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let bin_dir = root.path().join("bin");
        fs::create_dir(root.path().join("work")).unwrap();
        Fixture { root, bin_dir }
    }

    impl Fixture {
        fn work(&self) -> PathBuf {
            self.root.path().join("work")
        }

        /// Runs a scripted session starting in `work/` and returns its output.
        fn session(&self, script: &str) -> (String, PathBuf) {
            let bin = RecycleBin::new(&Config::new(&self.bin_dir));
            let mut out = Vec::new();
            let cwd = {
                let mut shell = Shell::new(script.as_bytes(), &mut out, self.work(), bin);
                shell.run().unwrap();
                shell.cwd().to_path_buf()
            };
            (String::from_utf8(out).unwrap(), cwd)
        }
    }

    #[test]
    fn unknown_command_is_reported() {
        let fx = fixture();
        let (out, _) = fx.session("frobnicate\nexit\n");
        assert!(out.contains("'frobnicate' is not recognized as an internal or external command."));
        assert!(out.contains("Exiting File Navigator."));
    }

    #[test]
    fn end_of_input_exits() {
        let fx = fixture();
        let (out, _) = fx.session("\n\n");
        assert!(out.contains("Welcome"));
    }

    #[test]
    fn cd_moves_between_directories() {
        let fx = fixture();
        fs::create_dir(fx.work().join("sub dir")).unwrap();
        let (_, cwd) = fx.session("cd sub dir\n");
        assert!(cwd.ends_with("sub dir"));

        let (_, cwd) = fx.session("cd ..\n");
        assert_eq!(cwd, fx.root.path());

        let (out, cwd) = fx.session("cd missing\n");
        assert!(out.contains("The system cannot find the path specified"));
        assert_eq!(cwd, fx.work());
    }

    #[cfg(unix)]
    #[test]
    fn cd_to_missing_drive_is_reported() {
        let fx = fixture();
        let (out, cwd) = fx.session("cd q:\n");
        assert!(out.contains("The system cannot find the drive specified: 'Q:\\'"));
        assert_eq!(cwd, fx.work());
    }

    #[test]
    fn dir_lists_entries() {
        let fx = fixture();
        fs::write(fx.work().join("a.txt"), "aaa").unwrap();
        fs::create_dir(fx.work().join("nested")).unwrap();
        let (out, _) = fx.session("DIR\n");
        assert!(out.contains("<DIR>        nested"));
        assert!(out.contains("3 B a.txt"));
    }

    #[test]
    fn type_prints_file_between_rules() {
        let fx = fixture();
        fs::write(fx.work().join("a.txt"), "hello world").unwrap();
        fs::write(fx.work().join("bad.txt"), b"\xff\xfe").unwrap();
        let (out, _) = fx.session("type a.txt\ntype bad.txt\ntype nope.txt\ntype\n");
        assert!(out.contains(&format!("{}\nhello world\n{}", "-".repeat(40), "-".repeat(40))));
        assert!(out.contains("Could not read the file 'bad.txt'."));
        assert!(out.contains("The system cannot find the file specified: 'nope.txt'"));
        assert!(out.contains("The syntax of the command is incorrect."));
    }

    #[test]
    fn copy_prompts_and_copies() {
        let fx = fixture();
        fs::write(fx.work().join("a.txt"), "data").unwrap();
        let (out, _) = fx.session("copy\na.txt\nbackup/b.txt\n");
        assert!(out.contains("Creating it."));
        assert!(out.contains("successfully copied"));
        assert_eq!(fs::read_to_string(fx.work().join("backup/b.txt")).unwrap(), "data");
    }

    #[test]
    fn search_prints_matches() {
        let fx = fixture();
        fs::write(fx.work().join("a.txt"), "one needle\n").unwrap();
        let script = format!("search\n{}\n\nneedle\nyes\n", fx.work().display());
        let (out, _) = fx.session(&script);
        assert!(out.contains("Found 1 matches:"));
        assert!(out.contains("Line: 1, Content: one needle"));
    }

    #[test]
    fn search_reports_missing_directory_and_bad_pattern() {
        let fx = fixture();
        let (out, _) = fx.session("search\n.\nmissing\nx\nno\nsearch\n.\n\n(\nno\n");
        assert!(out.contains("does not exist."));
        assert!(out.contains("Invalid search pattern '('"));
    }

    #[test]
    fn delete_and_recover_round_trip() {
        let fx = fixture();
        fs::write(fx.work().join("report.txt"), "hello").unwrap();

        let (out, _) = fx.session("delete\n1\nreport.txt\nbin\n");
        assert!(out.contains("File moved to recycle bin:"));
        assert!(out.contains("report.txt"));
        assert!(!fx.work().join("report.txt").exists());
        assert!(fx.bin_dir.join("report.txt").exists());

        let (out, _) = fx.session("recover report.txt\n");
        assert!(out.contains("File recovered to:"));
        assert_eq!(fs::read_to_string(fx.work().join("report.txt")).unwrap(), "hello");
    }

    #[test]
    fn delete_menu_reports_missing_files() {
        let fx = fixture();
        let (out, _) = fx.session("delete\n1\nnope.txt\ndelete\n2\nnope.txt\ndelete\n3\nbin\n");
        assert!(out.contains("File not found!"));
        assert!(out.contains("File not found in recycle bin!"));
        assert!(out.contains("Invalid choice. Please enter 1, 2."));
        assert!(out.contains("The recycle bin is empty."));
    }

    #[test]
    fn help_lists_every_command() {
        let fx = fixture();
        let (out, _) = fx.session("help\n");
        for kind in CommandKind::ALL {
            assert!(out.contains(kind.usage()), "{kind}");
        }
    }
}
