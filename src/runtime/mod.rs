//! Runtime abstraction for system operations.
//!
//! Everything the installer does to the outside world (file system,
//! well-known directories, interactive prompts, child processes) goes through the
//! [`Runtime`] trait so the reconciliation logic can be exercised against
//! a strict mock.
//!
//! # Structure
//!
//! - `env` - Well-known directories
//! - `fs` - File system operations (read, write, directory)
//! - `process` - Running external programs
//! - `user` - User interaction (confirmation prompts)

mod env;
mod fs;
mod process;
mod user;

use anyhow::Result;
use std::path::{Path, PathBuf};

#[cfg_attr(test, mockall::automock)]
pub trait Runtime: Send + Sync {
    // File System
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()>;
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn create_dir_all(&self, path: &Path) -> Result<()>;
    fn remove_file(&self, path: &Path) -> Result<()>;
    fn remove_dir_all(&self, path: &Path) -> Result<()>;
    fn exists(&self, path: &Path) -> bool;
    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>>;
    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>>;

    /// Set file permissions (mode) on Unix systems. No-op on Windows.
    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()>;

    /// Make a path absolute against the current directory without touching
    /// the file system (the path does not need to exist yet).
    fn absolute(&self, path: &Path) -> Result<PathBuf>;

    // Directories
    fn home_dir(&self) -> Option<PathBuf>;
    fn data_dir(&self) -> Option<PathBuf>;

    // Processes
    /// Run `program` with `args` in `cwd`, inheriting stdio.
    /// Fails if the program cannot be started or exits unsuccessfully.
    fn run_command(&self, program: &str, args: &[String], cwd: &Path) -> Result<()>;

    // User interaction
    /// Prompt user for confirmation. Returns true if user confirms (y/yes), false otherwise.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

pub struct RealRuntime;

impl Runtime for RealRuntime {
    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        self.write_impl(path, contents)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        self.read_to_string_impl(path)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.create_dir_all_impl(path)
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        self.remove_file_impl(path)
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        self.remove_dir_all_impl(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.exists_impl(path)
    }

    fn create_file(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>> {
        self.create_file_impl(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn std::io::Read + Send>> {
        self.open_impl(path)
    }

    fn set_permissions(&self, path: &Path, mode: u32) -> Result<()> {
        self.set_permissions_impl(path, mode)
    }

    fn absolute(&self, path: &Path) -> Result<PathBuf> {
        self.absolute_impl(path)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home_dir_impl()
    }

    fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir_impl()
    }

    fn run_command(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
        self.run_command_impl(program, args, cwd)
    }

    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.confirm_impl(prompt)
    }
}
