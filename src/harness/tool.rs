//! External archiver invocation.
//!
//! The verifier never writes containers itself; archives under test come
//! from the platform's `zip` executable. This wrapper only builds the
//! command line, runs it with discarded output, and maps the exit status.
//! A non-zero status is reported upstream as [`ExternalToolError`] and
//! never retried.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::ExternalToolError;

/// Handle to the external `zip` executable.
pub struct ZipTool {
    program: PathBuf,
}

impl Default for ZipTool {
    fn default() -> Self {
        let exe = if cfg!(windows) { "zip.exe" } else { "zip" };
        ZipTool::new(exe)
    }
}

impl ZipTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ZipTool {
            program: program.into(),
        }
    }

    /// Probe for the executable by running `zip -h`.
    ///
    /// Used by callers (and the test suite) to skip archiver-dependent
    /// work on hosts without the tool.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("-h")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }

    /// Archive a single member: `zip <archive> <member>`, run from `cwd`
    /// so stored names stay relative.
    pub fn create(&self, cwd: &Path, archive: &str, member: &str) -> Result<(), ExternalToolError> {
        self.run(cwd, &[archive, member])
    }

    /// Archive a tree recursively: `zip -r <archive> <member>`.
    pub fn create_recursive(
        &self,
        cwd: &Path,
        archive: &str,
        member: &str,
    ) -> Result<(), ExternalToolError> {
        self.run(cwd, &["-r", archive, member])
    }

    fn run(&self, cwd: &Path, args: &[&str]) -> Result<(), ExternalToolError> {
        debug!(program = %self.program.display(), ?args, "invoking archiver");
        let status = Command::new(&self.program)
            .args(args)
            .current_dir(cwd)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|source| ExternalToolError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(ExternalToolError::Failed {
                program: self.program.display().to_string(),
                status,
            })
        }
    }
}
