//! Interactive editor collaborator.

use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

/// Editor invocation failure.
#[derive(Debug)]
pub enum EditorError {
    /// The editor command line is blank.
    NotConfigured,
    /// The editor process could not be started.
    Spawn { program: String, source: io::Error },
    /// The editor exited unsuccessfully; `None` when killed by a signal.
    ExitStatus(Option<i32>),
}

impl Display for EditorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "no editor configured; set EDITOR"),
            Self::Spawn { program, source } => {
                write!(f, "failed to start editor `{program}`: {source}")
            }
            Self::ExitStatus(Some(code)) => write!(f, "editor exited with status {code}"),
            Self::ExitStatus(None) => write!(f, "editor terminated by signal"),
        }
    }
}

impl Error for EditorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Opens a file for interactive editing and blocks until done.
pub trait Editor {
    fn edit(&self, path: &Path) -> Result<(), EditorError>;
}

/// Runs `{command} {path}` with inherited stdin/stdout/stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEditor {
    command: String,
}

impl ProcessEditor {
    /// `command` may carry arguments, e.g. `code --wait`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Editor for ProcessEditor {
    fn edit(&self, path: &Path) -> Result<(), EditorError> {
        let mut words = self.command.split_whitespace();
        let program = words.next().ok_or(EditorError::NotConfigured)?;

        let started_at = Instant::now();
        info!("event=editor_run module=process status=start program={program}");
        let status = Command::new(program)
            .args(words)
            .arg(path)
            .status()
            .map_err(|source| EditorError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            error!(
                "event=editor_run module=process status=error program={program} exit_code={:?} duration_ms={}",
                status.code(),
                started_at.elapsed().as_millis()
            );
            return Err(EditorError::ExitStatus(status.code()));
        }
        info!(
            "event=editor_run module=process status=ok program={program} duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Editor, EditorError, ProcessEditor};
    use std::path::Path;

    #[test]
    fn blank_command_is_not_configured() {
        let err = ProcessEditor::new("   ").edit(Path::new("x.md")).unwrap_err();
        assert!(matches!(err, EditorError::NotConfigured));
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let err = ProcessEditor::new("datebook-no-such-editor-binary")
            .edit(Path::new("x.md"))
            .unwrap_err();
        assert!(matches!(err, EditorError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn exit_status_is_checked() {
        ProcessEditor::new("true")
            .edit(Path::new("x.md"))
            .expect("`true` should succeed");
        let err = ProcessEditor::new("false")
            .edit(Path::new("x.md"))
            .unwrap_err();
        assert!(matches!(err, EditorError::ExitStatus(Some(1))));
    }
}
