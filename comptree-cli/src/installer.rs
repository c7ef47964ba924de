//! Copies generated scripts into the system's bash completion directory.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use comptree_core::trace_categories;

/// Errors raised while installing or uninstalling a script.
#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    /// None of the target directories exist.
    #[error("cannot determine system completions directory")]
    NoCompletionsDirectory,

    /// No script was given to install.
    #[error("no script to install")]
    NoScript,

    /// The script to install does not exist.
    #[error("cannot find script: {}", .0.display())]
    ScriptNotFound(PathBuf),

    /// A script is already installed and `force` was not given.
    #[error("file exists: {} (use --force to overwrite)", .0.display())]
    TargetExists(PathBuf),

    /// The script could not be staged in a temporary file.
    #[error("failed to stage script: {0}")]
    Staging(#[source] std::io::Error),

    /// The install or uninstall command could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        /// The command line.
        command: String,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The install or uninstall command exited unsuccessfully.
    #[error("'{command}' failed ({status})")]
    CommandFailed {
        /// The command line.
        command: String,
        /// How the command exited.
        status: ExitStatus,
    },
}

/// Installs and uninstalls the completion script for one program.
#[derive(Debug, bon::Builder)]
pub struct Installer {
    /// Name of the program the script completes; also the installed file name.
    #[builder(into)]
    program: String,

    /// Path of the script to install. Not needed to uninstall.
    #[builder(into)]
    script_path: Option<PathBuf>,

    /// Directories searched, in order, for an existing completions directory.
    #[builder(default = default_target_directories())]
    target_directories: Vec<PathBuf>,

    /// Prefix commands with `sudo` when not running as root.
    #[builder(default = true)]
    use_sudo: bool,

    /// Keeps a staged script alive for as long as the installer.
    staged: Option<tempfile::NamedTempFile>,
}

impl Installer {
    /// Creates an installer for a script read from `reader`, staged in a
    /// temporary file that lives as long as the returned installer.
    ///
    /// # Arguments
    ///
    /// * `program` - Name of the program the script completes.
    /// * `reader` - Source of the script text.
    /// * `target_directories` - Directories to search, or `None` for the defaults.
    /// * `use_sudo` - Whether to prefix commands with `sudo` when not root.
    pub fn from_reader(
        program: impl Into<String>,
        mut reader: impl Read,
        target_directories: Option<Vec<PathBuf>>,
        use_sudo: bool,
    ) -> Result<Self, InstallError> {
        let mut staged = tempfile::Builder::new()
            .prefix("comptree-")
            .suffix(".bash")
            .tempfile()
            .map_err(InstallError::Staging)?;

        std::io::copy(&mut reader, staged.as_file_mut()).map_err(InstallError::Staging)?;

        tracing::debug!(
            target: trace_categories::INSTALL,
            "staged script at {}",
            staged.path().display()
        );

        Ok(Self::builder()
            .program(program)
            .script_path(staged.path())
            .maybe_target_directories(target_directories)
            .use_sudo(use_sudo)
            .staged(staged)
            .build())
    }

    /// The directories searched for the completions directory.
    pub fn target_directories(&self) -> &[PathBuf] {
        &self.target_directories
    }

    /// The script this installer copies.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }

    /// The first target directory that exists.
    pub fn completions_path(&self) -> Option<&Path> {
        self.target_directories
            .iter()
            .map(PathBuf::as_path)
            .find(|dir| dir.is_dir())
    }

    /// Where the script will be installed, if a completions directory exists.
    pub fn target_path(&self) -> Option<PathBuf> {
        self.completions_path().map(|dir| dir.join(&self.program))
    }

    /// The command line that installs the script.
    pub fn install_command(&self) -> Result<Vec<String>, InstallError> {
        let script_path = self.script_path().ok_or(InstallError::NoScript)?;
        let target_path = self.target_path().ok_or(InstallError::NoCompletionsDirectory)?;

        let mut command = self.command_prefix();
        command.extend([
            String::from("cp"),
            script_path.display().to_string(),
            target_path.display().to_string(),
        ]);
        Ok(command)
    }

    /// The install command line, joined for display.
    pub fn install_command_string(&self) -> Result<String, InstallError> {
        Ok(self.install_command()?.join(" "))
    }

    /// The command line that removes the script from every target directory.
    pub fn uninstall_command(&self) -> Vec<String> {
        let mut command = self.command_prefix();
        command.extend([String::from("rm"), String::from("-f")]);
        command.extend(
            self.target_directories
                .iter()
                .map(|dir| dir.join(&self.program).display().to_string()),
        );
        command
    }

    /// The uninstall command line, joined for display.
    pub fn uninstall_command_string(&self) -> String {
        self.uninstall_command().join(" ")
    }

    /// Copies the script into the completions directory.
    ///
    /// # Arguments
    ///
    /// * `force` - Overwrite an existing script.
    pub fn install(&self, force: bool) -> Result<PathBuf, InstallError> {
        let script_path = self.script_path().ok_or(InstallError::NoScript)?;
        let target_path = self.target_path().ok_or(InstallError::NoCompletionsDirectory)?;

        if !script_path.exists() {
            return Err(InstallError::ScriptNotFound(script_path.to_path_buf()));
        }

        if target_path.exists() && !force {
            return Err(InstallError::TargetExists(target_path));
        }

        run(&self.install_command()?)?;
        Ok(target_path)
    }

    /// Removes the script from every target directory.
    pub fn uninstall(&self) -> Result<(), InstallError> {
        run(&self.uninstall_command())
    }

    fn command_prefix(&self) -> Vec<String> {
        if self.use_sudo && !is_root() {
            vec![String::from("sudo")]
        } else {
            vec![]
        }
    }
}

/// Returns the standard bash completion directories, system-wide ones first.
pub fn default_target_directories() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/bash-completion/completions"),
        PathBuf::from("/usr/local/etc/bash_completion.d"),
    ];

    if let Ok(home) = etcetera::home_dir() {
        dirs.push(home.join(".local/share/bash-completion/completions"));
        dirs.push(home.join(".bash_completion.d"));
    }

    dirs
}

fn run(command: &[String]) -> Result<(), InstallError> {
    let command_line = command.join(" ");
    tracing::debug!(target: trace_categories::INSTALL, "running: {command_line}");

    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };

    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| InstallError::Spawn {
            command: command_line.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(InstallError::CommandFailed {
            command: command_line,
            status,
        })
    }
}

#[cfg(unix)]
fn is_root() -> bool {
    uzers::get_current_uid() == 0
}

#[cfg(not(unix))]
const fn is_root() -> bool {
    false
}
