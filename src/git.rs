use crate::constants::{MAX_BRANCH_NAME_LENGTH, PROTECTED_BRANCHES};
use crate::debug;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use thiserror::Error;

/// characters git refuses in ref names
const INVALID_BRANCH_CHARS: [char; 8] = ['~', '^', ':', '?', '*', '[', ']', '\\'];

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("git {operation} failed ({}){}", exit_detail(.code), stderr_detail(.stderr))]
    Failed {
        operation: &'static str,
        code: Option<i32>,
        stderr: String,
    },
}

impl GitError {
    pub fn operation(&self) -> &'static str {
        match self {
            GitError::Spawn { operation, .. } | GitError::Failed { operation, .. } => operation,
        }
    }
}

fn exit_detail(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => String::from("terminated by signal"),
    }
}

fn stderr_detail(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// operations the session needs from version control
///
/// read operations capture stdout; everything else inherits the terminal so
/// hooks, signing prompts, and push progress reach the user
pub trait Vcs {
    /// raw `status --porcelain` output
    fn status(&self) -> Result<String, GitError>;
    fn current_branch(&self) -> Result<String, GitError>;
    fn create_branch(&self, name: &str) -> Result<(), GitError>;
    fn checkout_branch(&self, name: &str) -> Result<(), GitError>;
    /// false when the probe fails for any reason
    fn local_branch_exists(&self, name: &str) -> bool;
    /// no-op when `paths` is empty
    fn stage(&self, paths: &[&str]) -> Result<(), GitError>;
    fn commit(&self, message: &str) -> Result<(), GitError>;
    /// false when the probe fails for any reason
    fn remote_branch_exists(&self, name: &str) -> bool;
    fn push(&self, name: &str, set_upstream: bool) -> Result<(), GitError>;
    /// remote used by `push` and `remote_branch_exists`
    fn remote(&self) -> &str;
}

pub fn is_protected_branch(name: &str) -> bool {
    PROTECTED_BRANCHES.contains(&name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BranchNameError {
    #[error("branch name cannot be empty")]
    Empty,
    #[error("branch name too long (max {MAX_BRANCH_NAME_LENGTH} characters)")]
    TooLong,
    #[error("branch name cannot contain spaces")]
    ContainsSpace,
    #[error("branch name cannot contain '{0}'")]
    InvalidCharacter(char),
    #[error("branch name cannot start with '.' or '/'")]
    InvalidStart,
    #[error("branch name cannot end with '/' or '.lock'")]
    InvalidEnding,
}

/// check a new branch name, reporting the first rule it breaks
pub fn validate_branch_name(name: &str) -> Result<(), BranchNameError> {
    if name.is_empty() {
        return Err(BranchNameError::Empty);
    }
    if name.chars().count() > MAX_BRANCH_NAME_LENGTH {
        return Err(BranchNameError::TooLong);
    }
    if name.contains(' ') {
        return Err(BranchNameError::ContainsSpace);
    }
    if let Some(c) = name.chars().find(|c| INVALID_BRANCH_CHARS.contains(c)) {
        return Err(BranchNameError::InvalidCharacter(c));
    }
    if name.starts_with('.') || name.starts_with('/') {
        return Err(BranchNameError::InvalidStart);
    }
    if name.ends_with('/') || name.ends_with(".lock") {
        return Err(BranchNameError::InvalidEnding);
    }
    Ok(())
}

/// `Vcs` backed by the git binary
///
/// uses the git binary rather than git2 so commit signing (gpg/ssh), hooks,
/// and credential helpers work as they do on the command line
pub struct GitCli {
    dir: PathBuf,
    remote: String,
}

impl GitCli {
    pub fn new(dir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            remote: remote.into(),
        }
    }

    /// sanity check that we're inside a git work tree
    pub fn ensure_repository(&self) -> Result<(), GitError> {
        self.capture(&["rev-parse", "--is-inside-work-tree"], "rev-parse")
            .map(|_| ())
    }

    fn command(&self, args: &[&str]) -> Command {
        debug!(
            "$ git {}",
            shlex::try_join(args.iter().copied()).unwrap_or_else(|_| args.join(" "))
        );
        let mut cmd = Command::new("git");
        cmd.args(args).current_dir(&self.dir);
        cmd
    }

    /// run git and return its stdout
    fn capture(&self, args: &[&str], operation: &'static str) -> Result<String, GitError> {
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| GitError::Spawn { operation, source })?;
        check_output(output, operation)
    }

    /// run git with stdio inherited from the terminal
    fn passthrough(&self, args: &[&str], operation: &'static str) -> Result<(), GitError> {
        let status = self
            .command(args)
            .status()
            .map_err(|source| GitError::Spawn { operation, source })?;

        if status.success() {
            Ok(())
        } else {
            Err(GitError::Failed {
                operation,
                code: status.code(),
                stderr: String::new(),
            })
        }
    }

    /// run git silently, reporting only whether it succeeded
    fn probe(&self, args: &[&str]) -> bool {
        self.command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    }
}

fn check_output(output: Output, operation: &'static str) -> Result<String, GitError> {
    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(GitError::Failed {
            operation,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

impl Vcs for GitCli {
    fn status(&self) -> Result<String, GitError> {
        self.capture(&["status", "--porcelain"], "status")
    }

    fn current_branch(&self) -> Result<String, GitError> {
        self.capture(&["branch", "--show-current"], "branch")
            .map(|out| out.trim().to_string())
    }

    fn create_branch(&self, name: &str) -> Result<(), GitError> {
        self.passthrough(&["checkout", "-b", name], "checkout -b")
    }

    fn checkout_branch(&self, name: &str) -> Result<(), GitError> {
        self.passthrough(&["checkout", name], "checkout")
    }

    fn local_branch_exists(&self, name: &str) -> bool {
        let reference = format!("refs/heads/{name}");
        self.probe(&["show-ref", "--verify", "--quiet", &reference])
    }

    fn stage(&self, paths: &[&str]) -> Result<(), GitError> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.passthrough(&args, "add")
    }

    fn commit(&self, message: &str) -> Result<(), GitError> {
        self.passthrough(&["commit", "--message", message], "commit")
    }

    fn remote_branch_exists(&self, name: &str) -> bool {
        let reference = format!("{}/{name}", self.remote);
        self.probe(&["rev-parse", "--verify", "--quiet", &reference])
    }

    fn push(&self, name: &str, set_upstream: bool) -> Result<(), GitError> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(self.remote.as_str());
        args.push(name);
        self.passthrough(&args, "push")
    }

    fn remote(&self) -> &str {
        &self.remote
    }
}
