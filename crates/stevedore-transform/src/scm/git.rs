//! [`SourceControl`] backed by the `git` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use stevedore_common::constants::GIT_SUFFIX;
use stevedore_common::error::{Result, StevedoreError};

use super::SourceControl;

/// Runs `git` in the inspected directory. Every call blocks until the
/// subprocess exits; nothing is retried.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: Option<PathBuf>,
}

impl GitCli {
    /// Locates `git` on `PATH`.
    ///
    /// A missing binary is not an error here; each query then fails with
    /// [`StevedoreError::SourceControlUnavailable`].
    #[must_use]
    pub fn locate() -> Self {
        Self {
            program: which::which("git").ok(),
        }
    }

    /// Uses an explicit `git` binary.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: Some(program.into()),
        }
    }

    /// Whether a `git` binary was found.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.program.is_some()
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<Output> {
        let program = self
            .program
            .as_ref()
            .ok_or(StevedoreError::SourceControlUnavailable)?;

        if let Err(source) = std::fs::metadata(dir) {
            return Err(StevedoreError::Path {
                path: dir.to_path_buf(),
                source,
            });
        }

        tracing::debug!(dir = %dir.display(), ?args, "running git");
        isolate(Command::new(program).args(args).current_dir(dir))
            .output()
            .map_err(|e| StevedoreError::Command {
                program: program.display().to_string(),
                args: args.join(" "),
                message: e.to_string(),
            })
    }

    fn ensure_repository(&self, dir: &Path) -> Result<()> {
        let args = ["rev-parse", "--is-inside-work-tree"];
        let output = self.run(dir, &args)?;
        if output.status.success() && stdout_line(&output) == "true" {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() || stderr.contains("not a git repository") {
            return Err(StevedoreError::NotARepository {
                path: dir.to_path_buf(),
            });
        }
        Err(command_failed(&args, &output))
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::locate()
    }
}

impl SourceControl for GitCli {
    fn repository_root(&self, dir: &Path) -> Result<PathBuf> {
        self.ensure_repository(dir)?;
        let args = ["rev-parse", "--show-toplevel"];
        let output = self.run(dir, &args)?;
        if !output.status.success() {
            return Err(command_failed(&args, &output));
        }
        Ok(PathBuf::from(stdout_line(&output)))
    }

    fn current_branch(&self, dir: &Path) -> Result<String> {
        self.ensure_repository(dir)?;
        // Works on unborn branches, unlike `rev-parse --abbrev-ref HEAD`.
        let args = ["symbolic-ref", "--quiet", "--short", "HEAD"];
        let output = self.run(dir, &args)?;
        match output.status.code() {
            Some(0) => Ok(stdout_line(&output)),
            Some(1) => Err(StevedoreError::DetachedHead {
                path: dir.to_path_buf(),
            }),
            _ => Err(command_failed(&args, &output)),
        }
    }

    fn current_remote_url(&self, dir: &Path) -> Result<String> {
        let branch = self.current_branch(dir)?;
        let key = format!("branch.{branch}.remote");
        let output = self.run(dir, &["config", "--get", key.as_str()])?;
        let remote = stdout_line(&output);
        // "." marks a branch tracking another local branch.
        if !output.status.success() || remote.is_empty() || remote == "." {
            return Err(StevedoreError::NoRemoteConfigured { branch });
        }

        let output = self.run(dir, &["remote", "get-url", "--push", remote.as_str()])?;
        if !output.status.success() {
            tracing::debug!(%branch, %remote, "branch tracks an undefined remote");
            return Err(StevedoreError::NoRemoteConfigured { branch });
        }
        Ok(normalize_remote_url(&stdout_line(&output)))
    }
}

/// Rewrites a remote URL into `scheme://host/path.git` form.
///
/// scp-style `user@host:path` remotes become `ssh://user@host/path`, and a
/// missing `.git` suffix is appended.
#[must_use]
pub fn normalize_remote_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let mut url = match scp_parts(trimmed) {
        Some((host, path)) => format!("ssh://{host}/{}", path.trim_start_matches('/')),
        None => trimmed.to_string(),
    };
    if !url.ends_with(GIT_SUFFIX) {
        url.push_str(GIT_SUFFIX);
    }
    url
}

fn scp_parts(url: &str) -> Option<(&str, &str)> {
    if url.contains("://") {
        return None;
    }
    let (host, path) = url.split_once(':')?;
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some((host, path))
}

/// Pins git's messages to English and drops repository overrides inherited
/// from the caller, so `dir` alone selects the inspected repository.
fn isolate(command: &mut Command) -> &mut Command {
    command
        .env("LC_ALL", "C")
        .env_remove("LANGUAGE")
        .env_remove("GIT_DIR")
        .env_remove("GIT_WORK_TREE")
}

fn stdout_line(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn command_failed(args: &[&str], output: &Output) -> StevedoreError {
    StevedoreError::Command {
        program: "git".into(),
        args: args.join(" "),
        message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Throw-away repositories created with the real `git` binary.

    use std::path::Path;
    use std::process::Command;

    /// Whether `git` is installed; repository tests return early without it.
    pub fn git_available() -> bool {
        which::which("git").is_ok()
    }

    /// Runs `git` in `dir`, panicking on failure.
    pub fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_CONFIG_NOSYSTEM", "1")
            .env_remove("GIT_DIR")
            .env_remove("GIT_WORK_TREE")
            .status()
            .expect("spawn git");
        assert!(status.success(), "git {args:?} failed");
    }

    /// Creates a repository with branch `newbranch` tracking remote
    /// `newremote` at `https://git.test.com/somerepo`.
    pub fn repository_with_remote() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        git(dir.path(), &["init", "-q"]);
        git(
            dir.path(),
            &["remote", "add", "newremote", "https://git.test.com/somerepo"],
        );
        git(dir.path(), &["checkout", "-q", "-b", "newbranch"]);
        git(
            dir.path(),
            &["config", "branch.newbranch.remote", "newremote"],
        );
        dir
    }

    /// Records an empty commit so `HEAD` can be detached.
    pub fn commit(dir: &Path) {
        git(
            dir,
            &[
                "-c",
                "user.name=stevedore",
                "-c",
                "user.email=stevedore@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "--allow-empty",
                "-m",
                "init",
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::{commit, git, git_available, repository_with_remote};
    use super::*;

    #[test]
    fn normalize_appends_suffix() {
        assert_eq!(
            normalize_remote_url("https://git.test.com/somerepo\n"),
            "https://git.test.com/somerepo.git"
        );
    }

    #[test]
    fn normalize_keeps_existing_suffix() {
        assert_eq!(
            normalize_remote_url("https://github.com/org/repo.git"),
            "https://github.com/org/repo.git"
        );
    }

    #[test]
    fn normalize_rewrites_scp_syntax() {
        assert_eq!(
            normalize_remote_url("git@github.com:org/repo"),
            "ssh://git@github.com/org/repo.git"
        );
        assert_eq!(
            normalize_remote_url("ssh://git@github.com/org/repo.git"),
            "ssh://git@github.com/org/repo.git"
        );
    }

    #[test]
    fn missing_binary_is_unavailable() {
        let git = GitCli { program: None };
        assert!(!git.is_available());
        let err = git
            .current_branch(Path::new("."))
            .expect_err("should fail");
        assert!(matches!(err, StevedoreError::SourceControlUnavailable));
    }

    #[test]
    fn current_branch_reads_checked_out_branch() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        let branch = GitCli::locate()
            .current_branch(repo.path())
            .expect("branch");
        assert_eq!(branch, "newbranch");
    }

    #[test]
    fn current_remote_url_resolves_tracked_remote() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        let url = GitCli::locate()
            .current_remote_url(repo.path())
            .expect("remote url");
        assert_eq!(url, "https://git.test.com/somerepo.git");
    }

    #[test]
    fn untracked_branch_has_no_remote() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        git(repo.path(), &["checkout", "-q", "-b", "lonely"]);
        let err = GitCli::locate()
            .current_remote_url(repo.path())
            .expect_err("should fail");
        assert!(
            matches!(err, StevedoreError::NoRemoteConfigured { ref branch } if branch == "lonely"),
            "got: {err}"
        );
    }

    #[test]
    fn plain_directory_is_not_a_repository() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let git = GitCli::locate();
        assert!(matches!(
            git.current_branch(dir.path()),
            Err(StevedoreError::NotARepository { .. })
        ));
        assert!(matches!(
            git.current_remote_url(dir.path()),
            Err(StevedoreError::NotARepository { .. })
        ));
    }

    #[test]
    fn translated_locale_still_detects_plain_directory() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let mut command = Command::new("git");
        let _ = command
            .args(["rev-parse", "--is-inside-work-tree"])
            .current_dir(dir.path())
            .env("LANGUAGE", "de")
            .env("LC_ALL", "de_DE.UTF-8")
            .env("GIT_DIR", "/elsewhere/.git");
        let output = isolate(&mut command).output().expect("spawn git");

        let envs: Vec<_> = command.get_envs().collect();
        assert!(envs.contains(&("LANGUAGE".as_ref(), None)));
        assert!(envs.contains(&("GIT_DIR".as_ref(), None)));
        assert!(envs.contains(&("LC_ALL".as_ref(), Some("C".as_ref()))));
        assert!(!output.status.success());
        assert!(
            String::from_utf8_lossy(&output.stderr).contains("not a git repository"),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    #[test]
    fn detached_head_has_no_branch() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        commit(repo.path());
        git(repo.path(), &["checkout", "-q", "--detach"]);
        let git = GitCli::locate();
        assert!(matches!(
            git.current_branch(repo.path()),
            Err(StevedoreError::DetachedHead { .. })
        ));
        assert!(matches!(
            git.current_remote_url(repo.path()),
            Err(StevedoreError::DetachedHead { .. })
        ));
    }

    #[test]
    fn branch_tracking_local_branch_has_no_remote() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        git(repo.path(), &["config", "branch.newbranch.remote", "."]);
        let err = GitCli::locate()
            .current_remote_url(repo.path())
            .expect_err("should fail");
        assert!(
            matches!(err, StevedoreError::NoRemoteConfigured { ref branch } if branch == "newbranch"),
            "got: {err}"
        );
    }

    #[test]
    fn branch_tracking_undefined_remote_has_no_remote() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        git(repo.path(), &["config", "branch.newbranch.remote", "ghost"]);
        let err = GitCli::locate()
            .current_remote_url(repo.path())
            .expect_err("should fail");
        assert!(
            matches!(err, StevedoreError::NoRemoteConfigured { ref branch } if branch == "newbranch"),
            "got: {err}"
        );
    }

    #[test]
    fn missing_directory_is_a_path_error() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent");
        assert!(matches!(
            GitCli::locate().current_branch(&missing),
            Err(StevedoreError::Path { .. })
        ));
    }

    #[test]
    fn repository_root_is_toplevel() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        std::fs::create_dir_all(repo.path().join("a/b")).expect("mkdir");
        let root = GitCli::locate()
            .repository_root(&repo.path().join("a/b"))
            .expect("root");
        let expected = std::fs::canonicalize(repo.path()).expect("canonicalize");
        assert_eq!(std::fs::canonicalize(root).expect("canonicalize"), expected);
    }
}
