//! Compose-file and build-context path resolution.

use std::path::{Component, Path, PathBuf};

use stevedore_common::error::{Result, StevedoreError};

use crate::scm::SourceControl;

/// Returns the absolute directory containing the compose file.
///
/// Relative inputs are resolved against the current working directory.
///
/// # Errors
///
/// Returns [`StevedoreError::Path`] if the current directory cannot be
/// determined.
pub fn compose_file_directory(input_file: &Path) -> Result<PathBuf> {
    let absolute = if input_file.is_absolute() {
        input_file.to_path_buf()
    } else {
        let cwd = std::env::current_dir().map_err(|source| StevedoreError::Path {
            path: input_file.to_path_buf(),
            source,
        })?;
        cwd.join(input_file)
    };
    Ok(absolute
        .parent()
        .map_or_else(|| absolute.clone(), Path::to_path_buf))
}

/// Expresses a declared build context relative to its repository root.
///
/// `declared` is interpreted relative to `compose_dir`. The result always
/// uses `/` separators and never starts with `./`; it is empty when the
/// context is the repository root itself.
///
/// # Errors
///
/// - [`StevedoreError::InvalidInput`] if `declared` is empty.
/// - [`StevedoreError::Path`] if `compose_dir` cannot be canonicalized.
/// - [`StevedoreError::RepositoryResolution`] if `compose_dir` is outside a
///   working tree or the context escapes the repository.
pub fn relative_build_context<S: SourceControl + ?Sized>(
    declared: &str,
    compose_dir: &Path,
    scm: &S,
) -> Result<String> {
    if declared.is_empty() {
        return Err(StevedoreError::InvalidInput {
            message: "build context is empty".into(),
        });
    }

    let root = scm.repository_root(compose_dir).map_err(|e| match e {
        StevedoreError::NotARepository { path } => StevedoreError::RepositoryResolution {
            path,
            message: "not inside a git working tree".into(),
        },
        other => other,
    })?;
    let root = canonicalize(&root)?;
    let base = canonicalize(compose_dir)?;
    let context = normalize(&base.join(declared));

    let relative = context
        .strip_prefix(&root)
        .map_err(|_| StevedoreError::RepositoryResolution {
            path: context.clone(),
            message: format!("build context lies outside repository {}", root.display()),
        })?;

    tracing::debug!(
        declared,
        root = %root.display(),
        relative = %relative.display(),
        "resolved build context"
    );
    Ok(to_slash(relative))
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    std::fs::canonicalize(path).map_err(|source| StevedoreError::Path {
        path: path.to_path_buf(),
        source,
    })
}

/// Lexically folds `.` and `..`; the context directory need not exist yet.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scm::GitCli;
    use crate::scm::git::testutil::{git_available, repository_with_remote};

    /// Answers every query with a fixed repository root.
    struct FixedRoot(Option<PathBuf>);

    impl SourceControl for FixedRoot {
        fn repository_root(&self, dir: &Path) -> Result<PathBuf> {
            self.0.clone().ok_or_else(|| StevedoreError::NotARepository {
                path: dir.to_path_buf(),
            })
        }

        fn current_branch(&self, _dir: &Path) -> Result<String> {
            Ok("main".into())
        }

        fn current_remote_url(&self, _dir: &Path) -> Result<String> {
            Ok("https://example.com/repo.git".into())
        }
    }

    #[test]
    fn compose_dir_for_relative_input() {
        let wd = std::env::current_dir().expect("cwd");
        let dir = compose_file_directory(Path::new("foo/bar.yaml")).expect("dir");
        assert_eq!(dir, wd.join("foo"));
    }

    #[test]
    fn compose_dir_for_absolute_input() {
        let dir = compose_file_directory(Path::new("/abs/path/to/compose.yaml")).expect("dir");
        assert_eq!(dir, PathBuf::from("/abs/path/to"));
    }

    #[test]
    fn empty_context_is_invalid_even_outside_repository() {
        let err = relative_build_context("", Path::new("/nonexistent"), &FixedRoot(None))
            .expect_err("should fail");
        assert!(matches!(err, StevedoreError::InvalidInput { .. }));
    }

    #[test]
    fn outside_repository_is_resolution_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = relative_build_context("./build", dir.path(), &FixedRoot(None))
            .expect_err("should fail");
        assert!(matches!(err, StevedoreError::RepositoryResolution { .. }));
    }

    #[test]
    fn context_escaping_repository_is_resolution_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo = dir.path().join("repo");
        std::fs::create_dir_all(&repo).expect("mkdir");
        let err = relative_build_context("../elsewhere", &repo, &FixedRoot(Some(repo.clone())))
            .expect_err("should fail");
        assert!(matches!(err, StevedoreError::RepositoryResolution { .. }));
    }

    #[test]
    fn context_is_relative_to_fixed_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let compose_dir = dir.path().join("a");
        std::fs::create_dir_all(&compose_dir).expect("mkdir");
        let root = Some(dir.path().to_path_buf());
        let rel = relative_build_context("./b/../c/build", &compose_dir, &FixedRoot(root))
            .expect("resolve");
        assert_eq!(rel, "a/c/build");
    }

    #[test]
    fn context_at_root_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let rel = relative_build_context(".", dir.path(), &FixedRoot(Some(dir.path().into())))
            .expect("resolve");
        assert_eq!(rel, "");
    }

    #[test]
    fn context_inside_git_repository() {
        if !git_available() {
            return;
        }
        let repo = repository_with_remote();
        let compose_dir = repo.path().join("a");
        std::fs::create_dir_all(compose_dir.join("b")).expect("mkdir");
        let rel = relative_build_context("./b/build", &compose_dir, &GitCli::locate())
            .expect("resolve");
        assert_eq!(rel, "a/b/build");
    }

    #[test]
    fn plain_directory_is_resolution_error_with_git() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().expect("tempdir");
        let err = relative_build_context("./build", dir.path(), &GitCli::locate())
            .expect_err("should fail");
        assert!(matches!(err, StevedoreError::RepositoryResolution { .. }));
    }
}
