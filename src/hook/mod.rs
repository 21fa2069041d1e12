//! Git pre-commit hook that scans staged Python files before each commit
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Git not initialized: {} has no .git directory", .0.display())]
    NotAGitRepository(PathBuf),

    #[error("failed to write hook {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// POSIX shell script run by git before each commit
pub fn pre_commit_script(exe: &Path) -> String {
    let exe = exe.display().to_string().replace('"', "\\\"");
    format!(
        r#"#!/bin/sh
# Installed by ai-code-review
echo "Running AI Code Review on staged files..."

cd "$(git rev-parse --show-toplevel)" || exit 1

files=$(git -c core.quotePath=false diff --cached --name-only --diff-filter=ACM -- '*.py')

if [ -z "$files" ]; then
    echo "No Python files to check."
    exit 0
fi

# one path per line; paths may contain spaces or glob characters
set -f
IFS='
'
failed=0
for file in $files; do
    "{exe}" scan --path "$file" || failed=1
done

if [ "$failed" -ne 0 ]; then
    echo "Commit blocked: Code issues found."
    exit 1
fi

echo "Code review passed. Commit successful."
exit 0
"#
    )
}

/// Write `.git/hooks/pre-commit` under `repo_root` and mark it executable
pub fn install_pre_commit_hook(repo_root: &Path, exe: &Path) -> Result<PathBuf, HookError> {
    let git_dir = repo_root.join(".git");
    if !git_dir.is_dir() {
        return Err(HookError::NotAGitRepository(repo_root.to_path_buf()));
    }

    let hooks_dir = git_dir.join("hooks");
    let hook_path = hooks_dir.join("pre-commit");
    let write_err = |source| HookError::Write {
        path: hook_path.clone(),
        source,
    };

    std::fs::create_dir_all(&hooks_dir).map_err(write_err)?;
    std::fs::write(&hook_path, pre_commit_script(exe)).map_err(write_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&hook_path, std::fs::Permissions::from_mode(0o775))
            .map_err(write_err)?;
    }

    Ok(hook_path)
}
