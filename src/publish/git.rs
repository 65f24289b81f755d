//! Git publisher
//!
//! Runs the git CLI in the configured working copy:
//!
//! 1. `git config user.name` / `git config user.email`
//! 2. `git add <artifact>` (path relative to the working copy)
//! 3. `git commit -m <message>` ("nothing to commit" is not an error)
//! 4. `git push https://<token>@<host>/<repository>.git <branch>:<branch>`
//!
//! Git runs with `LC_ALL=C` so its messages can be matched, and with
//! terminal prompts turned off.
//!
//! The token only ever appears in the push URL argument. Every message that
//! leaves this module passes through [`redact`].

use crate::config::PublishConfig;
use crate::publish::{PublishError, PublishOutcome, Publisher};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;

/// Commits and pushes the artifact with the git CLI
pub struct GitPublisher {
    name: String,
    email: String,
    token: String,
    repository: String,
    host: String,
    branch: String,
    workdir: PathBuf,
    commit_message: String,
}

impl std::fmt::Debug for GitPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitPublisher")
            .field("repository", &self.repository)
            .field("branch", &self.branch)
            .field("workdir", &self.workdir)
            .finish_non_exhaustive()
    }
}

impl GitPublisher {
    /// Builds a publisher from settings
    ///
    /// # Returns
    ///
    /// * `Ok(GitPublisher)` - All required settings present
    /// * `Err(PublishError::MissingConfig)` - Names of the missing settings
    pub fn from_config(config: &PublishConfig) -> Result<Self, PublishError> {
        let missing = config.missing_fields();
        let required = |value: &Option<String>| value.clone().unwrap_or_default();

        if !missing.is_empty() {
            return Err(PublishError::MissingConfig(missing));
        }

        Ok(Self {
            name: required(&config.name),
            email: required(&config.email),
            token: required(&config.token),
            repository: required(&config.repository)
                .trim_end_matches(".git")
                .to_string(),
            host: config.host.clone(),
            branch: config.branch.clone(),
            workdir: PathBuf::from(&config.workdir),
            commit_message: config.commit_message.clone(),
        })
    }

    /// Push URL with the token embedded
    fn remote_url(&self) -> String {
        format!(
            "https://{}@{}/{}.git",
            self.token, self.host, self.repository
        )
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new("git");
        command
            .args(args)
            .current_dir(&self.workdir)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0");
        command
    }

    async fn git(&self, step: &'static str, args: &[&str]) -> Result<Output, PublishError> {
        tracing::debug!("git {}", step);

        self.command(args)
            .output()
            .await
            .map_err(|e| PublishError::Spawn {
                step,
                message: redact(&e.to_string(), &self.token),
            })
    }

    async fn git_checked(&self, step: &'static str, args: &[&str]) -> Result<Output, PublishError> {
        let output = self.git(step, args).await?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(self.failure(step, &output))
        }
    }

    /// Path of `artifact` relative to the working copy
    async fn pathspec(&self, artifact: &Path) -> Result<PathBuf, PublishError> {
        let workdir = canonical(&self.workdir).await?;
        let absolute = canonical(artifact).await?;

        match absolute.strip_prefix(&workdir) {
            Ok(relative) => Ok(relative.to_path_buf()),
            Err(_) => Err(PublishError::OutsideWorkdir {
                artifact: absolute,
                workdir,
            }),
        }
    }

    fn failure(&self, step: &'static str, output: &Output) -> PublishError {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };

        PublishError::CommandFailed {
            step,
            message: redact(detail.trim(), &self.token),
        }
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, artifact: &Path) -> Result<PublishOutcome, PublishError> {
        let pathspec = self.pathspec(artifact).await?;
        let artifact = pathspec.to_string_lossy();

        self.git_checked("config", &["config", "user.name", &self.name])
            .await?;
        self.git_checked("config", &["config", "user.email", &self.email])
            .await?;
        self.git_checked("add", &["add", "--", &artifact]).await?;

        let commit = self
            .git("commit", &["commit", "-m", &self.commit_message])
            .await?;
        let outcome = if commit.status.success() {
            PublishOutcome::Pushed
        } else {
            let stdout = String::from_utf8_lossy(&commit.stdout);
            let stderr = String::from_utf8_lossy(&commit.stderr);
            if !is_nothing_to_commit(&stdout, &stderr) {
                return Err(self.failure("commit", &commit));
            }
            tracing::info!("{} unchanged, nothing to commit", artifact);
            PublishOutcome::NothingToCommit
        };

        let refspec = format!("{0}:{0}", self.branch);
        self.git_checked("push", &["push", &self.remote_url(), &refspec])
            .await?;

        tracing::info!("Pushed {} to {} ({})", artifact, self.repository, self.branch);
        Ok(outcome)
    }
}

async fn canonical(path: &Path) -> Result<PathBuf, PublishError> {
    tokio::fs::canonicalize(path)
        .await
        .map_err(|e| PublishError::Resolve {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Returns true if a failed `git commit` only reported that there was
/// nothing to commit
pub fn is_nothing_to_commit(stdout: &str, stderr: &str) -> bool {
    [stdout, stderr].iter().any(|text| {
        text.contains("nothing to commit") || text.contains("no changes added to commit")
    })
}

/// Replaces every occurrence of `secret` in `text`
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        text.to_string()
    } else {
        text.replace(secret, "***")
    }
}
