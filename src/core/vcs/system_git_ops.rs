//! Additional operations for SystemGit (tags, log walking, remotes)

use super::CommitInfo;
use super::system_git::SystemGit;
use crate::core::error::{RelError, RelResult, ResultExt, ToolError};

impl SystemGit {
  /// Commits in `since..HEAD` (or all of HEAD's history when since is None),
  /// newest first
  pub fn commits_since(&self, since: Option<&str>) -> RelResult<Vec<CommitInfo>> {
    let range = match since {
      Some(sha) => format!("{}..HEAD", sha),
      None => "HEAD".to_string(),
    };

    let output = self
      .git_cmd()
      .args(["log", &range, "--no-merges", "--pretty=format:%H%x1f%s%x1f%b%x1e"])
      .output()
      .context("Failed to run git log")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Tool(ToolError::CommandFailed {
        command: format!("git log {}", range),
        stderr: stderr.to_string(),
      }));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Ok(parse_log_records(&stdout))
  }

  /// List all tags, sorted by version descending (`git tag --sort`)
  pub fn list_tags(&self) -> RelResult<Vec<String>> {
    let output = self
      .git_cmd()
      .args(["tag", "--list", "--sort=-v:refname"])
      .output()
      .context("Failed to list tags")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(RelError::Tool(ToolError::CommandFailed {
        command: "git tag --list".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect(),
    )
  }

  /// Whether a tag exists
  pub fn tag_exists(&self, tag: &str) -> RelResult<bool> {
    Ok(self.list_tags()?.iter().any(|t| t == tag))
  }

  /// Create an annotated tag, optionally GPG-signed with a specific key
  pub fn create_tag(&self, tag: &str, message: &str, sign: bool, key_id: Option<&str>) -> RelResult<()> {
    let mut cmd = self.git_cmd();
    cmd.arg("tag");

    if sign {
      match key_id {
        Some(key) => {
          cmd.arg("-u").arg(key);
        }
        None => {
          cmd.arg("-s");
        }
      }
    } else {
      cmd.arg("-a");
    }

    cmd.arg(tag).arg("-m").arg(message);

    let output = cmd.output().context("Failed to create tag")?;

    if !output.status.success() {
      return Err(RelError::Tool(ToolError::TagError {
        tag: tag.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Verify a signed tag (`git tag -v`)
  pub fn verify_tag(&self, tag: &str) -> RelResult<bool> {
    let output = self
      .git_cmd()
      .args(["tag", "-v", tag])
      .output()
      .context("Failed to verify tag")?;

    Ok(output.status.success())
  }

  /// Delete a local tag
  pub fn delete_tag(&self, tag: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["tag", "-d", tag])
      .output()
      .context("Failed to delete tag")?;

    if !output.status.success() {
      return Err(RelError::Tool(ToolError::TagError {
        tag: tag.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Push a tag to a remote
  pub fn push_tag(&self, remote: &str, tag: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["push", remote, &format!("refs/tags/{}", tag)])
      .output()
      .context("Failed to push tag")?;

    if !output.status.success() {
      return Err(RelError::Tool(ToolError::TagError {
        tag: tag.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Delete a tag on a remote
  pub fn delete_remote_tag(&self, remote: &str, tag: &str) -> RelResult<()> {
    let output = self
      .git_cmd()
      .args(["push", remote, "--delete", &format!("refs/tags/{}", tag)])
      .output()
      .context("Failed to delete remote tag")?;

    if !output.status.success() {
      return Err(RelError::Tool(ToolError::TagError {
        tag: tag.to_string(),
        reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(())
  }

  /// Whether a remote is configured
  pub fn has_remote(&self, name: &str) -> RelResult<bool> {
    let output = self
      .git_cmd()
      .args(["remote"])
      .output()
      .context("Failed to list remotes")?;

    if !output.status.success() {
      return Ok(false);
    }

    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .any(|l| l.trim() == name),
    )
  }
}

/// Parse git log output in %H%x1f%s%x1f%b%x1e format
///
/// Unit separators avoid ambiguity with subjects containing delimiters.
fn parse_log_records(raw: &str) -> Vec<CommitInfo> {
  let mut commits = Vec::new();

  for record in raw.split('\x1e') {
    let record = record.trim_matches(|c: char| c == '\n' || c == '\r');
    if record.is_empty() {
      continue;
    }

    let mut fields = record.splitn(3, '\x1f');
    let sha = fields.next().unwrap_or("").trim().to_string();
    let subject = fields.next().unwrap_or("").trim().to_string();
    let body = fields.next().unwrap_or("").trim().to_string();

    if sha.is_empty() {
      continue;
    }

    commits.push(CommitInfo { sha, subject, body });
  }

  commits
}
