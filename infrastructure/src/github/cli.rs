//! Thin async wrapper around the `gh` executable.

use govbot_application::PlatformError;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

/// Runs `gh` subcommands and maps their failures to [`PlatformError`].
#[derive(Debug, Clone)]
pub struct GhCli {
    program: PathBuf,
    working_dir: Option<PathBuf>,
}

impl GhCli {
    /// Locate `gh` on `PATH`.
    pub fn locate() -> Result<Self, PlatformError> {
        let program = which::which("gh")
            .map_err(|e| PlatformError::NotAvailable(format!("gh CLI not found: {}", e)))?;
        debug!("Using gh at {}", program.display());
        Ok(Self {
            program,
            working_dir: None,
        })
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Whether `gh auth status` succeeds.
    pub async fn is_authenticated(&self) -> bool {
        self.run(&["auth", "status"], None).await.is_ok()
    }

    /// Run `gh` with `args`, feeding `stdin` if given, and return stdout.
    pub async fn run(&self, args: &[&str], stdin: Option<&str>) -> Result<String, PlatformError> {
        trace!("gh {}", args.join(" "));
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| PlatformError::NotAvailable(format!("Failed to execute gh: {}", e)))?;

        if let Some(input) = stdin
            && let Some(mut pipe) = child.stdin.take()
        {
            pipe.write_all(input.as_bytes()).await.map_err(|e| {
                PlatformError::RequestFailed(format!("Failed to write to gh: {}", e))
            })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PlatformError::RequestFailed(format!("gh did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_failure(args, stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `gh api <endpoint>` decoded as JSON.
    pub async fn api<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, PlatformError> {
        let stdout = self.run(&["api", endpoint], None).await?;
        decode(endpoint, &stdout)
    }

    /// `gh api --paginate --slurp <endpoint>`, pages flattened.
    pub async fn api_paginated<T: DeserializeOwned>(
        &self,
        endpoint: &str,
    ) -> Result<Vec<T>, PlatformError> {
        let stdout = self
            .run(&["api", "--paginate", "--slurp", endpoint], None)
            .await?;
        let pages: Vec<Vec<T>> = decode(endpoint, &stdout)?;
        Ok(pages.into_iter().flatten().collect())
    }

    /// `gh api --method <method> <endpoint> --input -` with a JSON body.
    pub async fn api_send<T: DeserializeOwned>(
        &self,
        method: &str,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T, PlatformError> {
        let input = body.to_string();
        let stdout = self
            .run(
                &["api", "--method", method, endpoint, "--input", "-"],
                Some(&input),
            )
            .await?;
        decode(endpoint, &stdout)
    }

    /// `gh api --method DELETE <endpoint>`.
    pub async fn api_delete(&self, endpoint: &str) -> Result<(), PlatformError> {
        self.run(&["api", "--method", "DELETE", endpoint], None)
            .await
            .map(|_| ())
    }

    /// Raw file contents via the contents API.
    pub async fn api_raw(&self, endpoint: &str) -> Result<String, PlatformError> {
        self.run(
            &["api", "-H", "Accept: application/vnd.github.raw", endpoint],
            None,
        )
        .await
    }
}

fn decode<T: DeserializeOwned>(endpoint: &str, stdout: &str) -> Result<T, PlatformError> {
    serde_json::from_str(stdout).map_err(|e| {
        PlatformError::InvalidResponse(format!("Failed to parse gh api {}: {}", endpoint, e))
    })
}

/// Map a failed `gh` invocation to a port error.
pub(crate) fn classify_failure(args: &[&str], stderr: &str) -> PlatformError {
    let command = args.iter().take(4).copied().collect::<Vec<_>>().join(" ");
    let message = format!("gh {} failed: {}", command, stderr);
    if stderr.contains("HTTP 404") || stderr.contains("Not Found") {
        PlatformError::NotFound(message)
    } else if stderr.contains("gh auth login") || stderr.contains("HTTP 401") {
        PlatformError::NotAvailable(message)
    } else {
        PlatformError::RequestFailed(message)
    }
}
