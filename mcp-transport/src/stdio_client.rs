use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use mcp_types::JSONRPCMessage;
use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tokio::process::ChildStdin;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tracing::error;

use crate::Transport;
use crate::TransportEvent;
use crate::error::TransportError;
use crate::framing::read_loop;

const CHANNEL_CAPACITY: usize = 128;

/// How the child's stderr stream is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stderr {
    #[default]
    Inherit,
    Pipe,
    Ignore,
}

/// Spawn configuration for [`StdioClientTransport`].
#[derive(Debug, Clone, Default)]
pub struct StdioServerParameters {
    pub command: OsString,
    pub args: Vec<OsString>,
    /// `None` means "inherit the platform allow-list" (see
    /// [`default_inherited_env`]); `Some` replaces it entirely.
    pub env: Option<HashMap<String, String>>,
    pub cwd: Option<PathBuf>,
    pub stderr: Stderr,
}

/// The platform-specific set of environment variables inherited by a spawned
/// MCP server when `env` is not given explicitly.
#[cfg(unix)]
pub const DEFAULT_INHERITED_ENV_VARS: &[&str] = &["HOME", "LOGNAME", "PATH", "SHELL", "TERM", "USER"];

#[cfg(windows)]
pub const DEFAULT_INHERITED_ENV_VARS: &[&str] = &[
    "APPDATA",
    "HOMEDRIVE",
    "HOMEPATH",
    "LOCALAPPDATA",
    "PATH",
    "PROCESSOR_ARCHITECTURE",
    "SYSTEMDRIVE",
    "SYSTEMROOT",
    "TEMP",
    "USERNAME",
    "USERPROFILE",
];

/// Builds the environment inherited by a spawned server when no explicit
/// `env` is given: the platform allow-list, filtering out values that begin
/// with `()` (a guard against shell-function contamination leaking through
/// exported environment variables).
pub fn default_inherited_env() -> HashMap<String, String> {
    DEFAULT_INHERITED_ENV_VARS
        .iter()
        .filter_map(|key| {
            let value = std::env::var(key).ok()?;
            if value.starts_with("()") {
                None
            } else {
                Some(((*key).to_string(), value))
            }
        })
        .collect()
}

/// A client-side transport that spawns a subprocess and speaks framed
/// JSON-RPC over its stdio.
pub struct StdioClientTransport {
    params: StdioServerParameters,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl StdioClientTransport {
    pub fn new(params: StdioServerParameters) -> Self {
        Self {
            params,
            child: None,
            stdin: None,
        }
    }
}

#[async_trait]
impl Transport for StdioClientTransport {
    async fn start(&mut self) -> Result<mpsc::Receiver<TransportEvent>, TransportError> {
        if self.child.is_some() {
            return Err(TransportError::AlreadyStarted);
        }

        let mut command = Command::new(&self.params.command);
        command.args(&self.params.args);
        command.env_clear();
        command.envs(self.params.env.clone().unwrap_or_else(default_inherited_env));
        if let Some(cwd) = &self.params.cwd {
            command.current_dir(cwd);
        }
        command.stdin(Stdio::piped());
        command.stdout(Stdio::piped());
        command.stderr(match self.params.stderr {
            Stderr::Inherit => Stdio::inherit(),
            Stderr::Pipe => Stdio::piped(),
            Stderr::Ignore => Stdio::null(),
        });
        command.kill_on_drop(true);

        let mut child = command.spawn().map_err(TransportError::Spawn)?;
        let stdin = child
            .stdin
            .take()
            .ok_or(TransportError::MissingStdio("stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or(TransportError::MissingStdio("stdout"))?;

        if self.params.stderr == Stderr::Pipe {
            if let Some(mut stderr) = child.stderr.take() {
                tokio::spawn(async move {
                    let mut sink = tokio::io::stderr();
                    let _ = tokio::io::copy(&mut stderr, &mut sink).await;
                });
            }
        }

        let (event_tx, event_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (started_tx, started_rx) = oneshot::channel();

        tokio::spawn(read_loop(stdout, event_tx, started_tx));

        started_rx.await.map_err(|_| TransportError::Closed)?;

        self.child = Some(child);
        self.stdin = Some(stdin);
        Ok(event_rx)
    }

    async fn send_message(&mut self, message: &JSONRPCMessage) -> Result<(), TransportError> {
        let stdin = self.stdin.as_mut().ok_or(TransportError::NotStarted)?;
        let json = serde_json::to_string(message).map_err(TransportError::Encode)?;
        stdin.write_all(json.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                if e.kind() != std::io::ErrorKind::InvalidInput {
                    error!("failed to kill child process: {e}");
                }
            }
        }
        self.stdin = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn default_inherited_env_skips_shell_function_contamination() {
        let original = std::env::var("SHELL").ok();
        // SAFETY: restored to its original value before the test returns.
        unsafe {
            std::env::set_var("SHELL", "() { :; }; echo vulnerable");
        }
        let env = default_inherited_env();
        assert!(!env.contains_key("SHELL"));
        unsafe {
            match &original {
                Some(value) => std::env::set_var("SHELL", value),
                None => std::env::remove_var("SHELL"),
            }
        }
    }

    #[test]
    fn default_inherited_env_passes_through_ordinary_values() {
        let env = default_inherited_env();
        if let Ok(path) = std::env::var("PATH") {
            assert_eq!(env.get("PATH"), Some(&path));
        }
    }
}
