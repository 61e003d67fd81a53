use thiserror::Error;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::debug;

/// Environment variable the agent command reads its prompt from.
pub const PROMPT_ENV: &str = "AGENT_PROMPT";

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    agent_cmd: String,
    timeout_ms: u64,
}

impl BridgeConfig {
    pub fn new(agent_cmd: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            agent_cmd: agent_cmd.into(),
            timeout_ms,
        }
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("agent command is not configured (set AGENT_CMD)")]
    MissingCommand,
    #[error("agent command timed out after {0} ms")]
    Timeout(u64),
    #[error("failed to execute agent command: {0}")]
    SpawnFailure(#[from] std::io::Error),
    #[error("agent command exited with code {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
    #[error("agent command produced empty output")]
    EmptyOutput,
}

/// Runs the agent command for one prompt and returns its trimmed stdout.
pub async fn run_agent(prompt: &str, cfg: &BridgeConfig) -> Result<String, BridgeError> {
    if cfg.agent_cmd.trim().is_empty() {
        return Err(BridgeError::MissingCommand);
    }

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&cfg.agent_cmd);
    cmd.env(PROMPT_ENV, prompt);
    cmd.kill_on_drop(true);

    debug!(timeout_ms = cfg.timeout_ms, "running agent command");
    let output = timeout(Duration::from_millis(cfg.timeout_ms), cmd.output())
        .await
        .map_err(|_| BridgeError::Timeout(cfg.timeout_ms))??;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(BridgeError::NonZeroExit {
            code: output.status.code(),
            stderr,
        });
    }

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if stdout.is_empty() {
        return Err(BridgeError::EmptyOutput);
    }

    Ok(stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn echoes_prompt_from_env() {
        let cfg = BridgeConfig::new("printf '%s' \"$AGENT_PROMPT\"", 5_000);
        let answer = run_agent("hello agent", &cfg).await.unwrap();
        assert_eq!(answer, "hello agent");
    }

    #[tokio::test]
    async fn blank_command_is_rejected() {
        let cfg = BridgeConfig::new("   ", 5_000);
        let err = run_agent("hi", &cfg).await.unwrap_err();
        assert!(matches!(err, BridgeError::MissingCommand));
    }

    #[tokio::test]
    async fn non_zero_exit_keeps_stderr() {
        let cfg = BridgeConfig::new("echo boom >&2; exit 3", 5_000);
        match run_agent("hi", &cfg).await.unwrap_err() {
            BridgeError::NonZeroExit { code, stderr } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn whitespace_output_is_empty() {
        let cfg = BridgeConfig::new("printf '  \\n'", 5_000);
        let err = run_agent("hi", &cfg).await.unwrap_err();
        assert!(matches!(err, BridgeError::EmptyOutput));
    }

    #[tokio::test]
    async fn slow_command_times_out() {
        let cfg = BridgeConfig::new("sleep 5", 50);
        let err = run_agent("hi", &cfg).await.unwrap_err();
        assert!(matches!(err, BridgeError::Timeout(50)));
    }
}
