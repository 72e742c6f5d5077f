use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use super::{compose_prompt, LlmProvider, ProviderError, ProviderKind};
use crate::config::OllamaConfig;

/// Local model runner driven through its command line.
///
/// The composed prompt goes to stdin and the summary is read from stdout.
pub struct OllamaProvider {
    command: String,
    args: Vec<String>,
    model: String,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(config: &OllamaConfig, timeout: Duration) -> Self {
        Self {
            command: config.command.clone(),
            args: config.args.clone(),
            model: config.model.clone(),
            timeout,
        }
    }

    async fn run(&self, input: String) -> Result<String, ProviderError> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .arg(&self.model)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ProviderError::RuntimeNotFound(self.command.clone()),
                _ => ProviderError::Io(self.command.clone(), e),
            })?;

        // Feed stdin from a separate task so a chatty runner can't fill its
        // stdout pipe while we are still writing.
        let writer = child.stdin.take().map(|mut stdin| {
            tokio::spawn(async move {
                let result = stdin.write_all(input.as_bytes()).await;
                drop(stdin);
                result
            })
        });

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProviderError::Timeout(ProviderKind::Ollama, self.timeout))?
            .map_err(|e| ProviderError::Io(self.command.clone(), e))?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Err(e)) if e.kind() != ErrorKind::BrokenPipe => {
                    return Err(ProviderError::Io(self.command.clone(), e));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "stdin writer task failed"),
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ProviderError::Process {
                runtime: self.command.clone(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, content: &str, prompt: &str) -> Result<String, ProviderError> {
        debug!(command = %self.command, model = %self.model, "invoking local runner");
        self.run(compose_prompt(prompt, content)).await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn provider(command: &str, args: &[&str]) -> OllamaProvider {
        let config = OllamaConfig {
            enabled: true,
            model: "mistral".to_string(),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };
        OllamaProvider::new(&config, Duration::from_secs(10))
    }

    #[tokio::test]
    async fn test_missing_runtime() {
        let provider = provider("pagebrief-no-such-runner", &["run"]);
        let err = provider.summarize("content", "prompt").await.unwrap_err();
        assert!(matches!(err, ProviderError::RuntimeNotFound(cmd) if cmd == "pagebrief-no-such-runner"));
    }

    #[tokio::test]
    async fn test_echoes_stdin_through_runner() {
        // `sh -c cat -- mistral` runs cat with the model as $1
        let provider = provider("sh", &["-c", "cat", "--"]);
        let out = provider.summarize("Body", "Summarize:").await.unwrap();
        assert_eq!(
            out,
            "Summarize:\nThe contents of this website is as follows:\nBody"
        );
    }

    #[tokio::test]
    async fn test_non_zero_exit_carries_stderr() {
        let provider = provider("sh", &["-c", "echo model $1 missing >&2; exit 3", "--"]);
        let err = provider.summarize("Body", "Summarize:").await.unwrap_err();
        match err {
            ProviderError::Process { runtime, stderr } => {
                assert_eq!(runtime, "sh");
                assert_eq!(stderr, "model mistral missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_timeout_kills_runner() {
        let config = OllamaConfig {
            enabled: true,
            model: "mistral".to_string(),
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "sleep 5".to_string(), "--".to_string()],
        };
        let provider = OllamaProvider::new(&config, Duration::from_millis(200));
        let err = provider.summarize("Body", "Summarize:").await.unwrap_err();
        assert!(matches!(err, ProviderError::Timeout(ProviderKind::Ollama, _)));
        assert_eq!(err.to_string(), "Ollama did not answer within 200ms");
    }
}
