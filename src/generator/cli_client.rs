//! AI CLI連携モジュール
//!
//! claude / codex / gemini の各CLIを子プロセスとして起動し、
//! 標準出力を応答として受け取る。システムプロンプトはユーザープロンプトの前に連結する。

use super::GenerationService;
use crate::ai_provider::AiProvider;
use crate::error::{CopyError, Result};
use async_trait::async_trait;
use tokio::process::Command;

pub struct CliClient {
    provider: AiProvider,
    command: &'static str,
}

impl CliClient {
    pub fn new(provider: AiProvider) -> Result<Self> {
        let command = provider.command_name().ok_or_else(|| {
            CopyError::Config(format!("{:?} はCLIプロバイダではありません", provider))
        })?;
        Ok(Self { provider, command })
    }

    fn args(&self, prompt: &str) -> Vec<String> {
        match self.provider {
            AiProvider::Codex => vec!["exec".into(), prompt.into()],
            AiProvider::Claude => vec!["-p".into(), prompt.into(), "--output-format".into(), "text".into()],
            _ => vec!["-p".into(), prompt.into()],
        }
    }
}

/// システムプロンプトとユーザープロンプトを1つにまとめる
fn combine_prompts(system: &str, prompt: &str) -> String {
    format!("{}\n\n####\n\n{}", system, prompt)
}

#[async_trait]
impl GenerationService for CliClient {
    fn model(&self) -> &str {
        self.command
    }

    async fn generate(&self, system: &str, prompt: &str) -> Result<String> {
        let full_prompt = combine_prompts(system, prompt);
        tracing::debug!(command = self.command, prompt_len = full_prompt.len(), "invoking AI CLI");

        // Windowsではcmd /c経由
        #[cfg(windows)]
        let output = {
            let mut args = vec!["/c".to_string(), self.command.to_string()];
            args.extend(self.args(&full_prompt));
            Command::new("cmd").args(&args).output().await
        };

        #[cfg(not(windows))]
        let output = Command::new(self.command).args(self.args(&full_prompt)).output().await;

        let output = output.map_err(|e| CopyError::CliExecution(format!("{} 実行エラー: {}", self.command, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CopyError::CliExecution(format!(
                "{} failed (code {:?}): {}",
                self.command,
                output.status.code(),
                stderr.trim()
            )));
        }

        let response = String::from_utf8_lossy(&output.stdout).to_string();
        let preview: String = response.chars().take(500).collect();
        tracing::debug!(response_len = response.len(), preview = %preview, "AI CLI responded");

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_is_not_a_cli_provider() {
        assert!(CliClient::new(AiProvider::Openai).is_err());
        assert_eq!(CliClient::new(AiProvider::Gemini).unwrap().model(), "gemini");
    }

    #[test]
    fn test_args_per_provider() {
        let claude = CliClient::new(AiProvider::Claude).unwrap();
        assert_eq!(claude.args("p"), vec!["-p", "p", "--output-format", "text"]);
        let codex = CliClient::new(AiProvider::Codex).unwrap();
        assert_eq!(codex.args("p"), vec!["exec", "p"]);
    }

    #[test]
    fn test_combine_prompts() {
        assert_eq!(combine_prompts("S", "U"), "S\n\n####\n\nU");
    }
}
