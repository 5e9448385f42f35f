use clap::ValueEnum;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiProvider {
    /// OpenAI互換API（HTTP）
    Openai,
    Claude,
    Codex,
    Gemini,
}

impl AiProvider {
    /// CLI経由のプロバイダのコマンド名
    pub fn command_name(&self) -> Option<&'static str> {
        match self {
            AiProvider::Openai => None,
            AiProvider::Claude => Some("claude"),
            AiProvider::Codex => Some("codex"),
            AiProvider::Gemini => Some("gemini"),
        }
    }
}
