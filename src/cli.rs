use clap::{Parser, Subcommand};
use crate::ai_provider::AiProvider;
use romance_copy_common::CopyStyle;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "romance-copy")]
#[command(about = "商品コピー（ロマンスコピー）生成・禁止語チェックツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// AIプロバイダ (openai/claude/codex/gemini)
    #[arg(long, default_value = "openai", global = true)]
    pub ai_provider: AiProvider,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 商品ワークブックからコピーを生成
    Generate {
        /// ブランド（プリセット名またはプロファイルJSON）
        #[arg(short, long, required = true)]
        brand: String,

        /// ワークブック（省略時はプロファイルの値）
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// ルール文書（省略時はプロファイルの値）
        #[arg(short, long)]
        rules: Option<PathBuf>,

        /// 生成対象シート（複数指定可、省略時は対話選択）
        #[arg(short, long)]
        sheet: Vec<String>,

        /// 出力ワークブック（デフォルト: <ブランド>_Results.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// コピーの種類 (description/tagline)
        #[arg(long)]
        style: Option<CopyStyle>,

        /// 処理する商品数の上限
        #[arg(short, long)]
        limit: Option<usize>,

        /// 生成サービスを呼ばずにプロンプトのみ出力
        #[arg(long)]
        dry_run: bool,

        /// キャッシュを使用（同一プロンプトの再生成をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// グループ値の照合結果を表示
    Match {
        /// ブランド（プリセット名またはプロファイルJSON）
        #[arg(short, long, required = true)]
        brand: String,

        /// ワークブック（省略時はプロファイルの値）
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// 照合するグループ値
        #[arg(required = true)]
        value: String,
    },

    /// 生成済みワークブックの文数・禁止語をチェック
    Check {
        /// ブランド（禁止語の取得元）
        #[arg(short, long, required = true)]
        brand: String,

        /// 入力ワークブック
        #[arg(required = true)]
        input: PathBuf,

        /// チェックする列（省略時はブランドのスタイルの列）
        #[arg(short, long)]
        columns: Vec<String>,

        /// 出力ワークブック（デフォルト: <入力>_checked.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// モデルを設定
        #[arg(long)]
        set_model: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象フォルダ（省略時はカレント）
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },

    /// ブランドプロファイル一覧
    Brands {
        /// プロファイルJSONを探すフォルダ
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::parse_from([
            "romance-copy", "generate", "--brand", "spade", "--style", "tagline",
            "--sheet", "A", "--sheet", "B", "--limit", "3", "--dry-run",
        ]);
        match cli.command {
            Commands::Generate { brand, style, sheet, limit, dry_run, use_cache, .. } => {
                assert_eq!(brand, "spade");
                assert_eq!(style, Some(CopyStyle::Tagline));
                assert_eq!(sheet, vec!["A", "B"]);
                assert_eq!(limit, Some(3));
                assert!(dry_run);
                assert!(!use_cache);
            }
            _ => panic!("expected generate"),
        }
        assert_eq!(cli.ai_provider, AiProvider::Openai);
    }

    #[test]
    fn test_parse_global_provider() {
        let cli = Cli::parse_from(["romance-copy", "match", "-b", "coach", "tote", "--ai-provider", "claude"]);
        assert_eq!(cli.ai_provider, AiProvider::Claude);
        assert!(matches!(cli.command, Commands::Match { ref value, .. } if value == "tote"));
    }
}
