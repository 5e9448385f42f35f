//! ログ設定（tracing）
//!
//! 進捗表示は標準出力、ログは標準エラーに出す。
//! `RUST_LOG` が設定されていればそれを優先する。

use std::io;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "debug,reqwest=info,hyper=info"
    } else {
        "warn,romance_copy=info,romance_copy_common=info"
    }
}

pub fn configure_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let stderr_log = fmt::layer()
        .with_writer(io::stderr)
        .with_target(verbose)
        .with_filter(filter);

    // 二重初期化（テストなど）は無視
    let _ = tracing_subscriber::Registry::default()
        .with(stderr_log)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            assert!(default_directives(verbose).parse::<EnvFilter>().is_ok());
        }
    }

    #[test]
    fn test_configure_twice_is_harmless() {
        configure_logging(false);
        configure_logging(true);
    }
}
