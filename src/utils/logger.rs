use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_filter(verbose: bool, level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("markdown_pdf=debug,tower_http=debug,info")
        } else {
            EnvFilter::new(format!("markdown_pdf={level},tower_http={level}"))
        }
    })
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(verbose, false, "info");
}

/// `RUST_LOG` 優先於設定檔中的 level
pub fn init_logger(verbose: bool, json: bool, level: &str) {
    let filter = default_filter(verbose, level);

    if json {
        // 容器環境以 JSON 輸出，方便日誌收集
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .json(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }
}
