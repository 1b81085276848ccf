use clap::Parser;
use markdown_pdf::config::cli::{Cli, Command, ConvertArgs, HealthcheckArgs};
use markdown_pdf::utils::health::{check_health, default_health_url};
use markdown_pdf::utils::logger;
use markdown_pdf::{
    AppConfig, AppError, ConvertJob, ConvertOptions, LocalStorage, OutputFormat, RenderService,
};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref(), &cli.overrides()) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose);
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_with(&e);
        }
    };

    logger::init_logger(cli.verbose, config.log_json, &config.log_level);
    if cli.verbose {
        tracing::debug!("Resolved config: {:?}", config);
    }

    // 每個 worker 對應一條 runtime 執行緒
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers.max(1))
        .enable_all()
        .build()?;

    let code = runtime.block_on(async {
        match cli.action() {
            Command::Serve(_) => run_serve(&config).await,
            Command::Convert(args) => run_convert(&config, args).await,
            Command::Healthcheck(args) => run_healthcheck(&config, args).await,
        }
    });

    match code {
        Ok(0) => Ok(()),
        Ok(code) => std::process::exit(code),
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            exit_with(&e);
        }
    }
}

fn exit_with(e: &AppError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.severity().exit_code().max(1))
}

async fn run_serve(config: &AppConfig) -> markdown_pdf::Result<i32> {
    markdown_pdf::serve(config).await?;
    Ok(0)
}

async fn run_convert(config: &AppConfig, args: ConvertArgs) -> markdown_pdf::Result<i32> {
    let service = RenderService::from_config(config);
    let job = ConvertJob::new(LocalStorage::new("."), service);

    let outcome = job
        .run(ConvertOptions {
            input: args.input.to_string_lossy().into_owned(),
            output: args.output.map(|p| p.to_string_lossy().into_owned()),
            title: args.title,
            format: if args.html {
                OutputFormat::Html
            } else {
                OutputFormat::Pdf
            },
        })
        .await?;

    match outcome.pages {
        Some(pages) => println!(
            "✅ Wrote {} ({} pages, {} bytes)",
            outcome.output, pages, outcome.bytes
        ),
        None => println!("✅ Wrote {} ({} bytes)", outcome.output, outcome.bytes),
    }
    Ok(0)
}

async fn run_healthcheck(config: &AppConfig, args: HealthcheckArgs) -> markdown_pdf::Result<i32> {
    let url = args
        .url
        .unwrap_or_else(|| default_health_url(config.port));
    let outcome = check_health(&url, Duration::from_secs(args.timeout)).await?;
    if !outcome.is_healthy() {
        eprintln!("unhealthy: {:?}", outcome);
    }
    Ok(outcome.exit_code())
}
