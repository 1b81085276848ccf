use crate::config::{Overrides, ENV_CONFIG};
use crate::domain::model::PageSize;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "markdown-pdf")]
#[command(version, about = "Markdown to PDF conversion service")]
pub struct Cli {
    /// TOML config file
    #[arg(long, global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve(ServeArgs),
    /// Convert a Markdown file without starting the server
    Convert(ConvertArgs),
    /// Query the /health endpoint; exit 0 when healthy, 1 otherwise
    Healthcheck(HealthcheckArgs),
}

#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Runtime worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct ConvertArgs {
    /// Markdown source (.md, .markdown or .txt)
    pub input: PathBuf,

    /// Output path; defaults to the input stem with .pdf or .html
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// PDF title; defaults to the input stem
    #[arg(long)]
    pub title: Option<String>,

    /// Write a standalone HTML file instead of a PDF
    #[arg(long)]
    pub html: bool,

    /// a4 or letter
    #[arg(long)]
    pub page_size: Option<PageSize>,
}

#[derive(Debug, Clone, Args)]
pub struct HealthcheckArgs {
    /// Full health URL; defaults to http://127.0.0.1:{port}/health
    #[arg(long)]
    pub url: Option<String>,

    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seconds before the health check gives up
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
}

impl Cli {
    /// The subcommand to run; `serve` when none was given.
    pub fn action(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    }

    pub fn overrides(&self) -> Overrides {
        let mut overrides = Overrides {
            log_json: self.log_json,
            ..Overrides::default()
        };
        match &self.command {
            Some(Command::Serve(args)) => {
                overrides.host = args.host.clone();
                overrides.port = args.port;
                overrides.workers = args.workers;
            }
            Some(Command::Convert(args)) => overrides.page_size = args.page_size,
            Some(Command::Healthcheck(args)) => overrides.port = args.port,
            None => {}
        }
        overrides
    }
}
