//! Core application

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, BufReader, BufWriter};

use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::domain::{EnrichmentStage, EventPipeline};

pub struct CoreApp {
    pub stage: Arc<EnrichmentStage>,
    pub shutdown: ShutdownService,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.log_json);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config)?;

        match command.unwrap_or(Commands::Run { input: None }) {
            Commands::Run { input } => app.run_pipeline(input).await,
            Commands::Lookup { ip } => app.lookup(&ip).await,
        }
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;
        let stage = EnrichmentStage::configure_with(config.stage, config.client, config.cache)
            .context("Failed to configure enrichment stage")?;

        Ok(Self {
            stage: Arc::new(stage),
            shutdown: ShutdownService::new(),
        })
    }

    fn init_logging(json: bool) {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        // stdout carries events; logs always go to stderr
        if json {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .json()
                .with_env_filter(filter)
                .init();
        } else {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_ansi(std::io::stderr().is_terminal())
                .compact()
                .with_env_filter(filter)
                .init();
        }
    }

    async fn run_pipeline(self, input: Option<PathBuf>) -> Result<()> {
        // Install signal handlers FIRST (before blocking on input)
        self.shutdown.install_signal_handlers();

        match input.filter(|path| path.as_os_str() != "-") {
            Some(path) => {
                let file = tokio::fs::File::open(&path)
                    .await
                    .with_context(|| format!("Failed to open input file: {}", path.display()))?;
                tracing::debug!(path = %path.display(), "Reading events from file");
                self.pump(BufReader::new(file)).await
            }
            None => {
                tracing::debug!("Reading events from stdin");
                self.pump(BufReader::new(tokio::io::stdin())).await
            }
        }
    }

    async fn pump<R>(&self, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let pipeline = EventPipeline::new(self.stage.clone());
        let writer = BufWriter::new(tokio::io::stdout());
        let summary = pipeline
            .run(reader, writer, self.shutdown.subscribe())
            .await?;

        if self.shutdown.is_triggered() {
            tracing::info!(records = summary.records, "Stopped on shutdown signal");
        }
        Ok(())
    }

    async fn lookup(self, ip: &str) -> Result<()> {
        let attributes = self
            .stage
            .resolve(ip)
            .await
            .with_context(|| format!("Lookup failed for {ip}"))?;

        println!("{}", serde_json::to_string_pretty(&attributes)?);
        Ok(())
    }
}
