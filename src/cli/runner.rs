//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PipelineConfig;
use crate::error::{Error, Result, ResultExt};
use crate::model::TABLES;
use crate::output::TableReader;
use crate::pipeline::Pipeline;
use crate::storage::Storage;
use crate::types::{ArtistMatch, DedupPolicy, SaveMode};
use serde_json::{json, Value};
use tracing::{error, info};

/// Overrides given on the `run` command line
#[derive(Debug, Default)]
struct RunOverrides {
    input: Option<String>,
    output: Option<String>,
    concurrency: Option<usize>,
    dedup: Option<DedupPolicy>,
    artist_match: Option<ArtistMatch>,
    save_mode: Option<SaveMode>,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                input,
                output,
                concurrency,
                dedup,
                artist_match,
                save_mode,
            } => {
                let overrides = RunOverrides {
                    input: input.clone(),
                    output: output.clone(),
                    concurrency: *concurrency,
                    dedup: *dedup,
                    artist_match: *artist_match,
                    save_mode: *save_mode,
                };
                self.run_pipeline(overrides).await
            }
            Commands::Inspect { output, table } => {
                self.inspect(output.as_deref(), table.as_deref()).await
            }
        }
    }

    /// Load the config file, or defaults when none is given
    fn load_config(&self) -> Result<PipelineConfig> {
        match &self.cli.config {
            Some(path) => PipelineConfig::from_file(path),
            None => Ok(PipelineConfig::default()),
        }
    }

    /// Run the full pipeline
    async fn run_pipeline(&self, overrides: RunOverrides) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(input) = overrides.input {
            config = config.with_input(input);
        }
        if let Some(output) = overrides.output {
            config = config.with_output(output);
        }
        if let Some(concurrency) = overrides.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(dedup) = overrides.dedup {
            config.dedup = dedup;
        }
        if let Some(artist_match) = overrides.artist_match {
            config.artist_match = artist_match;
        }
        if let Some(save_mode) = overrides.save_mode {
            config.save_mode = save_mode;
        }

        let pipeline = Pipeline::from_config(&config)?;
        match pipeline.run().await {
            Ok(stats) => {
                let stats = serde_json::to_value(&stats).context("Failed to render run stats")?;
                self.output_message(&json!({ "type": "RUN_STATS", "stats": stats }))
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, "Run failed");
                Err(e)
            }
        }
    }

    /// Summarize tables on an output root
    async fn inspect(&self, output: Option<&str>, table: Option<&str>) -> Result<()> {
        let config = self.load_config()?;
        let root = output.map_or(config.output.clone(), str::to_string);
        if root.trim().is_empty() {
            return Err(Error::config("output root is not set (use --output)"));
        }

        let tables: Vec<&str> = match table {
            Some(name) if TABLES.contains(&name) => vec![name],
            Some(name) => {
                return Err(Error::config(format!(
                    "Unknown table '{name}' (expected one of: {})",
                    TABLES.join(", ")
                )))
            }
            None => TABLES.to_vec(),
        };

        let storage = Storage::open(&root, &config.aws)?;
        let reader = TableReader::new(storage).with_concurrency(config.concurrency);
        for name in tables {
            let summary = reader.summarize(name).await?;
            info!(table = name, materialized = summary.materialized, "Inspected table");
            let summary = serde_json::to_value(&summary)
                .with_context(|| format!("Failed to render summary of {name}"))?;
            self.output_message(&json!({ "type": "TABLE", "table": summary }))?;
        }
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) -> Result<()> {
        let text = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        }
        .context("Failed to render message")?;
        println!("{text}");
        Ok(())
    }
}
