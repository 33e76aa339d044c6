//! Command-line interface for stepgen.
//!
//! Provides commands for running the generation pipeline, compressing and
//! decompressing source files, a sample round trip, and showing the
//! resolved configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{ChatCompletionsClient, CompletionClient, ModelParams};
use crate::config::{Overrides, Settings};
use crate::core::GenerationPipeline;
use crate::domain::GenerationReport;
use crate::semantic::{Encoding, SemanticCodec, SAMPLE_PROGRAM};

/// stepgen - Context-chained LLM code generation
#[derive(Parser, Debug)]
#[command(name = "stepgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// LLM model to use (default: $LLM_MODEL or gpt-4-turbo)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// LLM API key (default: $LLM_API_KEY)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Chat-completions endpoint (default: $LLM_API_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Config file (default: ./stepgen.yaml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the calculator app (default command)
    Generate {
        /// Directory holding the prompt files
        #[arg(long)]
        prompts: Option<PathBuf>,

        /// Output directory for generated files
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compress a source file into a semantic summary
    Compress {
        /// Source file to compress
        file: PathBuf,

        /// Use the compact abbreviated format instead of JSON
        #[arg(long)]
        compact: bool,
    },

    /// Reconstruct source code from a compressed file
    Decompress {
        /// Compressed file
        file: PathBuf,

        /// Input is in the compact abbreviated format
        #[arg(long)]
        compact: bool,

        /// Extension for the reconstructed file
        #[arg(long, default_value = "py")]
        ext: String,
    },

    /// Compress and reconstruct a built-in sample program
    Demo {
        /// Use the compact abbreviated format instead of JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let command = self.command.unwrap_or(Commands::Generate {
            prompts: None,
            output: None,
        });

        let mut overrides = Overrides {
            model: self.model,
            api_key: self.api_key,
            endpoint: self.endpoint,
            ..Default::default()
        };
        if let Commands::Generate { prompts, output } = &command {
            overrides.prompts_dir = prompts.clone();
            overrides.output_dir = output.clone();
        }

        let settings = Settings::load(overrides, self.config.as_deref())?;

        match command {
            Commands::Generate { .. } => generate(&settings).await,
            Commands::Compress { file, compact } => compress(&settings, &file, encoding(compact)).await,
            Commands::Decompress { file, compact, ext } => {
                decompress(&settings, &file, encoding(compact), &ext).await
            }
            Commands::Demo { compact } => demo(&settings, encoding(compact)).await,
            Commands::Config => show_config(&settings),
        }
    }
}

fn encoding(compact: bool) -> Encoding {
    if compact {
        Encoding::Compact
    } else {
        Encoding::Structured
    }
}

fn build_client(settings: &Settings) -> Result<Arc<dyn CompletionClient>> {
    let client = ChatCompletionsClient::from_settings(settings)?;
    Ok(Arc::new(client))
}

/// Run the four-stage pipeline and print a summary
async fn generate(settings: &Settings) -> Result<()> {
    let client = match build_client(settings) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("\nError during code generation: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!("\n{}", "=".repeat(80));
    eprintln!(" LLM-BUILT CALCULATOR - SEQUENTIAL CODE GENERATION");
    eprintln!("{}\n", "=".repeat(80));
    eprintln!("Using LLM model: {}", settings.model);
    eprintln!("Output directory: {}", settings.output_dir.display());

    let pipeline = GenerationPipeline::new(settings, client);

    match pipeline.run().await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            match e.stage() {
                Some(stage) => eprintln!("\n[Stage {} failed: {}]", stage, e.cause_message()),
                None => eprintln!("\nError during code generation: {}", e),
            }
            std::process::exit(1);
        }
    }
}

fn print_report(report: &GenerationReport) {
    eprintln!("\n{}", "=".repeat(80));
    eprintln!(" CODE GENERATION COMPLETED");
    eprintln!("{}\n", "=".repeat(80));

    println!("Generated files:");
    for artifact in &report.artifacts {
        println!(
            "  - {}: {} ({} bytes, sha256 {})",
            artifact.kind,
            artifact.path.display(),
            artifact.size_bytes,
            &artifact.sha256[..12]
        );
    }
    for path in &report.auxiliary_files {
        println!("  - Config: {}", path.display());
    }

    if report.is_partial() {
        eprintln!("\nSome auxiliary files could not be generated:");
        for failure in &report.auxiliary_failures {
            eprintln!("  - {}: {}", failure.file, failure.error);
        }
    }

    eprintln!("\n[Run {} finished]", report.run_id);
}

async fn compress(settings: &Settings, file: &Path, encoding: Encoding) -> Result<()> {
    let codec = SemanticCodec::new(build_client(settings)?, ModelParams::from(settings));
    let out = codec
        .compress_file(file, encoding)
        .await
        .with_context(|| format!("Failed to compress {}", file.display()))?;

    println!("{}", out.display());
    Ok(())
}

async fn decompress(settings: &Settings, file: &Path, encoding: Encoding, ext: &str) -> Result<()> {
    let codec = SemanticCodec::new(build_client(settings)?, ModelParams::from(settings));
    let out = codec
        .decompress_file(file, encoding, ext)
        .await
        .with_context(|| format!("Failed to decompress {}", file.display()))?;

    println!("{}", out.display());
    Ok(())
}

/// Round-trip the sample program and print both halves
async fn demo(settings: &Settings, encoding: Encoding) -> Result<()> {
    let codec = SemanticCodec::new(build_client(settings)?, ModelParams::from(settings));
    let result = codec
        .round_trip(SAMPLE_PROGRAM, encoding)
        .await
        .context("Sample round trip failed")?;

    println!("=== Compressed ===");
    println!("{}", result.compressed);
    println!("\n=== Reconstructed ===");
    println!("{}", result.reconstructed);
    Ok(())
}

/// Show resolved configuration
fn show_config(settings: &Settings) -> Result<()> {
    println!("Config file: {}", match &settings.config_file {
        Some(path) => path.display().to_string(),
        None => "<none>".to_string(),
    });
    println!("Model: {}", settings.model);
    println!("Endpoint: {}", settings.endpoint);
    println!("API key: {}", settings.masked_api_key());
    println!("Temperature: {}", settings.temperature);
    println!("Max tokens: {}", settings.max_tokens);
    println!("Request timeout: {}s", settings.request_timeout.as_secs());
    println!("Prompts: {}", settings.prompts_dir.display());
    println!("Output: {}", settings.output_dir.display());
    println!("Auxiliary output: {}", settings.auxiliary_dir.display());
    Ok(())
}
