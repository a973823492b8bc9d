use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use jd_core::{MapReduceConfig, SummaryChain};
use jd_llm::OllamaProvider;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "jd-cli")]
#[command(about = "Job posting summarizer with automatic map-reduce for oversized content")]
#[command(version)]
struct Cli {
    /// Ollama server URL
    #[arg(long, default_value = "http://localhost:11434", env = "JD_OLLAMA_URL")]
    ollama_url: String,

    /// Model name
    #[arg(long, default_value = "llama3.2", env = "JD_MODEL")]
    model: String,

    /// Log content analysis while processing
    #[arg(long, short, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a job posting from a text file (or stdin)
    Summarize {
        /// Plain-text input file; reads stdin when omitted
        path: Option<PathBuf>,
        /// Write the summary to this file instead of output/<timestamp>.md
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Print only, skip saving
        #[arg(long)]
        no_save: bool,
        /// Replace the standard headings with a custom output format
        #[arg(long, allow_hyphen_values = true)]
        format: Option<String>,
    },
    /// Show validation and call-count planning without invoking the model
    Stats {
        path: Option<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Check size classification only; performs no model calls
    Validate {
        path: Option<PathBuf>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let provider = OllamaProvider::new()
        .with_base_url(cli.ollama_url.clone())
        .with_model(cli.model.clone());
    let chain = SummaryChain::with_config(Arc::new(provider), MapReduceConfig::default());

    match cli.command {
        Commands::Summarize {
            path,
            output,
            no_save,
            format,
        } => {
            let content = read_content(path.as_deref())?;
            let summary = match format {
                Some(format) => chain.run_summary_with_format(&content, &format).await?,
                None => chain.run_summary(&content, cli.verbose).await?,
            };

            println!("{summary}");

            if !no_save {
                let saved = save_summary(&summary, output.as_deref())?;
                eprintln!("{} {}", "saved:".green().bold(), saved.display());
            }
        }
        Commands::Stats { path, json } => {
            let content = read_content(path.as_deref())?;
            let analysis = chain.content_analysis(&content)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                let stats = &analysis.validation.stats;
                println!("{}", "content analysis".bold());
                println!("  characters:       {}", stats.char_count);
                println!("  estimated tokens: {}", stats.estimated_tokens);
                println!("  action:           {:?}", stats.recommended_action);
                if let Some(plan) = &analysis.mapreduce {
                    println!("{}", "map-reduce plan".bold());
                    println!("  chunks:           {}", plan.chunk_count);
                    println!("  estimated calls:  {}", plan.estimated_model_calls);
                }
            }
        }
        Commands::Validate { path, json } => {
            let content = read_content(path.as_deref())?;
            let result = chain.validate_content_size(&content)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                let stats = &result.stats;
                println!("{}", "size validation".bold());
                println!("  characters:       {}", stats.char_count);
                println!("  estimated tokens: {}", stats.estimated_tokens);
                println!("  action:           {:?}", stats.recommended_action);
                println!("  needs processing: {}", result.needs_processing);
            }
        }
    }

    Ok(())
}

fn read_content(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn save_summary(summary: &str, output: Option<&Path>) -> Result<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from("output").join(format!("job_posting_{timestamp}.md"))
        }
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&path, summary).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saves_to_explicit_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("summary.md");

        let saved = save_summary("## 공고명: 테스트", Some(&target)).unwrap();

        assert_eq!(saved, target);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "## 공고명: 테스트");
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out.md");

        save_summary("요약", Some(&target)).unwrap();

        assert!(target.exists());
    }

    #[test]
    fn parses_validate_subcommand() {
        let cli = Cli::try_parse_from(["jd-cli", "validate", "posting.txt", "--json"]).unwrap();

        match cli.command {
            Commands::Validate { path, json } => {
                assert_eq!(path, Some(PathBuf::from("posting.txt")));
                assert!(json);
            }
            _ => panic!("expected validate subcommand"),
        }
    }

    #[test]
    fn parses_summarize_with_custom_format() {
        let cli =
            Cli::try_parse_from(["jd-cli", "summarize", "posting.txt", "--format", "- 한 줄 요약만"])
                .unwrap();

        match cli.command {
            Commands::Summarize { format, .. } => {
                assert_eq!(format.as_deref(), Some("- 한 줄 요약만"));
            }
            _ => panic!("expected summarize subcommand"),
        }
    }

    #[test]
    fn reads_content_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("posting.txt");
        std::fs::write(&source, "채용 공고 본문").unwrap();

        let content = read_content(Some(&source)).unwrap();

        assert_eq!(content, "채용 공고 본문");
    }
}
