use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use dataverse_dcat::{
    config::{Configuration, OutputFormat},
    core::DatasetMapper,
    handlers::{export_dataset, DataverseClient},
    rules::catalogue,
    utils::{archive_file_name, RdfSerializer},
};

#[derive(Parser)]
#[command(
    name = "dataverse_dcat",
    about = "Map Dataverse dataset metadata to DCAT linked data",
    long_about = None,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert dataset metadata JSON files (or directories of them)
    Convert {
        /// Input files or directories
        #[arg(short, long, required = true)]
        input: Vec<PathBuf>,

        /// Output directory; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "turtle")]
        format: OutputFormatArg,

        /// Print graph statistics for each dataset
        #[arg(long)]
        stats: bool,
    },

    /// Fetch datasets from a Dataverse installation and export them
    Fetch {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,

        /// Persistent identifiers (e.g. doi:10.15454/DOWA7X)
        #[arg(required = true)]
        persistent_ids: Vec<String>,

        /// Output directory, overrides the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format, overrides the configuration
        #[arg(short, long, value_enum)]
        format: Option<OutputFormatArg>,
    },

    /// Download the files of datasets as zip archives
    Download {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,

        /// Persistent identifiers (e.g. doi:10.15454/DOWA7X)
        #[arg(required = true)]
        persistent_ids: Vec<String>,

        /// Output directory, overrides the configuration
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run a global search against a Dataverse installation
    Search {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,

        /// Search query
        query: String,

        /// Print the hits as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every published dataset of a Dataverse installation
    List {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Show the order in which mapping rules run
    Schedule,

    /// Validate configuration file
    Validate {
        /// Configuration file path
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Generate example configuration
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,

        /// Configuration format
        #[arg(short, long, value_enum, default_value = "yaml")]
        format: ConfigFormat,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum OutputFormatArg {
    Turtle,
    NTriples,
    Json,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(format: OutputFormatArg) -> Self {
        match format {
            OutputFormatArg::Turtle => Self::Turtle,
            OutputFormatArg::NTriples => Self::NTriples,
            OutputFormatArg::Json => Self::Json,
        }
    }
}

#[derive(clap::ValueEnum, Clone)]
enum ConfigFormat {
    Yaml,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    let subscriber = tracing_subscriber::fmt().with_target(false);
    if std::env::var_os("RUST_LOG").is_some() {
        subscriber.with_env_filter(EnvFilter::from_default_env()).init();
    } else {
        subscriber.with_max_level(log_level).init();
    }

    match cli.command {
        Commands::Convert { input, output, format, stats } => {
            convert_command(input, output, format.into(), stats).await
        }
        Commands::Fetch { config, persistent_ids, output, format } => {
            fetch_command(config, persistent_ids, output, format.map(Into::into)).await
        }
        Commands::Download { config, persistent_ids, output } => {
            download_command(config, persistent_ids, output).await
        }
        Commands::Search { config, query, json } => search_command(config, query, json).await,
        Commands::List { config } => list_command(config).await,
        Commands::Schedule => schedule_command(),
        Commands::Validate { config } => validate_command(config).await,
        Commands::GenerateConfig { output, format } => generate_config_command(output, format).await,
    }
}

/// JSON files named directly, plus every `*.json` below named directories.
fn collect_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name().into_iter() {
                match entry {
                    Ok(entry)
                        if entry.file_type().is_file()
                            && entry.path().extension().and_then(|e| e.to_str()) == Some("json") =>
                    {
                        files.push(entry.into_path())
                    }
                    Ok(_) => {}
                    Err(e) => warn!("Skipping unreadable entry: {}", e),
                }
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Native API responses wrap the dataset in `{"status": .., "data": ..}`.
fn unwrap_api_envelope(document: Value) -> Value {
    match document {
        Value::Object(mut map) if map.contains_key("data") && !map.contains_key("latestVersion") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

async fn convert_command(
    inputs: Vec<PathBuf>,
    output: Option<PathBuf>,
    format: OutputFormat,
    stats: bool,
) -> Result<()> {
    let files = collect_inputs(&inputs);
    if files.is_empty() {
        anyhow::bail!("No JSON input found");
    }

    if output.is_some() {
        println!("{}", "Converting dataset metadata...".bright_blue().bold());
        println!(" Documents: {}", files.len());
    }

    let mapper = DatasetMapper::with_catalogue()?;
    let mut failures = 0;
    let mut total_triples = 0;

    for file in &files {
        let source = file.display().to_string();
        let outcome = convert_file(&mapper, file, output.as_deref(), &format).await;
        match outcome {
            Ok(result) => {
                total_triples += result.graph.len();
                if stats {
                    eprintln!("{}\n{}", source.bright_green(), result.graph.statistics());
                }
            }
            Err(e) => {
                failures += 1;
                error!("Failed to convert {}: {:#}", source, e);
            }
        }
    }

    if output.is_some() {
        println!("\n{}", " Conversion Summary".bright_green().bold());
        println!(" Total triples: {}", total_triples.to_string().bright_cyan());
    }

    if failures > 0 {
        anyhow::bail!("{} of {} documents failed", failures, files.len());
    }
    Ok(())
}

async fn convert_file(
    mapper: &DatasetMapper,
    file: &Path,
    output: Option<&Path>,
    format: &OutputFormat,
) -> Result<dataverse_dcat::ExtractionResult> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let document: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON in {}", file.display()))?;
    let document = unwrap_api_envelope(document);

    let result = mapper.run(&document, &file.display().to_string())?;

    match output {
        Some(directory) => {
            tokio::fs::create_dir_all(directory)
                .await
                .with_context(|| format!("Failed to create output directory: {}", directory.display()))?;
            let stem = file
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("dataset");
            let path = directory.join(format!("{}.{}", stem, format.extension()));
            result.graph.export_to_file(&path, format)?;
            println!(" Export written to: {}", path.display().to_string().bright_green());
        }
        None => print!("{}", RdfSerializer::serialize(&result.graph, format)?),
    }

    Ok(result)
}

async fn fetch_command(
    config_path: PathBuf,
    persistent_ids: Vec<String>,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
) -> Result<()> {
    println!("{}", "Fetching datasets...".bright_blue().bold());

    let config = Configuration::from_file(&config_path)?;
    config.validate()?;

    let directory = output.unwrap_or_else(|| PathBuf::from(&config.output.directory));
    let format = format.unwrap_or(config.output.format);

    println!(" Dataverse: {}", config.dataverse.base_url.bright_green());
    println!(" Datasets: {}", persistent_ids.len());

    let client = DataverseClient::from_settings(&config.dataverse)?;
    let mapper = DatasetMapper::with_catalogue()?;

    let progress = ProgressBar::new(persistent_ids.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for pid in &persistent_ids {
        progress.set_message(pid.clone());
        match export_dataset(&client, &mapper, pid, &directory, &format).await {
            Ok(path) => written.push(path),
            Err(e) => {
                progress.suspend(|| error!("{}: {:#}", pid, e));
                failures.push(pid.clone());
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    for path in &written {
        println!(" Export written to: {}", path.display().to_string().bright_green());
    }

    if failures.is_empty() {
        println!(" {} completed successfully!", "Fetch".bright_green());
        Ok(())
    } else {
        anyhow::bail!("Failed datasets: {}", failures.join(", "))
    }
}

async fn download_command(
    config_path: PathBuf,
    persistent_ids: Vec<String>,
    output: Option<PathBuf>,
) -> Result<()> {
    println!("{}", "Downloading datasets...".bright_blue().bold());

    let config = Configuration::from_file(&config_path)?;
    config.validate()?;

    let directory = output.unwrap_or_else(|| PathBuf::from(&config.output.directory));
    tokio::fs::create_dir_all(&directory)
        .await
        .with_context(|| format!("Failed to create output directory: {}", directory.display()))?;

    let client = DataverseClient::from_settings(&config.dataverse)?;

    let progress = ProgressBar::new(persistent_ids.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failures = Vec::new();
    for pid in &persistent_ids {
        progress.set_message(pid.clone());
        let path = directory.join(archive_file_name(pid));
        let result = match client.download_dataset(pid).await {
            Ok(archive) => tokio::fs::write(&path, archive)
                .await
                .with_context(|| format!("Failed to write archive: {}", path.display())),
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => progress.suspend(|| {
                println!(" Archive written to: {}", path.display().to_string().bright_green())
            }),
            Err(e) => {
                progress.suspend(|| error!("{}: {:#}", pid, e));
                failures.push(pid.clone());
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if failures.is_empty() {
        println!(" {} completed successfully!", "Download".bright_green());
        Ok(())
    } else {
        anyhow::bail!("Failed datasets: {}", failures.join(", "))
    }
}

async fn search_command(config_path: PathBuf, query: String, json: bool) -> Result<()> {
    let config = Configuration::from_file(&config_path)?;
    config.validate()?;

    let client = DataverseClient::from_settings(&config.dataverse)?;
    let hits = client.global_search(&query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    println!("{} {}", " Results for".bright_blue().bold(), query.bright_yellow());
    for hit in &hits {
        println!(
            "  • {} {}",
            hit.label.as_deref().unwrap_or("(untitled)").bright_cyan(),
            hit.link
        );
    }
    println!(" {} hit(s)", hits.len());
    Ok(())
}

async fn list_command(config_path: PathBuf) -> Result<()> {
    let config = Configuration::from_file(&config_path)?;
    config.validate()?;

    let client = DataverseClient::from_settings(&config.dataverse)?;
    let listing = client.get_all_datasets().await?;

    let items = listing
        .pointer("/data/items")
        .and_then(Value::as_array)
        .context("Search response has no data.items list")?;

    println!("{}", " Published datasets".bright_blue().bold());
    for item in items {
        println!(
            "  • {} {}",
            item.get("global_id").and_then(Value::as_str).unwrap_or("?").bright_cyan(),
            item.get("name").and_then(Value::as_str).unwrap_or_default()
        );
    }
    if let Some(total) = listing.pointer("/data/total_count") {
        println!(" Total: {} (showing {})", total, items.len());
    }
    Ok(())
}

fn schedule_command() -> Result<()> {
    println!("{}", " Rule schedule".bright_blue().bold());

    let rules = catalogue();
    for (position, rule) in dataverse_dcat::core::schedule(&rules)?.iter().enumerate() {
        let requires: Vec<String> = rule.required_labels().iter().map(ToString::to_string).collect();
        let provides: Vec<String> = rule.provided_labels().iter().map(ToString::to_string).collect();
        println!(
            " {:>2}. {} {}",
            position + 1,
            rule.name.bright_cyan(),
            rule.query
        );
        println!("     requires: {}  provides: {}", requires.join(", "), provides.join(", "));
    }

    let unprovided = dataverse_dcat::core::unprovided_requirements(&rules);
    if !unprovided.is_empty() {
        let labels: Vec<String> = unprovided.iter().map(ToString::to_string).collect();
        println!(" {} {}", "Never provided:".bright_yellow(), labels.join(", "));
    }
    Ok(())
}

async fn validate_command(config_path: PathBuf) -> Result<()> {
    println!("{}", " Validating configuration...".bright_blue().bold());

    match Configuration::from_file(&config_path) {
        Ok(config) => match config.validate() {
            Ok(()) => {
                println!(" Configuration is valid!");
                println!(" Name: {}", config.name.bright_green());
                println!(" Dataverse: {}", config.dataverse.base_url);
                println!(" Timeout: {}s", config.dataverse.timeout);
                println!(" Output: {} ({})", config.output.directory, config.output.format);
                Ok(())
            }
            Err(e) => {
                error!(" Configuration validation failed: {}", e);
                Err(e)
            }
        },
        Err(e) => {
            error!(" Failed to load configuration: {}", e);
            Err(e)
        }
    }
}

async fn generate_config_command(output_path: PathBuf, format: ConfigFormat) -> Result<()> {
    println!("{}", " Generating example configuration...".bright_blue().bold());

    let config = Configuration::example();

    let content = match format {
        ConfigFormat::Yaml => serde_yaml::to_string(&config)?,
        ConfigFormat::Json => serde_json::to_string_pretty(&config)?,
    };

    tokio::fs::write(&output_path, content).await?;

    println!(
        " Example configuration generated at: {}",
        output_path.display().to_string().bright_green()
    );
    println!(" Edit the file to point at your Dataverse installation");

    Ok(())
}
