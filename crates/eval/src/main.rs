//! Command-line front end for document admissibility screening.
//!
//! Usage:
//!     docval train --valid samples/ok --invalid samples/bad
//!     docval classify --valid samples/ok --invalid samples/bad scan.pdf photo.png
//!     docval inspect scan.pdf
//!     docval config

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use docval_classify::{classify_batch, ClassifyError};
use docval_explain::summarize;
use docval_features::{mime_for_extension, ExtractError, FeatureExtractor, PlaceholderImageAnalyzer};
use docval_model::{
    ClassificationResult, ClassifierConfig, FeatureRecord, Label, RawDocument,
    DEFAULT_SAMPLE_BYTES,
};
use docval_train::{train, AppendLog, TrainedModel, TrainingSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

/// Training sets smaller than this are refused unless `--force` is given.
const MIN_TRAINING_DOCS: usize = 4;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Parser)]
#[command(name = "docval")]
#[command(about = "Screen documents for admissibility against labeled examples")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Bytes of content read from each file for analysis
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
    sample_bytes: usize,

    /// Seed for the image analyzer, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
struct TrainingArgs {
    /// Directory of admissible example documents
    #[arg(long)]
    valid: PathBuf,

    /// Directory of rejected example documents
    #[arg(long)]
    invalid: PathBuf,

    /// Train even with fewer than 4 examples
    #[arg(long)]
    force: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on labeled directories and report model metrics
    Train {
        #[command(flatten)]
        training: TrainingArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Train, then classify the given files
    Classify {
        #[command(flatten)]
        training: TrainingArgs,

        /// Classifier configuration (JSON); missing fields use defaults
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the admission threshold (0.5 - 0.95)
        #[arg(short, long)]
        threshold: Option<f32>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,

        /// Documents to classify
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the extracted features of the given files
    Inspect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Print the default classifier configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docval=debug".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let extractor = Arc::new(build_extractor(cli.seed));

    match cli.command {
        Commands::Train { training, format } => {
            run_train(&extractor, &training, cli.sample_bytes, format).await?;
        }
        Commands::Classify {
            training,
            config,
            threshold,
            format,
            files,
        } => {
            let config = load_config(config.as_deref(), threshold).await?;
            run_classify(&extractor, &training, &config, &files, cli.sample_bytes, format).await?;
        }
        Commands::Inspect { files } => {
            run_inspect(&extractor, &files, cli.sample_bytes).await?;
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&ClassifierConfig::default())?);
        }
    }

    Ok(())
}

fn build_extractor(seed: Option<u64>) -> FeatureExtractor {
    match seed {
        Some(seed) => FeatureExtractor::new().with_analyzer(PlaceholderImageAnalyzer::seeded(seed)),
        None => FeatureExtractor::new(),
    }
}

async fn load_config(path: Option<&Path>, threshold: Option<f32>) -> Result<ClassifierConfig> {
    let mut config = match path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => ClassifierConfig::default(),
    };
    if let Some(threshold) = threshold {
        config = config.with_threshold(threshold);
    }
    config.validate()?;
    Ok(config)
}

/// Read a file's metadata and the leading `sample_bytes` of its content.
async fn read_document(path: &Path, sample_bytes: usize) -> Result<RawDocument> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("unusable file name: {}", path.display()))?;

    let meta = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("reading metadata of {}", path.display()))?;

    let mut sample = Vec::with_capacity(sample_bytes.min(meta.len() as usize));
    let file = tokio::fs::File::open(path).await?;
    file.take(sample_bytes as u64).read_to_end(&mut sample).await?;

    let mime = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| mime_for_extension(&ext.to_ascii_lowercase()))
        .unwrap_or(FALLBACK_MIME);

    let mut doc = RawDocument::new(name, meta.len(), mime).with_content_limit(&sample, sample_bytes);
    if let Ok(modified) = meta.modified() {
        doc = doc.with_last_modified(DateTime::<Utc>::from(modified));
    }
    Ok(doc)
}

/// Every regular file in `dir`, sorted by name.
async fn read_dir(dir: &Path, sample_bytes: usize) -> Result<Vec<RawDocument>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("reading directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    tracing::debug!(dir = %dir.display(), count = paths.len(), "listed documents");

    read_files(&paths, sample_bytes).await
}

async fn read_files(paths: &[PathBuf], sample_bytes: usize) -> Result<Vec<RawDocument>> {
    let mut docs = Vec::with_capacity(paths.len());
    for path in paths {
        docs.push(read_document(path, sample_bytes).await?);
    }
    Ok(docs)
}

/// Extract features off the async runtime. An empty input yields no records.
async fn extract(extractor: &Arc<FeatureExtractor>, docs: Vec<RawDocument>) -> Result<Vec<FeatureRecord>> {
    let extractor = Arc::clone(extractor);
    let extracted = tokio::task::spawn_blocking(move || extractor.extract_batch(&docs)).await?;
    match extracted {
        Ok(records) => Ok(records),
        Err(ExtractError::EmptyBatch) => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

async fn build_model(
    extractor: &Arc<FeatureExtractor>,
    args: &TrainingArgs,
    sample_bytes: usize,
) -> Result<TrainedModel> {
    let valid = read_dir(&args.valid, sample_bytes).await?;
    let invalid = read_dir(&args.invalid, sample_bytes).await?;

    let total = valid.len() + invalid.len();
    if total < MIN_TRAINING_DOCS && !args.force {
        bail!(
            "only {} training documents found; at least {} are needed (use --force to train anyway)",
            total,
            MIN_TRAINING_DOCS
        );
    }

    let set = TrainingSet::new();
    set.add_all(Label::Valid, extract(extractor, valid).await?);
    set.add_all(Label::Invalid, extract(extractor, invalid).await?);

    Ok(train(&set))
}

async fn run_train(
    extractor: &Arc<FeatureExtractor>,
    args: &TrainingArgs,
    sample_bytes: usize,
    format: Format,
) -> Result<()> {
    let model = build_model(extractor, args, sample_bytes).await?;

    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&model)?),
        Format::Text => {
            let m = &model.metrics;
            println!("Training set: {} valid, {} invalid", m.valid_count, m.invalid_count);
            println!("Balance ratio: {:.2}", m.balance_ratio);
            println!("Estimated accuracy: {:.0}%", m.estimated_accuracy);
            println!("Confidence: {}", m.confidence);
            println!("Recommendation: {}", m.recommendation);

            let valid = &model.patterns.valid;
            if let Some(ext) = valid.most_common_extension() {
                println!("---");
                println!("Typical admissible document: .{} around {:.2} MB", ext, valid.mean_size_mb);
            }
        }
    }

    Ok(())
}

async fn run_classify(
    extractor: &Arc<FeatureExtractor>,
    args: &TrainingArgs,
    config: &ClassifierConfig,
    files: &[PathBuf],
    sample_bytes: usize,
    format: Format,
) -> Result<()> {
    let model = build_model(extractor, args, sample_bytes).await?;
    let docs = read_files(files, sample_bytes).await?;
    let records = extract(extractor, docs).await?;

    let history: AppendLog<ClassificationResult> = AppendLog::new();
    match classify_batch(&records, &model.patterns, config) {
        Ok(results) => history.extend(results),
        Err(ClassifyError::EmptyBatch) => {}
        Err(e) => return Err(e.into()),
    }

    let results = history.recent_first();
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        Format::Text => {
            for result in &results {
                println!("\n{}", result.document_name);
                println!("   {}", summarize(result));
                for reason in &result.reasons {
                    println!("   {}", reason);
                }
            }
            let admitted = results.iter().filter(|r| r.is_valid).count();
            println!("\n---");
            println!("{} of {} documents admitted", admitted, results.len());
        }
    }

    Ok(())
}

async fn run_inspect(
    extractor: &Arc<FeatureExtractor>,
    files: &[PathBuf],
    sample_bytes: usize,
) -> Result<()> {
    let docs = read_files(files, sample_bytes).await?;
    let records = extract(extractor, docs).await?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_document_samples_leading_bytes() {
        let dir = std::env::temp_dir().join(format!("docval-read-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("Contract_2025.pdf");
        tokio::fs::write(&path, vec![b'%'; 5000]).await.unwrap();

        let doc = read_document(&path, 16).await.unwrap();
        assert_eq!(doc.name(), "Contract_2025.pdf");
        assert_eq!(doc.size_bytes(), 5000);
        assert_eq!(doc.mime_type(), "application/pdf");
        assert_eq!(doc.content_sample().map(|s| s.len()), Some(16));
        assert!(doc.last_modified().is_some());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_extension_gets_fallback_mime() {
        let dir = std::env::temp_dir().join(format!("docval-mime-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("payload.exe");
        tokio::fs::write(&path, b"MZ").await.unwrap();

        let doc = read_document(&path, DEFAULT_SAMPLE_BYTES).await.unwrap();
        assert_eq!(doc.mime_type(), FALLBACK_MIME);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_small_training_set_needs_force() {
        let root = std::env::temp_dir().join(format!("docval-train-{}", std::process::id()));
        let (valid, invalid) = (root.join("valid"), root.join("invalid"));
        tokio::fs::create_dir_all(&valid).await.unwrap();
        tokio::fs::create_dir_all(&invalid).await.unwrap();
        tokio::fs::write(valid.join("a.pdf"), b"%PDF-1.7").await.unwrap();
        tokio::fs::write(invalid.join("b.txt"), b"hello").await.unwrap();

        let extractor = Arc::new(build_extractor(Some(7)));
        let mut args = TrainingArgs {
            valid,
            invalid,
            force: false,
        };
        assert!(build_model(&extractor, &args, DEFAULT_SAMPLE_BYTES).await.is_err());

        args.force = true;
        let model = build_model(&extractor, &args, DEFAULT_SAMPLE_BYTES).await.unwrap();
        assert!(model.is_ready());
        assert_eq!(model.metrics.training_size, 2);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_config_threshold_override() {
        let config = load_config(None, Some(0.8)).await.unwrap();
        assert_eq!(config.confidence_threshold, 0.8);
        assert!(load_config(None, Some(0.99)).await.is_err());
    }
}
