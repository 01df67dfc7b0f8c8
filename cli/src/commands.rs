use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use docqa_config::Config;
use docqa_core::chunking::{normalize, Chunker};
use docqa_core::models::{AnswerStatus, Document, DocumentMetadata};
use docqa_index::{IndexHandle, VectorIndex};
use docqa_pipeline::embedder::select_embedder;
use docqa_pipeline::eval::{EvalCase, Evaluator};
use docqa_pipeline::llm::select_generator;
use docqa_pipeline::QueryPipeline;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Question answering over a private document collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the vector index from a directory of documents
    Index {
        /// Directory containing .txt/.md documents
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Ask a question against the indexed collection
    Ask {
        /// The question
        question: String,

        /// Maximum number of sources to use
        #[arg(long)]
        top: Option<usize>,

        /// Print the cited sources
        #[arg(long)]
        show_sources: bool,
    },
    /// Run the offline evaluation harness over a labeled dataset
    Eval {
        /// JSON file with labeled evaluation cases
        #[arg(long)]
        dataset: PathBuf,

        /// Where to write the JSON report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Concurrency cap for pipeline calls
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Show metadata of the persisted index
    Status,
}

pub async fn handle_index(config: &Config, data_dir: &Path) -> Result<()> {
    let documents = load_documents(data_dir)?;
    if documents.is_empty() {
        return Err(anyhow!(
            "no .txt/.md documents found under {}",
            data_dir.display()
        ));
    }
    info!(documents = documents.len(), "loaded documents");

    let chunker = Chunker::new(config.chunking.clone());
    let mut chunks = Vec::new();
    for doc in &documents {
        match chunker.chunk(doc) {
            Ok(mut doc_chunks) => chunks.append(&mut doc_chunks),
            // Bad input is fatal for that document only.
            Err(err) => warn!(document = %doc.id, error = %err, "skipping document"),
        }
    }
    info!(chunks = chunks.len(), "chunked documents");

    let embedder = select_embedder(&config.embedding)?;
    let bar = ProgressBar::new(chunks.len() as u64);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:40}] {pos}/{len}")
            .context("progress template")?,
    );
    bar.set_message("embedding");

    let titles: std::collections::HashMap<&str, &str> = documents
        .iter()
        .map(|d| (d.id.as_str(), d.metadata.title.as_str()))
        .collect();

    let mut pairs = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(32) {
        // Prefix the document title so the embedding carries provenance;
        // the stored chunk text stays untouched.
        let texts: Vec<String> = batch
            .iter()
            .map(|c| {
                let title = titles.get(c.document_id.as_str()).copied().unwrap_or("");
                format!("Document: {} | {}", title, c.text)
            })
            .collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        for (chunk, embedding) in batch.iter().cloned().zip(embeddings) {
            pairs.push((chunk, embedding));
        }
        bar.inc(batch.len() as u64);
    }
    bar.finish_and_clear();

    let index = VectorIndex::build(
        pairs,
        config.embedding.dimension,
        config.index.metric,
        config.chunking.clone(),
    )?;
    index.persist(&config.index.path)?;

    println!(
        "Indexed {} chunks from {} documents into {}",
        index.len(),
        documents.len(),
        config.index.path.display()
    );
    Ok(())
}

pub async fn handle_ask(
    config: &Config,
    question: &str,
    top: Option<usize>,
    show_sources: bool,
) -> Result<()> {
    let pipeline = open_pipeline(config)?;
    let result = pipeline.query(question, top).await;

    println!("{}", result.answer);
    if show_sources && !result.citations.is_empty() {
        println!("\nSources:");
        for citation in &result.citations {
            println!(
                "  [{}] {} (score {:.2})",
                citation.handle, citation.source_uri, citation.score
            );
        }
    }
    if result.status == AnswerStatus::Ungrounded {
        println!("\n(note: this answer could not be fully grounded in the indexed sources)");
    }
    info!(
        classification = %result.classification,
        latency_ms = result.latency_ms,
        "query complete"
    );
    Ok(())
}

pub async fn handle_eval(
    config: &Config,
    dataset: &Path,
    output: Option<&Path>,
    concurrency: Option<usize>,
) -> Result<()> {
    let content = std::fs::read_to_string(dataset)
        .with_context(|| format!("reading dataset {}", dataset.display()))?;
    let cases: Vec<EvalCase> = serde_json::from_str(&content).context("parsing dataset")?;

    let pipeline = open_pipeline(config)?;
    let mut eval_config = config.eval.clone();
    if let Some(cap) = concurrency {
        eval_config.concurrency = cap;
    }

    let mut evaluator = Evaluator::new(pipeline, eval_config);
    let report = evaluator.run(cases).await;

    println!("Evaluated {} cases ({} failed)", report.total, report.failed);
    println!(
        "  retrieval:    {:.3} +/- {:.3}",
        report.retrieval.mean, report.retrieval.std_dev
    );
    println!(
        "  faithfulness: {:.3} +/- {:.3}",
        report.faithfulness.mean, report.faithfulness.std_dev
    );
    println!(
        "  relevance:    {:.3} +/- {:.3}",
        report.relevance.mean, report.relevance.std_dev
    );
    println!(
        "  completeness: {:.3} +/- {:.3}",
        report.completeness.mean, report.completeness.std_dev
    );
    println!("  overall:      {:.3}", report.overall.mean);

    let output = output.unwrap_or_else(|| Path::new("evaluation_report.json"));
    std::fs::write(output, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("writing report {}", output.display()))?;
    println!("Report written to {}", output.display());
    Ok(())
}

pub fn handle_status(config: &Config) -> Result<()> {
    let index = VectorIndex::load(&config.index.path)?;
    let manifest = index.manifest();
    println!("Index at {}", config.index.path.display());
    println!("  entries:   {}", manifest.entry_count);
    println!("  dimension: {}", manifest.dimension);
    println!("  metric:    {}", manifest.metric);
    println!(
        "  chunking:  {} tokens / {} overlap",
        manifest.chunking.window_tokens, manifest.chunking.overlap_tokens
    );
    Ok(())
}

fn open_pipeline(config: &Config) -> Result<Arc<QueryPipeline>> {
    let index = VectorIndex::load(&config.index.path)?;
    // Configuration drift against the artifact is fatal at startup.
    index.ensure_compatible(
        config.embedding.dimension,
        config.index.metric,
        &config.chunking,
    )?;

    let embedder = select_embedder(&config.embedding)?;
    let generator = select_generator();
    Ok(Arc::new(QueryPipeline::new(
        Arc::new(IndexHandle::new(index)),
        embedder,
        generator,
        config,
    )))
}

/// Ingestion glue: plain-text and markdown files only, text assumed to be
/// already extracted. Binary parsing never happens inside the core.
fn load_documents(data_dir: &Path) -> Result<Vec<Document>> {
    let ingested_at = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut documents = Vec::new();
    for entry in WalkDir::new(data_dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !matches!(ext, "txt" | "md") {
            continue;
        }
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable file");
                continue;
            }
        };
        let relative = path
            .strip_prefix(data_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();
        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| relative.clone());
        documents.push(Document {
            id: relative.clone(),
            source_uri: relative,
            raw_text: normalize(&raw),
            metadata: DocumentMetadata { title, ingested_at },
        });
    }
    documents.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(documents)
}
