use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sms_toolkit::{
    config::Config,
    embedding::build_embedding_client,
    indexing::{CodebaseIndexer, IndexingOptions, IndexingReport},
    knowledge_base::KnowledgeBase,
    logging,
    pinecone::PineconeService,
    template::{self, DEFAULT_STUDENTS_TEMPLATE, DEFAULT_TEACHERS_TEMPLATE},
};

#[derive(Parser)]
#[command(
    name = "sms-toolkit",
    about = "Maintenance tooling for the student management system"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed the source tree and upsert it into the Pinecone index.
    Index {
        /// Directory to walk (overrides INDEX_ROOT).
        #[arg(long)]
        root: Option<PathBuf>,
        /// Target index name (overrides PINECONE_INDEX_NAME).
        #[arg(long)]
        index_name: Option<String>,
        /// Records per upsert request (overrides INDEX_BATCH_SIZE).
        #[arg(long)]
        batch_size: Option<usize>,
        /// Character threshold per chunk (overrides INDEX_CHUNK_SIZE).
        #[arg(long)]
        chunk_size: Option<usize>,
    },
    /// Convert the FAQ markdown into Tawk.to import files.
    KnowledgeBase {
        #[arg(long, default_value = "KNOWLEDGE_BASE.md")]
        input: PathBuf,
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// Derive the teachers list template from the students one.
    TeachersTemplate {
        #[arg(long, default_value = DEFAULT_STUDENTS_TEMPLATE)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_TEACHERS_TEMPLATE)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init_tracing();
    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Index {
            root,
            index_name,
            batch_size,
            chunk_size,
        } => {
            let mut config = Config::from_env().context("failed to load configuration")?;
            if let Some(root) = root {
                config.root = root;
            }
            if let Some(index_name) = index_name {
                config.index_name = index_name;
            }
            if let Some(batch_size) = batch_size {
                config.batch_size = batch_size;
            }
            if let Some(chunk_size) = chunk_size {
                config.chunk_size = chunk_size;
            }
            config.validate()?;
            let report = index_codebase(&config).await?;
            print_index_report(&report);
        }
        Command::KnowledgeBase { input, output_dir } => {
            let kb = KnowledgeBase::from_file(&input)?;
            let paths = kb.write_outputs(&output_dir)?;
            println!("Generated files:");
            println!("   - {}", paths.html.display());
            println!("   - {}", paths.csv.display());
            println!("Summary:");
            println!("   - Categories: {}", kb.categories.len());
            println!("   - Total Q&A: {}", kb.total_articles());
        }
        Command::TeachersTemplate { input, output } => {
            let derivation = template::write_teachers_template(&input, &output)?;
            println!(
                "Teachers template created at {} ({} rules applied)",
                output.display(),
                derivation.rules_applied
            );
        }
    }
    Ok(())
}

async fn index_codebase(config: &Config) -> Result<IndexingReport> {
    // Credentials are checked before any client is built or any request is sent.
    let credentials = config.credentials()?;
    tracing::debug!(
        root = %config.root.display(),
        index = %config.index_name,
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        "Loaded configuration"
    );

    let embedder = build_embedding_client(config, &credentials)
        .context("failed to build embedding client")?;
    let store = PineconeService::new(
        &config.pinecone_controller_url,
        &credentials.pinecone_api_key,
    )
    .context("failed to build Pinecone client")?;

    let indexer = CodebaseIndexer::new(
        embedder.as_ref(),
        &store,
        IndexingOptions::from_config(config),
    );
    Ok(indexer.run().await?)
}

fn print_index_report(report: &IndexingReport) {
    println!("Indexing complete");
    println!("   - Index: {}", report.index_name);
    println!("   - Embedding model: {}", report.embedding_model);
    println!("   - Files selected: {}", report.files_selected);
    println!("   - Files processed: {}", report.metrics.files_processed);
    println!("   - Files skipped (empty): {}", report.metrics.files_skipped);
    println!("   - Files failed: {}", report.metrics.files_failed);
    println!("   - Chunks indexed: {}", report.metrics.chunks_indexed);
    println!("   - Chunks failed: {}", report.metrics.chunks_failed);
    println!("   - Batches upserted: {}", report.batches_flushed);
    println!(
        "   - Total vectors in index: {} (was {})",
        report.vectors_after, report.vectors_before
    );
}
