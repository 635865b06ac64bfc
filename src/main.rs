//! csqa - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

use csqa::{
    cli::{show_outcome, Args, Commands, Verbosity},
    config::Config,
    corpus::{count_tags, load_intents},
    embedding::{CandleEmbedder, Embedder, EmbeddingBackend, OllamaEmbedder},
    generation::{HfTokenizer, OllamaGenerator},
    index::{VectorIndex, BUILD_BATCH_SIZE},
    rag::{AnswerParams, RAGPipeline},
    repl::ReplSession,
};

/// Initialize logger; RUST_LOG wins over the verbosity flags
fn init_logger(verbosity: Verbosity) {
    let mut log_builder = env_logger::Builder::new();
    log_builder.filter_level(verbosity.log_level());
    log_builder.parse_env("RUST_LOG");
    log_builder.init();
}

/// Load the configuration file, then apply command-line overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    args.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn show_config(config: &Config) -> Result<()> {
    match Config::config_path() {
        Ok(path) => println!("{} {}\n", "Config file:".bold(), path.display()),
        Err(e) => log::debug!("No default config path: {}", e),
    }
    println!("{}", config.to_toml()?);
    Ok(())
}

fn show_corpus(config: &Config) -> Result<()> {
    let passages = load_intents(&config.corpus.path)?;
    println!("{} {}", "Corpus:".bold(), config.corpus.path.display());
    println!("  Passages: {}", passages.len());
    println!("  Tags:     {}", count_tags(&passages));
    Ok(())
}

/// Construct the configured embedding backend
fn build_embedder(config: &Config) -> Result<Arc<dyn Embedder>> {
    let models = &config.models;
    let embedder: Arc<dyn Embedder> = match models.embedding_backend {
        EmbeddingBackend::Candle => Arc::new(CandleEmbedder::new(
            &models.embedding_model,
            models.pooling,
            models.hf_token(),
        )?),
        EmbeddingBackend::Ollama => Arc::new(OllamaEmbedder::new(
            &models.ollama_url,
            &models.embedding_model,
        )?),
    };
    log::info!(
        "Embedding backend {:?} with model {}",
        models.embedding_backend,
        models.embedding_model
    );
    Ok(embedder)
}

/// Load the corpus and embed it into the vector index
async fn build_index(
    config: &Config,
    embedder: &dyn Embedder,
    verbosity: Verbosity,
) -> Result<VectorIndex> {
    let passages = load_intents(&config.corpus.path)
        .with_context(|| format!("Could not load corpus {}", config.corpus.path.display()))?;

    let pb = if verbosity.show_progress() {
        ProgressBar::new(passages.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} Embedding corpus [{bar:40.cyan/blue}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let progress = &pb;
    let index = VectorIndex::build_with_progress(
        passages,
        embedder,
        BUILD_BATCH_SIZE,
        move |done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
        },
    )
    .await;
    pb.finish_and_clear();

    Ok(index?)
}

/// Wire the pipeline from configuration
async fn build_pipeline(config: &Config, verbosity: Verbosity) -> Result<RAGPipeline> {
    let embedder = build_embedder(config)?;
    let index = build_index(config, embedder.as_ref(), verbosity).await?;

    let tokenizer = HfTokenizer::load(&config.models.tokenizer_model, config.models.hf_token())?;
    let generator = OllamaGenerator::with_config(
        &config.models.ollama_url,
        &config.models.generation_model,
        Arc::new(tokenizer),
    )?;

    if !generator.health_check().await? {
        eprintln!(
            "{}: Ollama is not reachable at {}. Start it with: ollama serve",
            "Warning".yellow(),
            generator.base_url()
        );
    }

    Ok(RAGPipeline::with_config(
        Arc::new(index),
        embedder,
        Arc::new(generator),
        config.rag_config(),
    ))
}

async fn run_questions(pipeline: &RAGPipeline, args: &Args, params: &AnswerParams) {
    for question in &args.questions {
        let outcome = pipeline.run(question, params).await;
        show_outcome(question, &outcome, args.show_context);
    }
}

async fn run_repl(pipeline: &RAGPipeline, config: &Config, args: &Args, params: &AnswerParams) -> Result<()> {
    let mut session = match Config::config_dir() {
        Ok(dir) => ReplSession::with_history(dir.join("history"), args.show_context)?,
        Err(e) => {
            log::warn!("History disabled: {}", e);
            ReplSession::new(args.show_context)?
        }
    };

    session.show_banner(pipeline.corpus_size(), &config.models.generation_model);
    session.run(pipeline, params).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if let Err(msg) = args.validate() {
        eprintln!("{}: {}", "Error".red(), msg);
        std::process::exit(2);
    }

    let verbosity = args.verbosity();
    init_logger(verbosity);

    let config = load_config(&args)?;

    match &args.command {
        Some(Commands::Config) => return show_config(&config),
        Some(Commands::Corpus) => return show_corpus(&config),
        Some(Commands::Repl) | None => {}
    }

    let pipeline = build_pipeline(&config, verbosity).await?;
    let params = AnswerParams::from(pipeline.config());

    if args.interactive() {
        run_repl(&pipeline, &config, &args, &params).await?;
    } else {
        run_questions(&pipeline, &args, &params).await;
    }

    Ok(())
}
