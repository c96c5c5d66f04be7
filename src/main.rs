use clap::Parser;
use folder_semantic_index::domain::ports::embedding::EmbeddingService;
use folder_semantic_index::infrastructure::config::{ConfigLoader, FolderConfig};
use folder_semantic_index::infrastructure::{logging, metrics, Services};
use folder_semantic_index::Result;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "folder-semantic-index")]
#[command(about = "Per-folder semantic indexing and retrieval engine")]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file, layered over the embedded defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Additional folder to index, beyond any configured in the config file.
    /// May be repeated.
    #[arg(long = "folder")]
    folders: Vec<PathBuf>,

    /// Run the startup full scan for every folder, then exit, instead of
    /// also starting the background watcher and waiting.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let loader = ConfigLoader::new();
    let mut config = match &cli.config {
        Some(path) => loader.load_from_file(path)?,
        None => loader.load()?,
    };
    config
        .folders
        .extend(cli.folders.into_iter().map(|path| FolderConfig {
            path,
            include_extensions: Vec::new(),
        }));
    if config.folders.is_empty() {
        return Err(folder_semantic_index::Error::config(
            "no folders configured: set [[folders]] in a config file, pass --folder, \
             or set FSI__FOLDERS",
        ));
    }

    logging::init(&config.logging);
    let metrics_handle = if config.metrics.enabled { metrics::install() } else { None };

    // This binary ships only the deterministic hash-based embedding
    // service (spec §1's model-hosting non-goal); a real deployment
    // supplies its own `EmbeddingService` and constructs `Services`
    // directly rather than going through this CLI.
    let embedding: Arc<dyn EmbeddingService> = Arc::new(
        folder_semantic_index::adapters::providers::embedding::null::NullEmbeddingService::e5_like(384),
    );
    let services = Services::new(embedding, Some(&config.cache));

    let mut handles = Vec::with_capacity(config.folders.len());
    for folder in &config.folders {
        let handle = services.open_folder(folder, &config.watcher).await?;
        info!(root = %handle.root().display(), "folder ready");
        handles.push(handle);
    }

    if cli.once {
        if let Some(handle) = metrics_handle {
            info!(metrics = %metrics::render(&handle), "final metrics snapshot");
        }
        return Ok(());
    }

    tokio::signal::ctrl_c().await.ok();
    info!("shutting down");
    drop(handles);
    Ok(())
}
