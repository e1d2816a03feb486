use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use reqwest::Client;
use slaycanvas_web::{AppConfig, AppState, UploadFile, UploadHooks, UploadTracker, web};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "slaycanvas-web", version, about = "SlayCanvas web shell")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default).
    Serve,
    /// Upload local files to the upload endpoint and print the resulting URLs.
    Upload {
        /// Overrides UPLOAD_URL for this run.
        #[arg(long)]
        url: Option<String>,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    if let Err(err) = app_main(Cli::parse()).await {
        error!(?err, "application error");
        std::process::exit(1);
    }
}

async fn app_main(cli: Cli) -> Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Upload { url, files } => upload(config, url, files).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = AppState::new(config).await?;
    let app = web::router::build_router(state);

    info!(%addr, "listening");
    let listener = TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn upload(config: AppConfig, url: Option<String>, paths: Vec<PathBuf>) -> Result<()> {
    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("failed to load {}", path.display()))?;
        files.push(file);
    }

    let hooks = UploadHooks::new()
        .on_progress(|file_id, progress| info!(%file_id, progress, "uploading"))
        .on_complete(|file_id, url| info!(%file_id, url, "uploaded"))
        .on_error(|file_id, err| error!(%file_id, %err, "upload failed"));
    let tracker = UploadTracker::new(Client::new(), url.unwrap_or(config.upload_url), hooks);
    info!(count = files.len(), destination = tracker.upload_url(), "starting uploads");

    let urls = tracker
        .upload_multiple_files(files)
        .await
        .context("upload failed")?;
    for url in urls {
        println!("{url}");
    }

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
