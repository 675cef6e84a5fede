//! File Export - tool server that turns structured data into downloadable files
//!
//! Runs the tool API over HTTP (`tools`) or stdio (`stdio`), or the file
//! server (`files`), over the same export directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use file_export::{
    api::{build_files_app, build_tools_app},
    config::{ExportConfig, ServerConfig},
    tools::{stdio::serve_stdio, ExportService, ToolsState},
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "file-export")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Turn structured data into downloadable files")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "FILE_EXPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the tool API
    Tools {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Serve the tool API as newline-delimited JSON-RPC on stdin/stdout
    Stdio,

    /// Serve the export directory
    Files {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose {
        "debug".to_string()
    } else {
        std::env::var("LOG_LEVEL")
            .map(|l| l.to_ascii_lowercase())
            .unwrap_or_else(|_| "info".to_string())
    };
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new(default_directives(&log_level))
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| default_directives(&log_level).into())
    };
    // Stdout carries JSON-RPC traffic in stdio mode
    if matches!(cli.command, Commands::Stdio) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = ExportConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Tools { host, port } => {
            let server = override_bind(&config.tools, host, port);
            run_tools(config, server).await?;
        }
        Commands::Stdio => {
            run_stdio(config).await?;
        }
        Commands::Files { host, port } => {
            let server = override_bind(&config.files, host, port);
            run_files(config, server).await?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn default_directives(level: &str) -> String {
    format!("file_export={},tower_http={}", level, level)
}

fn override_bind(base: &ServerConfig, host: Option<String>, port: Option<u16>) -> ServerConfig {
    ServerConfig {
        host: host.unwrap_or_else(|| base.host.clone()),
        port: port.unwrap_or(base.port),
    }
}

async fn run_tools(config: ExportConfig, server: ServerConfig) -> Result<()> {
    tracing::info!("Starting File Export tool server");
    config.announce();

    tokio::fs::create_dir_all(&config.export.dir)
        .await
        .with_context(|| format!("Failed to create {}", config.export.dir.display()))?;

    let service = Arc::new(ExportService::new(&config));
    let app = build_tools_app(service, &config.cors_origins);
    serve(app, &server).await
}

async fn run_stdio(config: ExportConfig) -> Result<()> {
    tracing::info!("Starting File Export tool server on stdio");
    config.announce();

    tokio::fs::create_dir_all(&config.export.dir)
        .await
        .with_context(|| format!("Failed to create {}", config.export.dir.display()))?;

    let state = ToolsState {
        service: Arc::new(ExportService::new(&config)),
    };
    serve_stdio(state, tokio::io::stdin(), tokio::io::stdout()).await?;
    Ok(())
}

async fn run_files(config: ExportConfig, server: ServerConfig) -> Result<()> {
    tracing::info!("Starting File Export file server");

    let root = config.export.dir.clone();
    tokio::fs::create_dir_all(&root)
        .await
        .with_context(|| format!("Failed to create {}", root.display()))?;
    tracing::info!(root = %root.display(), "Serving export directory");

    let app = build_files_app(root, &config.cors_origins);
    serve(app, &server).await
}

async fn serve(app: axum::Router, server: &ServerConfig) -> Result<()> {
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on http://{}. Press Ctrl+C to stop.", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(tokio::signal::ctrl_c()))
        .await?;

    Ok(())
}

/// Resolves once `signal` fires. If the signal cannot be installed the
/// server keeps running until the process is killed.
async fn shutdown_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down...");
}

fn show_config(config: Option<&ExportConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
