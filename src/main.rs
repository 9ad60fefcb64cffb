mod api;
mod app;
mod cache;
mod commands;
mod config;
mod deeplink;
mod event;
mod scope;
mod select;
mod sync;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "k9v")]
#[command(about = "A terminal dashboard for Kubernetes clusters, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/k9v/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Namespace(s) to scope to at startup (repeatable)
  #[arg(short, long)]
  namespace: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Log to a file; the terminal belongs to the UI
  let log_dir = config::Config::log_dir()?;
  let file_appender = tracing_appender::rolling::daily(log_dir, "k9v.log");
  let (writer, _guard) = tracing_appender::non_blocking(file_appender);
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(writer)
    .with_ansi(false)
    .init();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override namespace scope if specified on command line
  let config = if args.namespace.is_empty() {
    config
  } else {
    config::Config {
      default_namespaces: args.namespace.into_iter().collect(),
      ..config
    }
  };

  // Initialize and run the app
  let mut app = app::App::new(config)?;
  app.run().await?;

  Ok(())
}
