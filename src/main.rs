use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use futures::StreamExt;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tracing::Level;

use launchdeck::launch_server::{SharedView, handle_request};
use launchdeck::query_watcher::POLL_INTERVAL;
use launchdeck::{HttpQueryExecutor, LaunchListView, PollingQueryWatcher, operations};

#[derive(Parser, Debug)]
#[command(name = "launchdeck", about = "Upcoming rocket launches over GraphQL")]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "launchdeck.yaml")]
    config: PathBuf,

    /// Listen address override, e.g. 0.0.0.0:3000.
    #[arg(long)]
    listen: Option<String>,

    /// Log level: error, warn, info, debug or trace.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct AppConfig {
    endpoint: EndpointConfig,
    listen: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EndpointConfig {
    url: String,
}

fn load_config(path: &Path) -> Result<AppConfig, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;
    serde_yaml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
}

fn startup_error(message: String) -> Box<std::io::Error> {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, message))
}

#[derive(Clone)]
// An Executor that uses the tokio runtime.
struct TokioExecutor;

impl<F> hyper::rt::Executor<F> for TokioExecutor
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    fn execute(&self, fut: F) {
        tokio::task::spawn(fut);
    }
}

#[tokio::main]
async fn main() -> std::result::Result<(), std::boxed::Box<std::io::Error>> {
    let args = Args::parse();

    let level = Level::from_str(&args.log_level)
        .map_err(|e| startup_error(format!("Invalid log level {}: {}", args.log_level, e)))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_config(&args.config).map_err(startup_error)?;
    let request = operations::launches_request().map_err(startup_error)?;

    let query_executor = HttpQueryExecutor::new(&config.endpoint.url);
    tracing::info!(
        "polling {} every {:?}",
        query_executor.endpoint_url(),
        POLL_INTERVAL
    );

    let view: SharedView = Arc::new(RwLock::new(LaunchListView::new()));

    // The subscription lives inside the apply loop and is released with it.
    let mut subscription = PollingQueryWatcher::new(query_executor, request).watch();
    let poll_view = Arc::clone(&view);
    tokio::task::spawn(async move {
        while let Some(emission) = subscription.next().await {
            poll_view.write().await.apply_emission(emission);
        }
    });

    let listen = args
        .listen
        .or(config.listen)
        .unwrap_or_else(|| "0.0.0.0:3000".to_string());
    let addr: SocketAddr = listen
        .parse()
        .map_err(|e| startup_error(format!("Invalid listen address {}: {}", listen, e)))?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Launch list available at http://{}", addr);

    loop {
        let (stream, _addr) = listener.accept().await?;
        let io = TokioIo::new(stream);

        let view_clone = Arc::clone(&view);
        let executor = TokioExecutor;

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let view = view_clone.clone();
                handle_request(req, view)
            });

            if let Err(e) = hyper_util::server::conn::auto::Builder::new(executor)
                .serve_connection(io, service)
                .await
            {
                tracing::error!("Error processing connection: {}", e);
            }
        });
    }
}
