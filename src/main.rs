//! gateway-router
//!
//! Runs a route table described in TOML either as a local HTTP server or as
//! a one-shot handler for a single proxy event, the way a serverless
//! function would receive it.
//!
//! ```text
//!  HTTP request ──▶ axum ──▶ ProxyRequest ─┐
//!                                          ├──▶ Router::dispatch ──▶ ProxyResponse
//!  event JSON (file/stdin) ──▶ ProxyRequest┘
//! ```

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use gateway_router::config::{prepare_gateway, read_config, render_route_tree, GatewayConfig};
use gateway_router::http::{into_proxy_response, GatewayServer, ProxyRequest};
use gateway_router::lifecycle::signals::wait_for_signal;
use gateway_router::observability::{logging, metrics};
use gateway_router::{GatewayRouter, Shutdown};

#[derive(Parser)]
#[command(name = "gateway-router")]
#[command(about = "First-match request router for serverless HTTP front-ends", long_about = None)]
struct Cli {
    /// Route table configuration (TOML).
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the route table over HTTP
    Serve {
        /// Override `server.bind_address`.
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Dispatch one proxy event and print the response envelope
    Invoke {
        /// Event JSON file; reads stdin when omitted.
        #[arg(short, long)]
        event: Option<PathBuf>,
    },
    /// Print the route tree in evaluation order
    Routes,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = read_config(&cli.config)?;
    logging::init_logging(&config.observability);
    let router = prepare_gateway(&config)?;

    tracing::info!(config = %cli.config.display(), routes = router.len(), "Configuration loaded");

    match cli.command {
        Commands::Serve { bind } => serve(config, router, bind).await,
        Commands::Invoke { event } => invoke(&router, event),
        Commands::Routes => {
            print!("{}", render_route_tree(&config));
            Ok(())
        }
    }
}

async fn serve(
    mut config: GatewayConfig,
    router: GatewayRouter,
    bind: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = bind {
        config.server.bind_address = bind;
    }
    let router = Arc::new(router);

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    let shutdown = Shutdown::new();
    let server = GatewayServer::new(router, config.server.clone());
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn invoke(router: &GatewayRouter, event: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let payload = match event {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let request: ProxyRequest = serde_json::from_str(&payload)?;

    let dispatched = router.dispatch(&request);
    tracing::info!(
        request_id = %request.request_id(),
        route = dispatched.route.unwrap_or("none"),
        "Event dispatched"
    );

    let response = into_proxy_response(dispatched.result);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
