//! Lighthouse beacon server
//!
//! Run with: cargo run --example lighthouse_server [BIND_ADDR]
//!
//! Examples:
//!   cargo run --example lighthouse_server                  # binds to 0.0.0.0:9876
//!   cargo run --example lighthouse_server localhost        # binds to 127.0.0.1:9876
//!   cargo run --example lighthouse_server 127.0.0.1:9877   # binds to 127.0.0.1:9877
//!
//! ## Listening
//!
//! Any line-oriented TCP client works:
//!   nc localhost 9876
//!
//! Each connection gets a welcome block, then one JSON status block every
//! broadcast interval.

use std::net::SocketAddr;

use lighthouse::server::DEFAULT_PORT;
use lighthouse::{LighthouseServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:9876
/// - "localhost:9877" -> 127.0.0.1:9877
/// - "127.0.0.1" -> 127.0.0.1:9876
/// - "0.0.0.0:9876" -> 0.0.0.0:9876
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: lighthouse_server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:{})", DEFAULT_PORT);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = ServerConfig::default();
    if let Some(addr_str) = args.get(1) {
        match parse_bind_addr(addr_str) {
            Ok(addr) => config = config.bind(addr),
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lighthouse=info".parse()?)
                .add_directive("lighthouse_server=info".parse()?),
        )
        .init();

    let server = LighthouseServer::new(config)?;

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            }
        })
        .await?;

    Ok(())
}
