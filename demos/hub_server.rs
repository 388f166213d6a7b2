//! WebSocket broadcast hub server
//!
//! Run with: cargo run --example hub_server [BIND_ADDR | --addr BIND_ADDR] [--everyone]
//!
//! Examples:
//!   cargo run --example hub_server                    # binds to 0.0.0.0:8080
//!   cargo run --example hub_server localhost          # binds to 127.0.0.1:8080
//!   cargo run --example hub_server 127.0.0.1:9000     # binds to 127.0.0.1:9000
//!   cargo run --example hub_server --everyone         # echo every message to every client
//!
//! ## Connecting
//!
//! Consumers receive broadcasts:
//!   websocat "ws://localhost:8080/echo?role=consumer"
//!
//! Producers (or any client) send them:
//!   websocat "ws://localhost:8080/echo?role=producer"
//!
//! Clients without a role receive nothing unless `--everyone` is given.

use std::net::SocketAddr;
use std::time::Duration;

use wshub_rs::{FanoutPredicate, HubConfig, HubServer, ServerConfig};

const DEFAULT_PORT: u16 = 8080;

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8080
/// - "localhost:9000" -> 127.0.0.1:9000
/// - "127.0.0.1" -> 127.0.0.1:8080
/// - "0.0.0.0:8080" -> 0.0.0.0:8080
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
    eprintln!("Usage: hub_server [BIND_ADDR | --addr BIND_ADDR] [--everyone]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8080)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --addr ADDR  Same as BIND_ADDR");
    eprintln!("  --everyone   Deliver every message to every client, sender included");
    eprintln!("  --help, -h   Show this help");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let everyone = args.iter().any(|a| a == "--everyone");

    let addr_arg = match args.iter().position(|a| a == "--addr") {
        Some(i) => args.get(i + 1),
        None => args.iter().find(|a| !a.starts_with("--")),
    };

    let bind_addr = match addr_arg {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wshub_rs=info".parse()?)
                .add_directive("hub_server=debug".parse()?),
        )
        .init();

    let config = ServerConfig::with_addr(bind_addr);

    let fanout = if everyone {
        FanoutPredicate::everyone()
    } else {
        FanoutPredicate::consumers()
    };
    let hub_config = HubConfig::default()
        .fanout(fanout)
        .stats_interval(Duration::from_secs(30));

    println!("Starting hub on ws://{}{}", config.bind_addr, config.path);
    println!("Fan-out: {}", hub_config.fanout.name());
    println!();

    let server = HubServer::with_hub_config(config, hub_config);

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        println!("\nShutting down...");
    };

    if let Err(e) = server.run_until(shutdown).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
