//! Confab Web Server
//!
//! HTTP interface for the Confab chat service.

use clap::Parser;
use confab_web::{init_logging, ConfabServer, WebConfig};

/// Confab Web Server - chat service with persistent conversation history
#[derive(Parser)]
#[command(name = "confab-web")]
#[command(about = "HTTP interface for the Confab chat service")]
#[command(version)]
struct Args {
    /// Server host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Database URL for conversation storage
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    std::env::set_var(
        "RUST_LOG",
        format!("confab_web={},tower_http=debug", args.log_level),
    );
    init_logging();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = WebConfig::from_env();
    config.host = args.host;
    config.port = args.port;
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    println!("🚀 Starting Confab Web Server");
    println!("📍 Server: http://{}", config.address());
    println!("🗄️  Database: {}", config.database_url);

    if std::env::var("OPENAI_API_KEY").is_err() {
        println!("⚠️  Warning: OPENAI_API_KEY is not set.");
        println!("   The server will start but chat requests will fail.");
    }

    let server = match ConfabServer::new(config).await {
        Ok(server) => server,
        Err(e) => {
            eprintln!("❌ Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        eprintln!("❌ Server failed to start: {}", e);
        std::process::exit(1);
    }
}
