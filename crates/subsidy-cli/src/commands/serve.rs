//! Server command implementation

use anyhow::Result;

use subsidy_core::{BackendKind, Config};

pub async fn cmd_serve(mut config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    println!("🚀 Starting subsidy web server...");
    println!(
        "   Listening: http://{}:{}",
        config.server.host, config.server.port
    );
    println!(
        "   Backend: {} (model: {})",
        config.provider.backend.as_str(),
        config.provider.model
    );
    if config.provider.api_key.is_none() && config.provider.backend == BackendKind::Gemini {
        println!("   ⚠️  GEMINI_API_KEY is not set - searches will fail");
    }
    if config.server.host != "127.0.0.1" && config.server.host != "localhost" {
        println!("   ⚠️  No authentication - do not expose to untrusted networks!");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    subsidy_server::serve(config).await
}
