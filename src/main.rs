//! stns-fetch - attribute lookup CLI
//!
//! Composition root: loads configuration, wires the adapters and runs one
//! lookup. Logs go to stderr so stdout carries only the result.

use stns_fetch::{load_config, ApiPath, FetchService, FileLockStore};
use std::io::Write;

const USAGE: &str = "usage: stns-fetch [--raw] <segment>... | stns-fetch --reset-locks";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut raw = false;
    let mut reset_locks = false;
    let mut segments = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--raw" => raw = true,
            "--reset-locks" => reset_locks = true,
            "-h" | "--help" => {
                println!("{}", USAGE);
                return Ok(());
            }
            _ => segments.push(arg),
        }
    }

    if reset_locks {
        let store = FileLockStore::new(cfg.lock_store_config());
        for endpoint in cfg.endpoints() {
            if store.clear(&endpoint)? {
                tracing::info!("cleared lock record for {}", endpoint);
            }
        }
        return Ok(());
    }

    if segments.is_empty() {
        anyhow::bail!(USAGE);
    }

    let path = ApiPath::from_segments(&segments);
    let service = FetchService::from_config(&cfg)?;

    tracing::debug!(
        "looking up {} across {} endpoints",
        path,
        service.endpoints().len()
    );

    let mut stdout = std::io::stdout().lock();
    if raw {
        let body = service.get_raw(&path).await?;
        stdout.write_all(&body)?;
    } else {
        let attrs = service.get(&path).await?;
        serde_json::to_writer_pretty(&mut stdout, &attrs)?;
        writeln!(stdout)?;
    }

    Ok(())
}
