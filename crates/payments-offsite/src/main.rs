//! # offsite-replay
//!
//! Replays offsite provider notifications through an `OffsiteGateway`.
//!
//! ## Usage
//!
//! ```bash
//! export OFFSITE_CHECKOUT_URL=https://pay.example.com/checkout
//!
//! # One JSON notification per line
//! offsite-replay notifications.ndjson
//! cat notifications.ndjson | offsite-replay
//! ```

use anyhow::Context;
use payments_core::Dispatcher;
use payments_offsite::{register_logging_listeners, OffsiteGateway};
use std::io::{self, BufRead, BufReader};
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let dispatcher = Arc::new(Dispatcher::new());
    register_logging_listeners(&dispatcher);

    let gateway = OffsiteGateway::from_env(dispatcher).context("Invalid gateway configuration")?;

    let reader: Box<dyn BufRead> = match std::env::args().nth(1) {
        Some(path) => {
            let file = std::fs::File::open(&path)
                .with_context(|| format!("Failed to open {}", path))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut processed = 0usize;
    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        gateway
            .process_slice(line.as_bytes())
            .with_context(|| format!("Notification on line {} failed", index + 1))?;
        processed += 1;
    }

    info!("[{}] Replayed {} notifications", gateway.config().name, processed);
    Ok(())
}
