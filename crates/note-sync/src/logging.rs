use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the default tracing subscriber for sync hosts.
///
/// Reads the level from `RUST_LOG`, defaulting to "info". Fails if a global
/// subscriber is already set.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{info, warn};

    #[test]
    fn second_init_is_rejected() {
        let _ = init();
        assert!(init().is_err());

        info!(root = "/", "Sync finished");
        warn!(path = "/a.md", "Failed to remove");
    }
}
