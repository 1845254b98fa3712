//! Console logging for the usersync binary
//!
//! `RUST_LOG` takes precedence; otherwise `--debug` picks `debug`, else `info`.
//! Request spans come from tower-http, e.g.
//! `RUST_LOG=usersync_server=debug,tower_http=debug usersync serve`.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Install the global fmt subscriber.
pub fn init(debug: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(debug)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_flag_picks_level() {
        assert_eq!(default_directive(false), "info");
        assert_eq!(default_directive(true), "debug");
    }
}
