//! Command implementations for the usersync CLI

pub mod check;
pub mod serve;

pub use check::run_check;
pub use serve::run_serve;

use anyhow::{Context, Result};

/// Resolve the database URL from the flag/env value clap collected.
pub(crate) fn require_database_url(database_url: Option<String>) -> Result<String> {
    database_url
        .filter(|url| !url.trim().is_empty())
        .context("DATABASE_URL not set. Set via --database-url, DATABASE_URL env, or .env")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_is_required() {
        assert!(require_database_url(None).is_err());
        assert!(require_database_url(Some("  ".into())).is_err());
        assert_eq!(
            require_database_url(Some("postgres://localhost/usersync".into())).unwrap(),
            "postgres://localhost/usersync"
        );
    }
}
